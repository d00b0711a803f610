//! HTTP surface of the reminder service

use actix_web::{web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ReminderError, Result};
use crate::sweep::{ExpirySweep, SweepOutcome};

/// Application state
pub struct AppState {
    pub sweep: Arc<ExpirySweep>,
}

impl AppState {
    pub fn new(sweep: Arc<ExpirySweep>) -> Self {
        Self { sweep }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check))
        .service(
            web::scope("/api/v1")
                .route("/reminders/run", web::post().to(run_sweep))
                .route(
                    "/users/{user_id}/reminders",
                    web::get().to(preview_reminders),
                ),
        );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "reminder-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    if state.sweep.is_ready().await {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ready",
            "database": "connected"
        }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "not_ready",
            "database": "disconnected"
        }))
    }
}

async fn run_sweep(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.sweep.run_once().await? {
        SweepOutcome::Completed(report) => Ok(HttpResponse::Ok().json(report)),
        SweepOutcome::Skipped => Err(ReminderError::SweepInProgress),
    }
}

async fn preview_reminders(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();

    match state.sweep.preview_for_user(user_id).await? {
        Some(batch) => Ok(HttpResponse::Ok().json(batch)),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({
            "user_id": user_id,
            "entries": []
        }))),
    }
}
