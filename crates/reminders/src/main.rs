//! Reminder Service - Daily expiry sweep and reminder emails
//!
//! Port: 8090

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use grocify_core::{
    init_tracing, load_dotenv, ConfigLoader, DatabaseConfig, DatabasePool, ServiceConfig,
    TracingConfig,
};
use grocify_reminders::{
    build_dispatcher, run_scheduler, server, Clock, DailyTicker, EmailConfig, ExpirySweep,
    IntervalTicker, PostgresStore, RecipeClient, ReminderConfig, SweepSchedule, SystemClock,
    TemplateEngine,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    init_tracing(TracingConfig::from_env()).context("Failed to initialize tracing")?;

    let service_config = ServiceConfig::from_env()?;
    service_config.validate()?;
    let database_config = DatabaseConfig::from_env()?;
    database_config.validate()?;
    let reminder_config = ReminderConfig::from_env()?;
    reminder_config.validate()?;
    let email_config = EmailConfig::from_env()?;
    email_config.validate()?;

    info!(
        host = %service_config.host,
        port = service_config.port,
        "Starting Reminder Service"
    );

    let pool = DatabasePool::new(&database_config)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PostgresStore::new(pool.pool().clone()));
    store
        .initialize_schema()
        .await
        .context("Failed to initialize schema")?;

    let dispatcher = build_dispatcher(&email_config, reminder_config.dispatch_timeout)
        .context("Failed to build email dispatcher")?;
    info!(provider = dispatcher.name(), "Email dispatcher ready");

    let templates = TemplateEngine::new(
        email_config.base_url.clone(),
        email_config.from_name.clone(),
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut sweep = ExpirySweep::new(
        store,
        dispatcher,
        clock.clone(),
        templates,
        &reminder_config,
    );

    if let Some(recipes) = &reminder_config.recipes {
        let client = RecipeClient::new(recipes.base_url.clone(), recipes.timeout)
            .context("Failed to build recipe client")?;
        if !client.health().await {
            warn!(url = %recipes.base_url, "Recipe service not reachable, continuing");
        }
        sweep = sweep.with_recipes(Arc::new(client), recipes.timeout, recipes.max_suggestions);
    }

    let sweep = Arc::new(sweep);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = match reminder_config.schedule {
        SweepSchedule::Daily { at } => {
            info!(run_at = %at, "Scheduling daily sweep");
            let ticker = DailyTicker::new(clock, at, reminder_config.run_on_startup);
            tokio::spawn(run_scheduler(sweep.clone(), ticker, shutdown_rx))
        }
        SweepSchedule::Every(period) => {
            info!(interval_secs = period.as_secs(), "Scheduling fixed-interval sweep");
            let ticker = IntervalTicker::new(period, reminder_config.run_on_startup);
            tokio::spawn(run_scheduler(sweep.clone(), ticker, shutdown_rx))
        }
    };

    let state = web::Data::new(server::AppState::new(sweep));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(server::configure)
    })
    .workers(service_config.workers)
    .bind((service_config.host.as_str(), service_config.port))?
    .run()
    .await?;

    info!("HTTP server stopped, shutting down scheduler");
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.await {
        warn!(error = %e, "Scheduler task ended abnormally");
    }

    Ok(())
}
