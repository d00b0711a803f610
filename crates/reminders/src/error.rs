use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use grocify_core::GrocifyError;

pub type Result<T> = std::result::Result<T, ReminderError>;

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error(transparent)]
    Core(#[from] GrocifyError),

    #[error("A sweep is already running")]
    SweepInProgress,
}

impl ResponseError for ReminderError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReminderError::Core(GrocifyError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            ReminderError::Core(GrocifyError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ReminderError::Core(GrocifyError::DatabaseError { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ReminderError::SweepInProgress => StatusCode::CONFLICT,
            ReminderError::Core(GrocifyError::ConfigurationError { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ReminderError::Core(GrocifyError::ValidationError { .. }) => "validation_error",
            ReminderError::Core(GrocifyError::NotFound { .. }) => "not_found",
            ReminderError::Core(GrocifyError::ConfigurationError { .. }) => "internal_error",
            ReminderError::Core(GrocifyError::DatabaseError { .. }) => "store_unavailable",
            ReminderError::SweepInProgress => "sweep_in_progress",
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": code,
            "error_description": self.to_string()
        }))
    }
}
