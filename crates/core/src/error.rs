//! Shared error type for Grocify services

use thiserror::Error;

/// Errors shared across Grocify crates
#[derive(Debug, Error)]
pub enum GrocifyError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable responsible for the failure, if any
        key: Option<String>,
    },

    /// Database operation failed
    #[error("Database error during {operation}: {message}")]
    DatabaseError { operation: String, message: String },

    /// Input failed validation
    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Entity lookup returned nothing
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

impl GrocifyError {
    /// Build a database error from a sqlx error
    pub fn database(operation: impl Into<String>, err: sqlx::Error) -> Self {
        GrocifyError::DatabaseError {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    /// Build a validation error for a field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        GrocifyError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a not-found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        GrocifyError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for GrocifyError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "input".to_string());

        GrocifyError::ValidationError {
            field,
            message: errors.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrocifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, validator::Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_validation_errors_name_the_field() {
        use validator::Validate;

        let errors = Named {
            name: String::new(),
        }
        .validate()
        .unwrap_err();

        match GrocifyError::from(errors) {
            GrocifyError::ValidationError { field, .. } => assert_eq!(field, "name"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let err = GrocifyError::not_found("item", 42);
        assert_eq!(err.to_string(), "item not found: 42");

        let err = GrocifyError::ConfigurationError {
            message: "missing url".to_string(),
            key: Some("GROCIFY_DATABASE_URL".to_string()),
        };
        assert_eq!(err.to_string(), "Configuration error: missing url");
    }
}
