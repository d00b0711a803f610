//! User accounts
//!
//! Credential hashing happens in the authentication layer; this crate only
//! stores the resulting hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique across all users
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user with an already-hashed credential
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let valid = CreateUserRequest {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateUserRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let empty_name = CreateUserRequest {
            name: String::new(),
            ..valid
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_serialized_user_hides_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("dana@example.com"));
    }
}
