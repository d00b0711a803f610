pub mod providers;
pub mod service;
pub mod templates;

pub use providers::{ConsoleProvider, SendGridProvider};
pub use service::{EmailError, EmailMessage, NotificationDispatcher};
pub use templates::TemplateEngine;

use grocify_core::{ConfigLoader, GrocifyError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub provider: EmailProviderConfig,
    pub from_email: String,
    pub from_name: String,
    /// Link target for "open your pantry" in reminders
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmailProviderConfig {
    SendGrid {
        api_key: String,
        /// Overridable for tests
        api_base: String,
    },
    Console,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProviderConfig::Console,
            from_email: "noreply@grocify.local".to_string(),
            from_name: "Grocify".to_string(),
            base_url: "http://localhost:5173".to_string(),
        }
    }
}

impl ConfigLoader for EmailConfig {
    /// - `GROCIFY_EMAIL_PROVIDER`: "console" (default) or "sendgrid"
    /// - `GROCIFY_SENDGRID_API_KEY`: required for sendgrid
    /// - `GROCIFY_SENDGRID_API_BASE`: default "https://api.sendgrid.com"
    /// - `GROCIFY_EMAIL_FROM`, `GROCIFY_EMAIL_FROM_NAME`, `GROCIFY_APP_BASE_URL`
    fn from_env() -> Result<Self, GrocifyError> {
        let defaults = EmailConfig::default();

        let provider_name =
            std::env::var("GROCIFY_EMAIL_PROVIDER").unwrap_or_else(|_| "console".to_string());

        let provider = match provider_name.to_lowercase().as_str() {
            "console" => EmailProviderConfig::Console,
            "sendgrid" => {
                let api_key = std::env::var("GROCIFY_SENDGRID_API_KEY").map_err(|_| {
                    GrocifyError::ConfigurationError {
                        message: "GROCIFY_SENDGRID_API_KEY must be set for the sendgrid provider"
                            .to_string(),
                        key: Some("GROCIFY_SENDGRID_API_KEY".to_string()),
                    }
                })?;
                let api_base = std::env::var("GROCIFY_SENDGRID_API_BASE")
                    .unwrap_or_else(|_| "https://api.sendgrid.com".to_string());
                EmailProviderConfig::SendGrid { api_key, api_base }
            }
            other => {
                return Err(GrocifyError::ConfigurationError {
                    message: format!("Unknown email provider '{}'", other),
                    key: Some("GROCIFY_EMAIL_PROVIDER".to_string()),
                })
            }
        };

        Ok(Self {
            provider,
            from_email: std::env::var("GROCIFY_EMAIL_FROM").unwrap_or(defaults.from_email),
            from_name: std::env::var("GROCIFY_EMAIL_FROM_NAME").unwrap_or(defaults.from_name),
            base_url: std::env::var("GROCIFY_APP_BASE_URL").unwrap_or(defaults.base_url),
        })
    }

    fn validate(&self) -> Result<(), GrocifyError> {
        if !self.from_email.contains('@') {
            return Err(GrocifyError::ConfigurationError {
                message: format!("Invalid sender address '{}'", self.from_email),
                key: Some("GROCIFY_EMAIL_FROM".to_string()),
            });
        }

        url::Url::parse(&self.base_url).map_err(|e| GrocifyError::ConfigurationError {
            message: format!("Invalid app base URL: {}", e),
            key: Some("GROCIFY_APP_BASE_URL".to_string()),
        })?;

        if let EmailProviderConfig::SendGrid { api_key, api_base } = &self.provider {
            if api_key.trim().is_empty() {
                return Err(GrocifyError::ConfigurationError {
                    message: "SendGrid API key is empty".to_string(),
                    key: Some("GROCIFY_SENDGRID_API_KEY".to_string()),
                });
            }
            url::Url::parse(api_base).map_err(|e| GrocifyError::ConfigurationError {
                message: format!("Invalid SendGrid API base: {}", e),
                key: Some("GROCIFY_SENDGRID_API_BASE".to_string()),
            })?;
        }

        Ok(())
    }
}

/// Build the dispatcher selected by `config`
///
/// # Errors
///
/// Returns `EmailError::HttpClient` when the provider's HTTP client cannot
/// be built.
pub fn build_dispatcher(
    config: &EmailConfig,
    request_timeout: Duration,
) -> Result<Arc<dyn NotificationDispatcher>, EmailError> {
    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.provider {
        EmailProviderConfig::SendGrid { api_key, api_base } => Arc::new(SendGridProvider::new(
            api_key.clone(),
            api_base.clone(),
            config.from_email.clone(),
            config.from_name.clone(),
            request_timeout,
        )?),
        EmailProviderConfig::Console => Arc::new(ConsoleProvider::new()),
    };
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_console() {
        let config = EmailConfig::default();
        assert!(matches!(config.provider, EmailProviderConfig::Console));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_sendgrid_key() {
        let config = EmailConfig {
            provider: EmailProviderConfig::SendGrid {
                api_key: "  ".to_string(),
                api_base: "https://api.sendgrid.com".to_string(),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_dispatcher_selects_provider() {
        let console = build_dispatcher(&EmailConfig::default(), Duration::from_secs(5)).unwrap();
        assert_eq!(console.name(), "console");

        let config = EmailConfig {
            provider: EmailProviderConfig::SendGrid {
                api_key: "sg-key".to_string(),
                api_base: "https://api.sendgrid.com".to_string(),
            },
            ..Default::default()
        };
        let sendgrid = build_dispatcher(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(sendgrid.name(), "sendgrid");
    }

    #[test]
    fn test_validate_rejects_bad_sender() {
        let config = EmailConfig {
            from_email: "grocify".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
