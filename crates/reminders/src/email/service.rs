use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Email provider rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, EmailError>;

/// Rendered message ready for a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Outbound notification channel
///
/// Callers treat delivery as best effort: a failure is reported but never
/// retried by the dispatcher itself.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<()>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}

pub(crate) fn ensure_recipient(to: &str) -> Result<()> {
    let trimmed = to.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(EmailError::InvalidRecipient(to.to_string())),
    }
}
