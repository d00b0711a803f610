use super::service::{ensure_recipient, EmailError, EmailMessage, NotificationDispatcher, Result};
use async_trait::async_trait;
use grocify_core::telemetry::external_api_span;
use serde_json::json;
use std::time::Duration;
use tracing::{info, Instrument};

pub struct SendGridProvider {
    api_key: String,
    api_base: String,
    from_email: String,
    from_name: String,
    client: reqwest::Client,
}

impl SendGridProvider {
    pub fn new(
        api_key: String,
        api_base: String,
        from_email: String,
        from_name: String,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            from_email,
            from_name,
            client,
        })
    }
}

#[async_trait]
impl NotificationDispatcher for SendGridProvider {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<()> {
        ensure_recipient(to)?;

        let payload = json!({
            "personalizations": [{
                "to": [{"email": to}],
                "subject": message.subject
            }],
            "from": {
                "email": self.from_email,
                "name": self.from_name
            },
            "content": [
                {
                    "type": "text/plain",
                    "value": message.text_body
                },
                {
                    "type": "text/html",
                    "value": message.html_body
                }
            ]
        });

        let url = format!("{}/v3/mail/send", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .instrument(external_api_span("POST", &url, "sendgrid"))
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}

/// Development provider that writes messages to stdout
#[derive(Debug, Default)]
pub struct ConsoleProvider;

impl ConsoleProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for ConsoleProvider {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<()> {
        ensure_recipient(to)?;

        println!("\n{:=<60}", "");
        println!("EMAIL SENT (Console Provider - Development Mode)");
        println!("{:=<60}", "");
        println!("To: {}", to);
        println!("Subject: {}", message.subject);
        println!("{:-<60}", "");
        println!("{}", message.text_body);
        println!("{:=<60}\n", "");

        info!(to = %to, subject = %message.subject, "Console email delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}
