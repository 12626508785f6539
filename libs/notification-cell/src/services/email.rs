// libs/notification-cell/src/services/email.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{ChannelKind, DeliveryResult, NotificationError};
use crate::services::gateway::NotificationChannel;

/// Transactional email over the SendGrid v3 mail API.
/// POST {base}/v3/mail/send, 202 Accepted on success.
pub struct EmailClient {
    client: Client,
    base_url: String,
    api_key: String,
    from_address: String,
    configured: bool,
    timeout: Duration,
}

impl EmailClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.email_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.email_api_key.clone(),
            from_address: config.email_from_address.clone(),
            configured: config.is_email_configured(),
            timeout: Duration::from_secs(config.outbound_timeout_seconds),
        }
    }

    async fn deliver(&self, to: &str, subject: &str, text: &str) -> Result<(), NotificationError> {
        if !self.configured {
            return Err(NotificationError::NotConfigured(ChannelKind::Email));
        }

        let url = format!("{}/v3/mail/send", self.base_url);
        let request_body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from_address },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": text }]
        });

        debug!("Sending email request to: {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::ProviderRejected {
                channel: ChannelKind::Email,
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for EmailClient {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, destination: &str, subject: &str, body: &str) -> DeliveryResult {
        match self.deliver(destination, subject, body).await {
            Ok(()) => {
                info!("Email sent to: {}", destination);
                DeliveryResult::success("Email sent successfully")
            }
            Err(NotificationError::NotConfigured(_)) => {
                error!("Email not sent to {}: channel not configured", destination);
                DeliveryResult::failure("Email channel not configured")
            }
            Err(e) => {
                error!("Error sending email to {}: {}", destination, e);
                DeliveryResult::failure("Failed to send email")
            }
        }
    }
}
