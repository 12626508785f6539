// libs/notification-cell/src/services/sms.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{ChannelKind, DeliveryResult, NotificationError};
use crate::services::gateway::NotificationChannel;

/// Twilio Programmable Messaging client.
/// POST {base}/2010-04-01/Accounts/{sid}/Messages.json, form encoded, basic auth.
pub struct SmsClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    configured: bool,
    timeout: Duration,
}

impl SmsClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.twilio_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_from_number.clone(),
            configured: config.is_sms_configured(),
            timeout: Duration::from_secs(config.outbound_timeout_seconds),
        }
    }

    async fn deliver(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        if !self.configured {
            return Err(NotificationError::NotConfigured(ChannelKind::Sms));
        }

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        debug!("Sending SMS request to: {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::ProviderRejected {
                channel: ChannelKind::Sms,
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for SmsClient {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    async fn send(&self, destination: &str, _subject: &str, body: &str) -> DeliveryResult {
        match self.deliver(destination, body).await {
            Ok(()) => {
                info!("SMS sent to: {}", destination);
                DeliveryResult::success("SMS sent successfully")
            }
            Err(NotificationError::NotConfigured(_)) => {
                error!("SMS not sent to {}: channel not configured", destination);
                DeliveryResult::failure("SMS channel not configured")
            }
            Err(e) => {
                error!("Error sending SMS to {}: {}", destination, e);
                DeliveryResult::failure("Failed to send SMS")
            }
        }
    }
}
