// libs/notification-cell/src/services/gateway.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, warn};

use shared_config::AppConfig;

use crate::models::{ChannelKind, DeliveryResult, NotificationOutcome, Recipient};
use crate::services::{email::EmailClient, sms::SmsClient};

/// One outbound delivery channel. Implementations turn every fault into a
/// failed `DeliveryResult` instead of returning an error.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn send(&self, destination: &str, subject: &str, body: &str) -> DeliveryResult;
}

pub struct NotificationGateway {
    email: Arc<dyn NotificationChannel>,
    sms: Arc<dyn NotificationChannel>,
}

impl NotificationGateway {
    pub fn new(email: Arc<dyn NotificationChannel>, sms: Arc<dyn NotificationChannel>) -> Self {
        Self { email, sms }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(EmailClient::new(config)),
            Arc::new(SmsClient::new(config)),
        )
    }

    /// Attempt one email and one SMS. The channels run concurrently and a
    /// failure on one never affects the other.
    #[instrument(skip(self, body))]
    pub async fn notify(&self, recipient: &Recipient, subject: &str, body: &str) -> NotificationOutcome {
        let (email_response, sms_response) = tokio::join!(
            Self::dispatch(self.email.as_ref(), recipient.email.as_deref(), subject, body),
            Self::dispatch(self.sms.as_ref(), recipient.phone_number.as_deref(), subject, body),
        );

        NotificationOutcome {
            email_response,
            sms_response,
        }
    }

    async fn dispatch(
        channel: &dyn NotificationChannel,
        destination: Option<&str>,
        subject: &str,
        body: &str,
    ) -> DeliveryResult {
        match destination {
            Some(destination) => channel.send(destination, subject, body).await,
            None => {
                let kind = channel.kind();
                warn!("No {} destination on file, skipping send", kind);
                match kind {
                    ChannelKind::Email => DeliveryResult::failure("No email address on file"),
                    ChannelKind::Sms => DeliveryResult::failure("No phone number on file"),
                }
            }
        }
    }
}
