use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Email,
    Sms,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Email => write!(f, "email"),
            ChannelKind::Sms => write!(f, "sms"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failure,
}

/// Outcome of one send attempt on one channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryResult {
    pub status: DeliveryStatus,
    pub message: String,
}

impl DeliveryResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: DeliveryStatus::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DeliveryStatus::Success
    }
}

/// Where a patient can be reached. Blank addresses count as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl Recipient {
    pub fn new(email: Option<String>, phone_number: Option<String>) -> Self {
        Self {
            email: email.filter(|value| !value.trim().is_empty()),
            phone_number: phone_number.filter(|value| !value.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOutcome {
    pub email_response: DeliveryResult,
    pub sms_response: DeliveryResult,
}

impl NotificationOutcome {
    pub fn any_delivered(&self) -> bool {
        self.email_response.is_success() || self.sms_response.is_success()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("{0} channel not configured")]
    NotConfigured(ChannelKind),

    #[error("Provider rejected {channel} message: HTTP {status}: {body}")]
    ProviderRejected {
        channel: ChannelKind,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
