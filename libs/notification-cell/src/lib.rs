// =====================================================================================
// NOTIFICATION CELL - PATIENT EMAIL & SMS DELIVERY
// =====================================================================================
//
// Wraps the outbound email API and the Twilio SMS API behind one channel trait.
// Sends never fail the caller: every attempt comes back as a DeliveryResult.
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    ChannelKind, DeliveryResult, DeliveryStatus, NotificationError, NotificationOutcome,
    Recipient, TestNotificationRequest,
};

pub use services::{EmailClient, NotificationChannel, NotificationGateway, SmsClient};

pub use router::notification_routes;
