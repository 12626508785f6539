pub mod email;
pub mod gateway;
pub mod sms;

pub use email::EmailClient;
pub use gateway::{NotificationChannel, NotificationGateway};
pub use sms::SmsClient;
