use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_RECONCILIATION_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_OUTBOUND_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_PORT: u16 = 3030;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub email_api_base_url: String,
    pub email_api_key: String,
    pub email_from_address: String,
    pub twilio_base_url: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,
    pub reconciliation_interval_seconds: u64,
    pub outbound_timeout_seconds: u64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: required("SUPABASE_URL"),
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY"),
            email_api_base_url: env::var("EMAIL_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_API_BASE_URL not set, using default");
                    "https://api.sendgrid.com".to_string()
                }),
            email_api_key: required("EMAIL_API_KEY"),
            email_from_address: required("EMAIL_FROM_ADDRESS"),
            twilio_base_url: env::var("TWILIO_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_BASE_URL not set, using default");
                    "https://api.twilio.com".to_string()
                }),
            twilio_account_sid: required("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: required("TWILIO_AUTH_TOKEN"),
            twilio_from_number: required("TWILIO_FROM_NUMBER"),
            reconciliation_interval_seconds: numeric(
                "RECONCILIATION_INTERVAL_SECONDS",
                DEFAULT_RECONCILIATION_INTERVAL_SECONDS,
            ),
            outbound_timeout_seconds: numeric(
                "OUTBOUND_TIMEOUT_SECONDS",
                DEFAULT_OUTBOUND_TIMEOUT_SECONDS,
            ),
            port: numeric("PORT", DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_role_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_api_base_url.is_empty()
            && !self.email_api_key.is_empty()
            && !self.email_from_address.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.twilio_base_url.is_empty()
            && !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_from_number.is_empty()
    }
}

fn required(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", key);
        String::new()
    })
}

fn numeric<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number ({}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> AppConfig {
        AppConfig {
            supabase_url: String::new(),
            supabase_service_role_key: String::new(),
            email_api_base_url: "https://api.sendgrid.com".to_string(),
            email_api_key: String::new(),
            email_from_address: String::new(),
            twilio_base_url: "https://api.twilio.com".to_string(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_from_number: String::new(),
            reconciliation_interval_seconds: DEFAULT_RECONCILIATION_INTERVAL_SECONDS,
            outbound_timeout_seconds: DEFAULT_OUTBOUND_TIMEOUT_SECONDS,
            port: DEFAULT_PORT,
        }
    }

    #[test]
    fn test_channel_configuration_flags() {
        let mut config = blank();
        assert!(!config.is_configured());
        assert!(!config.is_email_configured());
        assert!(!config.is_sms_configured());

        config.email_api_key = "key".to_string();
        config.email_from_address = "clinic@example.com".to_string();
        assert!(config.is_email_configured());
        assert!(!config.is_sms_configured());

        config.twilio_account_sid = "AC123".to_string();
        config.twilio_auth_token = "token".to_string();
        config.twilio_from_number = "+15550000000".to_string();
        assert!(config.is_sms_configured());
    }

    #[test]
    fn test_numeric_falls_back_on_garbage() {
        env::set_var("APP_CONFIG_TEST_NUMERIC", "not-a-number");
        assert_eq!(numeric("APP_CONFIG_TEST_NUMERIC", 42u64), 42);

        env::set_var("APP_CONFIG_TEST_NUMERIC", "7");
        assert_eq!(numeric("APP_CONFIG_TEST_NUMERIC", 42u64), 7);
        env::remove_var("APP_CONFIG_TEST_NUMERIC");
    }
}
