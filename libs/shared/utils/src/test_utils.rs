use std::sync::Arc;
use chrono::{DateTime, Duration, DurationRound, TimeZone, Utc};

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub email_api_base_url: String,
    pub email_api_key: String,
    pub email_from_address: String,
    pub twilio_base_url: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
            email_api_base_url: "http://localhost:54322".to_string(),
            email_api_key: "test-email-key".to_string(),
            email_from_address: "clinic@example.com".to_string(),
            twilio_base_url: "http://localhost:54323".to_string(),
            twilio_account_sid: "ACtest".to_string(),
            twilio_auth_token: "test-twilio-token".to_string(),
            twilio_from_number: "+15550001111".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(mut self, url: &str) -> Self {
        self.supabase_url = url.to_string();
        self
    }

    pub fn with_email_url(mut self, url: &str) -> Self {
        self.email_api_base_url = url.to_string();
        self
    }

    pub fn with_twilio_url(mut self, url: &str) -> Self {
        self.twilio_base_url = url.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            email_api_base_url: self.email_api_base_url.clone(),
            email_api_key: self.email_api_key.clone(),
            email_from_address: self.email_from_address.clone(),
            twilio_base_url: self.twilio_base_url.clone(),
            twilio_account_sid: self.twilio_account_sid.clone(),
            twilio_auth_token: self.twilio_auth_token.clone(),
            twilio_from_number: self.twilio_from_number.clone(),
            reconciliation_interval_seconds: 60,
            outbound_timeout_seconds: 5,
            port: 3030,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestClock;

impl TestClock {
    /// Fixed reference instant so assertions on rendered timestamps are stable.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Self::now() - Duration::minutes(minutes)
    }

    /// Whole-hour slot `days` after the reference day.
    pub fn slot(days: i64, hour: u32) -> DateTime<Utc> {
        let day = Self::now()
            .duration_trunc(Duration::days(1))
            .unwrap();
        day + Duration::days(days) + Duration::hours(hour as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().with_supabase_url("http://127.0.0.1:9999");
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://127.0.0.1:9999");
        assert!(app_config.is_configured());
        assert!(app_config.is_email_configured());
        assert!(app_config.is_sms_configured());
    }

    #[test]
    fn test_clock_helpers() {
        assert_eq!(TestClock::minutes_ago(20), TestClock::now() - Duration::minutes(20));
        assert_eq!(
            TestClock::slot(1, 9),
            Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap()
        );
    }
}
