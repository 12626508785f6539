use std::time::Duration;

use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin PostgREST client. Every collection lives under `/rest/v1/{table}` and
/// filters are passed as `column=op.value` query parameters.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
    timeout: Duration,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_role_key.clone(),
            timeout: Duration::from_secs(config.outbound_timeout_seconds),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self
            .client
            .request(method, &url)
            .headers(headers)
            .timeout(self.timeout);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// `Prefer: return=representation` so PATCH/POST echo the affected rows.
    /// An empty array back from a filtered PATCH means the filter matched nothing.
    pub fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> AppConfig {
        AppConfig {
            supabase_url: format!("{}/", url),
            supabase_service_role_key: "service-key".to_string(),
            email_api_base_url: String::new(),
            email_api_key: String::new(),
            email_from_address: String::new(),
            twilio_base_url: String::new(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_from_number: String::new(),
            reconciliation_interval_seconds: 60,
            outbound_timeout_seconds: 5,
            port: 3030,
        }
    }

    #[tokio::test]
    async fn test_request_sends_service_key_and_decodes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctor_schedules"))
            .and(query_param("doctor_id", "eq.doc1"))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"doctor_id": "doc1"}])))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        assert_eq!(client.get_base_url(), mock_server.uri());

        let rows: Vec<Value> = client
            .request(Method::GET, "/rest/v1/doctor_schedules?doctor_id=eq.doc1", None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["doctor_id"], "doc1");
    }

    #[tokio::test]
    async fn test_request_maps_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let result: Result<Vec<Value>> = client.request(Method::GET, "/rest/v1/appointments", None).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("500"));
        assert!(err.contains("boom"));
    }

    #[tokio::test]
    async fn test_request_gives_up_after_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let config = AppConfig {
            outbound_timeout_seconds: 1,
            ..config_for(&mock_server.uri())
        };
        let client = SupabaseClient::new(&config);

        let started = std::time::Instant::now();
        let result: Result<Vec<Value>> = client.request(Method::GET, "/rest/v1/appointments", None).await;

        assert!(result.is_err());
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
    }
}
