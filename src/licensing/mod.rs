//! License verification against the WordPress licensing plugin.

mod cache;

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::ClientError;
pub use cache::LicenseCache;

/// Anything that can say yes or no to a license code.
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    /// Fail-closed: every error is `false`.
    async fn verify(&self, code: &str) -> bool;
}

/// The plugin answers `{"status": "valid"}`; older builds answered `{"valid": true}`.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default)]
    status: Option<String>,
}

impl VerifyResponse {
    fn is_valid(&self) -> bool {
        self.valid == Some(true) || self.status.as_deref() == Some("valid")
    }
}

pub struct LicenseClient {
    client: Client,
    verify_url: String,
    cache: Mutex<LicenseCache>,
}

impl LicenseClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.license_timeout)
            .user_agent("Millionisho-Bot/1.0");
        if let Some(proxy) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            verify_url: format!(
                "{}{}",
                config.wordpress_base_url.trim_end_matches('/'),
                config.license_verify_path
            ),
            cache: Mutex::new(LicenseCache::new(config.cache_ttl, config.cache_max_size)),
        })
    }

    /// One round-trip to the licensing site, without the cache.
    pub async fn check(&self, code: &str) -> Result<bool, ClientError> {
        tracing::info!(url = %self.verify_url, "Verifying license");

        let resp = self
            .client
            .get(&self.verify_url)
            .query(&[("key", code)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(status = status.as_u16(), body = %body, "License response");

        if status != StatusCode::OK {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VerifyResponse = serde_json::from_str(&body)?;
        Ok(parsed.is_valid())
    }
}

#[async_trait]
impl LicenseVerifier for LicenseClient {
    async fn verify(&self, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() {
            return false;
        }

        if let Some(valid) = self.cache.lock().await.get(code, Instant::now()) {
            tracing::debug!(valid, "License answered from cache");
            return valid;
        }

        match self.check(code).await {
            Ok(valid) => {
                tracing::info!(valid, "License verified");
                self.cache.lock().await.insert(code, valid, Instant::now());
                valid
            }
            Err(e) => {
                tracing::error!("License verification failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VERIFY_PATH: &str = "/wp-json/licensing/v1/verify";

    fn client_for(server: &MockServer, timeout: Duration) -> LicenseClient {
        let config = AppConfig {
            wordpress_base_url: server.uri(),
            license_timeout: timeout,
            ..AppConfig::default()
        };
        LicenseClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn valid_status_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(VERIFY_PATH))
            .and(query_param("key", "GOOD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "valid", "message": "ok"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert!(client.verify("GOOD").await);
    }

    #[tokio::test]
    async fn legacy_valid_flag_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(VERIFY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"valid": true})))
            .mount(&server)
            .await;

        assert!(client_for(&server, Duration::from_secs(5)).verify("X").await);
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(VERIFY_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "invalid"})),
            )
            .mount(&server)
            .await;

        assert!(!client_for(&server, Duration::from_secs(5)).verify("BAD").await);
    }

    #[tokio::test]
    async fn non_200_and_garbage_fail_closed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("key", "ERR"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"valid": true})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("key", "HTML"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert!(matches!(
            client.check("ERR").await,
            Err(ClientError::Status { status: 500, .. })
        ));
        assert!(!client.verify("ERR").await);
        assert!(matches!(client.check("HTML").await, Err(ClientError::Parse(_))));
        assert!(!client.verify("HTML").await);
    }

    #[tokio::test]
    async fn timeout_returns_false_within_bound() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "valid"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(300));
        let started = Instant::now();
        assert!(!client.verify("SLOW").await);
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(matches!(client.check("SLOW").await, Err(ClientError::Timeout)));
    }

    #[tokio::test]
    async fn definitive_answers_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "valid"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert!(client.verify("ONCE").await);
        assert!(client.verify(" ONCE ").await);
    }

    #[tokio::test]
    async fn blank_code_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(!client_for(&server, Duration::from_secs(5)).verify("   ").await);
    }
}
