//! Cloudflare DNS record updates.

use serde::{Deserialize, Serialize};

use crate::config::RecordConfig;
use crate::error::{ProviderError, Result, SyncError};

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com";

/// Pushes new IP values to a single Cloudflare DNS record.
///
/// The record identity (zone, record id, name, type, proxy flag) is fixed
/// configuration; only the IP changes between calls.
pub struct CloudflareUpdater {
    client: reqwest::Client,
    record: RecordConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    content: &'a str,
    name: &'a str,
    proxied: bool,
    #[serde(rename = "type")]
    record_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ProviderError>,
}

impl CloudflareUpdater {
    /// Create a new updater for the configured record.
    pub fn new(record: RecordConfig) -> Self {
        Self::with_base_url(record, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(record: RecordConfig, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            record,
            base_url,
        }
    }

    /// Update the DNS record to carry `new_ip`.
    ///
    /// On success the provider has accepted the new value; persisting it
    /// locally is the caller's responsibility.
    pub async fn update(&self, new_ip: &str) -> Result<()> {
        let url = format!(
            "{}/client/v4/zones/{}/dns_records/{}",
            self.base_url, self.record.zone_id, self.record.record_id
        );

        let request = UpdateRequest {
            content: new_ip,
            name: &self.record.name,
            proxied: self.record.proxied,
            record_type: &self.record.record_type,
        };

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", self.record.api_token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Connectivity(format!(
                "HTTP {} from DNS provider",
                response.status()
            )));
        }

        let body = response.text().await?;
        let api: ApiResponse = serde_json::from_str(&body)?;

        if !api.success {
            return Err(SyncError::RemoteRejection(api.errors));
        }

        tracing::debug!("Record {} now points at {}", self.record.name, new_ip);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> RecordConfig {
        RecordConfig {
            api_token: "test-token".to_string(),
            zone_id: "zone-123".to_string(),
            record_id: "rec-456".to_string(),
            name: "home.example.com".to_string(),
            record_type: "A".to_string(),
            proxied: false,
        }
    }

    #[tokio::test]
    async fn test_update_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/client/v4/zones/zone-123/dns_records/rec-456"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "content": "192.168.1.1",
                "name": "home.example.com",
                "proxied": false,
                "type": "A",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"success":true,"errors":[]}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let updater = CloudflareUpdater::with_base_url(record(), mock_server.uri());

        updater.update("192.168.1.1").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_rejection_carries_provider_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/client/v4/zones/zone-123/dns_records/rec-456"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"success":false,"errors":[{"code":1234,"message":"Invalid record ID"}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let updater = CloudflareUpdater::with_base_url(record(), mock_server.uri());
        let err = updater.update("192.168.1.1").await.unwrap_err();

        match err {
            SyncError::RemoteRejection(errors) => {
                assert_eq!(
                    errors,
                    vec![ProviderError {
                        code: 1234,
                        message: "Invalid record ID".to_string(),
                    }]
                );
            }
            other => panic!("expected remote rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_http_failure_is_connectivity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/client/v4/zones/zone-123/dns_records/rec-456"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let updater = CloudflareUpdater::with_base_url(record(), mock_server.uri());
        let err = updater.update("192.168.1.1").await.unwrap_err();

        assert!(matches!(err, SyncError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_update_refused_connection_is_connectivity() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let updater = CloudflareUpdater::with_base_url(record(), format!("http://{}", addr));
        let err = updater.update("192.168.1.1").await.unwrap_err();

        assert!(matches!(err, SyncError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_update_unparseable_envelope_is_serialization_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/client/v4/zones/zone-123/dns_records/rec-456"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let updater = CloudflareUpdater::with_base_url(record(), mock_server.uri());
        let err = updater.update("192.168.1.1").await.unwrap_err();

        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_update_proxied_record() {
        let mock_server = MockServer::start().await;

        let mut proxied_record = record();
        proxied_record.proxied = true;

        Mock::given(method("PUT"))
            .and(path("/client/v4/zones/zone-123/dns_records/rec-456"))
            .and(body_json(serde_json::json!({
                "content": "10.0.0.1",
                "name": "home.example.com",
                "proxied": true,
                "type": "A",
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"success":true,"errors":[]}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let updater = CloudflareUpdater::with_base_url(proxied_record, mock_server.uri());

        updater.update("10.0.0.1").await.unwrap();
    }
}
