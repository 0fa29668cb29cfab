// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare adapter for the `DnsProvider` trait.
//
// ## Scope
//
// - Zone lookup by name
// - Record listing filtered by exact name and type
// - Record update by ID, sending only type, name and content
//
// TTL and proxied status are never sent, so Cloudflare keeps whatever the
// record already has. Records are never created or deleted. Every method
// is one API round-trip with no retry; the caller owns retry policy.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{DnsProvider, DnsRecord, RecordType};
use ddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
    name: String,
}

impl<T> ApiResponse<T> {
    fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "no error details".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Cloudflare DNS provider
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider talking to the public Cloudflare API
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, CLOUDFLARE_API_BASE)
    }

    /// Create a provider against a custom API base URL
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare { api_token, base_url } => Self::with_base_url(
                api_token.clone(),
                base_url.as_deref().unwrap_or(CLOUDFLARE_API_BASE),
            ),
        }
    }

    /// Send an authenticated request and unwrap the response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::network(format!("Cloudflare {} request failed: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, &error_text, what));
        }

        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            Error::provider("cloudflare", format!("Failed to parse {} response: {}", what, e))
        })?;

        if !body.success {
            return Err(Error::provider(
                "cloudflare",
                format!("{} failed: {}", what, body.error_summary()),
            ));
        }

        body.result.ok_or_else(|| {
            Error::provider("cloudflare", format!("{} response has no result", what))
        })
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, error_text: &str, what: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::provider(
            "cloudflare",
            format!(
                "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
                status
            ),
        ),
        404 => Error::not_found(format!("{}: {}", what, status)),
        409 => Error::provider(
            "cloudflare",
            format!("Conflict: Record is being updated by another process. Status: {}", status),
        ),
        429 => Error::provider(
            "cloudflare",
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            "cloudflare",
            format!("Cloudflare server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            "cloudflare",
            format!("{} failed: {} - {}", what, status, error_text),
        ),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn zone_id_by_name(&self, zone: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for {}", zone);

        let request = self
            .client
            .get(format!("{}/zones", self.base_url))
            .query(&[("name", zone)]);
        let zones: Vec<Zone> = self.call(request, "zone lookup").await?;

        let mut matches: Vec<Zone> = zones
            .into_iter()
            .filter(|z| z.name.eq_ignore_ascii_case(zone))
            .collect();

        let found = match matches.len() {
            0 => return Err(Error::not_found(format!("Zone not found: {}", zone))),
            1 => matches.remove(0),
            n => {
                return Err(Error::provider(
                    "cloudflare",
                    format!("Ambiguous zone name {}: {} zones match", zone, n),
                ));
            }
        };

        tracing::debug!("Found zone ID: {}", found.id);
        Ok(found.id)
    }

    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing {} records for {}", record_type, name);

        let request = self
            .client
            .get(format!("{}/zones/{}/dns_records", self.base_url, zone_id))
            .query(&[("name", name), ("type", record_type.as_str())]);

        self.call(request, "record lookup").await
    }

    async fn update_record(&self, zone_id: &str, record: &DnsRecord) -> Result<DnsRecord> {
        tracing::debug!(
            "Patching {} record {} ({}) -> {}",
            record.record_type,
            record.name,
            record.id,
            record.content
        );

        let request = self
            .client
            .patch(format!(
                "{}/zones/{}/dns_records/{}",
                self.base_url, zone_id, record.id
            ))
            .json(&serde_json::json!({
                "type": record.record_type,
                "name": record.name,
                "content": record.content,
            }));

        self.call(request, "record update").await
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        let provider = CloudflareProvider::new("");
        assert!(matches!(provider, Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_name() {
        let provider = CloudflareProvider::new("token").unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_from_config() {
        let config = ProviderConfig::Cloudflare {
            api_token: "test_token".to_string(),
            base_url: Some("http://127.0.0.1:8080/client/v4/".to_string()),
        };

        let provider = CloudflareProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, "http://127.0.0.1:8080/client/v4");

        let config = ProviderConfig::Cloudflare {
            api_token: "test_token".to_string(),
            base_url: None,
        };
        let provider = CloudflareProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url, CLOUDFLARE_API_BASE);
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new("secret_token_12345").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
    }

    #[test]
    fn test_status_mapping() {
        let err = status_error(StatusCode::NOT_FOUND, "", "zone lookup");
        assert!(matches!(err, Error::NotFound(_)));

        let err = status_error(StatusCode::FORBIDDEN, "", "record update");
        assert!(err.to_string().contains("Authentication failed"));

        let err = status_error(StatusCode::BAD_GATEWAY, "upstream", "record lookup");
        assert!(err.to_string().contains("transient"));
    }

    #[test]
    fn test_error_summary() {
        let body: ApiResponse<Vec<Zone>> = serde_json::from_value(serde_json::json!({
            "success": false,
            "errors": [{ "code": 9109, "message": "Invalid access token" }],
            "result": null
        }))
        .unwrap();

        assert_eq!(body.error_summary(), "Invalid access token (9109)");
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use ddns_core::{CancellationToken, UpdateOutcome, update_record};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "test_token_12345";

    fn create_mock_provider(mock_server: &MockServer) -> CloudflareProvider {
        CloudflareProvider::with_base_url(TOKEN, mock_server.uri()).unwrap()
    }

    fn envelope(result: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": result
        })
    }

    fn a_record(id: &str, content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "zone_id": "zone123",
            "name": "home.example.com",
            "type": "A",
            "content": content,
            "proxied": true,
            "ttl": 1
        })
    }

    async fn mount_zone(mock_server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("name", "example.com"))
            .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
                { "id": "zone123", "name": "example.com" }
            ]))))
            .mount(mock_server)
            .await;
    }

    async fn mount_records(mock_server: &MockServer, records: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/zones/zone123/dns_records"))
            .and(query_param("name", "home.example.com"))
            .and(query_param("type", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(records)))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_zone_lookup() {
        let mock_server = MockServer::start().await;
        mount_zone(&mock_server).await;

        let provider = create_mock_provider(&mock_server);
        let zone_id = provider.zone_id_by_name("example.com").await.unwrap();

        assert_eq!(zone_id, "zone123");
    }

    #[tokio::test]
    async fn test_zone_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([]))))
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = provider.zone_id_by_name("example.com").await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_ambiguous_zone_name() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("name", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
                { "id": "zone123", "name": "example.com" },
                { "id": "zone456", "name": "example.com" }
            ]))))
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = provider.zone_id_by_name("example.com").await.unwrap_err();

        match err {
            Error::Provider { message, .. } => assert!(message.contains("Ambiguous"), "{message}"),
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_record_listing_failure_is_lookup_stage() {
        let mock_server = MockServer::start().await;
        mount_zone(&mock_server).await;
        Mock::given(method("GET"))
            .and(path("/zones/zone123/dns_records"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = update_record(
            &provider,
            &CancellationToken::new(),
            "example.com",
            "home.example.com",
            RecordType::A,
            "203.0.113.7",
        )
        .await
        .unwrap_err();

        match err {
            Error::RecordLookup { name, record_type, source } => {
                assert_eq!(name, "home.example.com");
                assert_eq!(record_type, RecordType::A);
                assert!(source.to_string().contains("transient"), "{source}");
            }
            other => panic!("expected RecordLookup, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{ "code": 9109, "message": "Invalid access token" }],
                "result": null
            })))
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = provider.zone_id_by_name("example.com").await.unwrap_err();

        assert!(err.to_string().contains("Authentication failed"), "got {err}");
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "errors": [{ "code": 1003, "message": "Invalid or missing zone id" }],
                "result": null
            })))
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = provider.zone_id_by_name("example.com").await.unwrap_err();

        match err {
            Error::Provider { provider, message } => {
                assert_eq!(provider, "cloudflare");
                assert!(message.contains("Invalid or missing zone id (1003)"));
            }
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_records() {
        let mock_server = MockServer::start().await;
        mount_records(&mock_server, serde_json::json!([a_record("rec1", "203.0.113.1")])).await;

        let provider = create_mock_provider(&mock_server);
        let records = provider
            .list_records("zone123", "home.example.com", RecordType::A)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "rec1");
        assert_eq!(records[0].record_type, "A");
        assert_eq!(records[0].content, "203.0.113.1");
    }

    #[tokio::test]
    async fn test_update_sends_only_identity_and_content() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/zones/zone123/dns_records/rec1"))
            .and(body_json(serde_json::json!({
                "type": "A",
                "name": "home.example.com",
                "content": "203.0.113.7"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(a_record("rec1", "203.0.113.7"))))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let record = DnsRecord {
            id: "rec1".to_string(),
            name: "home.example.com".to_string(),
            record_type: "A".to_string(),
            content: "203.0.113.7".to_string(),
        };

        let stored = provider.update_record("zone123", &record).await.unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_updater_writes_changed_record() {
        let mock_server = MockServer::start().await;
        mount_zone(&mock_server).await;
        mount_records(&mock_server, serde_json::json!([a_record("rec1", "203.0.113.1")])).await;
        Mock::given(method("PATCH"))
            .and(path("/zones/zone123/dns_records/rec1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(a_record("rec1", "203.0.113.7"))))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let outcome = update_record(
            &provider,
            &CancellationToken::new(),
            "example.com",
            "home.example.com",
            RecordType::A,
            "203.0.113.7",
        )
        .await
        .unwrap();

        match outcome {
            UpdateOutcome::Updated { record, previous_content } => {
                assert_eq!(record.content, "203.0.113.7");
                assert_eq!(previous_content, "203.0.113.1");
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_updater_skips_unchanged_record() {
        let mock_server = MockServer::start().await;
        mount_zone(&mock_server).await;
        mount_records(&mock_server, serde_json::json!([a_record("rec1", "203.0.113.7")])).await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let outcome = update_record(
            &provider,
            &CancellationToken::new(),
            "example.com",
            "home.example.com",
            RecordType::A,
            "203.0.113.7",
        )
        .await
        .unwrap();

        assert!(matches!(outcome, UpdateOutcome::NoChange { .. }));
    }

    #[tokio::test]
    async fn test_updater_refuses_ambiguous_records() {
        let mock_server = MockServer::start().await;
        mount_zone(&mock_server).await;
        mount_records(
            &mock_server,
            serde_json::json!([a_record("rec1", "203.0.113.1"), a_record("rec2", "203.0.113.2")]),
        )
        .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = create_mock_provider(&mock_server);
        let err = update_record(
            &provider,
            &CancellationToken::new(),
            "example.com",
            "home.example.com",
            RecordType::A,
            "203.0.113.7",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::RecordCount { count: 2, .. }), "got {err:?}");
    }
}
