use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::DashboardApi;
use crate::config::Settings;
use crate::errors::DashboardError;
use crate::models::{
    NewWebApplication, ScanAcknowledgement, ScanResult, Vulnerability, VulnerabilityFilter,
    WebApplication,
};
use crate::utils::truncation::truncate_error_body;

/// HTTP implementation of [`DashboardApi`] against the audit backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, DashboardError> {
        // Url::join drops the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            DashboardError::Config(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;

        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| DashboardError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, DashboardError> {
        Self::new(&settings.base_url, &settings.user_agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, DashboardError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| DashboardError::Internal(format!("Bad endpoint path '{}': {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, DashboardError> {
        let url = self.endpoint(path, query)?;
        debug!(method = %method, url = %url, "Backend request");

        let mut builder = self.client.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            DashboardError::Network(format!("{} /{} failed: {}", method, path, e))
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            DashboardError::Network(format!("Reading response from /{} failed: {}", path, e))
        })?;
        debug!(method = %method, path, status = status.as_u16(), bytes = bytes.len(), "Backend response");

        if !status.is_success() {
            return Err(DashboardError::Http {
                status: status.as_u16(),
                message: error_message(status, &bytes),
            });
        }

        decode_body(path, &bytes)
    }
}

/// Parse, then shape-check. Both failures are decode errors so that a
/// misbehaving backend is never confused with an unreachable one.
fn decode_body<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, DashboardError> {
    let decode_err = |message: String| DashboardError::Decode {
        endpoint: format!("/{}", path),
        message,
    };

    let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(bytes).map_err(|e| decode_err(format!("invalid JSON: {}", e)))?
    };
    serde_json::from_value(value).map_err(|e| decode_err(e.to_string()))
}

/// Human-readable message for a non-2xx response.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        let field = value
            .get("error")
            .or_else(|| value.get("detail"))
            .and_then(|v| v.as_str());
        if let Some(text) = field {
            return text.to_string();
        }
    }
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        truncate_error_body(&text)
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn list_web_applications(&self) -> Result<Vec<WebApplication>, DashboardError> {
        self.request(Method::GET, "web-applications/", &[], None).await
    }

    async fn get_web_application(&self, id: u64) -> Result<WebApplication, DashboardError> {
        self.request(Method::GET, &format!("web-applications/{}/", id), &[], None).await
    }

    async fn create_web_application(
        &self,
        app: &NewWebApplication,
    ) -> Result<WebApplication, DashboardError> {
        let body = serde_json::to_value(app)?;
        let created: WebApplication = self
            .request(Method::POST, "web-applications/", &[], Some(&body))
            .await?;
        info!(id = created.id, name = %created.name, "Web application created");
        Ok(created)
    }

    async fn trigger_scan(&self, id: u64) -> Result<ScanAcknowledgement, DashboardError> {
        let ack: ScanAcknowledgement = self
            .request(Method::POST, &format!("web-applications/{}/scan/", id), &[], None)
            .await?;
        info!(web_application = id, ack = %ack.describe(), "Scan triggered");
        Ok(ack)
    }

    async fn list_scan_results(
        &self,
        web_application: Option<u64>,
    ) -> Result<Vec<ScanResult>, DashboardError> {
        let query: Vec<(&str, String)> = web_application
            .map(|id| vec![("web_application", id.to_string())])
            .unwrap_or_default();
        self.request(Method::GET, "scan-results/", &query, None).await
    }

    async fn get_scan_result(&self, id: u64) -> Result<ScanResult, DashboardError> {
        self.request(Method::GET, &format!("scan-results/{}/", id), &[], None).await
    }

    async fn list_vulnerabilities(
        &self,
        filter: &VulnerabilityFilter,
    ) -> Result<Vec<Vulnerability>, DashboardError> {
        self.request(Method::GET, "vulnerabilities/", &filter.query_pairs(), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/api", "test").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
    }

    #[test]
    fn test_endpoint_keeps_api_prefix() {
        let client = ApiClient::new("http://localhost:8000/api", "test").unwrap();
        let url = client.endpoint("web-applications/7/scan/", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/web-applications/7/scan/");
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client = ApiClient::new("http://localhost:8000/api/", "test").unwrap();
        let url = client
            .endpoint("vulnerabilities/", &[("type", "sql injection".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/vulnerabilities/?type=sql+injection");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        assert!(matches!(ApiClient::new("::::", "test"), Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, br#"{"error": "Scan failed: timeout"}"#);
        assert_eq!(msg, "Scan failed: timeout");
        let msg = error_message(StatusCode::NOT_FOUND, br#"{"detail": "Not found."}"#);
        assert_eq!(msg, "Not found.");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, b""), "Bad Gateway");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, b"upstream down"), "upstream down");
    }

    #[test]
    fn test_decode_shape_mismatch_is_decode_error() {
        let err = decode_body::<Vec<WebApplication>>("web-applications/", br#"{"results": []}"#).unwrap_err();
        match err {
            DashboardError::Decode { endpoint, .. } => assert_eq!(endpoint, "/web-applications/"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_invalid_json_is_decode_error() {
        let err = decode_body::<Vec<WebApplication>>("web-applications/", b"<html>").unwrap_err();
        assert!(matches!(err, DashboardError::Decode { .. }));
    }

    #[test]
    fn test_decode_empty_body_as_acknowledgement() {
        let ack: ScanAcknowledgement = decode_body("web-applications/1/scan/", b"").unwrap();
        assert!(ack.scan().is_none());
    }
}
