pub mod client;

use async_trait::async_trait;

use crate::errors::DashboardError;
use crate::models::{
    NewWebApplication, ScanAcknowledgement, ScanResult, Vulnerability, VulnerabilityFilter,
    WebApplication,
};

pub use client::ApiClient;

/// One method per backend endpoint. Each call issues exactly one request;
/// there is no retry, caching or request coalescing behind it.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /web-applications/`
    async fn list_web_applications(&self) -> Result<Vec<WebApplication>, DashboardError>;

    /// `GET /web-applications/{id}/`
    async fn get_web_application(&self, id: u64) -> Result<WebApplication, DashboardError>;

    /// `POST /web-applications/`
    async fn create_web_application(
        &self,
        app: &NewWebApplication,
    ) -> Result<WebApplication, DashboardError>;

    /// `POST /web-applications/{id}/scan/`
    async fn trigger_scan(&self, id: u64) -> Result<ScanAcknowledgement, DashboardError>;

    /// `GET /scan-results/`, optionally `?web_application={id}`
    async fn list_scan_results(
        &self,
        web_application: Option<u64>,
    ) -> Result<Vec<ScanResult>, DashboardError>;

    /// `GET /scan-results/{id}/`
    async fn get_scan_result(&self, id: u64) -> Result<ScanResult, DashboardError>;

    /// `GET /vulnerabilities/` with the filter as query parameters
    async fn list_vulnerabilities(
        &self,
        filter: &VulnerabilityFilter,
    ) -> Result<Vec<Vulnerability>, DashboardError>;
}
