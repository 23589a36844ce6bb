//! In-memory backend used by the view tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::models::*;

#[derive(Default)]
pub(crate) struct FakeApi {
    pub apps: Mutex<Vec<WebApplication>>,
    pub scans: Mutex<Vec<ScanResult>>,
    pub vulns: Vec<Vulnerability>,
    failing: Mutex<HashSet<&'static str>>,
    stalled: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apps(self, apps: Vec<WebApplication>) -> Self {
        *self.apps.lock().unwrap() = apps;
        self
    }

    pub fn with_scans(self, scans: Vec<ScanResult>) -> Self {
        *self.scans.lock().unwrap() = scans;
        self
    }

    pub fn with_vulns(mut self, vulns: Vec<Vulnerability>) -> Self {
        self.vulns = vulns;
        self
    }

    /// Make every call to `endpoint` fail with a 500.
    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    /// Make calls to `endpoint` hang until [`recover`](Self::recover).
    /// Only `trigger_scan` and `get_scan_result` honour this.
    pub fn stall(&self, endpoint: &'static str) {
        self.stalled.lock().unwrap().insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().remove(endpoint);
        self.stalled.lock().unwrap().remove(endpoint);
    }

    fn is_stalled(&self, endpoint: &'static str) -> bool {
        self.stalled.lock().unwrap().contains(endpoint)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, endpoint: &'static str, call: String) -> Result<(), DashboardError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(DashboardError::Http { status: 500, message: "Internal Server Error".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn list_web_applications(&self) -> Result<Vec<WebApplication>, DashboardError> {
        self.record("list_web_applications", "GET /web-applications/".into())?;
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn get_web_application(&self, id: u64) -> Result<WebApplication, DashboardError> {
        self.record("get_web_application", format!("GET /web-applications/{}/", id))?;
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(DashboardError::Http { status: 404, message: "Not found.".into() })
    }

    async fn create_web_application(
        &self,
        app: &NewWebApplication,
    ) -> Result<WebApplication, DashboardError> {
        self.record("create_web_application", "POST /web-applications/".into())?;
        let mut apps = self.apps.lock().unwrap();
        let created = WebApplication {
            id: apps.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            name: app.name.clone(),
            url: app.url.clone(),
            description: app.description.clone(),
            created_at: Some("2024-06-01T00:00:00Z".into()),
            updated_at: None,
            scan_results: None,
        };
        apps.push(created.clone());
        Ok(created)
    }

    async fn trigger_scan(&self, id: u64) -> Result<ScanAcknowledgement, DashboardError> {
        self.record("trigger_scan", format!("POST /web-applications/{}/scan/", id))?;
        if self.is_stalled("trigger_scan") {
            std::future::pending::<()>().await;
        }
        let mut scans = self.scans.lock().unwrap();
        let scan = scan(scans.iter().map(|s| s.id).max().unwrap_or(0) + 1, id, ScanStatus::Pending, "2024-06-02T00:00:00Z");
        scans.push(scan.clone());
        Ok(ScanAcknowledgement::Scan(scan))
    }

    async fn list_scan_results(
        &self,
        web_application: Option<u64>,
    ) -> Result<Vec<ScanResult>, DashboardError> {
        let call = match web_application {
            Some(id) => format!("GET /scan-results/?web_application={}", id),
            None => "GET /scan-results/".into(),
        };
        self.record("list_scan_results", call)?;
        Ok(self
            .scans
            .lock()
            .unwrap()
            .iter()
            .filter(|s| web_application.map_or(true, |id| s.web_application.id() == id))
            .cloned()
            .collect())
    }

    async fn get_scan_result(&self, id: u64) -> Result<ScanResult, DashboardError> {
        self.record("get_scan_result", format!("GET /scan-results/{}/", id))?;
        if self.is_stalled("get_scan_result") {
            std::future::pending::<()>().await;
        }
        self.scans
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(DashboardError::Http { status: 404, message: "Not found.".into() })
    }

    async fn list_vulnerabilities(
        &self,
        filter: &VulnerabilityFilter,
    ) -> Result<Vec<Vulnerability>, DashboardError> {
        self.record("list_vulnerabilities", "GET /vulnerabilities/".into())?;
        Ok(self
            .vulns
            .iter()
            .filter(|v| filter.scan_result.map_or(true, |id| v.scan_result == Some(id)))
            .filter(|v| filter.severity.map_or(true, |s| v.severity == s))
            .filter(|v| filter.vuln_type.as_ref().map_or(true, |t| &v.vuln_type == t))
            .filter(|v| {
                filter
                    .web_application
                    .map_or(true, |id| v.web_application.as_ref().map(|r| r.id()) == Some(id))
            })
            .cloned()
            .collect())
    }
}

pub(crate) fn app(id: u64, name: &str) -> WebApplication {
    WebApplication {
        id,
        name: name.to_string(),
        url: format!("https://{}.example.com", name.to_lowercase()),
        description: None,
        created_at: Some("2024-01-01T00:00:00Z".into()),
        updated_at: None,
        scan_results: None,
    }
}

pub(crate) fn scan(id: u64, app_id: u64, status: ScanStatus, date: &str) -> ScanResult {
    ScanResult {
        id,
        web_application: WebApplicationRef::Id(app_id),
        scan_date: date.to_string(),
        status,
        summary: None,
        vulnerabilities: None,
        vulnerabilities_count: None,
    }
}

pub(crate) fn vuln(id: u64, severity: Severity, vuln_type: &str, scan_result: u64) -> Vulnerability {
    Vulnerability {
        id,
        name: format!("Finding {}", id),
        vuln_type: vuln_type.to_string(),
        description: "Test description".to_string(),
        severity,
        url: None,
        parameter: None,
        evidence: None,
        mitigation: None,
        location: None,
        remediation: None,
        date_discovered: None,
        web_application: None,
        scan_result: Some(scan_result),
    }
}
