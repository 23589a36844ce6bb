use serde::Serialize;
use tracing::info;

use super::state::{LoadTicket, Loader};
use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::models::{
    name_index, per_scan_counts, ScanResult, ScanStatus, SeverityCount, Vulnerability,
    VulnerabilityFilter, WebApplication,
};
use crate::utils::formatting::timestamp_sort_key;

const CONTEXT: &str = "Failed to load dashboard";

/// Everything the overview needs, fetched in one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub web_applications: Vec<WebApplication>,
    pub scan_results: Vec<ScanResult>,
    pub vulnerabilities: Vec<Vulnerability>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentScan {
    pub scan_id: u64,
    pub application_name: String,
    pub scan_date: String,
    pub status: ScanStatus,
    pub vulnerability_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub web_applications: usize,
    pub scans: usize,
    pub completed_scans: usize,
    pub vulnerabilities: usize,
    pub critical: usize,
    pub severity: SeverityCount,
    pub recent_scans: Vec<RecentScan>,
}

impl DashboardData {
    pub fn summarize(&self, recent_limit: usize) -> DashboardSummary {
        let severity = SeverityCount::from_vulnerabilities(&self.vulnerabilities);
        let counts = per_scan_counts(&self.vulnerabilities);
        let names = name_index(&self.web_applications);

        let mut ordered: Vec<&ScanResult> = self.scan_results.iter().collect();
        // Stable: scans with equal or unparseable dates keep backend order.
        ordered.sort_by(|a, b| timestamp_sort_key(&b.scan_date).cmp(&timestamp_sort_key(&a.scan_date)));

        let recent_scans = ordered
            .into_iter()
            .take(recent_limit)
            .map(|scan| {
                RecentScan {
                    scan_id: scan.id,
                    application_name: scan.web_application.resolve_name(&names).to_string(),
                    scan_date: scan.scan_date.clone(),
                    status: scan.status,
                    vulnerability_count: counts.get(&scan.id).copied().unwrap_or(0),
                }
            })
            .collect();

        DashboardSummary {
            web_applications: self.web_applications.len(),
            scans: self.scan_results.len(),
            completed_scans: self
                .scan_results
                .iter()
                .filter(|s| s.status == ScanStatus::Completed)
                .count(),
            vulnerabilities: self.vulnerabilities.len(),
            critical: severity.critical,
            severity,
            recent_scans,
        }
    }
}

/// Overview page controller.
#[derive(Debug, Clone)]
pub struct DashboardView {
    loader: Loader<DashboardData>,
    recent_limit: usize,
}

impl DashboardView {
    pub fn new(recent_limit: usize) -> Self {
        Self { loader: Loader::new(), recent_limit }
    }

    pub fn loader(&self) -> &Loader<DashboardData> {
        &self.loader
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loader.begin()
    }

    pub fn retry(&mut self) -> Option<LoadTicket> {
        self.loader.retry()
    }

    pub fn invalidate(&mut self) {
        self.loader.invalidate();
    }

    /// Fetch the three collections concurrently. The first failure fails
    /// the batch.
    pub async fn fetch(api: &dyn DashboardApi) -> Result<DashboardData, DashboardError> {
        let all = VulnerabilityFilter::default();
        let (web_applications, scan_results, vulnerabilities) = futures::try_join!(
            api.list_web_applications(),
            api.list_scan_results(None),
            api.list_vulnerabilities(&all),
        )?;
        info!(
            applications = web_applications.len(),
            scans = scan_results.len(),
            vulnerabilities = vulnerabilities.len(),
            "Dashboard data loaded"
        );
        Ok(DashboardData { web_applications, scan_results, vulnerabilities })
    }

    pub fn settle(&mut self, ticket: LoadTicket, result: Result<DashboardData, DashboardError>) -> bool {
        self.loader.settle(ticket, result, CONTEXT)
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) -> Result<(), DashboardError> {
        let ticket = self.begin_load();
        let result = Self::fetch(api).await;
        self.loader.settle_checked(ticket, result, CONTEXT)
    }

    pub fn summary(&self) -> Option<DashboardSummary> {
        self.loader.data().map(|data| data.summarize(self.recent_limit))
    }
}
