use serde::Serialize;
use tracing::debug;

use super::state::{LoadTicket, Loader};
use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::models::{
    group_by_severity, type_counts, ScanResult, ScanStatus, Severity, SeverityCount, Vulnerability,
    VulnerabilityFilter, WebApplication,
};
use crate::utils::formatting::readable_type_name;

const CONTEXT: &str = "Failed to load scan result";

/// Placeholder shown when a scan has no findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    NoneFound,
    Pending,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoneFound => "No vulnerabilities found. Great job!",
            EmptyState::Pending => "Vulnerabilities will appear here once the scan is complete.",
        }
    }
}

/// One bar of the type breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    pub vuln_type: String,
    pub label: String,
    pub count: usize,
    pub fraction: f64,
}

/// One slice of the severity distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeveritySlice {
    pub severity: Severity,
    pub count: usize,
    pub fraction: f64,
}

/// A scan result with its application and findings resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanDetail {
    pub scan: ScanResult,
    pub application: WebApplication,
    pub vulnerabilities: Vec<Vulnerability>,
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl ScanDetail {
    pub fn grouped(&self) -> Vec<(Severity, Vec<&Vulnerability>)> {
        group_by_severity(&self.vulnerabilities)
    }

    pub fn severity_counts(&self) -> SeverityCount {
        SeverityCount::from_vulnerabilities(&self.vulnerabilities)
    }

    pub fn type_breakdown(&self) -> Vec<TypeShare> {
        let total = self.vulnerabilities.len();
        type_counts(&self.vulnerabilities)
            .into_iter()
            .map(|tc| TypeShare {
                label: readable_type_name(&tc.vuln_type),
                fraction: fraction(tc.count, total),
                vuln_type: tc.vuln_type,
                count: tc.count,
            })
            .collect()
    }

    /// All five severities in display order, empty ones included.
    pub fn severity_chart(&self) -> Vec<SeveritySlice> {
        let counts = self.severity_counts();
        let total = counts.total();
        counts
            .ordered()
            .into_iter()
            .map(|(severity, count)| SeveritySlice { severity, count, fraction: fraction(count, total) })
            .collect()
    }

    /// `None` when there is something to list. Only a completed scan may
    /// claim that nothing was found.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.vulnerabilities.is_empty() {
            return None;
        }
        Some(if self.scan.status == ScanStatus::Completed {
            EmptyState::NoneFound
        } else {
            EmptyState::Pending
        })
    }
}

/// Detail page for one scan result.
#[derive(Debug, Clone, Default)]
pub struct ScanDetailView {
    scan_id: Option<u64>,
    loader: Loader<ScanDetail>,
}

impl ScanDetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_id(&self) -> Option<u64> {
        self.scan_id
    }

    pub fn loader(&self) -> &Loader<ScanDetail> {
        &self.loader
    }

    /// Point the page at another scan. Any in-flight load for the previous
    /// one is discarded.
    pub fn open(&mut self, scan_id: u64) {
        if self.scan_id != Some(scan_id) {
            self.scan_id = Some(scan_id);
            self.loader.reset();
        }
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

    /// Scan first, then its application and (unless nested) its findings.
    pub async fn fetch(api: &dyn DashboardApi, scan_id: u64) -> Result<ScanDetail, DashboardError> {
        let mut scan = api.get_scan_result(scan_id).await?;
        let app_id = scan.web_application.id();

        let (application, vulnerabilities) = match scan.vulnerabilities.take() {
            Some(nested) => (api.get_web_application(app_id).await?, nested),
            None => {
                debug!(scan_id, "Findings not nested, fetching separately");
                let filter = VulnerabilityFilter::for_scan(scan_id);
                futures::try_join!(api.get_web_application(app_id), api.list_vulnerabilities(&filter))?
            }
        };
        Ok(ScanDetail { scan, application, vulnerabilities })
    }

    pub fn settle(&mut self, ticket: LoadTicket, result: Result<ScanDetail, DashboardError>) -> bool {
        self.loader.settle(ticket, result, CONTEXT)
    }

    /// Load the open scan.
    pub async fn load(&mut self, api: &dyn DashboardApi) -> Result<(), DashboardError> {
        let scan_id = self
            .scan_id
            .ok_or_else(|| DashboardError::InvalidArgument("No scan result selected".into()))?;
        let ticket = self.begin_load();
        let result = Self::fetch(api, scan_id).await;
        self.loader.settle_checked(ticket, result, CONTEXT)
    }

    pub fn detail(&self) -> Option<&ScanDetail> {
        self.loader.data()
    }
}
