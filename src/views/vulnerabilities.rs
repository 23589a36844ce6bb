use super::state::{LoadTicket, Loader};
use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::models::{SeverityCount, Vulnerability, VulnerabilityFilter};

const CONTEXT: &str = "Failed to load vulnerabilities";

/// Guidance shown when there is nothing to list at all.
pub const EMPTY_GUIDANCE: &str =
    "No vulnerabilities found. Add web applications and run scans to discover vulnerabilities.";

/// Flat vulnerability list with an optional server-side filter.
#[derive(Debug, Clone, Default)]
pub struct VulnerabilitiesView {
    filter: VulnerabilityFilter,
    loader: Loader<Vec<Vulnerability>>,
}

impl VulnerabilitiesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loader(&self) -> &Loader<Vec<Vulnerability>> {
        &self.loader
    }

    pub fn filter(&self) -> &VulnerabilityFilter {
        &self.filter
    }

    /// Replace the filter. A load for the previous filter is discarded.
    pub fn set_filter(&mut self, filter: VulnerabilityFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.loader.invalidate();
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

    pub async fn fetch(
        api: &dyn DashboardApi,
        filter: &VulnerabilityFilter,
    ) -> Result<Vec<Vulnerability>, DashboardError> {
        api.list_vulnerabilities(filter).await
    }

    pub fn settle(&mut self, ticket: LoadTicket, result: Result<Vec<Vulnerability>, DashboardError>) -> bool {
        self.loader.settle(ticket, result, CONTEXT)
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) -> Result<(), DashboardError> {
        let ticket = self.begin_load();
        let result = Self::fetch(api, &self.filter).await;
        self.loader.settle_checked(ticket, result, CONTEXT)
    }

    pub fn vulnerabilities(&self) -> &[Vulnerability] {
        self.loader.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn severity_counts(&self) -> SeverityCount {
        SeverityCount::from_vulnerabilities(self.vulnerabilities())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::views::testing::{vuln, FakeApi};

    fn fixture() -> FakeApi {
        FakeApi::new().with_vulns(vec![
            vuln(1, Severity::Critical, "xss", 1),
            vuln(2, Severity::Low, "sql_injection", 1),
            vuln(3, Severity::Critical, "csrf", 2),
        ])
    }

    #[tokio::test]
    async fn test_unfiltered_list() {
        let api = fixture();
        let mut view = VulnerabilitiesView::new();
        view.load(&api).await.unwrap();
        assert_eq!(view.vulnerabilities().len(), 3);
        assert_eq!(view.severity_counts().critical, 2);
    }

    #[tokio::test]
    async fn test_filter_by_severity_and_scan() {
        let api = fixture();
        let mut view = VulnerabilitiesView::new();
        view.set_filter(VulnerabilityFilter {
            severity: Some(Severity::Critical),
            scan_result: Some(2),
            ..Default::default()
        });
        view.load(&api).await.unwrap();
        let ids: Vec<u64> = view.vulnerabilities().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_filter_change_discards_in_flight_load() {
        let api = fixture();
        let mut view = VulnerabilitiesView::new();
        let ticket = view.begin_load();
        let late = VulnerabilitiesView::fetch(&api, &VulnerabilityFilter::default()).await;
        view.set_filter(VulnerabilityFilter::for_scan(1));
        assert!(!view.settle(ticket, late));
        assert!(view.vulnerabilities().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_retryable() {
        let api = fixture();
        api.fail("list_vulnerabilities");
        let mut view = VulnerabilitiesView::new();
        assert!(view.load(&api).await.is_err());
        assert!(view.loader().failure().unwrap().retryable);
        assert!(view.vulnerabilities().is_empty());
    }
}
