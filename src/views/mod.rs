//! Page controllers. Each view owns its [`Loader`] and knows how to fetch its
//! data through a [`DashboardApi`](crate::api::DashboardApi); rendering lives
//! in the REPL and CLI layers.

pub mod dashboard;
pub mod form;
pub mod scan_detail;
pub mod scan_results;
pub mod state;
pub mod vulnerabilities;
pub mod web_applications;

#[cfg(test)]
pub(crate) mod testing;

pub use dashboard::{DashboardData, DashboardSummary, DashboardView, RecentScan};
pub use form::{ApplicationForm, FormErrors};
pub use scan_detail::{EmptyState, ScanDetail, ScanDetailView, SeveritySlice, TypeShare};
pub use scan_results::{ScanResultsData, ScanResultsView, ScanRow};
pub use state::{Failure, LoadState, LoadTicket, Loader, PendingScans, ScanTicket};
pub use vulnerabilities::{VulnerabilitiesView, EMPTY_GUIDANCE};
pub use web_applications::{AppRow, ScanAffordance, WebApplicationsView};

/// Navigable pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    WebApplications,
    ScanResults,
    ScanDetail(u64),
    Vulnerabilities,
}

impl Page {
    /// Entries of the navigation bar, in display order.
    pub const NAV: [Page; 4] = [
        Page::Dashboard,
        Page::WebApplications,
        Page::ScanResults,
        Page::Vulnerabilities,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::WebApplications => "Web Applications",
            Page::ScanResults | Page::ScanDetail(_) => "Scan Results",
            Page::Vulnerabilities => "Vulnerabilities",
        }
    }

    /// The nav entry highlighted while this page is shown.
    pub fn nav_entry(&self) -> Page {
        match self {
            Page::ScanDetail(_) => Page::ScanResults,
            other => *other,
        }
    }
}
