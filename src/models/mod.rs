pub mod aggregates;
pub mod scan_result;
pub mod severity;
pub mod vulnerability;
pub mod web_application;

pub use aggregates::{group_by_severity, per_scan_counts, type_counts, SeverityCount, TypeCount};
pub use scan_result::{ScanAcknowledgement, ScanResult, ScanStatus};
pub use severity::Severity;
pub use vulnerability::{Vulnerability, VulnerabilityFilter};
pub use web_application::{
    name_index, NewWebApplication, WebApplication, WebApplicationRef, WebApplicationSummary};
