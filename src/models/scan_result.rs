use std::fmt;

use serde::{Deserialize, Serialize};

use super::vulnerability::Vulnerability;
use super::web_application::WebApplicationRef;

/// Lifecycle of a scan. Transitions are driven by the backend; the
/// dashboard only observes them by re-fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "In Progress", alias = "in progress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Failed")]
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::InProgress => "in_progress",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    /// No further transitions will happen on the backend.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution record of a scan against a web application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: u64,
    pub web_application: WebApplicationRef,
    pub scan_date: String,
    pub status: ScanStatus,
    #[serde(default)]
    pub summary: Option<String>,
    /// Present only on endpoints that nest findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<Vec<Vulnerability>>,
    /// Backend-computed count, present on list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerabilities_count: Option<usize>,
}

impl ScanResult {
    /// Number of findings this record knows about: the nested list when
    /// present, otherwise the backend's count.
    pub fn vulnerability_count(&self) -> Option<usize> {
        self.vulnerabilities
            .as_ref()
            .map(Vec::len)
            .or(self.vulnerabilities_count)
    }
}

/// What `POST /web-applications/{id}/scan/` answered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanAcknowledgement {
    Scan(ScanResult),
    Other(serde_json::Value),
}

impl ScanAcknowledgement {
    pub fn scan(&self) -> Option<&ScanResult> {
        match self {
            ScanAcknowledgement::Scan(scan) => Some(scan),
            ScanAcknowledgement::Other(_) => None,
        }
    }

    /// A short human-readable description of the acknowledgement.
    pub fn describe(&self) -> String {
        match self {
            ScanAcknowledgement::Scan(scan) => format!("scan #{} is {}", scan.id, scan.status),
            ScanAcknowledgement::Other(value) => value
                .get("message")
                .or_else(|| value.get("detail"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| "scan requested".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_accepts_display_labels() {
        let label: ScanStatus = serde_json::from_str("\"In Progress\"").unwrap();
        let canonical: ScanStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(label, ScanStatus::InProgress);
        assert_eq!(canonical, ScanStatus::InProgress);
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"in_progress\"");
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<ScanStatus>("\"queued\"").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ScanStatus::Completed.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
        assert!(!ScanStatus::Pending.is_terminal());
        assert!(!ScanStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_decode_list_shape_with_embedded_application() {
        let scan: ScanResult = serde_json::from_value(json!({
            "id": 4,
            "web_application": {"id": 2, "name": "Blog", "url": "http://blog.test"},
            "scan_date": "2024-05-01T08:30:00Z",
            "status": "Completed",
            "vulnerabilities_count": 3
        }))
        .unwrap();
        assert_eq!(scan.web_application.id(), 2);
        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.vulnerability_count(), Some(3));
    }

    #[test]
    fn test_nested_vulnerabilities_win_over_count() {
        let scan: ScanResult = serde_json::from_value(json!({
            "id": 4,
            "web_application": 2,
            "scan_date": "2024-05-01T08:30:00Z",
            "status": "completed",
            "vulnerabilities": [],
            "vulnerabilities_count": 3
        }))
        .unwrap();
        assert_eq!(scan.vulnerability_count(), Some(0));
    }

    #[test]
    fn test_acknowledgement_decodes_scan_or_message() {
        let scan: ScanAcknowledgement = serde_json::from_value(json!({
            "id": 9, "web_application": 7, "scan_date": "2024-05-01T08:30:00Z", "status": "pending"
        }))
        .unwrap();
        assert_eq!(scan.scan().map(|s| s.id), Some(9));
        assert_eq!(scan.describe(), "scan #9 is pending");

        let message: ScanAcknowledgement =
            serde_json::from_value(json!({"message": "Scan queued"})).unwrap();
        assert!(message.scan().is_none());
        assert_eq!(message.describe(), "Scan queued");
    }
}
