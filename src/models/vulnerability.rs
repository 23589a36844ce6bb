use serde::{Deserialize, Serialize};

use super::severity::Severity;
use super::web_application::WebApplicationRef;

/// One discrete finding produced by a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: u64,
    pub name: String,
    /// Machine type key such as `sql_injection` or `missing_header`.
    #[serde(rename = "type")]
    pub vuln_type: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub mitigation: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub remediation: Option<String>,
    #[serde(default)]
    pub date_discovered: Option<String>,
    #[serde(default)]
    pub web_application: Option<WebApplicationRef>,
    #[serde(default)]
    pub scan_result: Option<u64>,
}

impl Vulnerability {
    /// Where the finding was observed. Older payloads call it `url`,
    /// newer ones `location`.
    pub fn location(&self) -> Option<&str> {
        non_empty(self.url.as_deref()).or_else(|| non_empty(self.location.as_deref()))
    }

    /// How to fix it, under either field name.
    pub fn remediation(&self) -> Option<&str> {
        non_empty(self.mitigation.as_deref()).or_else(|| non_empty(self.remediation.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Query parameters accepted by `GET /vulnerabilities/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VulnerabilityFilter {
    pub scan_result: Option<u64>,
    pub web_application: Option<u64>,
    pub severity: Option<Severity>,
    pub vuln_type: Option<String>,
}

impl VulnerabilityFilter {
    pub fn for_scan(scan_result: u64) -> Self {
        Self { scan_result: Some(scan_result), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Key/value pairs in the order they are sent.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.scan_result {
            pairs.push(("scan_result", id.to_string()));
        }
        if let Some(id) = self.web_application {
            pairs.push(("web_application", id.to_string()));
        }
        if let Some(severity) = self.severity {
            pairs.push(("severity", severity.as_str().to_string()));
        }
        if let Some(ref vuln_type) = self.vuln_type {
            pairs.push(("type", vuln_type.clone()));
        }
        pairs
    }
}
