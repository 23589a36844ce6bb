use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Risk level of a vulnerability, declared from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "Critical", alias = "CRITICAL")]
    Critical,
    #[serde(alias = "High", alias = "HIGH")]
    High,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Info", alias = "INFO")]
    Info,
}

impl Severity {
    /// Fixed display order used by every grouping and chart.
    pub const DISPLAY_ORDER: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Capitalized name for headings ("Critical", "Info").
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" => Ok(Severity::Info),
            other => Err(format!(
                "Unknown severity '{}'. Use: critical, high, medium, low, info",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_display_order() {
        let mut sorted = Severity::DISPLAY_ORDER;
        sorted.sort();
        assert_eq!(sorted, Severity::DISPLAY_ORDER);
    }

    #[test]
    fn test_deserialize_canonical_and_label_forms() {
        let canonical: Severity = serde_json::from_str("\"critical\"").unwrap();
        let label: Severity = serde_json::from_str("\"Critical\"").unwrap();
        assert_eq!(canonical, Severity::Critical);
        assert_eq!(label, Severity::Critical);
    }

    #[test]
    fn test_serialize_is_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_unknown_severity_rejected() {
        assert!(serde_json::from_str::<Severity>("\"severe\"").is_err());
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(" info ".parse::<Severity>().unwrap(), Severity::Info);
    }

    #[test]
    fn test_ordering_puts_critical_first() {
        let mut levels = vec![Severity::Info, Severity::Critical, Severity::Low];
        levels.sort();
        assert_eq!(levels, vec![Severity::Critical, Severity::Low, Severity::Info]);
    }
}
