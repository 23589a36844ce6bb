use std::collections::HashMap;

use serde::Serialize;

use super::severity::Severity;
use super::vulnerability::Vulnerability;

/// Five-bucket severity histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub info: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl SeverityCount {
    pub fn from_vulnerabilities<'a, I>(vulnerabilities: I) -> Self
    where
        I: IntoIterator<Item = &'a Vulnerability>,
    {
        let mut counts = Self::default();
        for vuln in vulnerabilities {
            counts.add(vuln.severity);
        }
        counts
    }

    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.low + self.medium + self.high + self.critical
    }

    /// Buckets in display order, critical first.
    pub fn ordered(&self) -> [(Severity, usize); 5] {
        Severity::DISPLAY_ORDER.map(|s| (s, self.get(s)))
    }
}

/// Occurrences of one vulnerability type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub vuln_type: String,
    pub count: usize,
}

/// Per-type counts, most frequent first, ties broken by type name.
pub fn type_counts(vulnerabilities: &[Vulnerability]) -> Vec<TypeCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for vuln in vulnerabilities {
        *counts.entry(vuln.vuln_type.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<TypeCount> = counts
        .into_iter()
        .map(|(vuln_type, count)| TypeCount { vuln_type: vuln_type.to_string(), count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.vuln_type.cmp(&b.vuln_type)));
    out
}

/// Non-empty severity groups in the fixed order critical, high, medium,
/// low, info. Input order is preserved inside each group.
pub fn group_by_severity(vulnerabilities: &[Vulnerability]) -> Vec<(Severity, Vec<&Vulnerability>)> {
    Severity::DISPLAY_ORDER
        .iter()
        .filter_map(|&severity| {
            let group: Vec<&Vulnerability> =
                vulnerabilities.iter().filter(|v| v.severity == severity).collect();
            (!group.is_empty()).then_some((severity, group))
        })
        .collect()
}

/// Vulnerability count per producing scan id. Findings without a scan id
/// are not counted.
pub fn per_scan_counts(vulnerabilities: &[Vulnerability]) -> HashMap<u64, usize> {
    let mut counts = HashMap::new();
    for vuln in vulnerabilities {
        if let Some(scan_id) = vuln.scan_result {
            *counts.entry(scan_id).or_insert(0) += 1;
        }
    }
    counts
}
