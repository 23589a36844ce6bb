use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scan_result::ScanResult;
use crate::utils::formatting::timestamp_sort_key;

/// A target site registered with the backend for scanning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebApplication {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The reference backend names this field `date_added`.
    #[serde(default, alias = "date_added")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Scan history, only present when the backend embeds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_results: Option<Vec<ScanResult>>,
}

impl WebApplication {
    /// Most recent embedded scan by `scan_date`, if any were embedded.
    pub fn latest_scan(&self) -> Option<&ScanResult> {
        self.scan_results
            .as_ref()?
            .iter()
            .max_by_key(|scan| timestamp_sort_key(&scan.scan_date))
    }
}

/// The `{id, name, url}` summary some endpoints embed in place of a bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebApplicationSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Reference to the owning application: bare id or embedded summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebApplicationRef {
    Id(u64),
    Summary(WebApplicationSummary),
}

impl WebApplicationRef {
    pub fn id(&self) -> u64 {
        match self {
            WebApplicationRef::Id(id) => *id,
            WebApplicationRef::Summary(summary) => summary.id,
        }
    }

    pub fn embedded_name(&self) -> Option<&str> {
        match self {
            WebApplicationRef::Id(_) => None,
            WebApplicationRef::Summary(summary) => Some(&summary.name),
        }
    }

    /// Name to show for the owner. The fetched application list wins over
    /// an embedded summary, which may predate a rename.
    pub fn resolve_name<'a>(&'a self, names: &HashMap<u64, &'a str>) -> &'a str {
        names
            .get(&self.id())
            .copied()
            .or_else(|| self.embedded_name())
            .unwrap_or("Unknown")
    }
}

/// Id to name lookup for [`WebApplicationRef::resolve_name`].
pub fn name_index(apps: &[WebApplication]) -> HashMap<u64, &str> {
    apps.iter().map(|app| (app.id, app.name.as_str())).collect()
}

/// Body of `POST /web-applications/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWebApplication {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
