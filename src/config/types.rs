use serde::{Deserialize, Serialize};

use crate::utils::formatting::DEFAULT_DATE_FORMAT;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_RECENT_SCANS: usize = 5;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DashboardConfig {
    pub api: Option<ApiConfig>,
    pub dashboard: Option<DashboardSection>,
    pub web_applications: Option<WebApplicationsSection>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DashboardSection {
    /// How many scans the "Recent Scans" table shows.
    pub recent_scans: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WebApplicationsSection {
    /// Trigger a scan right after a new application is saved.
    pub scan_on_create: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DisplayConfig {
    pub color: Option<bool>,
    pub date_format: Option<String>,
}

/// Fully resolved settings after file, environment and CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    pub recent_scans: usize,
    pub scan_on_create: bool,
    pub color: bool,
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("auditdeck/{}", env!("CARGO_PKG_VERSION")),
            recent_scans: DEFAULT_RECENT_SCANS,
            scan_on_create: false,
            color: true,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Settings {
    /// Layer a parsed config file over the defaults.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let defaults = Self::default();
        let api = config.api.clone().unwrap_or_default();
        let display = config.display.clone().unwrap_or_default();
        Self {
            base_url: api.base_url.unwrap_or(defaults.base_url),
            user_agent: api.user_agent.unwrap_or(defaults.user_agent),
            recent_scans: config
                .dashboard
                .as_ref()
                .and_then(|d| d.recent_scans)
                .unwrap_or(defaults.recent_scans),
            scan_on_create: config
                .web_applications
                .as_ref()
                .and_then(|w| w.scan_on_create)
                .unwrap_or(defaults.scan_on_create),
            color: display.color.unwrap_or(defaults.color),
            date_format: display.date_format.unwrap_or(defaults.date_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, "http://localhost:8000/api");
        assert_eq!(settings.recent_scans, 5);
        assert!(!settings.scan_on_create);
        assert!(settings.color);
        assert!(settings.user_agent.starts_with("auditdeck/"));
    }

    #[test]
    fn test_empty_config_yields_defaults() {
        assert_eq!(Settings::from_config(&DashboardConfig::default()), Settings::default());
    }

    #[test]
    fn test_config_sections_override_defaults() {
        let config: DashboardConfig = serde_yaml::from_str(
            "api:\n  base_url: https://audit.internal/api\ndashboard:\n  recent_scans: 10\nweb_applications:\n  scan_on_create: true\ndisplay:\n  color: false\n",
        )
        .unwrap();
        let settings = Settings::from_config(&config);
        assert_eq!(settings.base_url, "https://audit.internal/api");
        assert_eq!(settings.recent_scans, 10);
        assert!(settings.scan_on_create);
        assert!(!settings.color);
        assert_eq!(settings.date_format, DEFAULT_DATE_FORMAT);
    }
}
