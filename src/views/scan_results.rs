use serde::Serialize;
use tracing::debug;

use super::state::{LoadTicket, Loader, PendingScans};
use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::models::{name_index, ScanAcknowledgement, ScanResult, ScanStatus, WebApplication};

const CONTEXT: &str = "Failed to load scan results";

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResultsData {
    /// Always the full list; feeds the application selector and name lookup.
    pub web_applications: Vec<WebApplication>,
    pub scan_results: Vec<ScanResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRow {
    pub id: u64,
    pub web_application: u64,
    pub application_name: String,
    pub scan_date: String,
    pub status: ScanStatus,
    pub vulnerability_count: Option<usize>,
}

impl ScanResultsData {
    pub fn rows(&self) -> Vec<ScanRow> {
        let names = name_index(&self.web_applications);
        self.scan_results
            .iter()
            .map(|scan| ScanRow {
                id: scan.id,
                web_application: scan.web_application.id(),
                application_name: scan.web_application.resolve_name(&names).to_string(),
                scan_date: scan.scan_date.clone(),
                status: scan.status,
                vulnerability_count: scan.vulnerability_count(),
            })
            .collect()
    }
}

/// Scan results list, optionally narrowed to one application.
#[derive(Debug, Clone, Default)]
pub struct ScanResultsView {
    loader: Loader<ScanResultsData>,
    selected: Option<u64>,
    pending: PendingScans,
    action_error: Option<String>,
}

impl ScanResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loader(&self) -> &Loader<ScanResultsData> {
        &self.loader
    }

    pub fn selected(&self) -> Option<u64> {
        self.selected
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn clear_action_error(&mut self) {
        self.action_error = None;
    }

    /// Forget a trigger dropped mid-flight. See [`WebApplicationsView::abandon`].
    ///
    /// [`WebApplicationsView::abandon`]: super::WebApplicationsView::abandon
    pub fn abandon(&mut self) {
        self.pending.clear();
        self.loader.invalidate();
    }

    /// Change the application filter. Responses for the old filter are
    /// discarded.
    pub fn select(&mut self, web_application: Option<u64>) {
        if self.selected != web_application {
            debug!(from = ?self.selected, to = ?web_application, "Scan results filter changed");
            self.selected = web_application;
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
        web_application: Option<u64>,
    ) -> Result<ScanResultsData, DashboardError> {
        let (web_applications, scan_results) = futures::try_join!(
            api.list_web_applications(),
            api.list_scan_results(web_application),
        )?;
        Ok(ScanResultsData { web_applications, scan_results })
    }

    pub fn settle(&mut self, ticket: LoadTicket, result: Result<ScanResultsData, DashboardError>) -> bool {
        self.loader.settle(ticket, result, CONTEXT)
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) -> Result<(), DashboardError> {
        let ticket = self.begin_load();
        let result = Self::fetch(api, self.selected).await;
        self.loader.settle_checked(ticket, result, CONTEXT)
    }

    /// Scan the selected application, then re-fetch. `Ok(None)` while a
    /// request for it is already in flight.
    pub async fn trigger_selected_scan(
        &mut self,
        api: &dyn DashboardApi,
    ) -> Result<Option<ScanAcknowledgement>, DashboardError> {
        self.action_error = None;
        let app_id = self.selected.ok_or_else(|| {
            DashboardError::InvalidArgument("Select a web application before starting a scan".into())
        })?;
        let Some(ticket) = self.pending.begin(app_id) else {
            return Ok(None);
        };
        let result = api.trigger_scan(app_id).await;
        self.pending.finish(ticket);
        match result {
            Ok(ack) => {
                if let Err(err) = self.load(api).await {
                    debug!(error = %err, "Refresh after scan request failed");
                }
                Ok(Some(ack))
            }
            Err(err) => {
                self.action_error = Some(format!("Failed to start scan for application {}: {}", app_id, err));
                Err(err)
            }
        }
    }

    pub fn is_scan_pending(&self) -> bool {
        self.selected.is_some_and(|id| self.pending.contains(id))
    }

    pub fn rows(&self) -> Vec<ScanRow> {
        self.loader.data().map(ScanResultsData::rows).unwrap_or_default()
    }
}
