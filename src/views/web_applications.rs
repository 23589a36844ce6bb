use serde::Serialize;
use tracing::{debug, info, warn};

use super::form::{ApplicationForm, FormErrors};
use super::state::{LoadTicket, Loader, PendingScans, ScanTicket};
use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::models::{ScanAcknowledgement, ScanStatus, WebApplication};

const CONTEXT: &str = "Failed to load web applications";

/// What the scan button for one application offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAffordance {
    Available,
    /// Our own trigger request is in flight.
    Starting,
    /// The backend reports the latest scan as running.
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppRow {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub latest_scan_date: Option<String>,
    pub latest_status: Option<ScanStatus>,
    /// Only known for a completed latest scan.
    pub vulnerability_count: Option<usize>,
    pub scan: ScanAffordance,
}

/// Web applications page: list, add form and scan triggers.
#[derive(Debug, Clone, Default)]
pub struct WebApplicationsView {
    loader: Loader<Vec<WebApplication>>,
    pub form: ApplicationForm,
    form_errors: FormErrors,
    pending: PendingScans,
    action_error: Option<String>,
    scan_on_create: bool,
}

impl WebApplicationsView {
    pub fn new(scan_on_create: bool) -> Self {
        Self { scan_on_create, ..Default::default() }
    }

    pub fn loader(&self) -> &Loader<Vec<WebApplication>> {
        &self.loader
    }

    pub fn form_errors(&self) -> &FormErrors {
        &self.form_errors
    }

    /// Banner for a failed create or trigger. Never replaces the list.
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn clear_action_error(&mut self) {
        self.action_error = None;
    }

    /// Forget requests dropped mid-flight: their scan locks are released
    /// and a refresh they started can no longer settle.
    pub fn abandon(&mut self) {
        self.pending.clear();
        self.loader.invalidate();
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

    pub async fn fetch(api: &dyn DashboardApi) -> Result<Vec<WebApplication>, DashboardError> {
        api.list_web_applications().await
    }

    pub fn settle(&mut self, ticket: LoadTicket, result: Result<Vec<WebApplication>, DashboardError>) -> bool {
        self.loader.settle(ticket, result, CONTEXT)
    }

    pub async fn load(&mut self, api: &dyn DashboardApi) -> Result<(), DashboardError> {
        let ticket = self.begin_load();
        let result = Self::fetch(api).await;
        self.loader.settle_checked(ticket, result, CONTEXT)
    }

    /// Validate the form locally, then create the application. Field errors
    /// and API failures are kept on the view as well as returned.
    pub async fn submit(&mut self, api: &dyn DashboardApi) -> Result<WebApplication, DashboardError> {
        self.action_error = None;
        let new_app = match self.form.validate() {
            Ok(new_app) => {
                self.form_errors = FormErrors::default();
                new_app
            }
            Err(errors) => {
                let message = errors.messages().join("; ");
                self.form_errors = errors;
                return Err(DashboardError::Validation(message));
            }
        };

        let created = match api.create_web_application(&new_app).await {
            Ok(created) => created,
            Err(err) => {
                self.action_error = Some(format!("Failed to create web application: {}", err));
                return Err(err);
            }
        };

        if let Some(list) = self.loader.data_mut() {
            list.push(created.clone());
        }
        self.form.reset();

        if self.scan_on_create {
            if let Some(ticket) = self.pending.begin(created.id) {
                let result = api.trigger_scan(created.id).await;
                self.pending.finish(ticket);
                match result {
                    Ok(ack) => {
                        info!(id = created.id, ack = %ack.describe(), "Initial scan started");
                        if let Err(err) = self.load(api).await {
                            debug!(error = %err, "Refresh after scan request failed");
                        }
                    }
                    Err(err) => warn!(id = created.id, error = %err, "Initial scan could not be started"),
                }
            }
        }

        Ok(created)
    }

    /// Lock `app_id` for a scan request. `None` while one is in flight.
    pub fn begin_scan(&mut self, app_id: u64) -> Option<ScanTicket> {
        self.pending.begin(app_id)
    }

    /// Release the lock and record a failure in the action banner.
    pub fn finish_scan(
        &mut self,
        ticket: ScanTicket,
        result: Result<ScanAcknowledgement, DashboardError>,
    ) -> Result<ScanAcknowledgement, DashboardError> {
        let app_id = ticket.app_id();
        self.pending.finish(ticket);
        result.map_err(|err| {
            self.action_error = Some(format!("Failed to start scan for application {}: {}", app_id, err));
            err
        })
    }

    /// POST one scan request, then re-fetch the list so the new status
    /// shows. `Ok(None)` when a request for `app_id` is already running.
    pub async fn trigger_scan(
        &mut self,
        api: &dyn DashboardApi,
        app_id: u64,
    ) -> Result<Option<ScanAcknowledgement>, DashboardError> {
        self.action_error = None;
        let Some(ticket) = self.begin_scan(app_id) else {
            debug!(app_id, "Scan request already in flight");
            return Ok(None);
        };
        let result = api.trigger_scan(app_id).await;
        let ack = self.finish_scan(ticket, result)?;
        if let Err(err) = self.load(api).await {
            debug!(error = %err, "Refresh after scan request failed");
        }
        Ok(Some(ack))
    }

    pub fn is_scan_pending(&self, app_id: u64) -> bool {
        self.pending.contains(app_id)
    }

    pub fn rows(&self) -> Vec<AppRow> {
        let Some(apps) = self.loader.data() else {
            return Vec::new();
        };
        apps.iter()
            .map(|app| {
                let latest = app.latest_scan();
                let scan = if self.pending.contains(app.id) {
                    ScanAffordance::Starting
                } else if latest.map(|s| s.status) == Some(ScanStatus::InProgress) {
                    ScanAffordance::InProgress
                } else {
                    ScanAffordance::Available
                };
                AppRow {
                    id: app.id,
                    name: app.name.clone(),
                    url: app.url.clone(),
                    description: app.description.clone(),
                    latest_scan_date: latest.map(|s| s.scan_date.clone()),
                    latest_status: latest.map(|s| s.status),
                    vulnerability_count: latest
                        .filter(|s| s.status == ScanStatus::Completed)
                        .and_then(|s| s.vulnerability_count()),
                    scan,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::views::form::{NAME_REQUIRED, URL_SCHEME};
    use crate::views::testing::{app, scan, FakeApi};

    async fn loaded(api: &FakeApi) -> WebApplicationsView {
        let mut view = WebApplicationsView::new(false);
        view.load(api).await.unwrap();
        view
    }

    #[tokio::test]
    async fn test_trigger_scan_posts_once_then_refetches() {
        let api = FakeApi::new().with_apps(vec![app(7, "Shop")]);
        let mut view = loaded(&api).await;
        let before = api.calls().len();

        let ack = view.trigger_scan(&api, 7).await.unwrap();
        assert!(ack.is_some());
        assert_eq!(
            api.calls()[before..],
            ["POST /web-applications/7/scan/".to_string(), "GET /web-applications/".to_string()]
        );
        assert!(!view.is_scan_pending(7));
    }

    #[tokio::test]
    async fn test_duplicate_trigger_while_pending_is_ignored() {
        let api = FakeApi::new().with_apps(vec![app(7, "Shop")]);
        let mut view = loaded(&api).await;

        let ticket = view.begin_scan(7).unwrap();
        assert_eq!(view.rows()[0].scan, ScanAffordance::Starting);
        assert!(view.trigger_scan(&api, 7).await.unwrap().is_none());
        assert_eq!(api.count_calls("POST /web-applications/7/scan/"), 0);

        let result = view.finish_scan(ticket, Ok(ScanAcknowledgement::Other(serde_json::Value::Null)));
        assert!(result.is_ok());
        assert_eq!(view.rows()[0].scan, ScanAffordance::Available);
    }

    #[tokio::test]
    async fn test_failed_trigger_releases_lock_and_keeps_list() {
        let api = FakeApi::new().with_apps(vec![app(7, "Shop")]);
        let mut view = loaded(&api).await;
        api.fail("trigger_scan");

        assert!(view.trigger_scan(&api, 7).await.is_err());
        assert!(!view.is_scan_pending(7));
        assert!(view.action_error().unwrap().contains("application 7"));
        assert_eq!(view.loader().data().unwrap().len(), 1);
        assert_eq!(api.count_calls("GET /web-applications/"), 1);
    }

    #[tokio::test]
    async fn test_abandoned_trigger_releases_lock() {
        let api = FakeApi::new().with_apps(vec![app(7, "Shop")]);
        let mut view = loaded(&api).await;
        api.stall("trigger_scan");

        let dropped = tokio::time::timeout(Duration::from_millis(20), view.trigger_scan(&api, 7)).await;
        assert!(dropped.is_err());
        assert_eq!(view.rows()[0].scan, ScanAffordance::Starting);

        view.abandon();
        assert!(!view.is_scan_pending(7));
        assert!(view.loader().data().is_some());

        api.recover("trigger_scan");
        assert!(view.trigger_scan(&api, 7).await.unwrap().is_some());
        assert_eq!(api.count_calls("POST /web-applications/7/scan/"), 2);
    }

    #[tokio::test]
    async fn test_abandoned_create_leaves_no_lock() {
        let api = FakeApi::new();
        let mut view = WebApplicationsView::new(true);
        view.load(&api).await.unwrap();
        view.form = ApplicationForm::new("Blog", "https://blog.example.com", "");
        api.stall("trigger_scan");

        let dropped = tokio::time::timeout(Duration::from_millis(20), view.submit(&api)).await;
        assert!(dropped.is_err());
        assert!(view.is_scan_pending(1));

        view.abandon();
        assert!(!view.is_scan_pending(1));
    }

    #[test]
    fn test_clear_action_error() {
        let mut view = WebApplicationsView::new(false);
        view.action_error = Some("Failed to start scan".into());
        view.clear_action_error();
        assert!(view.action_error().is_none());
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let api = FakeApi::new();
        let mut view = WebApplicationsView::new(false);
        view.form = ApplicationForm::new("", "shop.example.com", "");

        let err = view.submit(&api).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert_eq!(view.form_errors().name.as_deref(), Some(NAME_REQUIRED));
        assert_eq!(view.form_errors().url.as_deref(), Some(URL_SCHEME));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_appends_and_resets() {
        let api = FakeApi::new().with_apps(vec![app(1, "Shop")]);
        let mut view = loaded(&api).await;
        view.form = ApplicationForm::new("Blog", "https://blog.example.com", "");

        let created = view.submit(&api).await.unwrap();
        assert_eq!(created.id, 2);
        let names: Vec<String> = view.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Shop", "Blog"]);
        assert_eq!(view.form, ApplicationForm::default());
        assert_eq!(api.count_calls("POST /web-applications/"), 1);
        assert_eq!(api.count_calls("GET /web-applications/"), 1);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_list_untouched() {
        let api = FakeApi::new().with_apps(vec![app(1, "Shop")]);
        let mut view = loaded(&api).await;
        api.fail("create_web_application");
        view.form = ApplicationForm::new("Blog", "https://blog.example.com", "");

        assert!(view.submit(&api).await.is_err());
        assert_eq!(view.loader().data().unwrap().len(), 1);
        assert!(view.action_error().unwrap().starts_with("Failed to create web application"));
        assert_eq!(view.form.name, "Blog");
    }

    #[tokio::test]
    async fn test_scan_on_create() {
        let api = FakeApi::new();
        let mut view = WebApplicationsView::new(true);
        view.load(&api).await.unwrap();
        view.form = ApplicationForm::new("Blog", "https://blog.example.com", "");

        view.submit(&api).await.unwrap();
        assert_eq!(api.count_calls("POST /web-applications/1/scan/"), 1);
        assert!(!view.is_scan_pending(1));
    }

    #[tokio::test]
    async fn test_scan_on_create_failure_only_warns() {
        let api = FakeApi::new();
        api.fail("trigger_scan");
        let mut view = WebApplicationsView::new(true);
        view.load(&api).await.unwrap();
        view.form = ApplicationForm::new("Blog", "https://blog.example.com", "");

        assert!(view.submit(&api).await.is_ok());
        assert!(view.action_error().is_none());
    }

    #[tokio::test]
    async fn test_rows_show_latest_scan() {
        let mut shop = app(1, "Shop");
        let mut done = scan(10, 1, ScanStatus::Completed, "2024-01-01T00:00:00Z");
        done.vulnerabilities_count = Some(4);
        let running = scan(11, 1, ScanStatus::InProgress, "2024-02-01T00:00:00Z");
        shop.scan_results = Some(vec![done.clone(), running]);
        let mut blog = app(2, "Blog");
        blog.scan_results = Some(vec![done]);

        let api = FakeApi::new().with_apps(vec![shop, blog, app(3, "Wiki")]);
        let view = loaded(&api).await;
        let rows = view.rows();

        assert_eq!(rows[0].latest_status, Some(ScanStatus::InProgress));
        assert_eq!(rows[0].scan, ScanAffordance::InProgress);
        assert_eq!(rows[0].vulnerability_count, None);
        assert_eq!(rows[1].vulnerability_count, Some(4));
        assert_eq!(rows[1].scan, ScanAffordance::Available);
        assert!(rows[2].latest_scan_date.is_none());
    }
}
