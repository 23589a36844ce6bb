use std::sync::Arc;

use console::style;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use tracing::{debug, info};

use crate::api::DashboardApi;
use crate::config::Settings;
use crate::errors::DashboardError;
use crate::repl::banner;
use crate::repl::commands::{self, ResultsAction, SlashCommand};
use crate::repl::completer::ReplHelper;
use crate::repl::progress::RequestIndicator;
use crate::repl::renderer;
use crate::views::{
    ApplicationForm, DashboardView, Page, ScanDetailView, ScanResultsView, VulnerabilitiesView,
    WebApplicationsView,
};

/// Start (or retry) a view's load, await it interruptibly and settle it.
/// An abandoned request invalidates the ticket so its result can never
/// land later.
macro_rules! drive_load {
    ($self:ident . $view:ident, $retry:expr, $message:expr, $fetch:expr) => {{
        let ticket = if $retry { $self.$view.retry() } else { Some($self.$view.begin_load()) };
        match ticket {
            None => println!("{}", renderer::render_info("  Nothing to retry.")),
            Some(ticket) => match RequestIndicator::interruptible($message, $fetch).await {
                Some(result) => {
                    $self.$view.settle(ticket, result);
                }
                None => {
                    $self.$view.invalidate();
                    println!("{}", renderer::render_info("  Request abandoned."));
                }
            },
        }
    }};
}

/// Interactive dashboard shell. Holds one controller per page so that
/// switching pages keeps what was last loaded.
pub struct ReplSession {
    api: Arc<dyn DashboardApi>,
    settings: Settings,
    page: Page,
    dashboard: DashboardView,
    apps: WebApplicationsView,
    results: ScanResultsView,
    detail: ScanDetailView,
    vulns: VulnerabilitiesView,
}

impl ReplSession {
    pub fn new(api: Arc<dyn DashboardApi>, settings: Settings) -> Self {
        Self {
            api,
            dashboard: DashboardView::new(settings.recent_scans),
            apps: WebApplicationsView::new(settings.scan_on_create),
            results: ScanResultsView::new(),
            detail: ScanDetailView::new(),
            vulns: VulnerabilitiesView::new(),
            page: Page::Dashboard,
            settings,
        }
    }

    pub async fn run(mut self) -> Result<(), DashboardError> {
        banner::show_splash(&self.settings.base_url);

        let config = Config::builder().auto_add_history(true).build();
        let mut editor = Editor::with_config(config)
            .map_err(|e| DashboardError::Internal(format!("Failed to initialize shell: {}", e)))?;
        editor.set_helper(Some(ReplHelper::default()));

        self.navigate(Page::Dashboard).await;

        loop {
            let readline = {
                // rustyline is blocking, so use spawn_blocking
                let result = tokio::task::spawn_blocking(move || {
                    let term_w = console::Term::stdout().size().1 as usize;
                    let sep = format!("{}", style("─".repeat(term_w)).dim());
                    let prompt = format!("{}\n{} ", sep, style("auditdeck>").cyan().bold());
                    let result = editor.readline(&prompt);
                    (editor, result)
                })
                .await
                .map_err(|e| DashboardError::Internal(format!("Readline task failed: {}", e)))?;

                editor = result.0;
                result.1
            };

            match readline {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let term_w = console::Term::stdout().size().1 as usize;
                    println!("{}", style("─".repeat(term_w)).dim());

                    match commands::parse_command(trimmed) {
                        Ok(cmd) => {
                            if self.handle_command(cmd).await {
                                break;
                            }
                        }
                        Err(msg) => println!("{}", renderer::render_error(&msg)),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    println!("{}", renderer::render_error(&format!("Input error: {}", err)));
                    break;
                }
            }
        }

        println!("{}", renderer::render_info("Goodbye."));
        Ok(())
    }

    /// Returns `true` when the shell should exit.
    async fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Exit => return true,
            SlashCommand::Clear => print!("\x1B[2J\x1B[1;1H"),
            SlashCommand::Help { command } => println!("{}", renderer::render_help(command.as_deref())),
            SlashCommand::Version => println!("{}", renderer::render_version()),
            SlashCommand::Config => println!("{}", renderer::render_settings(&self.settings)),

            SlashCommand::Dashboard => self.navigate(Page::Dashboard).await,
            SlashCommand::Apps => self.navigate(Page::WebApplications).await,
            SlashCommand::Add { name, url, description } => self.add_application(name, url, description).await,
            SlashCommand::Scan { app_id } => self.trigger_scan(app_id).await,
            SlashCommand::Results { action } => match action {
                ResultsAction::Keep => self.navigate(Page::ScanResults).await,
                ResultsAction::All => {
                    self.results.select(None);
                    self.navigate(Page::ScanResults).await;
                }
                ResultsAction::App(id) => {
                    self.results.select(Some(id));
                    self.navigate(Page::ScanResults).await;
                }
                ResultsAction::Scan => self.trigger_selected_scan().await,
            },
            SlashCommand::Result { scan_id } => {
                self.detail.open(scan_id);
                self.navigate(Page::ScanDetail(scan_id)).await;
            }
            SlashCommand::Vulns { filter } => {
                self.vulns.set_filter(filter);
                self.navigate(Page::Vulnerabilities).await;
            }
            SlashCommand::Refresh => {
                self.load_current(false).await;
                self.render_page();
            }
            SlashCommand::Retry => {
                self.load_current(true).await;
                self.render_page();
            }
        }
        false
    }

    async fn navigate(&mut self, page: Page) {
        debug!(?page, "Navigating");
        if self.page != page {
            // Action banners belong to the page they were raised on.
            self.apps.clear_action_error();
            self.results.clear_action_error();
        }
        self.page = page;
        self.load_current(false).await;
        self.render_page();
    }

    async fn load_current(&mut self, retry: bool) {
        let api = self.api.clone();
        match self.page {
            Page::Dashboard => {
                drive_load!(self.dashboard, retry, "Loading dashboard", DashboardView::fetch(api.as_ref()))
            }
            Page::WebApplications => drive_load!(
                self.apps,
                retry,
                "Loading web applications",
                WebApplicationsView::fetch(api.as_ref())
            ),
            Page::ScanResults => {
                let selected = self.results.selected();
                drive_load!(
                    self.results,
                    retry,
                    "Loading scan results",
                    ScanResultsView::fetch(api.as_ref(), selected)
                )
            }
            Page::ScanDetail(scan_id) => {
                drive_load!(self.detail, retry, "Loading scan result", ScanDetailView::fetch(api.as_ref(), scan_id))
            }
            Page::Vulnerabilities => {
                let filter = self.vulns.filter().clone();
                drive_load!(
                    self.vulns,
                    retry,
                    "Loading vulnerabilities",
                    VulnerabilitiesView::fetch(api.as_ref(), &filter)
                )
            }
        }
    }

    fn render_page(&self) {
        print!("{}", renderer::render_frame(self.page));
        let fmt = self.settings.date_format.as_str();
        let body = match self.page {
            Page::Dashboard => renderer::render_load_state(self.dashboard.loader().state())
                .or_else(|| self.dashboard.summary().map(|s| renderer::render_dashboard(&s, fmt))),
            Page::WebApplications => {
                let mut out = String::new();
                if let Some(err) = self.apps.action_error() {
                    out.push_str(&format!("  {}\n", renderer::render_error(err)));
                }
                out.push_str(
                    &renderer::render_load_state(self.apps.loader().state())
                        .unwrap_or_else(|| renderer::render_apps(&self.apps.rows(), fmt)),
                );
                Some(out)
            }
            Page::ScanResults => {
                let mut out = String::new();
                if let Some(err) = self.results.action_error() {
                    out.push_str(&format!("  {}\n", renderer::render_error(err)));
                }
                out.push_str(&renderer::render_load_state(self.results.loader().state()).unwrap_or_else(
                    || renderer::render_scan_rows(&self.results.rows(), self.results.selected(), fmt),
                ));
                Some(out)
            }
            Page::ScanDetail(_) => renderer::render_load_state(self.detail.loader().state())
                .or_else(|| self.detail.detail().map(|d| renderer::render_scan_detail(d, fmt))),
            Page::Vulnerabilities => renderer::render_load_state(self.vulns.loader().state())
                .or_else(|| Some(renderer::render_vulnerabilities(self.vulns.vulnerabilities(), self.vulns.filter()))),
        };
        if let Some(body) = body {
            println!("{}", body);
        }
    }

    async fn add_application(&mut self, name: String, url: String, description: String) {
        let api = self.api.clone();
        if self.apps.loader().data().is_none() {
            drive_load!(self.apps, false, "Loading web applications", WebApplicationsView::fetch(api.as_ref()));
        }
        self.apps.form = ApplicationForm::new(name, url, description);

        // Validation errors come back before any request is made.
        let submitted = RequestIndicator::interruptible("Creating web application", self.apps.submit(api.as_ref())).await;
        let Some(result) = submitted else {
            self.apps.abandon();
            println!("{}", renderer::render_info("  Request abandoned."));
            return;
        };
        match result {
            Ok(created) => {
                info!(id = created.id, "Web application added from shell");
                println!(
                    "{}",
                    renderer::render_success(&format!("Added {} (id {})", style(&created.name).bold(), created.id))
                );
                self.page = Page::WebApplications;
                self.render_page();
            }
            Err(DashboardError::Validation(_)) => {
                print!("{}", renderer::render_form_errors(self.apps.form_errors()));
            }
            Err(err) => {
                let msg = self.apps.action_error().map(str::to_string).unwrap_or_else(|| err.to_string());
                println!("{}", renderer::render_error(&msg));
            }
        }
    }

    async fn trigger_scan(&mut self, app_id: u64) {
        let api = self.api.clone();
        let message = format!("Starting scan for application {}", app_id);
        let Some(result) = RequestIndicator::interruptible(&message, self.apps.trigger_scan(api.as_ref(), app_id)).await
        else {
            self.apps.abandon();
            println!("{}", renderer::render_info("  Scan request abandoned."));
            return;
        };
        match result {
            Ok(Some(ack)) => {
                println!("{}", renderer::render_success(&format!("Scan requested: {}", ack.describe())));
                self.page = Page::WebApplications;
                self.render_page();
            }
            Ok(None) => println!("{}", renderer::render_info("  A scan request for that application is already in flight.")),
            Err(err) => println!("{}", renderer::render_error(&err.to_string())),
        }
    }

    async fn trigger_selected_scan(&mut self) {
        let api = self.api.clone();
        let Some(result) =
            RequestIndicator::interruptible("Starting scan", self.results.trigger_selected_scan(api.as_ref())).await
        else {
            self.results.abandon();
            println!("{}", renderer::render_info("  Scan request abandoned."));
            return;
        };
        match result {
            Ok(Some(ack)) => {
                println!("{}", renderer::render_success(&format!("Scan requested: {}", ack.describe())));
                self.page = Page::ScanResults;
                self.render_page();
            }
            Ok(None) => println!("{}", renderer::render_info("  A scan request for that application is already in flight.")),
            Err(err) => println!("{}", renderer::render_error(&err.to_string())),
        }
    }
}
