use std::time::Duration;

use tracing::{debug, info, warn};

use super::commands::{ScansCommand, ShowArgs};
use super::{print_json, CliContext};
use crate::api::DashboardApi;
use crate::errors::DashboardError;
use crate::repl::progress::ctrl_c_pressed;
use crate::repl::renderer;
use crate::views::{Page, ScanDetail, ScanDetailView, ScanResultsView};

pub async fn handle_scans(ctx: &CliContext, command: ScansCommand) -> Result<(), DashboardError> {
    match command {
        ScansCommand::List { app, json } => list(ctx, app, json).await,
        ScansCommand::Show(args) => show(ctx, args).await,
        ScansCommand::Trigger { app_id } => trigger(ctx, app_id).await,
    }
}

async fn list(ctx: &CliContext, app: Option<u64>, json: bool) -> Result<(), DashboardError> {
    let mut view = ScanResultsView::new();
    view.select(app);
    ctx.track("Loading scan results", json, view.load(ctx.api())).await?;
    let rows = view.rows();

    if json {
        return print_json(&rows);
    }
    if !ctx.quiet {
        print!("{}", renderer::render_frame(Page::ScanResults));
    }
    println!("{}", renderer::render_scan_rows(&rows, view.selected(), &ctx.settings.date_format));
    Ok(())
}

fn print_detail(ctx: &CliContext, detail: &ScanDetail, json: bool) -> Result<(), DashboardError> {
    if json {
        return print_json(detail);
    }
    if !ctx.quiet {
        print!("{}", renderer::render_frame(Page::ScanDetail(detail.scan.id)));
    }
    println!("{}", renderer::render_scan_detail(detail, &ctx.settings.date_format));
    Ok(())
}

/// Show a scan result. With `--follow`, poll until the backend reports a
/// terminal status.
async fn show(ctx: &CliContext, args: ShowArgs) -> Result<(), DashboardError> {
    info!(scan_id = args.id, follow = args.follow, "Querying scan result");
    if !args.follow {
        let detail = ctx
            .track("Loading scan result", args.json, ScanDetailView::fetch(ctx.api(), args.id))
            .await?;
        return print_detail(ctx, &detail, args.json);
    }

    let interval = Duration::from_secs(args.interval.max(1));
    let last = follow_scan(ctx.api(), args.id, interval, |detail| {
        if args.json {
            return print_json(&detail.scan);
        }
        if !ctx.quiet {
            println!(
                "{}",
                renderer::render_info(&format!(
                    "Scan #{} is {} ({} vulnerabilities so far), checking again in {}s",
                    args.id,
                    detail.scan.status,
                    detail.vulnerabilities.len(),
                    interval.as_secs(),
                ))
            );
        }
        Ok(())
    })
    .await?;

    match last {
        Some(detail) => print_detail(ctx, &detail, args.json),
        None => {
            info!(scan_id = args.id, "Interrupted before the first result arrived");
            Ok(())
        }
    }
}

/// Fetch `scan_id` every `interval` until its status is terminal, calling
/// `on_poll` for each unfinished snapshot. Ctrl-C during a fetch or a wait
/// stops early with the last snapshot seen, if any.
pub(crate) async fn follow_scan<F>(
    api: &dyn DashboardApi,
    scan_id: u64,
    interval: Duration,
    mut on_poll: F,
) -> Result<Option<ScanDetail>, DashboardError>
where
    F: FnMut(&ScanDetail) -> Result<(), DashboardError>,
{
    let mut last = None;
    loop {
        let detail = tokio::select! {
            result = ScanDetailView::fetch(api, scan_id) => result?,
            _ = ctrl_c_pressed() => {
                warn!(scan_id, "Follow interrupted during fetch");
                return Ok(last);
            }
        };

        let status = detail.scan.status;
        if status.is_terminal() {
            debug!(scan_id, %status, "Scan reached a terminal status");
            return Ok(Some(detail));
        }
        on_poll(&detail)?;
        last = Some(detail);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = ctrl_c_pressed() => {
                warn!(scan_id, "Follow interrupted");
                return Ok(last);
            }
        }
    }
}

async fn trigger(ctx: &CliContext, app_id: u64) -> Result<(), DashboardError> {
    let mut view = ScanResultsView::new();
    view.select(Some(app_id));
    let message = format!("Starting scan for application {}", app_id);
    match ctx.track(&message, false, view.trigger_selected_scan(ctx.api())).await? {
        Some(ack) => {
            println!("{}", renderer::render_success(&format!("Scan requested: {}", ack.describe())));
            if let Some(scan) = ack.scan() {
                println!(
                    "{}",
                    renderer::render_info(&format!("Follow it with: auditdeck scans show {} --follow", scan.id))
                );
            }
        }
        None => println!("{}", renderer::render_info("A scan request for that application is already in flight.")),
    }
    Ok(())
}
