use tracing::info;

use super::commands::DashboardArgs;
use super::{print_json, CliContext};
use crate::errors::DashboardError;
use crate::repl::renderer;
use crate::views::{DashboardView, Page};

pub async fn handle_dashboard(ctx: &CliContext, args: DashboardArgs) -> Result<(), DashboardError> {
    info!(base_url = %ctx.settings.base_url, "Loading dashboard");
    let data = ctx.track("Loading dashboard", args.json, DashboardView::fetch(ctx.api())).await?;
    let summary = data.summarize(ctx.settings.recent_scans);

    if args.json {
        return print_json(&summary);
    }
    if !ctx.quiet {
        print!("{}", renderer::render_frame(Page::Dashboard));
    }
    println!("{}", renderer::render_dashboard(&summary, &ctx.settings.date_format));
    Ok(())
}
