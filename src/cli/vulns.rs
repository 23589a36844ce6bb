use super::commands::VulnsArgs;
use super::{print_json, CliContext};
use crate::errors::DashboardError;
use crate::models::VulnerabilityFilter;
use crate::repl::renderer;
use crate::views::{Page, VulnerabilitiesView};

pub async fn handle_vulns(ctx: &CliContext, args: VulnsArgs) -> Result<(), DashboardError> {
    let filter = VulnerabilityFilter {
        scan_result: args.scan,
        web_application: args.app,
        severity: args.severity,
        vuln_type: args.vuln_type,
    };
    let mut view = VulnerabilitiesView::new();
    view.set_filter(filter);
    ctx.track("Loading vulnerabilities", args.json, view.load(ctx.api())).await?;

    if args.json {
        return print_json(view.vulnerabilities());
    }
    if !ctx.quiet {
        print!("{}", renderer::render_frame(Page::Vulnerabilities));
    }
    println!("{}", renderer::render_vulnerabilities(view.vulnerabilities(), view.filter()));
    if !ctx.quiet && !view.vulnerabilities().is_empty() {
        println!("{}", renderer::render_severity_histogram(&view.severity_counts()));
    }
    Ok(())
}
