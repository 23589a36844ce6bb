use tracing::info;

use super::commands::{AddArgs, AppsCommand};
use super::{print_json, CliContext};
use crate::errors::DashboardError;
use crate::repl::renderer;
use crate::views::{ApplicationForm, Page, WebApplicationsView};

pub async fn handle_apps(ctx: &CliContext, command: AppsCommand) -> Result<(), DashboardError> {
    match command {
        AppsCommand::List { json } => list(ctx, json).await,
        AppsCommand::Add(args) => add(ctx, args).await,
        AppsCommand::Scan { id } => scan(ctx, id).await,
    }
}

async fn list(ctx: &CliContext, json: bool) -> Result<(), DashboardError> {
    let mut view = WebApplicationsView::new(false);
    ctx.track("Loading web applications", json, view.load(ctx.api())).await?;
    let rows = view.rows();

    if json {
        return print_json(&rows);
    }
    if !ctx.quiet {
        print!("{}", renderer::render_frame(Page::WebApplications));
    }
    println!("{}", renderer::render_apps(&rows, &ctx.settings.date_format));
    Ok(())
}

async fn add(ctx: &CliContext, args: AddArgs) -> Result<(), DashboardError> {
    let mut view = WebApplicationsView::new(args.scan || ctx.settings.scan_on_create);
    view.form = ApplicationForm::new(args.name, args.url, args.description);

    let result = ctx.track("Creating web application", args.json, view.submit(ctx.api())).await;
    let created = match result {
        Ok(created) => created,
        Err(err @ DashboardError::Validation(_)) => {
            eprint!("{}", renderer::render_form_errors(view.form_errors()));
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    info!(id = created.id, name = %created.name, "Web application added");
    if args.json {
        return print_json(&created);
    }
    println!(
        "{}",
        renderer::render_success(&format!("Added web application {} (id {})", created.name, created.id))
    );
    Ok(())
}

async fn scan(ctx: &CliContext, app_id: u64) -> Result<(), DashboardError> {
    let mut view = WebApplicationsView::new(false);
    let message = format!("Starting scan for application {}", app_id);
    match ctx.track(&message, false, view.trigger_scan(ctx.api(), app_id)).await? {
        Some(ack) => println!("{}", renderer::render_success(&format!("Scan requested: {}", ack.describe()))),
        None => println!("{}", renderer::render_info("A scan request for that application is already in flight.")),
    }
    Ok(())
}
