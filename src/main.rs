use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use auditdeck::api::{ApiClient, DashboardApi};
use auditdeck::cli::{self, Cli, CliContext, Commands};
use auditdeck::config;
use auditdeck::errors::DashboardError;
use auditdeck::repl::ReplSession;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("auditdeck={}", log_level)));

    // stdout carries rendered pages and --json output
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.with_ansi(!cli.no_color).init();
    }

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), DashboardError> {
    let command = cli.command.unwrap_or(Commands::Shell);
    if let Commands::Validate(args) = command {
        return handle_validate(args).await;
    }

    let settings = config::load_settings(
        cli.config.as_deref().map(Path::new),
        cli.api_url.as_deref(),
        cli.no_color,
    )
    .await?;
    if !settings.color {
        console::set_colors_enabled(false);
    }

    let client = ApiClient::from_settings(&settings)?;
    debug!(backend = %client.base_url(), "API client ready");
    let api: Arc<dyn DashboardApi> = Arc::new(client);
    let ctx = CliContext::new(api, settings, cli.quiet);

    match command {
        Commands::Shell => ReplSession::new(ctx.api.clone(), ctx.settings.clone()).run().await,
        Commands::Dashboard(args) => cli::dashboard::handle_dashboard(&ctx, args).await,
        Commands::Apps(command) => cli::apps::handle_apps(&ctx, command).await,
        Commands::Scans(command) => cli::scans::handle_scans(&ctx, command).await,
        Commands::Vulns(args) => cli::vulns::handle_vulns(&ctx, args).await,
        Commands::Validate(args) => handle_validate(args).await,
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), DashboardError> {
    let path = Path::new(&args.config);
    let parsed = config::parse_config(path).await?;
    let settings = config::Settings::from_config(&parsed);
    println!("Configuration is valid: {}", args.config);
    println!("  backend: {}", settings.base_url);
    Ok(())
}
