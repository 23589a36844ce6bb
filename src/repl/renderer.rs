use console::style;

use crate::config::Settings;
use crate::models::{ScanStatus, Severity, SeverityCount, Vulnerability, VulnerabilityFilter};
use crate::repl::commands::{CommandHelp, COMMAND_HELP};
use crate::utils::formatting::{format_percent, format_timestamp, readable_type_name};
use crate::utils::truncation::{truncate_chars, truncate_evidence};
use crate::views::{
    AppRow, DashboardSummary, EmptyState, Failure, FormErrors, LoadState, Page, ScanAffordance,
    ScanDetail, ScanRow, EMPTY_GUIDANCE,
};

const BAR_WIDTH: usize = 24;
const RULE_WIDTH: usize = 60;

/// Paint `text` in the colour associated with `severity`.
fn paint(severity: Severity, text: &str) -> String {
    match severity {
        Severity::Critical => style(text).red().bold().to_string(),
        Severity::High => style(text).red().to_string(),
        Severity::Medium => style(text).yellow().to_string(),
        Severity::Low => style(text).blue().to_string(),
        Severity::Info => style(text).dim().to_string(),
    }
}

/// Render a severity badge with appropriate colors.
pub fn render_severity_badge(severity: Severity) -> String {
    let label = format!(" {} ", severity.as_str().to_uppercase());
    match severity {
        Severity::Critical => style(label).on_red().white().bold().to_string(),
        Severity::High => style(label).red().bold().to_string(),
        Severity::Medium => style(label).yellow().bold().to_string(),
        Severity::Low => style(label).blue().to_string(),
        Severity::Info => style(label).dim().to_string(),
    }
}

pub fn render_status(status: ScanStatus) -> String {
    let label = format!("{:<11}", status.as_str());
    match status {
        ScanStatus::Completed => style(label).green().to_string(),
        ScanStatus::InProgress => style(label).yellow().to_string(),
        ScanStatus::Pending => style(label).cyan().to_string(),
        ScanStatus::Failed => style(label).red().to_string(),
    }
}

fn rule() -> String {
    format!("  {}\n", style("─".repeat(RULE_WIDTH)).dim())
}

fn section(title: &str) -> String {
    format!("\n  {}\n{}", style(title).white().bold(), rule())
}

fn bar(fraction: f64) -> String {
    let len = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).ceil() as usize;
    "█".repeat(len)
}

/// Product header and navigation bar with the current page highlighted.
pub fn render_frame(page: Page) -> String {
    let current = page.nav_entry();
    let nav: Vec<String> = Page::NAV
        .iter()
        .map(|entry| {
            if *entry == current {
                style(format!(" {} ", entry.label())).black().on_cyan().bold().to_string()
            } else {
                style(format!(" {} ", entry.label())).dim().to_string()
            }
        })
        .collect();
    let mut out = format!(
        "\n  {}  {}\n",
        style("AuditDeck").cyan().bold(),
        nav.join(&style("│").dim().to_string()),
    );
    if let Page::ScanDetail(id) = page {
        out.push_str(&format!("  {}\n", style(format!("Scan Results › Scan #{}", id)).dim()));
    }
    out.push_str(&rule());
    out
}

/// Page-level error banner.
pub fn render_failure(failure: &Failure) -> String {
    let mut out = format!("\n  {} {}\n", style("✗").red().bold(), style(&failure.message).red());
    if failure.retryable {
        out.push_str(&format!("    {} {}\n", style("Type").dim(), style("/retry").white().bold()));
    }
    out
}

/// Placeholder for states without data. `None` once data is loaded.
pub fn render_load_state<T>(state: &LoadState<T>) -> Option<String> {
    match state {
        LoadState::Idle => Some(render_info("  Nothing loaded yet. Type /refresh.")),
        LoadState::Loading => Some(render_info("  Loading...")),
        LoadState::Failed(failure) => Some(render_failure(failure)),
        LoadState::Loaded(_) => None,
    }
}

/// Five bars in display order, scaled to the largest bucket.
pub fn render_severity_histogram(counts: &SeverityCount) -> String {
    let max = counts.ordered().iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let mut out = String::new();
    for (severity, count) in counts.ordered() {
        out.push_str(&format!(
            "   {} {:>4}  {}\n",
            paint(severity, &format!("{:<10}", severity.label())),
            count,
            paint(severity, &bar(count as f64 / max as f64)),
        ));
    }
    out.push_str(&format!("   {} {:>4}\n", style(format!("{:<10}", "Total")).white().bold(), counts.total()));
    out
}

pub fn render_dashboard(summary: &DashboardSummary, date_format: &str) -> String {
    let mut out = String::new();
    let cards = [
        ("Applications", summary.web_applications.to_string()),
        ("Scans", format!("{} ({} completed)", summary.scans, summary.completed_scans)),
        ("Vulnerabilities", summary.vulnerabilities.to_string()),
        ("Critical", summary.critical.to_string()),
    ];
    out.push('\n');
    for (label, value) in cards {
        let value = if label == "Critical" && summary.critical > 0 {
            style(value).red().bold().to_string()
        } else {
            style(value).white().bold().to_string()
        };
        out.push_str(&format!("  {} {}\n", style(format!("{:<16}", label)).dim(), value));
    }

    out.push_str(&section("Vulnerabilities by Severity"));
    out.push_str(&render_severity_histogram(&summary.severity));

    out.push_str(&section("Recent Scans"));
    if summary.recent_scans.is_empty() {
        out.push_str(&format!("   {}\n", style("No scans yet. Add an application and run /scan <app-id>.").dim()));
        return out;
    }
    for recent in &summary.recent_scans {
        out.push_str(&format!(
            "   {} {} {} {} {}\n",
            style(format!("#{:<5}", recent.scan_id)).dim(),
            style(format!("{:<24}", truncate_chars(&recent.application_name, 24))).white(),
            style(format!("{:<19}", format_timestamp(&recent.scan_date, date_format))).dim(),
            render_status(recent.status),
            style(format!("{} vulns", recent.vulnerability_count)).dim(),
        ));
    }
    out
}

pub fn render_form_errors(errors: &FormErrors) -> String {
    let mut out = String::new();
    for (field, message) in [("name", &errors.name), ("url", &errors.url)] {
        if let Some(message) = message {
            out.push_str(&format!("  {} {} {}\n", style("✗").red(), style(format!("{}:", field)).dim(), style(message).red()));
        }
    }
    out
}

pub fn render_apps(rows: &[AppRow], date_format: &str) -> String {
    if rows.is_empty() {
        return format!(
            "\n  {}\n  {}\n",
            style("No web applications yet.").dim(),
            style("Add one with /add --name <name> --url <url>").dim(),
        );
    }

    let mut out = format!(
        "\n  {} {} {} {} {} {}\n",
        style(format!("{:<5}", "ID")).dim(),
        style(format!("{:<22}", "Name")).dim(),
        style(format!("{:<32}", "URL")).dim(),
        style(format!("{:<19}", "Last scan")).dim(),
        style(format!("{:<11}", "Status")).dim(),
        style("Vulns").dim(),
    );
    for row in rows {
        let last_scan = row
            .latest_scan_date
            .as_deref()
            .map(|d| format_timestamp(d, date_format))
            .unwrap_or_else(|| "Never".to_string());
        let status = row
            .latest_status
            .map(render_status)
            .unwrap_or_else(|| style(format!("{:<11}", "-")).dim().to_string());
        let vulns = row.vulnerability_count.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
        let action = match row.scan {
            ScanAffordance::Available => style(format!("/scan {}", row.id)).cyan().to_string(),
            ScanAffordance::Starting => style("starting...").yellow().to_string(),
            ScanAffordance::InProgress => style("scanning").yellow().dim().to_string(),
        };
        out.push_str(&format!(
            "  {} {} {} {} {} {:<5} {}\n",
            style(format!("{:<5}", row.id)).dim(),
            style(format!("{:<22}", truncate_chars(&row.name, 22))).white().bold(),
            format!("{:<32}", truncate_chars(&row.url, 32)),
            style(format!("{:<19}", last_scan)).dim(),
            status,
            vulns,
            action,
        ));
        if let Some(description) = &row.description {
            out.push_str(&format!("        {}\n", style(truncate_chars(description, 70)).dim()));
        }
    }
    out
}

pub fn render_scan_rows(rows: &[ScanRow], selected: Option<u64>, date_format: &str) -> String {
    let filter = match selected {
        Some(id) => format!("application {}", id),
        None => "all applications".to_string(),
    };
    let mut out = format!("\n  {} {}\n", style("Showing").dim(), style(filter).white());

    if rows.is_empty() {
        out.push_str(&format!("\n  {}\n", style("No scan results yet.").dim()));
        if selected.is_some() {
            out.push_str(&format!("  {}\n", style("Start one with /results scan").dim()));
        }
        return out;
    }

    out.push_str(&format!(
        "\n  {} {} {} {} {}\n",
        style(format!("{:<6}", "Scan")).dim(),
        style(format!("{:<24}", "Application")).dim(),
        style(format!("{:<19}", "Date")).dim(),
        style(format!("{:<11}", "Status")).dim(),
        style("Vulns").dim(),
    ));
    for row in rows {
        out.push_str(&format!(
            "  {} {} {} {} {}\n",
            style(format!("{:<6}", row.id)).cyan(),
            style(format!("{:<24}", truncate_chars(&row.application_name, 24))).white(),
            style(format!("{:<19}", format_timestamp(&row.scan_date, date_format))).dim(),
            render_status(row.status),
            row.vulnerability_count.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
        ));
    }
    out.push_str(&format!("\n  {}\n", style("Open one with /result <scan-id>").dim()));
    out
}

fn render_vulnerability(vuln: &Vulnerability) -> String {
    let mut out = format!(
        "\n   {} {} {}\n",
        render_severity_badge(vuln.severity),
        style(&vuln.name).white().bold(),
        style(format!("[{}]", readable_type_name(&vuln.vuln_type))).dim(),
    );
    out.push_str(&format!("     {}\n", vuln.description));
    if let Some(location) = vuln.location() {
        out.push_str(&format!("     {:<12} {}\n", style("Location:").dim(), location));
    }
    if let Some(parameter) = &vuln.parameter {
        out.push_str(&format!("     {:<12} {}\n", style("Parameter:").dim(), parameter));
    }
    if let Some(evidence) = &vuln.evidence {
        out.push_str(&format!("     {:<12} {}\n", style("Evidence:").dim(), truncate_evidence(evidence)));
    }
    if let Some(remediation) = vuln.remediation() {
        out.push_str(&format!("     {:<12} {}\n", style("Remediation:").dim(), remediation));
    }
    out
}

pub fn render_scan_detail(detail: &ScanDetail, date_format: &str) -> String {
    let scan = &detail.scan;
    let mut out = format!(
        "\n  {} {}\n",
        style(format!("Scan #{}", scan.id)).white().bold(),
        render_status(scan.status),
    );
    out.push_str(&format!(
        "  {:<14} {} {}\n",
        style("Application:").dim(),
        style(&detail.application.name).white().bold(),
        style(format!("({})", detail.application.url)).dim(),
    ));
    out.push_str(&format!("  {:<14} {}\n", style("Date:").dim(), format_timestamp(&scan.scan_date, date_format)));
    if let Some(summary) = scan.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&format!("  {:<14} {}\n", style("Summary:").dim(), summary));
    }

    if let Some(empty) = detail.empty_state() {
        let message = match empty {
            EmptyState::NoneFound => style(format!("✓ {}", empty.message())).green().to_string(),
            EmptyState::Pending => style(empty.message()).dim().to_string(),
        };
        out.push_str(&format!("\n  {}\n", message));
        return out;
    }

    out.push_str(&section("Severity Distribution"));
    for slice in detail.severity_chart() {
        out.push_str(&format!(
            "   {} {:>4} {:>5}  {}\n",
            paint(slice.severity, &format!("{:<10}", slice.severity.label())),
            slice.count,
            format_percent(slice.fraction),
            paint(slice.severity, &bar(slice.fraction)),
        ));
    }

    out.push_str(&section("Vulnerability Types"));
    for share in detail.type_breakdown() {
        out.push_str(&format!(
            "   {:<24} {:>4} {:>5}  {}\n",
            truncate_chars(&share.label, 24),
            share.count,
            format_percent(share.fraction),
            style(bar(share.fraction)).cyan(),
        ));
    }

    for (severity, group) in detail.grouped() {
        out.push_str(&section(&format!("{} ({})", severity.label(), group.len())));
        for vuln in group {
            out.push_str(&render_vulnerability(vuln));
        }
    }
    out
}

pub fn render_vulnerabilities(vulnerabilities: &[Vulnerability], filter: &VulnerabilityFilter) -> String {
    if vulnerabilities.is_empty() {
        let msg = if filter.is_empty() { EMPTY_GUIDANCE } else { "No vulnerabilities match the filter." };
        return format!("\n  {}\n", style(msg).dim());
    }

    let mut out = format!(
        "\n{}\n",
        style(format!("  Vulnerabilities ({}):", vulnerabilities.len())).white().bold(),
    );
    if !filter.is_empty() {
        let parts: Vec<String> = filter.query_pairs().into_iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        out.push_str(&format!("  {}\n", style(format!("filter: {}", parts.join(" "))).dim()));
    }
    out.push('\n');
    for vuln in vulnerabilities {
        let scan = vuln.scan_result.map(|id| format!("scan #{}", id)).unwrap_or_default();
        out.push_str(&format!(
            "  {} {} {} {}\n",
            render_severity_badge(vuln.severity),
            style(&vuln.name).white(),
            style(format!("[{}]", readable_type_name(&vuln.vuln_type))).dim(),
            style(scan).dim(),
        ));
        if let Some(location) = vuln.location() {
            out.push_str(&format!("      {}\n", style(location).dim()));
        }
    }
    out
}

pub fn render_settings(settings: &Settings) -> String {
    let rows = [
        ("api.base_url", settings.base_url.clone()),
        ("api.user_agent", settings.user_agent.clone()),
        ("dashboard.recent_scans", settings.recent_scans.to_string()),
        ("web_applications.scan_on_create", settings.scan_on_create.to_string()),
        ("display.color", settings.color.to_string()),
        ("display.date_format", settings.date_format.clone()),
    ];
    let mut out = format!("\n  {}\n", style("Settings").white().bold());
    for (key, value) in rows {
        out.push_str(&format!("    {} {}\n", style(format!("{:<34}", key)).dim(), value));
    }
    out
}

/// Render the help listing for all commands.
pub fn render_help(specific_command: Option<&str>) -> String {
    if let Some(cmd_name) = specific_command {
        return match COMMAND_HELP.iter().find(|c| c.name == cmd_name) {
            Some(cmd) => format_command_detail(cmd),
            None => format!("{} Unknown command: /{}", style("✗").red(), cmd_name),
        };
    }

    let mut out = String::new();
    out.push_str(&format!("\n{}\n\n", style("Available commands:").white().bold()));
    for cmd in COMMAND_HELP {
        out.push_str(&format!(
            "  {} {}\n",
            style(format!("{:<16}", format!("/{}", cmd.name))).cyan().bold(),
            style(cmd.description).dim(),
        ));
    }
    out
}

fn format_command_detail(cmd: &CommandHelp) -> String {
    format!(
        "\n{}\n  {}\n\n  {}\n",
        style(format!("/{}", cmd.name)).cyan().bold(),
        style(cmd.description).dim(),
        style(cmd.usage).white(),
    )
}

/// Render the version info.
pub fn render_version() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let build_ts = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");

    format!(
        "\n  {} {}\n  {} {}\n  {} {}\n",
        style("Version:").dim(),
        style(version).white().bold(),
        style("Commit:").dim(),
        style(git_hash).white(),
        style("Built:").dim(),
        style(build_ts).white(),
    )
}

/// Print an error message to the REPL.
pub fn render_error(msg: &str) -> String {
    format!("{} {}", style("✗").red(), style(msg).red())
}

/// Print a success message.
pub fn render_success(msg: &str) -> String {
    format!("{} {}", style("✓").green(), msg)
}

/// Print an info message.
pub fn render_info(msg: &str) -> String {
    format!("{}", style(msg).dim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::{app, scan, vuln};
    use crate::views::RecentScan;

    fn strip(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    fn detail(status: ScanStatus, vulnerabilities: Vec<Vulnerability>) -> ScanDetail {
        ScanDetail {
            scan: scan(9, 1, status, "2024-05-01T08:30:00Z"),
            application: app(1, "Shop"),
            vulnerabilities,
        }
    }

    #[test]
    fn test_render_severity_badge_critical() {
        let badge = strip(&render_severity_badge(Severity::Critical));
        assert_eq!(badge, " CRITICAL ");
    }

    #[test]
    fn test_render_severity_badge_info() {
        assert_eq!(strip(&render_severity_badge(Severity::Info)), " INFO ");
    }

    #[test]
    fn test_frame_highlights_current_page() {
        let out = strip(&render_frame(Page::ScanDetail(4)));
        assert!(out.contains("AuditDeck"));
        assert!(out.contains("Web Applications"));
        assert!(out.contains("Scan #4"));
    }

    #[test]
    fn test_failure_shows_retry_hint_only_when_retryable() {
        let retryable = Failure { message: "Failed to load dashboard: network".into(), retryable: true };
        assert!(strip(&render_failure(&retryable)).contains("/retry"));
        let fatal = Failure { message: "Failed to load scan result: 404".into(), retryable: false };
        assert!(!strip(&render_failure(&fatal)).contains("/retry"));
    }

    #[test]
    fn test_histogram_lists_all_buckets() {
        let counts = SeverityCount { critical: 2, low: 1, ..Default::default() };
        let out = strip(&render_severity_histogram(&counts));
        for label in ["Critical", "High", "Medium", "Low", "Info", "Total"] {
            assert!(out.contains(label), "{label}");
        }
        assert!(out.contains("█"));
    }

    #[test]
    fn test_dashboard_lists_recent_scans() {
        let summary = DashboardSummary {
            web_applications: 1,
            scans: 1,
            completed_scans: 1,
            vulnerabilities: 2,
            critical: 2,
            severity: SeverityCount { critical: 2, ..Default::default() },
            recent_scans: vec![RecentScan {
                scan_id: 3,
                application_name: "Shop".into(),
                scan_date: "2024-05-01T08:30:00Z".into(),
                status: ScanStatus::Completed,
                vulnerability_count: 2,
            }],
        };
        let out = strip(&render_dashboard(&summary, "%Y-%m-%d %H:%M"));
        assert!(out.contains("Shop"));
        assert!(out.contains("2024-05-01 08:30"));
        assert!(out.contains("2 vulns"));
    }

    #[test]
    fn test_detail_success_message_only_when_completed() {
        let done = strip(&render_scan_detail(&detail(ScanStatus::Completed, vec![]), "%Y"));
        assert!(done.contains("No vulnerabilities found. Great job!"));

        let running = strip(&render_scan_detail(&detail(ScanStatus::InProgress, vec![]), "%Y"));
        assert!(!running.contains("Great job"));
        assert!(running.contains("once the scan is complete"));
    }

    #[test]
    fn test_detail_renders_charts_and_groups() {
        let d = detail(
            ScanStatus::Completed,
            vec![
                vuln(1, Severity::Critical, "sql_injection", 9),
                vuln(2, Severity::Low, "xss", 9),
            ],
        );
        let out = strip(&render_scan_detail(&d, "%Y"));
        assert!(out.contains("Severity Distribution"));
        assert!(out.contains("Sql Injection"));
        assert!(out.contains("50%"));
        assert!(out.contains("Critical (1)"));
        assert!(!out.contains("High (0)"));
    }

    #[test]
    fn test_empty_vulnerability_list_shows_guidance() {
        let out = strip(&render_vulnerabilities(&[], &VulnerabilityFilter::default()));
        assert!(out.contains("Add web applications and run scans"));
        let out = strip(&render_vulnerabilities(&[], &VulnerabilityFilter::for_scan(1)));
        assert!(out.contains("match the filter"));
    }

    #[test]
    fn test_apps_table() {
        let rows = vec![AppRow {
            id: 7,
            name: "Shop".into(),
            url: "https://shop.example.com".into(),
            description: None,
            latest_scan_date: None,
            latest_status: None,
            vulnerability_count: None,
            scan: ScanAffordance::Starting,
        }];
        let out = strip(&render_apps(&rows, "%Y"));
        assert!(out.contains("Never"));
        assert!(out.contains("starting..."));
        assert!(strip(&render_apps(&[], "%Y")).contains("No web applications yet"));
    }

    #[test]
    fn test_form_errors() {
        let errors = FormErrors { name: Some("Name is required".into()), url: None };
        let out = strip(&render_form_errors(&errors));
        assert!(out.contains("name: Name is required"));
        assert!(!out.contains("url:"));
    }

    #[test]
    fn test_render_help_all_commands() {
        let output = strip(&render_help(None));
        assert!(output.contains("/dashboard"));
        assert!(output.contains("/vulns"));
        assert!(output.contains("/exit"));
    }

    #[test]
    fn test_render_help_specific_command() {
        let output = render_help(Some("add"));
        assert!(output.contains("--url"));
        assert!(render_help(Some("nonexistent")).contains("Unknown command"));
    }

    #[test]
    fn test_render_error() {
        assert!(render_error("something went wrong").contains("something went wrong"));
    }
}
