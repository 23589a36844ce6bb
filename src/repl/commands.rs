use crate::models::{Severity, VulnerabilityFilter};

/// All slash commands supported by the REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    Dashboard,
    Apps,
    /// Fields go through the add form as typed; validation happens there.
    Add {
        name: String,
        url: String,
        description: String,
    },
    Scan {
        app_id: u64,
    },
    Results {
        action: ResultsAction,
    },
    Result {
        scan_id: u64,
    },
    Vulns {
        filter: VulnerabilityFilter,
    },
    Retry,
    Refresh,
    Config,
    Version,
    Clear,
    Help {
        command: Option<String>,
    },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsAction {
    /// Show the list with the current application filter.
    Keep,
    All,
    App(u64),
    /// Trigger a scan for the selected application.
    Scan,
}

/// Description of a command for help display.
pub struct CommandHelp {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub static COMMAND_HELP: &[CommandHelp] = &[
    CommandHelp {
        name: "dashboard",
        usage: "/dashboard",
        description: "Overview: totals, severity distribution and recent scans",
    },
    CommandHelp {
        name: "apps",
        usage: "/apps",
        description: "List web applications with their latest scan",
    },
    CommandHelp {
        name: "add",
        usage: "/add --name <name> --url <http(s)://...> [--description <text>]",
        description: "Register a web application. Quote values that contain spaces.",
    },
    CommandHelp {
        name: "scan",
        usage: "/scan <app-id>",
        description: "Start a scan for a web application",
    },
    CommandHelp {
        name: "results",
        usage: "/results [<app-id>|all|scan]",
        description: "List scan results, optionally for one application. 'scan' starts a scan for the selected one.",
    },
    CommandHelp {
        name: "result",
        usage: "/result <scan-id>",
        description: "Show one scan result with its vulnerabilities and charts",
    },
    CommandHelp {
        name: "vulns",
        usage: "/vulns [--severity critical|high|medium|low|info] [--scan <id>] [--app <id>] [--type <type>]",
        description: "List vulnerabilities",
    },
    CommandHelp {
        name: "retry",
        usage: "/retry",
        description: "Retry the last failed page load",
    },
    CommandHelp {
        name: "refresh",
        usage: "/refresh",
        description: "Reload the current page",
    },
    CommandHelp {
        name: "config",
        usage: "/config",
        description: "Show the effective settings",
    },
    CommandHelp {
        name: "version",
        usage: "/version",
        description: "Show version and build info",
    },
    CommandHelp {
        name: "clear",
        usage: "/clear",
        description: "Clear the terminal screen",
    },
    CommandHelp {
        name: "help",
        usage: "/help [command]",
        description: "Show help for all or a specific command",
    },
    CommandHelp {
        name: "exit",
        usage: "/exit",
        description: "Quit the shell",
    },
];

/// All command names for tab completion.
pub static COMMAND_NAMES: &[&str] = &[
    "/dashboard",
    "/apps",
    "/add",
    "/scan",
    "/results",
    "/result",
    "/vulns",
    "/retry",
    "/refresh",
    "/config",
    "/version",
    "/clear",
    "/help",
    "/exit",
];

/// Flags (or keywords) accepted after each command.
pub fn command_flags(command: &str) -> &'static [&'static str] {
    match command {
        "/add" => &["--name", "--url", "--description"],
        "/results" => &["all", "scan"],
        "/vulns" => &["--severity", "--scan", "--app", "--type"],
        "/help" => &[
            "dashboard", "apps", "add", "scan", "results", "result", "vulns", "retry", "refresh",
            "config", "version", "clear", "help", "exit",
        ],
        _ => &[],
    }
}

/// Split on whitespace, keeping double-quoted runs together.
fn tokenize(input: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err("Unterminated quote".into());
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Parse a raw input line into a SlashCommand, or return an error message.
pub fn parse_command(input: &str) -> Result<SlashCommand, String> {
    let input = input.trim();
    if !input.starts_with('/') {
        return Err("Commands must start with /. Type /help for available commands.".into());
    }

    let parts = tokenize(input)?;
    let Some(cmd) = parts.first() else {
        return Err("Empty command".into());
    };
    let args: Vec<&str> = parts[1..].iter().map(String::as_str).collect();

    match cmd.as_str() {
        "/dashboard" | "/home" => Ok(SlashCommand::Dashboard),
        "/apps" => Ok(SlashCommand::Apps),
        "/add" => parse_add(&args),
        "/scan" => Ok(SlashCommand::Scan { app_id: parse_id("/scan", args.first().copied())? }),
        "/results" => parse_results(&args),
        "/result" => Ok(SlashCommand::Result { scan_id: parse_id("/result", args.first().copied())? }),
        "/vulns" => parse_vulns(&args),
        "/retry" => Ok(SlashCommand::Retry),
        "/refresh" => Ok(SlashCommand::Refresh),
        "/config" => Ok(SlashCommand::Config),
        "/version" => Ok(SlashCommand::Version),
        "/clear" => Ok(SlashCommand::Clear),
        "/help" => Ok(SlashCommand::Help {
            command: args.first().map(|s| s.trim_start_matches('/').to_string()),
        }),
        "/exit" | "/quit" | "/q" => Ok(SlashCommand::Exit),
        other => Err(format!("Unknown command: {}. Type /help for available commands.", other)),
    }
}

fn parse_id(command: &str, arg: Option<&str>) -> Result<u64, String> {
    let arg = arg.ok_or_else(|| format!("{} needs an id. Type /help {} for usage.", command, command.trim_start_matches('/')))?;
    arg.parse::<u64>().map_err(|_| format!("Invalid id for {}: {}", command, arg))
}

fn flag_value<'a>(args: &[&'a str], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i).copied().ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_add(args: &[&str]) -> Result<SlashCommand, String> {
    let mut name = String::new();
    let mut url = String::new();
    let mut description = String::new();

    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--name" | "-n" => {
                i += 1;
                name = flag_value(args, i, "--name")?.to_string();
            }
            "--url" | "-u" => {
                i += 1;
                url = flag_value(args, i, "--url")?.to_string();
            }
            "--description" | "-d" => {
                i += 1;
                description = flag_value(args, i, "--description")?.to_string();
            }
            other => {
                return Err(format!("Unknown flag for /add: {}", other));
            }
        }
        i += 1;
    }
    Ok(SlashCommand::Add { name, url, description })
}

fn parse_results(args: &[&str]) -> Result<SlashCommand, String> {
    let action = match args.first().copied() {
        None => ResultsAction::Keep,
        Some("all") => ResultsAction::All,
        Some("scan") => ResultsAction::Scan,
        Some(id) => ResultsAction::App(
            id.parse::<u64>()
                .map_err(|_| format!("Expected an application id, 'all' or 'scan', got: {}", id))?,
        ),
    };
    Ok(SlashCommand::Results { action })
}

fn parse_vulns(args: &[&str]) -> Result<SlashCommand, String> {
    let mut filter = VulnerabilityFilter::default();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--severity" => {
                i += 1;
                let raw = flag_value(args, i, "--severity")?;
                filter.severity = Some(raw.parse::<Severity>()?);
            }
            "--scan" => {
                i += 1;
                filter.scan_result = Some(parse_id("--scan", Some(flag_value(args, i, "--scan")?))?);
            }
            "--app" => {
                i += 1;
                filter.web_application = Some(parse_id("--app", Some(flag_value(args, i, "--app")?))?);
            }
            "--type" => {
                i += 1;
                filter.vuln_type = Some(flag_value(args, i, "--type")?.to_string());
            }
            other => {
                return Err(format!("Unknown flag for /vulns: {}", other));
            }
        }
        i += 1;
    }
    Ok(SlashCommand::Vulns { filter })
}
