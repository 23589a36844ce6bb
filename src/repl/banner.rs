use console::{style, Term};
use tui_banner::{Align, Banner, ColorMode, Fill, Gradient, GradientDirection, Palette};

pub const ACCENT: u8 = 39; // deep sky blue
const ACCENT_DIM: u8 = 24;
const DIM: u8 = 240;

const TAGLINE: &str = "Web Application Security Audit Dashboard";

/// Print the startup splash: FIGlet title, version, backend and a short
/// command guide.
pub fn show_splash(backend: &str) {
    let term = Term::stdout();
    let _ = term.clear_screen();

    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");

    let (_, term_cols) = term.size();
    let term_w = term_cols as usize;

    let center = |text_w: usize| -> String {
        if term_w > text_w + 4 {
            " ".repeat((term_w - text_w) / 2)
        } else {
            "  ".to_string()
        }
    };

    let palette = Palette::from_hex(&["#AFD7FF", "#00AFFF", "#005F87"]);
    let gradient = Gradient::new(palette.colors().to_vec(), GradientDirection::Horizontal);

    let banner_text = match Banner::new("AUDITDECK") {
        Ok(b) => b
            .gradient(gradient)
            .fill(Fill::Keep)
            .align(Align::Center)
            .trim_vertical(true)
            .edge_shade(0.35, '\u{2591}')
            .color_mode(ColorMode::TrueColor)
            .width(term_w)
            .render(),
        Err(_) => format!("{}{}\n", center(9), style("AUDITDECK").color256(ACCENT).bold()),
    };

    println!();
    print!("{}", banner_text);

    let version_str = format!("v{} ({})", version, git_hash);
    println!("{}{}", center(version_str.len()), style(version_str).color256(DIM));

    let scene_w = term_w.clamp(40, 76);
    let rule = style("\u{2500}".repeat(scene_w)).color256(ACCENT_DIM);
    let pad = center(scene_w);
    println!("{}{}", pad, rule);
    println!("{}{}", center(TAGLINE.len()), style(TAGLINE).white().bold());
    println!("{}{}", pad, rule);
    println!();

    let backend_line = format!("Backend: {}", backend);
    println!("{}{}", center(backend_line.chars().count()), style(backend_line).dim());
    println!();

    let guide: &[(&str, &str)] = &[
        ("/dashboard", "Overview of applications, scans and findings"),
        ("/apps", "Web applications and scan triggers"),
        ("/results [<app-id>]", "Scan results"),
        ("/vulns", "All vulnerabilities"),
        ("/help", "List all commands"),
    ];
    let p = center(56);
    println!("{}  {}", p, style("Quick Start:").white().bold());
    for (cmd, desc) in guide {
        println!("{}    {:<22} {}", p, style(cmd).color256(ACCENT), style(desc).dim());
    }
    println!();
}
