use std::future::Future;
use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Spinner bound to one backend request: it appears when the request starts
/// and is gone as soon as the future settles.
pub struct RequestIndicator {
    bar: ProgressBar,
    started: Instant,
}

impl RequestIndicator {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg} {elapsed:.dim}") {
            bar.set_style(spinner);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar, started: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    pub fn abandon(self) {
        self.bar.abandon_with_message(format!("{}", style("Cancelled").yellow()));
    }

    /// Drive `fut` to completion with the spinner shown.
    pub async fn track<F: Future>(message: &str, fut: F) -> F::Output {
        let indicator = Self::start(message);
        let out = fut.await;
        indicator.finish();
        out
    }

    /// Like [`track`](Self::track), but Ctrl-C drops `fut` and yields `None`.
    pub async fn interruptible<F: Future>(message: &str, fut: F) -> Option<F::Output> {
        let indicator = Self::start(message);
        tokio::select! {
            out = fut => {
                debug!(message, elapsed = %format_elapsed(indicator.elapsed()), "Request settled");
                indicator.finish();
                Some(out)
            }
            _ = ctrl_c_pressed() => {
                indicator.abandon();
                None
            }
        }
    }
}

/// Resolves on Ctrl-C. Once tokio owns SIGINT every blocking wait must
/// select on this, or the key press is swallowed. Never resolves if the
/// handler cannot be installed.
pub async fn ctrl_c_pressed() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!(error = %e, "Ctrl-C handler failed");
        std::future::pending::<()>().await;
    }
}

/// `1m5s` / `12s` / `350ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis() as u64;
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    let secs = ms / 1000;
    let mins = secs / 60;
    if mins > 0 {
        format!("{}m{}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
