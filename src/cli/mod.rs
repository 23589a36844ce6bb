pub mod apps;
pub mod commands;
pub mod dashboard;
pub mod scans;
pub mod vulns;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::api::DashboardApi;
use crate::config::Settings;
use crate::errors::DashboardError;
use crate::repl::progress::RequestIndicator;

pub use commands::{Cli, Commands};

/// What every one-shot command needs.
pub struct CliContext {
    pub api: Arc<dyn DashboardApi>,
    pub settings: Settings,
    /// No spinners or hints; results only.
    pub quiet: bool,
}

impl CliContext {
    pub fn new(api: Arc<dyn DashboardApi>, settings: Settings, quiet: bool) -> Self {
        Self { api, settings, quiet }
    }

    pub fn api(&self) -> &dyn DashboardApi {
        self.api.as_ref()
    }

    /// Await a request, with a spinner unless quiet or writing JSON.
    pub async fn track<F: Future>(&self, message: &str, json: bool, fut: F) -> F::Output {
        if self.quiet || json {
            fut.await
        } else {
            RequestIndicator::track(message, fut).await
        }
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), DashboardError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
