use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::errors::DashboardError;

/// Why a page failed to load, in user-facing terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    /// Show the manual retry affordance.
    pub retryable: bool,
}

impl Failure {
    pub fn from_error(context: &str, err: &DashboardError) -> Self {
        Self {
            message: format!("{}: {}", context, err),
            retryable: err.classify().retryable,
        }
    }
}

/// Page-level data state. One value replaces the loading/error/data flags
/// so they can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(Failure),
}

/// Proof that a load was started. Only the newest ticket may settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a load ticket must be settled or the page stays in Loading"]
pub struct LoadTicket(u64);

/// `LoadState` plus a generation counter that discards late responses.
#[derive(Debug, Clone)]
pub struct Loader<T> {
    state: LoadState<T>,
    generation: u64,
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self { state: LoadState::Idle, generation: 0 }
    }
}

impl<T> Loader<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            LoadState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    /// Start a load: `* → Loading`.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Manual retry: `Failed → Loading`. `None` in any other state.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        match self.state {
            LoadState::Failed(_) => Some(self.begin()),
            _ => None,
        }
    }

    /// Forget in-flight loads without touching what is displayed. A load
    /// interrupted mid-flight falls back to `Idle`.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        if matches!(self.state, LoadState::Loading) {
            self.state = LoadState::Idle;
        }
    }

    /// Forget in-flight loads and whatever was displayed.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = LoadState::Idle;
    }

    /// Apply a load result. Returns `false` (and changes nothing) when the
    /// ticket is stale.
    pub fn settle(
        &mut self,
        ticket: LoadTicket,
        result: Result<T, DashboardError>,
        context: &str,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, context, "Discarding stale response");
            return false;
        }
        self.state = match result {
            Ok(data) => LoadState::Loaded(data),
            Err(err) => {
                warn!(error = %err, error_type = err.classify().error_type, context, "Load failed");
                LoadState::Failed(Failure::from_error(context, &err))
            }
        };
        true
    }

    /// Like [`settle`](Self::settle), but also hands the error back so a
    /// caller can propagate it.
    pub fn settle_checked(
        &mut self,
        ticket: LoadTicket,
        result: Result<T, DashboardError>,
        context: &str,
    ) -> Result<(), DashboardError> {
        match result {
            Ok(data) => {
                self.settle(ticket, Ok(data), context);
                Ok(())
            }
            Err(err) => {
                if ticket.0 == self.generation {
                    warn!(error = %err, error_type = err.classify().error_type, context, "Load failed");
                    self.state = LoadState::Failed(Failure::from_error(context, &err));
                }
                Err(err)
            }
        }
    }
}

/// Proof that a scan request for one application is in flight.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a scan ticket must be finished or the application stays locked"]
pub struct ScanTicket {
    app_id: u64,
}

impl ScanTicket {
    pub fn app_id(&self) -> u64 {
        self.app_id
    }
}

/// Applications with a scan request in flight. Visual lock only: it stops
/// the same view from double-submitting, nothing more.
#[derive(Debug, Clone, Default)]
pub struct PendingScans {
    ids: BTreeSet<u64>,
}

impl PendingScans {
    /// `None` if a request for `app_id` is already in flight.
    pub fn begin(&mut self, app_id: u64) -> Option<ScanTicket> {
        self.ids.insert(app_id).then_some(ScanTicket { app_id })
    }

    /// Release the lock once the request settled, whatever the outcome.
    pub fn finish(&mut self, ticket: ScanTicket) {
        self.ids.remove(&ticket.app_id);
    }

    pub fn contains(&self, app_id: u64) -> bool {
        self.ids.contains(&app_id)
    }

    /// Drop every lock. Used when in-flight requests are abandoned and
    /// their tickets will never be finished.
    pub fn clear(&mut self) {
        if !self.ids.is_empty() {
            debug!(ids = ?self.ids, "Releasing abandoned scan locks");
        }
        self.ids.clear();
    }
}
