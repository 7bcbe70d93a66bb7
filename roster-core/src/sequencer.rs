//! Mutation sequencer
//!
//! Wraps every gateway-backed operation so the view layer can show busy
//! indicators and the most recent error. Busy flags are held by RAII guards,
//! so they clear on success, failure, panic and when the awaiting future is
//! dropped.

use std::future::Future;
use tokio::sync::watch;

use crate::collection::LoadOutcome;
use crate::error::{RosterError, RosterResult};

/// Snapshot of in-flight work
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStatus {
    list_loads: usize,
    actions: usize,
    pub last_error: Option<String>,
}

impl ActivityStatus {
    pub fn is_list_loading(&self) -> bool {
        self.list_loads > 0
    }

    pub fn is_action_in_flight(&self) -> bool {
        self.actions > 0
    }

    pub fn is_idle(&self) -> bool {
        self.list_loads == 0 && self.actions == 0
    }
}

#[derive(Debug, Clone, Copy)]
enum Activity {
    ListLoad,
    Action,
}

struct BusyGuard<'a> {
    status: &'a watch::Sender<ActivityStatus>,
    activity: Activity,
}

impl<'a> BusyGuard<'a> {
    fn enter(status: &'a watch::Sender<ActivityStatus>, activity: Activity) -> Self {
        status.send_modify(|status| match activity {
            Activity::ListLoad => status.list_loads += 1,
            Activity::Action => status.actions += 1,
        });
        Self { status, activity }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let activity = self.activity;
        self.status.send_modify(|status| match activity {
            Activity::ListLoad => {
                status.list_loads = status.list_loads.saturating_sub(1)
            }
            Activity::Action => status.actions = status.actions.saturating_sub(1),
        });
    }
}

#[derive(Debug)]
pub struct MutationSequencer {
    status: watch::Sender<ActivityStatus>,
}

impl Default for MutationSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationSequencer {
    pub fn new() -> Self {
        let (status, _) = watch::channel(ActivityStatus::default());
        Self { status }
    }

    /// Run a mutation (create, update, remove, single load) with the action
    /// flag raised. Success clears the last error, failure replaces it.
    pub async fn track_action<T, F>(&self, operation: F) -> RosterResult<T>
    where
        F: Future<Output = RosterResult<T>>,
    {
        let _busy = BusyGuard::enter(&self.status, Activity::Action);
        let result = operation.await;
        self.settle(&result);
        result
    }

    /// Fold an outcome into `last_error`: success clears it, failure
    /// replaces it. Cancelled results leave it alone.
    pub fn settle<T>(&self, result: &RosterResult<T>) {
        match result {
            Ok(_) => self.clear_error(),
            Err(err) if err.is_cancelled() => {}
            Err(err) => self.record_error(err),
        }
    }

    /// Run a page load with the list flag raised. Superseded loads leave
    /// the last error alone.
    pub async fn track_list_load<F>(&self, operation: F) -> RosterResult<LoadOutcome>
    where
        F: Future<Output = RosterResult<LoadOutcome>>,
    {
        let _busy = BusyGuard::enter(&self.status, Activity::ListLoad);
        let result = operation.await;
        match &result {
            Ok(LoadOutcome::Applied) => self.clear_error(),
            Ok(LoadOutcome::Superseded) => {}
            Err(err) if err.is_cancelled() => {}
            Err(err) => self.record_error(err),
        }
        result
    }

    pub fn is_list_loading(&self) -> bool {
        self.status.borrow().is_list_loading()
    }

    pub fn is_action_in_flight(&self) -> bool {
        self.status.borrow().is_action_in_flight()
    }

    pub fn last_error(&self) -> Option<String> {
        self.status.borrow().last_error.clone()
    }

    pub fn status(&self) -> ActivityStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActivityStatus> {
        self.status.subscribe()
    }

    pub fn record_error(&self, err: &RosterError) {
        let message = err.user_message();
        tracing::debug!("[Sequencer] Recording error: {}", message);
        self.status
            .send_modify(|status| status.last_error = Some(message));
    }

    pub fn clear_error(&self) {
        self.status.send_if_modified(|status| status.last_error.take().is_some());
    }
}
