//! Host callbacks and the commit protocol.
//!
//! Every callback is optional. A missing date or progress handler also
//! turns the matching drag handles off.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::error::CallbackError;
use crate::model::Task;

/// Verdict of a commit callback. `Ok(None)` means the host returned
/// nothing explicit; see [`UnspecifiedOutcome`].
pub type CallbackResult = Result<Option<bool>, CallbackError>;

/// How `Ok(None)` is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnspecifiedOutcome {
    #[default]
    Accept,
    Reject,
}

impl UnspecifiedOutcome {
    pub fn resolve(self, result: &CallbackResult) -> bool {
        match result {
            Ok(Some(verdict)) => *verdict,
            Ok(None) => self == UnspecifiedOutcome::Accept,
            Err(_) => false,
        }
    }
}

/// Answer of a commit callback: known now, or delivered later through a
/// channel while the UI keeps running.
#[derive(Debug)]
pub enum Commit {
    Ready(CallbackResult),
    Pending(Receiver<CallbackResult>),
}

impl Commit {
    pub fn accept() -> Self {
        Commit::Ready(Ok(Some(true)))
    }

    pub fn reject() -> Self {
        Commit::Ready(Ok(Some(false)))
    }

    /// The host returned nothing explicit.
    pub fn unspecified() -> Self {
        Commit::Ready(Ok(None))
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Commit::Ready(Err(CallbackError::new(message)))
    }

    /// A commit answered later through the returned [`CommitSender`].
    pub fn deferred() -> (CommitSender, Self) {
        let (tx, rx) = mpsc::channel();
        (CommitSender(tx), Commit::Pending(rx))
    }

    /// Non-blocking check. `None` while still pending; a dropped sender
    /// counts as a failure.
    pub fn try_resolve(&self) -> Option<CallbackResult> {
        match self {
            Commit::Ready(result) => Some(result.clone()),
            Commit::Pending(rx) => match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(CallbackError::new(
                    "commit sender dropped without an answer",
                ))),
            },
        }
    }
}

impl From<bool> for Commit {
    fn from(verdict: bool) -> Self {
        Commit::Ready(Ok(Some(verdict)))
    }
}

impl From<CallbackResult> for Commit {
    fn from(result: CallbackResult) -> Self {
        Commit::Ready(result)
    }
}

/// Sending half of a deferred commit. May be moved to another thread.
#[derive(Debug, Clone)]
pub struct CommitSender(Sender<CallbackResult>);

impl CommitSender {
    pub fn send(&self, result: CallbackResult) {
        // The chart may already be gone; nothing is waiting then.
        let _ = self.0.send(result);
    }

    pub fn accept(&self) {
        self.send(Ok(Some(true)));
    }

    pub fn reject(&self) {
        self.send(Ok(Some(false)));
    }
}

type ChangeHandler = Box<dyn FnMut(&Task, &[Task]) -> Commit>;
type TaskHandler = Box<dyn FnMut(&Task) -> Commit>;
type NotifyHandler = Box<dyn FnMut(&Task)>;
type SelectHandler = Box<dyn FnMut(&Task, bool)>;

/// The host's collaborators, all optional.
#[derive(Default)]
pub struct GanttCallbacks {
    pub(crate) date_change: Option<ChangeHandler>,
    pub(crate) progress_change: Option<ChangeHandler>,
    pub(crate) delete: Option<TaskHandler>,
    pub(crate) expander_click: Option<TaskHandler>,
    pub(crate) click: Option<NotifyHandler>,
    pub(crate) double_click: Option<NotifyHandler>,
    pub(crate) select: Option<SelectHandler>,
}

impl GanttCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the moved task and its descendants after a date drag.
    pub fn on_date_change(mut self, f: impl FnMut(&Task, &[Task]) -> Commit + 'static) -> Self {
        self.date_change = Some(Box::new(f));
        self
    }

    pub fn on_progress_change(mut self, f: impl FnMut(&Task, &[Task]) -> Commit + 'static) -> Self {
        self.progress_change = Some(Box::new(f));
        self
    }

    /// Removal happens only on an explicit `true`.
    pub fn on_delete(mut self, f: impl FnMut(&Task) -> Commit + 'static) -> Self {
        self.delete = Some(Box::new(f));
        self
    }

    /// Receives the project with `hide_children` already flipped.
    pub fn on_expander_click(mut self, f: impl FnMut(&Task) -> Commit + 'static) -> Self {
        self.expander_click = Some(Box::new(f));
        self
    }

    pub fn on_click(mut self, f: impl FnMut(&Task) + 'static) -> Self {
        self.click = Some(Box::new(f));
        self
    }

    pub fn on_double_click(mut self, f: impl FnMut(&Task) + 'static) -> Self {
        self.double_click = Some(Box::new(f));
        self
    }

    pub fn on_select(mut self, f: impl FnMut(&Task, bool) + 'static) -> Self {
        self.select = Some(Box::new(f));
        self
    }

    pub fn permissions(&self) -> crate::model::Permissions {
        crate::model::Permissions {
            dates: self.date_change.is_some(),
            progress: self.progress_change.is_some(),
        }
    }
}

impl std::fmt::Debug for GanttCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GanttCallbacks")
            .field("date_change", &self.date_change.is_some())
            .field("progress_change", &self.progress_change.is_some())
            .field("delete", &self.delete.is_some())
            .field("expander_click", &self.expander_click.is_some())
            .field("click", &self.click.is_some())
            .field("double_click", &self.double_click.is_some())
            .field("select", &self.select.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_follows_configuration() {
        let silent: CallbackResult = Ok(None);
        assert!(UnspecifiedOutcome::Accept.resolve(&silent));
        assert!(!UnspecifiedOutcome::Reject.resolve(&silent));
        assert!(!UnspecifiedOutcome::Accept.resolve(&Err(CallbackError::new("boom"))));
        assert!(UnspecifiedOutcome::Reject.resolve(&Ok(Some(true))));
    }

    #[test]
    fn deferred_commit_resolves_once_sent() {
        let (tx, commit) = Commit::deferred();
        assert!(commit.try_resolve().is_none());
        tx.reject();
        assert_eq!(commit.try_resolve(), Some(Ok(Some(false))));
    }

    #[test]
    fn dropped_sender_is_a_failure() {
        let (tx, commit) = Commit::deferred();
        drop(tx);
        assert!(matches!(commit.try_resolve(), Some(Err(_))));
    }

    #[test]
    fn permissions_track_registered_handlers() {
        let callbacks = GanttCallbacks::new().on_progress_change(|_, _| Commit::accept());
        let permissions = callbacks.permissions();
        assert!(!permissions.dates);
        assert!(permissions.progress);
    }
}
