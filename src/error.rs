use thiserror::Error;

/// Problems found in the task set or configuration handed to the chart.
///
/// None of these are fatal: the store logs them and lays out whatever is
/// still drawable.
#[derive(Debug, Error)]
pub enum GanttError {
    #[error("task set is empty, the date axis is undefined")]
    EmptyTaskSet,

    #[error("date axis runs past the representable calendar range")]
    AxisOverflow,

    #[error("task '{id}' starts after it ends")]
    InvalidRange { id: String },

    #[error("task '{id}' references unknown parent project '{parent}'")]
    UnknownParent { id: String, parent: String },

    #[error("task '{id}' depends on unknown task '{dependency}'")]
    UnknownDependency { id: String, dependency: String },

    #[error("duplicate task id '{id}'")]
    DuplicateId { id: String },

    #[error("invalid chart configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Why a pointer-down did not start a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DragRejected {
    #[error("task is disabled")]
    Disabled,

    #[error("a commit for this task is still outstanding")]
    CommitPending,

    #[error("no handler accepts this kind of change")]
    NotPermitted,

    #[error("this bar variant does not support the action")]
    UnsupportedAction,

    #[error("no task at that row")]
    NoSuchTask,
}

/// A failure raised by a host callback while confirming a change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
