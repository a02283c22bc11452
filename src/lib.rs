//! Interactive Gantt chart widget for egui.
//!
//! Hand a list of [`Task`]s and a [`GanttConfig`] to a [`Gantt`]
//! controller, register the callbacks the host cares about, and draw it
//! each frame with [`GanttWidget`]. Drag edits are shown immediately and
//! rolled back when the host rejects them.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod gantt;
pub mod interaction;
pub mod model;
pub mod store;
pub mod ui;

pub use callbacks::{CallbackResult, Commit, CommitSender, GanttCallbacks, UnspecifiedOutcome};
pub use config::{BarPalette, GanttConfig, GroupBy};
pub use error::{CallbackError, DragRejected, GanttError};
pub use gantt::{Gantt, GanttKey};
pub use interaction::{EventAction, GanttEvent};
pub use model::{DateAxis, Task, TaskType, ViewMode};
pub use store::{GanttState, GanttStore};
pub use ui::GanttWidget;
