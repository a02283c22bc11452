//! The chart controller.
//!
//! [`Gantt`] owns the store, the drag state machine and the host
//! callbacks. Render regions feed it pointer and keyboard input in chart
//! coordinates; it mutates the store and reconciles host commits.
//! Changes are applied optimistically and rolled back when the host
//! rejects them.

use std::rc::Rc;

use egui::{Pos2, Vec2};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::callbacks::{CallbackResult, Commit, GanttCallbacks, UnspecifiedOutcome};
use crate::config::GanttConfig;
use crate::error::DragRejected;
use crate::interaction::{x_step, BarAction, DragScale, EventAction, GanttEvent, Interaction};
use crate::model::bar_task::{compile_task, hit_test};
use crate::model::{Hit, Permissions, Task};
use crate::store::{GanttState, GanttStore, ListenerId};

/// Keyboard input the chart reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GanttKey {
    Up,
    Down,
    Left,
    Right,
    Delete,
}

#[derive(Debug)]
enum PendingKind {
    Change { original: Task, candidate: Task },
    Delete { task: Task },
    Expand { toggled: Task },
}

impl PendingKind {
    fn task_id(&self) -> &str {
        match self {
            PendingKind::Change { candidate, .. } => &candidate.id,
            PendingKind::Delete { task } => &task.id,
            PendingKind::Expand { toggled } => &toggled.id,
        }
    }
}

#[derive(Debug)]
struct PendingCommit {
    kind: PendingKind,
    commit: Commit,
}

pub struct Gantt {
    instance: Uuid,
    store: GanttStore,
    interaction: Interaction,
    callbacks: GanttCallbacks,
    pending: Vec<PendingCommit>,
    repaint: Option<ListenerId>,
}

impl Gantt {
    pub fn new(tasks: Vec<Task>, config: GanttConfig, callbacks: GanttCallbacks) -> Self {
        Self {
            instance: Uuid::new_v4(),
            store: GanttStore::new(tasks, config),
            interaction: Interaction::new(),
            callbacks,
            pending: Vec::new(),
            repaint: None,
        }
    }

    /// Unique per chart; namespaces the widget's egui ids.
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn store(&self) -> &GanttStore {
        &self.store
    }

    pub fn state(&self) -> Rc<GanttState> {
        self.store.get()
    }

    pub fn permissions(&self) -> Permissions {
        self.callbacks.permissions()
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Ask `ctx` for a repaint whenever the store changes. Subscribes once.
    pub fn repaint_on_change(&mut self, ctx: &egui::Context) {
        if self.repaint.is_some() {
            return;
        }
        let ctx = ctx.clone();
        self.repaint = Some(self.store.subscribe(move |_, _| ctx.request_repaint()));
    }

    /// Replace the host's task list. In-flight drags are abandoned;
    /// outstanding commits survive as long as their task does.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        let before = self.state();
        self.interaction.cancel();
        let interaction = &mut self.interaction;
        self.pending.retain(|pending| {
            let id = pending.kind.task_id();
            let keep = tasks.iter().any(|t| t.id == id);
            if !keep {
                debug!(task = %id, "dropping commit for removed task");
                interaction.unlock(id);
            }
            keep
        });
        self.store.set_tasks(tasks);
        self.reapply_pending();
        self.report_dropped_selection(&before);
    }

    pub fn set_config(&mut self, config: GanttConfig) {
        let before = self.state();
        self.store.set_config(config);
        self.reapply_pending();
        self.report_dropped_selection(&before);
    }

    /// Abandon the current drag, e.g. when the pointer left the window
    /// before release.
    pub fn cancel_drag(&mut self) {
        if self.interaction.cancel() {
            self.store.set_event(GanttEvent::default());
            self.store.revert();
            self.reapply_pending();
        }
    }

    /// Tell the host about a selection a relayout dropped (hidden by a
    /// collapse, or deleted).
    fn report_dropped_selection(&mut self, before: &GanttState) {
        let Some(prev) = before.selected.as_deref() else {
            return;
        };
        if self.state().selected.as_deref() == Some(prev) {
            return;
        }
        if let (Some(handler), Some(task)) = (self.callbacks.select.as_mut(), before.task(prev)) {
            handler(task, false);
        }
    }

    pub fn hit(&self, pos: Pos2) -> Option<Hit> {
        let state = self.state();
        hit_test(&state.derived.bar_tasks, pos, self.permissions(), state.config.rtl)
    }

    fn scale(&self) -> Option<DragScale> {
        let state = self.state();
        let axis = state.derived.axis.as_ref()?;
        let time_step = state.config.time_step();
        Some(DragScale {
            x_step: x_step(axis, state.config.column_width, time_step, state.config.rtl),
            time_step,
            rtl: state.config.rtl,
        })
    }

    /// Pointer pressed at chart position `pos`. Focuses the bar under the
    /// pointer and starts a drag when the region allows one.
    pub fn pointer_down(&mut self, pos: Pos2) -> Result<BarAction, DragRejected> {
        let hit = self.hit(pos).ok_or(DragRejected::NoSuchTask)?;
        let state = self.state();
        let bar = state
            .derived
            .bar_tasks
            .get(hit.index)
            .ok_or(DragRejected::NoSuchTask)?;
        self.select(Some(&bar.task.id));

        let action = BarAction::from_region(hit.region);
        let permissions = self.permissions();
        self.interaction.begin(bar, action, pos.x, permissions)?;
        self.store.set_event(GanttEvent {
            action: action.into(),
            changed_task: Some(bar.clone()),
            original_task: Some(bar.clone()),
        });
        Ok(action)
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        let Some(scale) = self.scale() else { return };
        let Some(candidate) = self.interaction.pointer_move(pos.x, scale).cloned() else {
            return;
        };
        self.store.apply_candidate(&candidate);
        if let Some(drag) = self.interaction.drag() {
            self.store.set_event(GanttEvent {
                action: drag.action.into(),
                changed_task: Some(candidate),
                original_task: Some(drag.original.clone()),
            });
        }
    }

    /// Pointer released. A changed drag is shown optimistically and handed
    /// to the matching commit callback.
    pub fn pointer_up(&mut self, pos: Pos2) {
        let Some(scale) = self.scale() else { return };
        let proposal = self.interaction.pointer_up(pos.x, scale);
        self.store.set_event(GanttEvent::default());
        let Some(proposal) = proposal else {
            // Snap any intermediate candidate back to the confirmed bar.
            self.store.revert();
            self.reapply_pending();
            return;
        };

        let state = self.state();
        let children = state.dependants(&proposal.candidate);
        let candidate = proposal.candidate.task.clone();
        let handler = if proposal.action.changes_dates() {
            self.callbacks.date_change.as_mut()
        } else {
            self.callbacks.progress_change.as_mut()
        };
        let Some(handler) = handler else {
            self.store.revert();
            return;
        };
        debug!(task = %candidate.id, action = ?proposal.action, "dispatching commit");
        let commit = handler(&candidate, &children);

        self.store.apply_candidate(&proposal.candidate);
        self.interaction.lock(&candidate.id);
        self.pending.push(PendingCommit {
            kind: PendingKind::Change {
                original: proposal.original.task,
                candidate,
            },
            commit,
        });
        self.poll();
    }

    /// Click on a bar: fires `on_click`.
    pub fn click(&mut self, pos: Pos2) {
        let Some(task) = self.task_at(pos) else { return };
        self.store.set_event(GanttEvent {
            action: EventAction::Click,
            ..GanttEvent::default()
        });
        if let Some(handler) = self.callbacks.click.as_mut() {
            handler(&task);
        }
    }

    pub fn double_click(&mut self, pos: Pos2) {
        let Some(task) = self.task_at(pos) else { return };
        self.store.set_event(GanttEvent {
            action: EventAction::DblClick,
            ..GanttEvent::default()
        });
        if let Some(handler) = self.callbacks.double_click.as_mut() {
            handler(&task);
        }
    }

    fn task_at(&self, pos: Pos2) -> Option<Task> {
        let hit = self.hit(pos)?;
        self.state()
            .derived
            .bar_tasks
            .get(hit.index)
            .map(|bar| bar.task.clone())
    }

    /// Change the selection. The previous task is reported deselected
    /// before the new one is reported selected.
    pub fn select(&mut self, id: Option<&str>) {
        let prev = self.store.select(id);
        if prev.as_deref() == id {
            return;
        }
        let state = self.state();
        self.store.set_event(GanttEvent {
            action: EventAction::Select,
            changed_task: id.and_then(|i| state.bar(i)).cloned(),
            original_task: None,
        });
        let Some(handler) = self.callbacks.select.as_mut() else {
            return;
        };
        if let Some(task) = prev.as_deref().and_then(|p| state.task(p)) {
            handler(task, false);
        }
        if let Some(task) = id.and_then(|i| state.task(i)) {
            handler(task, true);
        }
    }

    /// Tooltip follows the hovered bar, or the dragged bar while dragging.
    pub fn hover(&mut self, pos: Option<Pos2>) {
        let id = match self.interaction.drag() {
            Some(drag) => Some(drag.original.task.id.clone()),
            None => pos.and_then(|p| self.task_at(p)).map(|t| t.id),
        };
        self.store.set_tooltip(id.as_deref());
    }

    /// Ask the host to delete the selected task.
    pub fn delete_selected(&mut self) {
        let state = self.state();
        let Some(task) = state.selected.as_deref().and_then(|id| state.task(id)).cloned() else {
            return;
        };
        if task.disabled || self.interaction.is_locked(&task.id) {
            return;
        }
        let Some(handler) = self.callbacks.delete.as_mut() else {
            return;
        };
        debug!(task = %task.id, "dispatching delete");
        let commit = handler(&task);
        self.store.set_event(GanttEvent {
            action: EventAction::Delete,
            ..GanttEvent::default()
        });
        self.interaction.lock(&task.id);
        self.pending.push(PendingCommit {
            kind: PendingKind::Delete { task },
            commit,
        });
        self.poll();
    }

    /// Expand or collapse a project. Without a handler the toggle applies
    /// immediately.
    pub fn toggle_expander(&mut self, id: &str) {
        let state = self.state();
        let Some(task) = state.task(id).filter(|t| t.is_project()) else {
            return;
        };
        let mut toggled = task.clone();
        toggled.hide_children = Some(!task.is_collapsed());
        match self.callbacks.expander_click.as_mut() {
            Some(handler) => {
                let commit = handler(&toggled);
                self.pending.push(PendingCommit {
                    kind: PendingKind::Expand { toggled },
                    commit,
                });
                self.poll();
            }
            None => {
                let before = self.state();
                self.store.commit_task(toggled);
                self.reapply_pending();
                self.report_dropped_selection(&before);
            }
        }
    }

    pub fn key(&mut self, key: GanttKey) {
        let state = self.state();
        let row = state.config.row_height;
        let column = state.config.column_width;
        match key {
            GanttKey::Up => self.store.set_scroll_y(state.scroll_y - row),
            GanttKey::Down => self.store.set_scroll_y(state.scroll_y + row),
            GanttKey::Left => self.store.set_scroll_x(state.scroll_x - column),
            GanttKey::Right => self.store.set_scroll_x(state.scroll_x + column),
            GanttKey::Delete => self.delete_selected(),
        }
    }

    /// Wheel input, positive values scrolling further into the chart.
    /// Horizontal deltas or a held shift scroll sideways; vertical wheel
    /// only scrolls when the chart height is capped.
    pub fn wheel(&mut self, delta: Vec2, shift: bool) {
        let state = self.state();
        if shift {
            self.store.set_scroll_x(state.scroll_x + delta.y + delta.x);
            return;
        }
        if delta.x != 0.0 {
            self.store.set_scroll_x(state.scroll_x + delta.x);
        }
        if delta.y != 0.0 && state.config.gantt_height.is_some() {
            self.store.set_scroll_y(state.scroll_y + delta.y);
        }
    }

    /// Resolve whatever host commits have answered. Call once per frame;
    /// returns how many settled.
    pub fn poll(&mut self) -> usize {
        let before = self.state();
        let outcome = before.config.unspecified_outcome;
        let mut settled = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            match self.pending[index].commit.try_resolve() {
                Some(result) => settled.push((self.pending.remove(index).kind, result)),
                None => index += 1,
            }
        }
        let count = settled.len();
        for (kind, result) in settled {
            self.settle(kind, result, outcome);
        }
        if count > 0 {
            self.reapply_pending();
            self.report_dropped_selection(&before);
        }
        count
    }

    fn settle(&mut self, kind: PendingKind, result: CallbackResult, outcome: UnspecifiedOutcome) {
        let accepted = outcome.resolve(&result);
        if let Err(e) = &result {
            warn!(error = %e, "commit callback failed");
        }
        match kind {
            PendingKind::Change { original, candidate } => {
                self.interaction.unlock(&candidate.id);
                if accepted {
                    self.store.commit_task(candidate);
                } else {
                    warn!(task = %original.id, "change rejected, restoring");
                    self.store.revert();
                }
            }
            PendingKind::Delete { task } => {
                self.interaction.unlock(&task.id);
                if matches!(result, Ok(Some(true))) {
                    debug!(task = %task.id, "task deleted");
                    self.store.remove_task(&task.id);
                }
            }
            PendingKind::Expand { toggled } => {
                if accepted {
                    self.store.commit_task(toggled);
                }
            }
        }
    }

    /// Relayout drops optimistic geometry; put outstanding candidates back.
    fn reapply_pending(&self) {
        let state = self.state();
        let Some(axis) = state.derived.axis.as_ref() else {
            return;
        };
        for pending in &self.pending {
            let PendingKind::Change { candidate, .. } = &pending.kind else {
                continue;
            };
            if let Some(bar) = state.bar(&candidate.id) {
                let shown = compile_task(candidate, bar.index, bar.row, axis, &state.config);
                self.store.apply_candidate(&shown);
            }
        }
    }
}

impl std::fmt::Debug for Gantt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gantt")
            .field("instance", &self.instance)
            .field("interaction", &self.interaction)
            .field("callbacks", &self.callbacks)
            .field("pending", &self.pending.len())
            .finish()
    }
}
