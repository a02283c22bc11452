//! Pointer drag state machine.
//!
//! `idle -> dragging(action, original, candidate) -> idle`. Candidates
//! are always derived from the snapshot taken at pointer-down, quantized
//! to whole time steps, so a drag that ends where it started compares
//! equal to the original and produces no commit.

use std::collections::HashSet;

use chrono::Duration;
use egui::{Pos2, Vec2};
use tracing::debug;

use crate::error::DragRejected;
use crate::model::{BarTask, BarVariant, DateAxis, HitRegion, Permissions};

/// What a drag changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAction {
    Move,
    /// Left edge; the end date when mirrored.
    Start,
    /// Right edge; the start date when mirrored.
    End,
    Progress,
}

impl BarAction {
    pub fn from_region(region: HitRegion) -> Self {
        match region {
            HitRegion::StartHandle => BarAction::Start,
            HitRegion::EndHandle => BarAction::End,
            HitRegion::ProgressHandle => BarAction::Progress,
            HitRegion::Body => BarAction::Move,
        }
    }

    pub fn changes_dates(self) -> bool {
        self != BarAction::Progress
    }
}

/// Last thing that happened to a bar, as published in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventAction {
    #[default]
    None,
    Move,
    Start,
    End,
    Progress,
    Select,
    Click,
    DblClick,
    Delete,
}

impl From<BarAction> for EventAction {
    fn from(action: BarAction) -> Self {
        match action {
            BarAction::Move => EventAction::Move,
            BarAction::Start => EventAction::Start,
            BarAction::End => EventAction::End,
            BarAction::Progress => EventAction::Progress,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GanttEvent {
    pub action: EventAction,
    pub changed_task: Option<BarTask>,
    pub original_task: Option<BarTask>,
}

/// Maps screen coordinates into chart coordinates.
pub trait ScreenTransform {
    fn to_chart(&self, screen: Pos2) -> Pos2;
}

/// Chart drawn at `origin` and scrolled by `scroll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOffset {
    pub origin: Pos2,
    pub scroll: Vec2,
}

impl ScreenTransform for ScrollOffset {
    fn to_chart(&self, screen: Pos2) -> Pos2 {
        screen - self.origin.to_vec2() + self.scroll
    }
}

/// Pixels per quantization step. Negative when mirrored.
pub fn x_step(axis: &DateAxis, column_width: f32, time_step: Duration, rtl: bool) -> f32 {
    let interval = axis.first_interval().num_milliseconds().max(1) as f64;
    let step = time_step.num_milliseconds() as f64 * column_width as f64 / interval;
    if rtl {
        -step as f32
    } else {
        step as f32
    }
}

/// Quantization settings for one drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragScale {
    pub x_step: f32,
    pub time_step: Duration,
    pub rtl: bool,
}

impl DragScale {
    fn steps(&self, dx: f32) -> i32 {
        if self.x_step == 0.0 {
            return 0;
        }
        (dx / self.x_step).round() as i32
    }

    fn shift(&self, steps: i32) -> Duration {
        self.time_step * steps
    }
}

pub fn progress_by_x(x: f32, bar: &BarTask, rtl: bool) -> f32 {
    let width = bar.width();
    if width <= 0.0 {
        return bar.task.progress;
    }
    let percent = if rtl {
        ((bar.x2 - x) * 100.0 / width).round()
    } else {
        ((x - bar.x1) * 100.0 / width).round()
    };
    percent.clamp(0.0, 100.0)
}

/// Candidate for `action` with the cursor at chart x `x`, relative to
/// the pointer-down snapshot `original`. Returns whether anything changed.
pub fn apply_drag(
    x: f32,
    action: BarAction,
    original: &BarTask,
    scale: DragScale,
    init_x1_delta: f32,
) -> (bool, BarTask) {
    let mut candidate = original.clone();
    match action {
        BarAction::Progress => {
            let progress = progress_by_x(x, original, scale.rtl);
            candidate.set_progress(progress, scale.rtl);
        }
        BarAction::Move => {
            let steps = scale.steps(x - init_x1_delta - original.x1);
            if steps != 0 {
                let dx = steps as f32 * scale.x_step;
                candidate.x1 += dx;
                candidate.x2 += dx;
                candidate.progress_x += dx;
                candidate.task.start = original.task.start + scale.shift(steps);
                candidate.task.end = original.task.end + scale.shift(steps);
            }
        }
        BarAction::Start => {
            let x = x.min(original.x2 - original.handle_width * 2.0);
            let steps = scale.steps(x - original.x1);
            if steps != 0 {
                candidate.x1 = original.x1 + steps as f32 * scale.x_step;
                if scale.rtl {
                    candidate.task.end = (original.task.end + scale.shift(steps)).max(original.task.start);
                } else {
                    candidate.task.start = (original.task.start + scale.shift(steps)).min(original.task.end);
                }
                candidate.set_progress(original.task.progress, scale.rtl);
            }
        }
        BarAction::End => {
            let x = x.max(original.x1 + original.handle_width * 2.0);
            let steps = scale.steps(x - original.x2);
            if steps != 0 {
                candidate.x2 = original.x2 + steps as f32 * scale.x_step;
                if scale.rtl {
                    candidate.task.start = (original.task.start + scale.shift(steps)).min(original.task.end);
                } else {
                    candidate.task.end = (original.task.end + scale.shift(steps)).max(original.task.start);
                }
                candidate.set_progress(original.task.progress, scale.rtl);
            }
        }
    }
    let changed = !candidate.task.same_schedule(&original.task);
    (changed, candidate)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub action: BarAction,
    pub original: BarTask,
    pub candidate: BarTask,
    pub init_x1_delta: f32,
}

/// A finished drag the host must confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub action: BarAction,
    pub original: BarTask,
    pub candidate: BarTask,
}

/// Drag lifecycle plus the set of tasks whose commit is still outstanding.
#[derive(Debug, Default)]
pub struct Interaction {
    drag: Option<DragState>,
    locked: HashSet<String>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_locked(&self, id: &str) -> bool {
        self.locked.contains(id)
    }

    pub fn lock(&mut self, id: &str) {
        self.locked.insert(id.to_string());
    }

    pub fn unlock(&mut self, id: &str) {
        self.locked.remove(id);
    }

    /// Drop the current drag. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Pointer-down on `bar` at chart x `cursor_x`.
    pub fn begin(
        &mut self,
        bar: &BarTask,
        action: BarAction,
        cursor_x: f32,
        permissions: Permissions,
    ) -> Result<(), DragRejected> {
        if bar.task.disabled {
            return Err(DragRejected::Disabled);
        }
        if self.is_locked(&bar.task.id) {
            return Err(DragRejected::CommitPending);
        }
        let allowed = if action.changes_dates() {
            bar.can_change_dates(permissions)
        } else {
            bar.can_change_progress(permissions)
        };
        if !allowed {
            return Err(if bar.variant == BarVariant::Project {
                DragRejected::UnsupportedAction
            } else {
                DragRejected::NotPermitted
            });
        }
        let supported = match bar.variant {
            BarVariant::Bar => true,
            BarVariant::Small => matches!(action, BarAction::Move | BarAction::Progress),
            BarVariant::Milestone => action == BarAction::Move,
            BarVariant::Project => false,
        };
        if !supported {
            return Err(DragRejected::UnsupportedAction);
        }

        debug!(task = %bar.task.id, ?action, "drag started");
        self.drag = Some(DragState {
            action,
            original: bar.clone(),
            candidate: bar.clone(),
            init_x1_delta: cursor_x - bar.x1,
        });
        Ok(())
    }

    /// Pointer-move. Returns the new candidate only when it differs from
    /// the previous one.
    pub fn pointer_move(&mut self, x: f32, scale: DragScale) -> Option<&BarTask> {
        let drag = self.drag.as_mut()?;
        let (_, candidate) = apply_drag(x, drag.action, &drag.original, scale, drag.init_x1_delta);
        if candidate == drag.candidate {
            return None;
        }
        drag.candidate = candidate;
        Some(&drag.candidate)
    }

    /// Pointer-up. Ends the drag; yields a proposal only when the final
    /// candidate differs from the snapshot.
    pub fn pointer_up(&mut self, x: f32, scale: DragScale) -> Option<Proposal> {
        let drag = self.drag.take()?;
        let (changed, candidate) = apply_drag(x, drag.action, &drag.original, scale, drag.init_x1_delta);
        if !changed {
            debug!(task = %drag.original.task.id, "drag ended without change");
            return None;
        }
        debug!(task = %drag.original.task.id, action = ?drag.action, "drag ended with change");
        Some(Proposal {
            action: drag.action,
            original: drag.original,
            candidate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GanttConfig;
    use crate::model::bar_task::compile;
    use crate::model::Task;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    const ALL: Permissions = Permissions {
        dates: true,
        progress: true,
    };

    fn setup(tasks: Vec<Task>, rtl: bool) -> (Vec<BarTask>, DragScale) {
        let config = GanttConfig {
            rtl,
            time_step: 24 * 60 * 60 * 1000,
            ..GanttConfig::default()
        };
        let axis = DateAxis::for_tasks(&tasks, config.view_mode, 1).unwrap();
        let bars = compile(&tasks, &axis, &config, &[]);
        let scale = DragScale {
            x_step: x_step(&axis, config.column_width, config.time_step(), rtl),
            time_step: config.time_step(),
            rtl,
        };
        (bars, scale)
    }

    fn task_a() -> Task {
        Task::new("a", "A", day(1), day(5)).with_progress(25.0)
    }

    #[test]
    fn move_two_days_forward() {
        let (bars, scale) = setup(vec![task_a()], false);
        let bar = &bars[0];
        let mut interaction = Interaction::new();
        let grab = bar.x1 + 30.0;
        interaction.begin(bar, BarAction::Move, grab, ALL).unwrap();
        assert!(interaction.pointer_move(grab + 120.0, scale).is_some());
        let proposal = interaction.pointer_up(grab + 121.0, scale).unwrap();
        assert_eq!(proposal.candidate.task.start, day(3));
        assert_eq!(proposal.candidate.task.end, day(7));
        assert_eq!(proposal.candidate.task.progress, 25.0);
        assert_eq!(proposal.original.task.start, day(1));
        assert!(!interaction.is_dragging());
    }

    #[test]
    fn move_in_rtl_follows_the_mirror() {
        let (bars, scale) = setup(vec![task_a()], true);
        let bar = &bars[0];
        assert!(scale.x_step < 0.0);
        let (changed, candidate) = apply_drag(bar.x1 - 120.0, BarAction::Move, bar, scale, 0.0);
        assert!(changed);
        assert_eq!(candidate.task.start, day(3));
        assert_eq!(candidate.task.end, day(7));
    }

    #[test]
    fn returning_to_the_start_proposes_nothing() {
        let (bars, scale) = setup(vec![task_a()], false);
        let bar = &bars[0];
        let mut interaction = Interaction::new();
        interaction.begin(bar, BarAction::Move, bar.x1, ALL).unwrap();
        interaction.pointer_move(bar.x1 + 200.0, scale);
        assert_eq!(interaction.pointer_up(bar.x1 + 3.0, scale), None);
    }

    #[test]
    fn unchanged_candidates_are_not_republished() {
        let (bars, scale) = setup(vec![task_a()], false);
        let bar = &bars[0];
        let mut interaction = Interaction::new();
        interaction.begin(bar, BarAction::Move, bar.x1, ALL).unwrap();
        assert!(interaction.pointer_move(bar.x1 + 60.0, scale).is_some());
        assert!(interaction.pointer_move(bar.x1 + 65.0, scale).is_none());
    }

    #[test]
    fn start_handle_clamps_before_the_end() {
        let (bars, scale) = setup(vec![task_a()], false);
        let bar = &bars[0];
        let (_, candidate) = apply_drag(bar.x2 + 500.0, BarAction::Start, bar, scale, 0.0);
        assert!(candidate.task.start <= candidate.task.end);
        assert_eq!(candidate.task.end, day(5));
        let (_, candidate) = apply_drag(bar.x1 - 60.0, BarAction::Start, bar, scale, 0.0);
        assert_eq!(candidate.task.start, day(1) - Duration::days(1));
    }

    #[test]
    fn end_handle_resizes_only_the_end() {
        let (bars, scale) = setup(vec![task_a()], false);
        let bar = &bars[0];
        let (changed, candidate) = apply_drag(bar.x2 + 60.0, BarAction::End, bar, scale, 0.0);
        assert!(changed);
        assert_eq!(candidate.task.start, day(1));
        assert_eq!(candidate.task.end, day(6));
        assert!((candidate.progress_width - candidate.width() * 0.25).abs() < 1e-3);
    }

    #[test]
    fn rtl_left_handle_moves_the_end() {
        let (bars, scale) = setup(vec![task_a()], true);
        let bar = &bars[0];
        let (changed, candidate) = apply_drag(bar.x1 - 120.0, BarAction::Start, bar, scale, 0.0);
        assert!(changed);
        assert_eq!(candidate.task.start, day(1));
        assert_eq!(candidate.task.end, day(7));
        assert_eq!(candidate.x1, bar.x1 - 120.0);

        let (_, candidate) = apply_drag(bar.x2 + 500.0, BarAction::Start, bar, scale, 0.0);
        assert_eq!(candidate.task.start, day(1));
        assert_eq!(candidate.task.end, day(1));
    }

    #[test]
    fn rtl_right_handle_moves_the_start() {
        let (bars, scale) = setup(vec![task_a()], true);
        let bar = &bars[0];
        let (changed, candidate) = apply_drag(bar.x2 + 60.0, BarAction::End, bar, scale, 0.0);
        assert!(changed);
        assert_eq!(candidate.task.start, day(1) - Duration::days(1));
        assert_eq!(candidate.task.end, day(5));

        let (_, candidate) = apply_drag(bar.x1 - 500.0, BarAction::End, bar, scale, 0.0);
        assert_eq!(candidate.task.start, day(5));
        assert_eq!(candidate.task.end, day(5));
    }

    #[test]
    fn progress_clamps_and_mirrors() {
        let (bars, _) = setup(vec![task_a()], false);
        let bar = &bars[0];
        assert_eq!(progress_by_x(bar.x1 + bar.width() / 2.0, bar, false), 50.0);
        assert_eq!(progress_by_x(bar.x2 + 40.0, bar, false), 100.0);
        assert_eq!(progress_by_x(bar.x1 - 40.0, bar, false), 0.0);
        assert_eq!(progress_by_x(bar.x1 + bar.width() / 4.0, bar, true), 75.0);
    }

    #[test]
    fn disabled_and_locked_tasks_refuse_drags() {
        let (bars, _) = setup(vec![task_a().disabled()], false);
        let mut interaction = Interaction::new();
        assert_eq!(
            interaction.begin(&bars[0], BarAction::Move, 0.0, ALL),
            Err(DragRejected::Disabled)
        );

        let (bars, _) = setup(vec![task_a()], false);
        interaction.lock("a");
        assert_eq!(
            interaction.begin(&bars[0], BarAction::Move, 0.0, ALL),
            Err(DragRejected::CommitPending)
        );
    }

    #[test]
    fn milestones_only_move_and_projects_never_drag() {
        let tasks = vec![
            Task::project("p", "P", day(1), day(5)),
            Task::milestone("m", "M", day(4)),
        ];
        let (bars, _) = setup(tasks, false);
        let mut interaction = Interaction::new();
        assert_eq!(
            interaction.begin(&bars[0], BarAction::Move, 0.0, ALL),
            Err(DragRejected::UnsupportedAction)
        );
        assert_eq!(
            interaction.begin(&bars[1], BarAction::Start, 0.0, ALL),
            Err(DragRejected::UnsupportedAction)
        );
        assert!(interaction.begin(&bars[1], BarAction::Move, bars[1].x1, ALL).is_ok());
    }

    #[test]
    fn missing_handler_means_not_permitted() {
        let (bars, _) = setup(vec![task_a()], false);
        let mut interaction = Interaction::new();
        let progress_only = Permissions {
            dates: false,
            progress: true,
        };
        assert_eq!(
            interaction.begin(&bars[0], BarAction::Move, 0.0, progress_only),
            Err(DragRejected::NotPermitted)
        );
        assert!(interaction.begin(&bars[0], BarAction::Progress, 0.0, progress_only).is_ok());
    }

    #[test]
    fn screen_offset_adds_scroll() {
        let transform = ScrollOffset {
            origin: Pos2::new(100.0, 50.0),
            scroll: Vec2::new(30.0, 0.0),
        };
        assert_eq!(transform.to_chart(Pos2::new(150.0, 70.0)), Pos2::new(80.0, 20.0));
    }
}
