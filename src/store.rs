//! View-state store.
//!
//! [`Store`] is a small observable cell: state lives behind an `Rc`, a
//! setter that hands back the same `Rc` is a no-op, and listeners receive
//! `(next, previous)` so each region can compare only what it draws.
//! [`GanttStore`] owns the chart state and keeps the derived layout in
//! step with the raw task list.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::{GanttConfig, GroupBy};
use crate::interaction::GanttEvent;
use crate::model::arrow::{layout_arrows, Arrow};
use crate::model::bar_task::compile;
use crate::model::ordering::{tasks_to_resources, validate, visible_tasks};
use crate::model::{BarTask, DateAxis, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Rc<dyn Fn(&T, &T)>;

pub struct Store<T> {
    state: RefCell<Rc<T>>,
    listeners: RefCell<Vec<(ListenerId, Listener<T>)>>,
    next_id: Cell<u64>,
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            state: RefCell::new(Rc::new(initial)),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> Rc<T> {
        self.state.borrow().clone()
    }

    /// Replace the state with whatever `f` returns. Listeners run
    /// synchronously in subscription order unless `f` returned the same
    /// `Rc`. A listener may call `set` again; the nested call notifies
    /// everyone with the newer state and the outer round stops there.
    pub fn set(&self, f: impl FnOnce(&Rc<T>) -> Rc<T>) {
        let prev = self.get();
        let next = f(&prev);
        if Rc::ptr_eq(&prev, &next) {
            return;
        }
        *self.state.borrow_mut() = next.clone();

        let listeners: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&next, &prev);
            if !Rc::ptr_eq(&self.state.borrow(), &next) {
                break;
            }
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T, &T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(other, _)| *other != id);
        listeners.len() != before
    }
}

impl<T: Clone + PartialEq> Store<T> {
    /// Edit a copy of the state; unchanged copies notify nobody.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.set(|prev| {
            let mut next = T::clone(prev);
            f(&mut next);
            if next == **prev {
                prev.clone()
            } else {
                Rc::new(next)
            }
        });
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Layout computed from the raw tasks and the configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub visible: Vec<Task>,
    pub resources: Vec<String>,
    /// `None` when there is nothing to lay out.
    pub axis: Option<DateAxis>,
    pub bar_tasks: Vec<BarTask>,
    pub arrows: Vec<Arrow>,
}

impl Derived {
    pub fn compute(tasks: &[Task], config: &GanttConfig) -> Self {
        for problem in validate(tasks) {
            warn!(%problem, "task set problem");
        }
        let visible = visible_tasks(tasks);
        let resources = match config.group_by {
            GroupBy::Resource => tasks_to_resources(&visible),
            GroupBy::Task => Vec::new(),
        };
        let axis = match DateAxis::for_tasks(&visible, config.view_mode, config.pre_steps) {
            Ok(axis) => Some(axis),
            Err(e) => {
                warn!(error = %e, "no date axis, chart left empty");
                None
            }
        };
        let bar_tasks = axis
            .as_ref()
            .map(|axis| compile(&visible, axis, config, &resources))
            .unwrap_or_default();
        let arrows = Self::route(&bar_tasks, config);
        debug!(
            visible = visible.len(),
            bars = bar_tasks.len(),
            arrows = arrows.len(),
            "layout recomputed"
        );
        Self {
            visible,
            resources,
            axis,
            bar_tasks,
            arrows,
        }
    }

    fn route(bars: &[BarTask], config: &GanttConfig) -> Vec<Arrow> {
        layout_arrows(
            bars,
            config.row_height,
            config.task_height(),
            config.arrow_indent,
            config.rtl,
        )
    }
}

/// Everything the render regions read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GanttState {
    /// Confirmed tasks as supplied by the host.
    pub tasks: Vec<Task>,
    pub config: GanttConfig,
    pub derived: Derived,
    pub scroll_x: f32,
    pub scroll_y: f32,
    /// Visible chart width, used for horizontal scroll bounds.
    pub viewport_width: f32,
    pub selected: Option<String>,
    pub tooltip: Option<String>,
    pub event: GanttEvent,
}

impl GanttState {
    pub fn row_count(&self) -> usize {
        match self.config.group_by {
            GroupBy::Task => self.derived.visible.len(),
            GroupBy::Resource => self.derived.resources.len(),
        }
    }

    pub fn full_height(&self) -> f32 {
        self.row_count() as f32 * self.config.row_height
    }

    /// Height of the scrolling body: the cap when set, else every row.
    pub fn body_height(&self) -> f32 {
        let full = self.full_height();
        self.config.gantt_height.map_or(full, |cap| cap.min(full))
    }

    pub fn chart_width(&self) -> f32 {
        self.derived
            .axis
            .as_ref()
            .map_or(0.0, |axis| axis.width(self.config.column_width))
    }

    pub fn max_scroll_x(&self) -> f32 {
        (self.chart_width() - self.viewport_width).max(0.0)
    }

    pub fn max_scroll_y(&self) -> f32 {
        match self.config.gantt_height {
            Some(cap) => (self.full_height() - cap).max(0.0),
            None => 0.0,
        }
    }

    pub fn bar(&self, id: &str) -> Option<&BarTask> {
        self.derived.bar_tasks.iter().find(|b| b.task.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks depending on `bar`, in row order.
    pub fn dependants(&self, bar: &BarTask) -> Vec<Task> {
        bar.bar_children
            .iter()
            .filter_map(|child| self.derived.bar_tasks.get(child.index))
            .map(|b| b.task.clone())
            .collect()
    }

    fn relayout(&mut self) {
        self.derived = Derived::compute(&self.tasks, &self.config);
        if let Some(id) = &self.selected {
            if !self.derived.visible.iter().any(|t| &t.id == id) {
                self.selected = None;
            }
        }
        if let Some(id) = &self.tooltip {
            if !self.derived.visible.iter().any(|t| &t.id == id) {
                self.tooltip = None;
            }
        }
        self.scroll_x = self.scroll_x.clamp(0.0, self.max_scroll_x());
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll_y());
    }
}

/// The chart's single shared store. Each setter writes only its own field
/// (plus the derived layout where that field feeds it).
#[derive(Debug)]
pub struct GanttStore {
    store: Store<GanttState>,
}

impl GanttStore {
    pub fn new(tasks: Vec<Task>, config: GanttConfig) -> Self {
        let mut state = GanttState {
            tasks,
            config,
            ..GanttState::default()
        };
        state.relayout();
        Self {
            store: Store::new(state),
        }
    }

    pub fn get(&self) -> Rc<GanttState> {
        self.store.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&GanttState, &GanttState) + 'static) -> ListenerId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        self.store.update(|state| {
            state.tasks = tasks;
            state.relayout();
        });
    }

    pub fn set_config(&self, config: GanttConfig) {
        self.store.update(|state| {
            let view_changed = state.config.view_mode != config.view_mode
                || state.config.column_width != config.column_width
                || state.config.rtl != config.rtl;
            state.config = config;
            state.relayout();
            if view_changed {
                state.scroll_x = initial_scroll_x(state);
            }
        });
    }

    /// Set the selection, returning the previous one.
    pub fn select(&self, id: Option<&str>) -> Option<String> {
        let prev = self.get().selected.clone();
        self.store.update(|state| state.selected = id.map(str::to_string));
        prev
    }

    pub fn set_tooltip(&self, id: Option<&str>) {
        self.store.update(|state| state.tooltip = id.map(str::to_string));
    }

    pub fn set_scroll_x(&self, x: f32) {
        self.store.update(|state| state.scroll_x = x.clamp(0.0, state.max_scroll_x()));
    }

    pub fn set_scroll_y(&self, y: f32) {
        self.store.update(|state| state.scroll_y = y.clamp(0.0, state.max_scroll_y()));
    }

    /// Record the visible chart width. The first non-zero width also
    /// applies the configured `view_date`.
    pub fn set_viewport(&self, width: f32) {
        self.store.update(|state| {
            let first = state.viewport_width == 0.0 && width > 0.0;
            state.viewport_width = width.max(0.0);
            state.scroll_x = if first {
                initial_scroll_x(state)
            } else {
                state.scroll_x.clamp(0.0, state.max_scroll_x())
            };
        });
    }

    pub fn set_event(&self, event: GanttEvent) {
        self.store.update(|state| state.event = event);
    }

    /// Show a drag candidate in place of its confirmed bar.
    pub fn apply_candidate(&self, candidate: &BarTask) {
        self.store.update(|state| {
            let Some(slot) = state
                .derived
                .bar_tasks
                .iter_mut()
                .find(|b| b.task.id == candidate.task.id)
            else {
                return;
            };
            *slot = BarTask {
                bar_children: slot.bar_children.clone(),
                ..candidate.clone()
            };
            state.derived.arrows = Derived::route(&state.derived.bar_tasks, &state.config);
        });
    }

    /// Write a confirmed task back into the raw list.
    pub fn commit_task(&self, task: Task) {
        debug!(task = %task.id, "change committed");
        self.store.update(|state| {
            if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task;
            }
            state.relayout();
        });
    }

    pub fn remove_task(&self, id: &str) {
        self.store.update(|state| {
            state.tasks.retain(|t| t.id != id);
            state.relayout();
        });
    }

    /// Drop any unconfirmed geometry and show the raw tasks again.
    pub fn revert(&self) {
        self.store.update(GanttState::relayout);
    }
}

fn initial_scroll_x(state: &GanttState) -> f32 {
    let (Some(axis), Some(view_date)) = (&state.derived.axis, state.config.view_date) else {
        return state.scroll_x.clamp(0.0, state.max_scroll_x());
    };
    axis.scroll_to(view_date, state.config.column_width, state.config.rtl)
        .unwrap_or(0.0)
        .clamp(0.0, state.max_scroll_x())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewMode;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::project("p", "Project", day(1), day(10)),
            Task::new("a", "A", day(1), day(5)).in_project("p"),
            Task::new("b", "B", day(5), day(10)).in_project("p").depends_on("a"),
        ]
    }

    #[test]
    fn listeners_see_next_and_previous_in_order() {
        let store = Store::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = seen.clone();
        store.subscribe(move |next, prev| first.borrow_mut().push(("first", *next, *prev)));
        let second = seen.clone();
        store.subscribe(move |next, prev| second.borrow_mut().push(("second", *next, *prev)));
        store.set(|_| Rc::new(2));
        assert_eq!(*seen.borrow(), vec![("first", 2, 1), ("second", 2, 1)]);
    }

    #[test]
    fn returning_the_same_rc_notifies_nobody() {
        let store = Store::new(String::from("x"));
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        store.subscribe(move |_, _| counter.set(counter.get() + 1));
        store.set(|prev| prev.clone());
        store.update(|_| {});
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unsubscribed_listeners_stop_firing() {
        let store = Store::new(0);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let id = store.subscribe(move |_, _| counter.set(counter.get() + 1));
        store.set(|_| Rc::new(1));
        assert!(store.unsubscribe(id));
        store.set(|_| Rc::new(2));
        assert_eq!(calls.get(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn listeners_may_set_again() {
        let store = Rc::new(Store::new(0));
        let inner = Rc::downgrade(&store);
        store.subscribe(move |next, _| {
            if *next == 1 {
                if let Some(store) = inner.upgrade() {
                    store.set(|_| Rc::new(2));
                }
            }
        });
        store.set(|_| Rc::new(1));
        assert_eq!(*store.get(), 2);
    }

    #[test]
    fn nested_set_ends_the_stale_round() {
        let store = Rc::new(Store::new(0));
        let inner = Rc::downgrade(&store);
        store.subscribe(move |next, _| {
            if *next == 1 {
                if let Some(store) = inner.upgrade() {
                    store.set(|_| Rc::new(2));
                }
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let second = seen.clone();
        store.subscribe(move |next, prev| second.borrow_mut().push((*next, *prev)));
        store.set(|_| Rc::new(1));
        assert_eq!(*store.get(), 2);
        assert_eq!(*seen.borrow(), vec![(2, 1)]);
    }

    #[test]
    fn derived_layout_tracks_tasks() {
        let store = GanttStore::new(tasks(), GanttConfig::default());
        let state = store.get();
        assert_eq!(state.derived.bar_tasks.len(), 3);
        assert_eq!(state.derived.arrows.len(), 1);
        assert_eq!(state.full_height(), 150.0);

        let mut collapsed = tasks();
        collapsed[0].hide_children = Some(true);
        store.set_tasks(collapsed);
        assert_eq!(store.get().derived.bar_tasks.len(), 1);
        assert!(store.get().derived.arrows.is_empty());
    }

    #[test]
    fn empty_task_set_lays_out_nothing() {
        let store = GanttStore::new(Vec::new(), GanttConfig::default());
        let state = store.get();
        assert!(state.derived.axis.is_none());
        assert!(state.derived.bar_tasks.is_empty());
        assert_eq!(state.chart_width(), 0.0);
    }

    #[test]
    fn scroll_is_clamped() {
        let config = GanttConfig {
            gantt_height: Some(100.0),
            ..GanttConfig::default()
        };
        let store = GanttStore::new(tasks(), config);
        store.set_viewport(200.0);
        let chart = store.get().chart_width();
        store.set_scroll_x(10_000.0);
        assert_eq!(store.get().scroll_x, chart - 200.0);
        store.set_scroll_x(-5.0);
        assert_eq!(store.get().scroll_x, 0.0);
        store.set_scroll_y(10_000.0);
        assert_eq!(store.get().scroll_y, 50.0);
    }

    #[test]
    fn without_height_cap_there_is_no_vertical_scroll() {
        let store = GanttStore::new(tasks(), GanttConfig::default());
        store.set_scroll_y(40.0);
        assert_eq!(store.get().scroll_y, 0.0);
    }

    #[test]
    fn view_date_sets_the_initial_scroll() {
        let config = GanttConfig {
            view_date: Some(day(4)),
            ..GanttConfig::default()
        };
        let store = GanttStore::new(tasks(), config);
        store.set_viewport(120.0);
        // Axis starts at Jan 31; Feb 4 is column 4.
        assert_eq!(store.get().scroll_x, 240.0);
    }

    #[test]
    fn revert_restores_confirmed_geometry() {
        let store = GanttStore::new(tasks(), GanttConfig::default());
        let original = store.get().derived.bar_tasks[1].clone();
        let mut moved = original.clone();
        moved.x1 += 120.0;
        moved.x2 += 120.0;
        moved.task.start = day(3);
        store.apply_candidate(&moved);
        assert_eq!(store.get().derived.bar_tasks[1].x1, original.x1 + 120.0);
        assert_eq!(store.get().tasks[1].start, day(1));
        store.revert();
        assert_eq!(store.get().derived.bar_tasks[1], original);
    }

    #[test]
    fn config_change_relays_out() {
        let store = GanttStore::new(tasks(), GanttConfig::default());
        let day_width = store.get().chart_width();
        store.set_config(GanttConfig {
            view_mode: ViewMode::Week,
            ..GanttConfig::default()
        });
        assert!(store.get().chart_width() < day_width);
    }

    #[test]
    fn selection_returns_previous_and_drops_hidden_tasks() {
        let store = GanttStore::new(tasks(), GanttConfig::default());
        assert_eq!(store.select(Some("a")), None);
        assert_eq!(store.select(Some("b")), Some("a".to_string()));
        let mut collapsed = tasks();
        collapsed[0].hide_children = Some(true);
        store.set_tasks(collapsed);
        assert_eq!(store.get().selected, None);
    }
}
