use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use gantt_widget::model::ordering::project_span;
use gantt_widget::ui::{self, show_toolbar, GanttWidget, ViewSwitcher};
use gantt_widget::{Commit, CommitSender, Gantt, GanttCallbacks, GanttConfig, Task};

/// What the chart callbacks report back to the app.
#[derive(Debug, Default)]
struct Shared {
    status: String,
    confirm_delete: bool,
    /// Tasks whose dates changed since the last project sync.
    changed: Vec<Task>,
    pending_delete: Option<(Task, CommitSender)>,
}

/// Demo application state.
pub struct DemoApp {
    gantt: Gantt,
    switcher: ViewSwitcher,
    shared: Rc<RefCell<Shared>>,
}

impl DemoApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        ui::install_icon_font(&cc.egui_ctx);

        let shared = Rc::new(RefCell::new(Shared {
            status: "Ready".to_string(),
            confirm_delete: true,
            ..Shared::default()
        }));
        let switcher = ViewSwitcher::default();
        let config = switcher.apply(&GanttConfig::default());
        let now = chrono::Local::now().naive_local();
        let gantt = Gantt::new(sample_tasks(now), config, Self::callbacks(&shared));

        Self {
            gantt,
            switcher,
            shared,
        }
    }

    fn callbacks(shared: &Rc<RefCell<Shared>>) -> GanttCallbacks {
        let on_date = Rc::clone(shared);
        let on_progress = Rc::clone(shared);
        let on_delete = Rc::clone(shared);
        let on_expand = Rc::clone(shared);
        let on_click = Rc::clone(shared);
        let on_double = Rc::clone(shared);
        let on_select = Rc::clone(shared);

        GanttCallbacks::new()
            .on_date_change(move |task, children| {
                tracing::info!(task = %task.id, children = children.len(), "date change");
                let mut s = on_date.borrow_mut();
                s.status = format!("On date change Id: {}", task.id);
                s.changed.push(task.clone());
                Commit::accept()
            })
            .on_progress_change(move |task, _| {
                tracing::info!(task = %task.id, progress = task.progress, "progress change");
                on_progress.borrow_mut().status = format!("On progress change Id: {}", task.id);
                Commit::accept()
            })
            .on_delete(move |task| {
                let mut s = on_delete.borrow_mut();
                if !s.confirm_delete {
                    s.status = format!("Deleted {}", task.name);
                    return Commit::accept();
                }
                let (sender, commit) = Commit::deferred();
                s.pending_delete = Some((task.clone(), sender));
                commit
            })
            .on_expander_click(move |task| {
                on_expand.borrow_mut().status = format!("On expander click Id: {}", task.id);
                Commit::accept()
            })
            .on_click(move |task| {
                on_click.borrow_mut().status = format!("On Click event Id: {}", task.id);
            })
            .on_double_click(move |task| {
                on_double.borrow_mut().status = format!("On Double Click event Id: {}", task.id);
            })
            .on_select(move |task, selected| {
                let verb = if selected { "selected" } else { "unselected" };
                tracing::info!(task = %task.id, verb, "selection");
                on_select.borrow_mut().status = format!("{} has {}", task.name, verb);
            })
    }

    /// Stretch parent projects over their children after accepted moves.
    fn sync_projects(&mut self) {
        let changed = std::mem::take(&mut self.shared.borrow_mut().changed);
        if changed.is_empty() {
            return;
        }
        let mut tasks = self.gantt.state().tasks.clone();
        let mut dirty = false;
        for task in &changed {
            if let Some(project) = &task.project {
                dirty |= stretch_project(&mut tasks, project);
            }
        }
        if dirty {
            self.gantt.set_tasks(tasks);
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let mut shared = self.shared.borrow_mut();
        let Some((task, sender)) = shared.pending_delete.take() else {
            return;
        };
        let mut answer = None;
        egui::Window::new("Delete task")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Are you sure about {} ?", task.name));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(false);
                    }
                });
            });
        match answer {
            Some(true) => {
                sender.accept();
                shared.status = format!("Deleted {}", task.name);
            }
            Some(false) => {
                sender.reject();
                shared.status = format!("Kept {}", task.name);
            }
            None => shared.pending_delete = Some((task, sender)),
        }
    }
}

/// Set `project`'s range to its children's span. Returns true if it moved.
fn stretch_project(tasks: &mut [Task], project: &str) -> bool {
    let Some((start, end)) = project_span(tasks, project) else {
        return false;
    };
    match tasks.iter_mut().find(|t| t.id == project) {
        Some(parent) if parent.start != start || parent.end != end => {
            parent.start = start;
            parent.end = end;
            true
        }
        _ => false,
    }
}

/// A small project plan anchored on the first of the current month.
fn sample_tasks(now: NaiveDateTime) -> Vec<Task> {
    let first = now.date() - Duration::days(i64::from(now.day0()));
    let day = |d: i64| first.and_time(NaiveTime::MIN) + Duration::days(d - 1);

    vec![
        Task::project("ProjectSample", "Some Project", day(1), day(15))
            .with_progress(25.0)
            .with_display_order(1),
        Task::new("Task 0", "Idea", day(1), day(2) + Duration::hours(12) + Duration::minutes(28))
            .with_progress(45.0)
            .in_project("ProjectSample")
            .with_resource("Team 1")
            .with_display_order(2),
        Task::new("Task 1", "Research", day(2), day(4))
            .with_progress(25.0)
            .depends_on("Task 0")
            .in_project("ProjectSample")
            .with_resource("Team 2")
            .with_display_order(3),
        Task::new("Task 2", "Discussion with team", day(4), day(8))
            .with_progress(10.0)
            .depends_on("Task 1")
            .in_project("ProjectSample")
            .with_resource("Team 1")
            .with_display_order(4),
        Task::new("Task 3", "Developing", day(8), day(9))
            .with_progress(2.0)
            .depends_on("Task 2")
            .in_project("ProjectSample")
            .with_resource("Team 2")
            .with_display_order(5),
        Task::new("Task 4", "Review", day(8), day(10))
            .with_progress(70.0)
            .depends_on("Task 2")
            .in_project("ProjectSample")
            .with_resource("Team 1")
            .with_display_order(6),
        Task::milestone("Task 6", "Release", day(15))
            .depends_on("Task 4")
            .in_project("ProjectSample")
            .with_display_order(7),
        Task::new("Task 9", "Party Time", day(18), day(19)).disabled(),
    ]
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if show_toolbar(&mut self.switcher, ui) {
                let config = self.switcher.apply(&self.gantt.state().config);
                self.gantt.set_config(config);
            }
            ui.horizontal(|ui| {
                let mut shared = self.shared.borrow_mut();
                ui.checkbox(&mut shared.confirm_delete, "Confirm Delete");
            });
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.shared.borrow().status)
                            .font(ui::theme::font_menu())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.gantt.state().tasks.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let limited = self.gantt.state().config.gantt_height.is_some();
            ui.heading(format!(
                "Gantt With {} Height",
                if limited { "Limited" } else { "Unlimited" }
            ));
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add(GanttWidget::new(&mut self.gantt));
            });
        });

        self.show_delete_confirmation(ctx);
        self.sync_projects();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn sample_is_anchored_on_the_first_of_the_month() {
        let tasks = sample_tasks(now());
        assert_eq!(tasks.len(), 8);
        assert_eq!(tasks[0].start, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(tasks[1].end, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap().and_hms_opt(12, 28, 0).unwrap());
        assert!(tasks[7].disabled);
        assert!(tasks[6].is_milestone());
    }

    #[test]
    fn moving_a_child_stretches_its_project() {
        let mut tasks = sample_tasks(now());
        let late = tasks[6].end + Duration::days(3);
        tasks[6].start = late;
        tasks[6].end = late;
        assert!(stretch_project(&mut tasks, "ProjectSample"));
        assert_eq!(tasks[0].end, late);
        assert!(!stretch_project(&mut tasks, "ProjectSample"));
    }
}
