//! Pixel geometry for every visible task.
//!
//! [`compile`] turns the ordered task list and the date axis into
//! [`BarTask`]s: the single projection that rendering, hit-testing and the
//! drag state machine all read. Every x formula has a right-to-left form
//! computed on true pixel coordinates, so hit-testing works unchanged when
//! the chart is mirrored.

use egui::{Color32, Pos2, Rect, Vec2};

use super::task::{Task, TaskType};
use super::timeline::DateAxis;
use crate::config::{BarPalette, GanttConfig, GroupBy};

/// Side of the corner triangles on a project bar.
const PROJECT_TRIANGLE: f32 = 15.0;
/// Half width of the progress handle base.
const PROGRESS_HANDLE_HALF: f32 = 5.0;
const PROGRESS_HANDLE_HEIGHT: f32 = 8.66;

/// How a bar is drawn and which handles it offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarVariant {
    /// Full bar with both date handles and a progress handle.
    Bar,
    /// Too narrow for date handles: widened to two handle widths, progress only.
    Small,
    Project,
    Milestone,
}

/// Normal and selected colours of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyles {
    pub background: Color32,
    pub background_selected: Color32,
    pub progress: Color32,
    pub progress_selected: Color32,
}

impl BarStyles {
    fn resolve(task: &Task, palette: &BarPalette) -> Self {
        let base = match task.kind {
            TaskType::Task => BarStyles {
                background: palette.bar_background,
                background_selected: palette.bar_background_selected,
                progress: palette.bar_progress,
                progress_selected: palette.bar_progress_selected,
            },
            TaskType::Project => BarStyles {
                background: palette.project_background,
                background_selected: palette.project_background_selected,
                progress: palette.project_progress,
                progress_selected: palette.project_progress_selected,
            },
            TaskType::Milestone => BarStyles {
                background: palette.milestone_background,
                background_selected: palette.milestone_background_selected,
                progress: Color32::TRANSPARENT,
                progress_selected: Color32::TRANSPARENT,
            },
        };
        match &task.styles {
            Some(custom) => BarStyles {
                background: custom.background.unwrap_or(base.background),
                background_selected: custom.background_selected.unwrap_or(base.background_selected),
                progress: custom.progress.unwrap_or(base.progress),
                progress_selected: custom.progress_selected.unwrap_or(base.progress_selected),
            },
            None => base,
        }
    }

    /// `(background, progress)` for the given selection state.
    pub fn colors(&self, selected: bool) -> (Color32, Color32) {
        if selected {
            (self.background_selected, self.progress_selected)
        } else {
            (self.background, self.progress)
        }
    }
}

/// A dependant of a bar: the bar at `index` lists this one as predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChild {
    pub index: usize,
    pub id: String,
}

/// A task with resolved pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTask {
    pub task: Task,
    /// Position in the ordered bar sequence.
    pub index: usize,
    /// Row the bar is drawn on (differs from `index` when grouping by resource).
    pub row: usize,
    pub variant: BarVariant,
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub height: f32,
    pub handle_width: f32,
    pub progress_x: f32,
    pub progress_width: f32,
    pub corner_radius: f32,
    pub styles: BarStyles,
    pub bar_children: Vec<BarChild>,
}

/// Which kinds of change the host accepts at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub dates: bool,
    pub progress: bool,
}

/// Part of a bar under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    StartHandle,
    EndHandle,
    ProgressHandle,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub index: usize,
    pub region: HitRegion,
}

/// Where a task name goes relative to its bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub x: f32,
    pub inside: bool,
}

/// Progress bar `(width, x)` for a bar spanning `x1..x2`.
pub fn progress_with_by_params(x1: f32, x2: f32, progress: f32, rtl: bool) -> (f32, f32) {
    let width = (x2 - x1) * progress * 0.01;
    let x = if rtl { x2 - width } else { x1 };
    (width, x)
}

/// Compile geometry for `tasks`, which must already be in display order.
/// `resources` is only consulted when grouping by resource.
pub fn compile(tasks: &[Task], axis: &DateAxis, config: &GanttConfig, resources: &[String]) -> Vec<BarTask> {
    let mut bars: Vec<BarTask> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let row = match config.group_by {
                GroupBy::Task => index,
                GroupBy::Resource => {
                    let resource = task.resource.as_deref().unwrap_or("");
                    resources.iter().position(|r| r == resource).unwrap_or(0)
                }
            };
            compile_task(task, index, row, axis, config)
        })
        .collect();

    for (index, task) in tasks.iter().enumerate() {
        for dependency in &task.dependencies {
            if let Some(parent) = bars.iter().position(|b| &b.task.id == dependency) {
                bars[parent].bar_children.push(BarChild {
                    index,
                    id: task.id.clone(),
                });
            }
        }
    }
    bars
}

pub(crate) fn compile_task(task: &Task, index: usize, row: usize, axis: &DateAxis, config: &GanttConfig) -> BarTask {
    let column_width = config.column_width;
    let task_height = config.task_height();
    let rtl = config.rtl;
    let y = task_y(row, config.row_height, task_height);

    let mut bar = BarTask {
        task: task.clone(),
        index,
        row,
        variant: BarVariant::Bar,
        x1: 0.0,
        x2: 0.0,
        y,
        height: task_height,
        handle_width: config.handle_width,
        progress_x: 0.0,
        progress_width: 0.0,
        corner_radius: config.bar_corner_radius,
        styles: BarStyles::resolve(task, &config.palette),
        bar_children: Vec::new(),
    };

    if task.kind == TaskType::Milestone {
        let x = axis.x_for(task.start, column_width, rtl);
        bar.variant = BarVariant::Milestone;
        bar.x1 = x - task_height * 0.5;
        bar.x2 = x + task_height * 0.5;
        bar.height = task_height / std::f32::consts::SQRT_2;
        return bar;
    }

    let (mut x1, mut x2) = if rtl {
        (
            axis.x_for(task.end, column_width, true),
            axis.x_for(task.start, column_width, true),
        )
    } else {
        (
            axis.x_for(task.start, column_width, false),
            axis.x_for(task.end, column_width, false),
        )
    };

    bar.variant = match task.kind {
        TaskType::Project => BarVariant::Project,
        _ if x2 - x1 < config.handle_width * 2.0 => {
            if rtl {
                x1 = x2 - config.handle_width * 2.0;
            } else {
                x2 = x1 + config.handle_width * 2.0;
            }
            BarVariant::Small
        }
        _ => BarVariant::Bar,
    };
    bar.x1 = x1;
    bar.x2 = x2;
    bar.set_progress(task.progress, rtl);
    bar
}

fn task_y(row: usize, row_height: f32, task_height: f32) -> f32 {
    row as f32 * row_height + (row_height - task_height) / 2.0
}

impl BarTask {
    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Update progress and its marker geometry together.
    pub fn set_progress(&mut self, progress: f32, rtl: bool) {
        self.task.progress = progress;
        let (width, x) = progress_with_by_params(self.x1, self.x2, progress, rtl);
        self.progress_width = width;
        self.progress_x = x;
    }

    pub fn rect(&self) -> Rect {
        match self.variant {
            BarVariant::Milestone => Rect::from_center_size(
                Pos2::new((self.x1 + self.x2) * 0.5, self.y + self.width() * 0.5),
                Vec2::splat(self.width()),
            ),
            _ => Rect::from_min_max(Pos2::new(self.x1, self.y), Pos2::new(self.x2, self.y + self.height)),
        }
    }

    pub fn progress_rect(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.progress_x, self.y),
            Vec2::new(self.progress_width, self.height),
        )
    }

    /// Corners of the milestone diamond: top, right, bottom, left.
    pub fn diamond(&self) -> [Pos2; 4] {
        let c = self.rect().center();
        let r = self.width() * 0.5;
        [
            Pos2::new(c.x, c.y - r),
            Pos2::new(c.x + r, c.y),
            Pos2::new(c.x, c.y + r),
            Pos2::new(c.x - r, c.y),
        ]
    }

    /// Left date handle (drags the start, or the end when mirrored).
    pub fn start_handle(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x1 + 1.0, self.y + 1.0),
            Vec2::new(self.handle_width, self.height - 2.0),
        )
    }

    /// Right date handle.
    pub fn end_handle(&self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x2 - self.handle_width - 1.0, self.y + 1.0),
            Vec2::new(self.handle_width, self.height - 2.0),
        )
    }

    /// Triangle sitting on the bottom edge at the moving end of the progress fill.
    pub fn progress_handle(&self, rtl: bool) -> [Pos2; 3] {
        let x = match self.variant {
            BarVariant::Small => self.x1 + self.progress_width,
            _ if rtl => self.progress_x,
            _ => self.progress_x + self.progress_width,
        };
        let bottom = self.y + self.height;
        [
            Pos2::new(x - PROGRESS_HANDLE_HALF, bottom),
            Pos2::new(x + PROGRESS_HANDLE_HALF, bottom),
            Pos2::new(x, bottom - PROGRESS_HANDLE_HEIGHT),
        ]
    }

    /// Top band and corner triangles of a project bracket.
    pub fn project_shape(&self) -> (Rect, [Pos2; 3], [Pos2; 3]) {
        let mid = self.y + self.height / 2.0 - 1.0;
        let bottom = self.y + self.height;
        let top = Rect::from_min_size(
            Pos2::new(self.x1, self.y),
            Vec2::new(self.width(), self.height / 2.0),
        );
        let left = [
            Pos2::new(self.x1, mid),
            Pos2::new(self.x1, bottom),
            Pos2::new(self.x1 + PROJECT_TRIANGLE, mid),
        ];
        let right = [
            Pos2::new(self.x2, mid),
            Pos2::new(self.x2, bottom),
            Pos2::new(self.x2 - PROJECT_TRIANGLE, mid),
        ];
        (top, left, right)
    }

    pub fn can_change_dates(&self, permissions: Permissions) -> bool {
        permissions.dates && !self.task.disabled && self.variant != BarVariant::Project
    }

    pub fn can_change_progress(&self, permissions: Permissions) -> bool {
        permissions.progress
            && !self.task.disabled
            && matches!(self.variant, BarVariant::Bar | BarVariant::Small)
    }

    /// Label inside the bar when it fits, otherwise beside it, clear of
    /// any outgoing dependency arrow.
    pub fn label_position(&self, text_width: f32, arrow_indent: f32, rtl: bool) -> LabelPlacement {
        let width = self.width();
        if text_width < width {
            return LabelPlacement {
                x: self.x1 + width * 0.5,
                inside: true,
            };
        }
        let arrow_gap = if self.bar_children.is_empty() { 0.0 } else { arrow_indent };
        let x = if rtl {
            self.x1 - text_width - arrow_gap - arrow_indent * 0.2
        } else {
            self.x1 + width + arrow_gap + arrow_indent * 0.2
        };
        LabelPlacement { x, inside: false }
    }

    /// Region of this bar under `pos`, honouring what may be dragged.
    pub fn hit(&self, pos: Pos2, permissions: Permissions, rtl: bool) -> Option<HitRegion> {
        if !self.rect().contains(pos) && !self.progress_hit_rect(rtl).contains(pos) {
            return None;
        }
        if self.variant == BarVariant::Bar && self.can_change_dates(permissions) {
            if self.start_handle().contains(pos) {
                return Some(HitRegion::StartHandle);
            }
            if self.end_handle().contains(pos) {
                return Some(HitRegion::EndHandle);
            }
        }
        if self.can_change_progress(permissions) && self.progress_hit_rect(rtl).contains(pos) {
            return Some(HitRegion::ProgressHandle);
        }
        self.rect().contains(pos).then_some(HitRegion::Body)
    }

    fn progress_hit_rect(&self, rtl: bool) -> Rect {
        match self.variant {
            BarVariant::Bar | BarVariant::Small => {
                Rect::from_points(&self.progress_handle(rtl)).expand(1.0)
            }
            _ => Rect::NOTHING,
        }
    }
}

/// Topmost bar region under `pos`. Later bars are drawn over earlier ones.
pub fn hit_test(bars: &[BarTask], pos: Pos2, permissions: Permissions, rtl: bool) -> Option<Hit> {
    bars.iter().rev().find_map(|bar| {
        bar.hit(pos, permissions, rtl).map(|region| Hit {
            index: bar.index,
            region,
        })
    })
}
