//! Task list beside the chart. Header and table are pluggable; the
//! defaults show Name/From/To columns, or a single Resource column when
//! grouping by resource.

use egui::{Align2, Id, Painter, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use egui_phosphor::regular::{CARET_DOWN, CARET_RIGHT};

use crate::config::GroupBy;
use crate::model::Task;
use crate::ui::calendar::long_date;
use crate::ui::theme;

/// What the header renderer receives.
#[derive(Debug, Clone, Copy)]
pub struct TaskListHeaderProps {
    pub header_height: f32,
    pub row_width: f32,
    pub font_size: f32,
    pub variant: GroupBy,
}

/// What the table renderer receives.
#[derive(Debug, Clone, Copy)]
pub struct TaskListTableProps<'a> {
    pub row_height: f32,
    pub row_width: f32,
    pub font_size: f32,
    pub locale: &'a str,
    pub tasks: &'a [Task],
    pub resources: &'a [String],
    pub variant: GroupBy,
    pub selected: Option<&'a str>,
    pub scroll_y: f32,
}

/// Requests raised from the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListAction {
    Select(String),
    ToggleExpander(String),
}

pub trait TaskListHeader {
    fn show(&self, painter: &Painter, rect: Rect, props: &TaskListHeaderProps);
}

pub trait TaskListTable {
    fn show(&self, ui: &mut Ui, id: Id, rect: Rect, props: &TaskListTableProps<'_>) -> Option<TaskListAction>;
}

/// Columns shown for `variant`.
pub fn column_count(variant: GroupBy) -> usize {
    match variant {
        GroupBy::Task => 3,
        GroupBy::Resource => 1,
    }
}

pub fn list_width(row_width: f32, variant: GroupBy) -> f32 {
    row_width * column_count(variant) as f32
}

/// Expander glyph: ▼ for an expanded project, ▶ for a collapsed one.
pub fn expander_symbol(task: &Task) -> Option<&'static str> {
    match task.hide_children {
        Some(false) => Some(CARET_DOWN),
        Some(true) => Some(CARET_RIGHT),
        None => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTaskListHeader;

impl TaskListHeader for DefaultTaskListHeader {
    fn show(&self, painter: &Painter, rect: Rect, props: &TaskListHeaderProps) {
        let painter = painter.with_clip_rect(rect);
        painter.rect_filled(rect, 0.0, theme::BG_HEADER);
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        let titles: &[&str] = match props.variant {
            GroupBy::Task => &["Name", "From", "To"],
            GroupBy::Resource => &["Resource"],
        };
        for (i, title) in titles.iter().enumerate() {
            let x = rect.left() + i as f32 * props.row_width;
            if i > 0 {
                let top = rect.top() + props.header_height * 0.2;
                painter.line_segment(
                    [Pos2::new(x, top), Pos2::new(x, top + props.header_height * 0.5)],
                    Stroke::new(1.0, theme::BORDER_SUBTLE),
                );
            }
            painter.text(
                Pos2::new(x + theme::CELL_PADDING, rect.center().y),
                Align2::LEFT_CENTER,
                *title,
                theme::font_header(props.font_size),
                theme::TEXT_PRIMARY,
            );
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTaskListTable;

impl DefaultTaskListTable {
    fn row_rect(rect: Rect, row: usize, props: &TaskListTableProps<'_>) -> Rect {
        Rect::from_min_size(
            Pos2::new(rect.left(), rect.top() + row as f32 * props.row_height - props.scroll_y),
            Vec2::new(rect.width(), props.row_height),
        )
    }

    fn paint_row_background(painter: &Painter, row_rect: Rect, row: usize, selected: bool) {
        let fill = if selected {
            theme::BG_SELECTED
        } else if row % 2 == 0 {
            theme::BG_PANEL
        } else {
            theme::BG_DARK
        };
        painter.rect_filled(row_rect, 0.0, fill);
    }

    fn cell_text(painter: &Painter, row_rect: Rect, column: usize, indent: f32, text: &str, props: &TaskListTableProps<'_>) {
        let left = row_rect.left() + column as f32 * props.row_width;
        let cell = Rect::from_min_size(Pos2::new(left, row_rect.top()), Vec2::new(props.row_width, props.row_height));
        painter.with_clip_rect(cell.intersect(painter.clip_rect())).text(
            Pos2::new(left + theme::CELL_PADDING + indent, row_rect.center().y),
            Align2::LEFT_CENTER,
            text,
            theme::font_sub(props.font_size),
            theme::TEXT_PRIMARY,
        );
    }
}

impl TaskListTable for DefaultTaskListTable {
    fn show(&self, ui: &mut Ui, id: Id, rect: Rect, props: &TaskListTableProps<'_>) -> Option<TaskListAction> {
        let painter = ui.painter_at(rect);
        let mut action = None;

        match props.variant {
            GroupBy::Resource => {
                for (row, resource) in props.resources.iter().enumerate() {
                    let row_rect = Self::row_rect(rect, row, props);
                    if !row_rect.intersects(rect) {
                        continue;
                    }
                    Self::paint_row_background(&painter, row_rect, row, false);
                    Self::cell_text(&painter, row_rect, 0, theme::EXPANDER_WIDTH, resource, props);
                }
            }
            GroupBy::Task => {
                for (row, task) in props.tasks.iter().enumerate() {
                    let row_rect = Self::row_rect(rect, row, props);
                    if !row_rect.intersects(rect) {
                        continue;
                    }
                    let selected = props.selected == Some(task.id.as_str());
                    Self::paint_row_background(&painter, row_rect, row, selected);

                    let row_response = ui.interact(
                        row_rect.intersect(rect),
                        id.with(("task-row", &task.id)),
                        Sense::click(),
                    );
                    if row_response.clicked() {
                        action = Some(TaskListAction::Select(task.id.clone()));
                    }

                    if let Some(symbol) = expander_symbol(task) {
                        let expander = Rect::from_min_size(
                            Pos2::new(row_rect.left() + theme::CELL_PADDING, row_rect.top()),
                            Vec2::new(theme::EXPANDER_WIDTH, props.row_height),
                        );
                        let response = ui.interact(
                            expander.intersect(rect),
                            id.with(("expander", &task.id)),
                            Sense::click(),
                        );
                        let color = if response.hovered() { theme::ACCENT } else { theme::TEXT_SECONDARY };
                        painter.text(
                            expander.center(),
                            Align2::CENTER_CENTER,
                            symbol,
                            theme::font_sub(props.font_size),
                            color,
                        );
                        if response.clicked() {
                            action = Some(TaskListAction::ToggleExpander(task.id.clone()));
                        }
                    }

                    Self::cell_text(&painter, row_rect, 0, theme::EXPANDER_WIDTH, &task.name, props);
                    Self::cell_text(&painter, row_rect, 1, 0.0, &long_date(task.start, props.locale), props);
                    Self::cell_text(&painter, row_rect, 2, 0.0, &long_date(task.end, props.locale), props);
                }
            }
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn expander_only_for_projects_with_a_flag() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let open = Task::project("p", "P", day, day);
        let closed = Task::project("q", "Q", day, day).collapsed(true);
        let plain = Task::new("t", "T", day, day);
        assert_eq!(expander_symbol(&open), Some(CARET_DOWN));
        assert_eq!(expander_symbol(&closed), Some(CARET_RIGHT));
        assert_eq!(expander_symbol(&plain), None);
    }

    #[test]
    fn list_width_depends_on_variant() {
        assert_eq!(list_width(155.0, GroupBy::Task), 465.0);
        assert_eq!(list_width(155.0, GroupBy::Resource), 155.0);
    }
}
