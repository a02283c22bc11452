//! The composed widget: task list, calendar header, chart body,
//! scrollbars and tooltip.

use egui::{Id, Key, Pos2, Rect, Response, Sense, Ui, Vec2, Widget};

use crate::gantt::{Gantt, GanttKey};
use crate::ui::calendar::{draw_calendar, header_labels};
use crate::ui::gantt_chart::show_gantt_chart;
use crate::ui::scroll::{show_scrollbar, Orientation};
use crate::ui::task_list::{
    list_width, DefaultTaskListHeader, DefaultTaskListTable, TaskListAction, TaskListHeader,
    TaskListHeaderProps, TaskListTable, TaskListTableProps,
};
use crate::ui::text_measure::{EguiTextMeasure, TextMeasure};
use crate::ui::theme;
use crate::ui::tooltip::{show_tooltip, StandardTooltipContent, TooltipContent, TooltipFrame};

/// Screen rectangles of every region, derived from the widget rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regions {
    pub list_header: Option<Rect>,
    pub list_body: Option<Rect>,
    pub calendar: Rect,
    pub body: Rect,
    pub h_scroll: Rect,
    pub v_scroll: Option<Rect>,
}

impl Regions {
    /// Split `rect` for a chart with the given header/body heights. The
    /// list sits left of the chart, or right of it when mirrored.
    pub fn layout(rect: Rect, header_height: f32, body_height: f32, list: f32, v_scroll: bool, rtl: bool) -> Self {
        let bar = theme::SCROLLBAR_SIZE;
        let v_width = if v_scroll { bar } else { 0.0 };
        let chart_width = (rect.width() - list - v_width).max(0.0);
        let (list_left, chart_left) = if rtl {
            (rect.left() + chart_width + v_width, rect.left())
        } else {
            (rect.left(), rect.left() + list)
        };
        let top = rect.top();
        let body_top = top + header_height;

        let (list_header, list_body) = if list > 0.0 {
            (
                Some(Rect::from_min_size(Pos2::new(list_left, top), Vec2::new(list, header_height))),
                Some(Rect::from_min_size(Pos2::new(list_left, body_top), Vec2::new(list, body_height))),
            )
        } else {
            (None, None)
        };

        Self {
            list_header,
            list_body,
            calendar: Rect::from_min_size(Pos2::new(chart_left, top), Vec2::new(chart_width, header_height)),
            body: Rect::from_min_size(Pos2::new(chart_left, body_top), Vec2::new(chart_width, body_height)),
            h_scroll: Rect::from_min_size(
                Pos2::new(chart_left, body_top + body_height),
                Vec2::new(chart_width, bar),
            ),
            v_scroll: v_scroll.then(|| {
                Rect::from_min_size(
                    Pos2::new(chart_left + chart_width, body_top),
                    Vec2::new(bar, body_height),
                )
            }),
        }
    }
}

/// Interactive Gantt chart over a [`Gantt`] controller.
///
/// ```ignore
/// ui.add(GanttWidget::new(&mut self.gantt));
/// ```
pub struct GanttWidget<'a> {
    gantt: &'a mut Gantt,
    header: Option<&'a dyn TaskListHeader>,
    table: Option<&'a dyn TaskListTable>,
    tooltip: Option<&'a dyn TooltipContent>,
    measure: Option<&'a dyn TextMeasure>,
}

impl<'a> GanttWidget<'a> {
    pub fn new(gantt: &'a mut Gantt) -> Self {
        Self {
            gantt,
            header: None,
            table: None,
            tooltip: None,
            measure: None,
        }
    }

    pub fn task_list_header(mut self, header: &'a dyn TaskListHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn task_list_table(mut self, table: &'a dyn TaskListTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn tooltip_content(mut self, content: &'a dyn TooltipContent) -> Self {
        self.tooltip = Some(content);
        self
    }

    /// Label width source. Defaults to the context's fonts; hosts without
    /// loaded fonts can pass [`crate::ui::ApproxTextMeasure`].
    pub fn text_measure(mut self, measure: &'a dyn TextMeasure) -> Self {
        self.measure = Some(measure);
        self
    }
}

impl Widget for GanttWidget<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let GanttWidget {
            gantt,
            header,
            table,
            tooltip,
            measure,
        } = self;
        let id = Id::new(gantt.instance());
        gantt.repaint_on_change(ui.ctx());

        // Settle host answers before anything reads the store this frame.
        gantt.poll();

        let state = gantt.state();
        let config = &state.config;
        let list = config
            .list_cell_width
            .map_or(0.0, |width| list_width(width, config.group_by));
        let body_height = state.body_height();
        let v_scroll = state.max_scroll_y() > 0.0;
        let total = Vec2::new(
            ui.available_width(),
            config.header_height + body_height + theme::SCROLLBAR_SIZE,
        );
        let (rect, response) = ui.allocate_exact_size(total, Sense::hover());
        let regions = Regions::layout(rect, config.header_height, body_height, list, v_scroll, config.rtl);

        gantt.store().set_viewport(regions.body.width());
        let state = gantt.state();
        let config = &state.config;

        if let Some(axis) = &state.derived.axis {
            let labels = header_labels(axis, config.column_width, config.rtl);
            draw_calendar(ui.painter(), regions.calendar, &labels, state.scroll_x, config.font_size);
        }

        let fonts = EguiTextMeasure::new(ui.ctx());
        show_gantt_chart(ui, id, regions.body, gantt, measure.unwrap_or(&fonts));

        if let (Some(header_rect), Some(body_rect), Some(cell)) =
            (regions.list_header, regions.list_body, config.list_cell_width)
        {
            let state = gantt.state();
            let header = header.unwrap_or(&DefaultTaskListHeader);
            header.show(
                ui.painter(),
                header_rect,
                &TaskListHeaderProps {
                    header_height: config.header_height,
                    row_width: cell,
                    font_size: config.font_size,
                    variant: config.group_by,
                },
            );
            let table = table.unwrap_or(&DefaultTaskListTable);
            let action = table.show(
                ui,
                id.with("task-list"),
                body_rect,
                &TaskListTableProps {
                    row_height: config.row_height,
                    row_width: cell,
                    font_size: config.font_size,
                    locale: &config.locale,
                    tasks: &state.derived.visible,
                    resources: &state.derived.resources,
                    variant: config.group_by,
                    selected: state.selected.as_deref(),
                    scroll_y: state.scroll_y,
                },
            );
            match action {
                Some(TaskListAction::Select(task)) => gantt.select(Some(&task)),
                Some(TaskListAction::ToggleExpander(task)) => gantt.toggle_expander(&task),
                None => {}
            }
        }

        let state = gantt.state();
        if let Some(x) = show_scrollbar(
            ui,
            id.with("h-scroll"),
            regions.h_scroll,
            Orientation::Horizontal,
            state.chart_width(),
            regions.body.width(),
            state.scroll_x,
        ) {
            gantt.store().set_scroll_x(x);
        }
        if let Some(v_rect) = regions.v_scroll {
            if let Some(y) = show_scrollbar(
                ui,
                id.with("v-scroll"),
                v_rect,
                Orientation::Vertical,
                state.full_height(),
                body_height,
                state.scroll_y,
            ) {
                gantt.store().set_scroll_y(y);
            }
        }

        if ui.rect_contains_pointer(rect) {
            handle_keyboard(ui, gantt);
            let (delta, shift) = ui.input(|i| (i.smooth_scroll_delta, i.modifiers.shift));
            if delta != Vec2::ZERO {
                gantt.wheel(-delta, shift);
            }
        }

        let state = gantt.state();
        if let Some(bar) = state.tooltip.as_deref().and_then(|id| state.bar(id)) {
            let config = &state.config;
            let frame = TooltipFrame {
                row_height: config.row_height,
                header_height: config.header_height,
                chart_left: regions.body.left() - rect.left(),
                chart_width: regions.body.width(),
                container_height: config.header_height + body_height,
                scroll_x: state.scroll_x,
                scroll_y: state.scroll_y,
                arrow_indent: config.arrow_indent,
                rtl: config.rtl,
            };
            let content = tooltip.unwrap_or(&StandardTooltipContent);
            show_tooltip(ui.ctx(), id, rect.min, bar, &frame, content, config.font_size);
        }

        if gantt.has_pending() || gantt.is_dragging() {
            ui.ctx().request_repaint();
        }
        response
    }
}

fn handle_keyboard(ui: &Ui, gantt: &mut Gantt) {
    let keys = ui.input(|i| {
        [
            (Key::ArrowUp, GanttKey::Up),
            (Key::ArrowDown, GanttKey::Down),
            (Key::ArrowLeft, GanttKey::Left),
            (Key::ArrowRight, GanttKey::Right),
            (Key::Delete, GanttKey::Delete),
            (Key::Backspace, GanttKey::Delete),
        ]
        .into_iter()
        .filter(|(key, _)| i.key_pressed(*key))
        .map(|(_, action)| action)
        .collect::<Vec<_>>()
    });
    for key in keys {
        gantt.key(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn widget_rect() -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(1000.0, 360.0))
    }

    #[test]
    fn list_left_of_chart() {
        let regions = Regions::layout(widget_rect(), 50.0, 300.0, 465.0, false, false);
        assert_eq!(regions.list_header.map(|r| r.left()), Some(10.0));
        assert_eq!(regions.calendar.left(), 475.0);
        assert_eq!(regions.body.width(), 535.0);
        assert_eq!(regions.body.top(), 70.0);
        assert_eq!(regions.h_scroll.top(), 370.0);
        assert_eq!(regions.v_scroll, None);
    }

    #[test]
    fn mirrored_layout_puts_list_on_the_right() {
        let regions = Regions::layout(widget_rect(), 50.0, 300.0, 465.0, true, true);
        assert_eq!(regions.body.left(), 10.0);
        assert_eq!(regions.body.width(), 525.0);
        assert_eq!(regions.v_scroll.map(|r| r.left()), Some(535.0));
        assert_eq!(regions.list_body.map(|r| r.left()), Some(545.0));
    }

    #[test]
    fn hidden_list_gives_the_chart_everything() {
        let regions = Regions::layout(widget_rect(), 50.0, 300.0, 0.0, false, false);
        assert_eq!(regions.list_header, None);
        assert_eq!(regions.body.width(), 1000.0);
    }
}
