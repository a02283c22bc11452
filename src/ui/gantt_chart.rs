//! Chart body: grid, dependency arrows, bars and pointer input.

use egui::{Align2, Color32, CursorIcon, Id, Painter, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use crate::gantt::Gantt;
use crate::interaction::{ScreenTransform, ScrollOffset};
use crate::model::{Arrow, BarTask, BarVariant, HitRegion, Permissions};
use crate::store::GanttState;
use crate::ui::grid::draw_grid;
use crate::ui::text_measure::TextMeasure;
use crate::ui::theme;

/// Paint and wire the chart body into `rect`.
pub fn show_gantt_chart(ui: &mut Ui, id: Id, rect: Rect, gantt: &mut Gantt, measure: &dyn TextMeasure) {
    let response = ui.interact(rect, id.with("chart-body"), Sense::click_and_drag());
    let transform = {
        let state = gantt.state();
        ScrollOffset {
            origin: rect.min,
            scroll: Vec2::new(state.scroll_x, state.scroll_y),
        }
    };

    handle_pointer(ui, &response, &transform, gantt);

    let state = gantt.state();
    let painter = ui.painter_at(rect);
    let origin = rect.min - Vec2::new(state.scroll_x, state.scroll_y);
    let now = chrono::Local::now().naive_local();
    draw_grid(&painter, rect, origin, &state, now);
    draw_arrows(&painter, origin, &state.derived.arrows, state.config.palette.arrow);

    let hovered = response
        .hover_pos()
        .and_then(|p| gantt.hit(transform.to_chart(p)));
    let permissions = gantt.permissions();
    for bar in &state.derived.bar_tasks {
        let selected = state.selected.as_deref() == Some(bar.task.id.as_str());
        let is_hovered = hovered.is_some_and(|h| h.index == bar.index);
        draw_bar(&painter, origin, bar, &state, selected, is_hovered || selected, permissions);
        draw_label(&painter, origin, bar, &state, measure);
    }
}

fn handle_pointer(ui: &Ui, response: &egui::Response, transform: &ScrollOffset, gantt: &mut Gantt) {
    if response.drag_started() {
        let press = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = press {
            if let Err(reason) = gantt.pointer_down(transform.to_chart(pos)) {
                tracing::debug!(%reason, "drag not started");
            }
        }
    }
    if gantt.is_dragging() {
        let pos = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|i| i.pointer.latest_pos()));
        match pos.map(|p| transform.to_chart(p)) {
            Some(chart) if response.drag_stopped() => gantt.pointer_up(chart),
            Some(chart) if response.dragged() => gantt.pointer_move(chart),
            None if response.drag_stopped() => gantt.cancel_drag(),
            _ => {}
        }
    }

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            gantt.double_click(transform.to_chart(pos));
        }
    } else if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let chart = transform.to_chart(pos);
            let hit_id = gantt
                .hit(chart)
                .and_then(|h| gantt.state().derived.bar_tasks.get(h.index).map(|b| b.task.id.clone()));
            gantt.select(hit_id.as_deref());
            gantt.click(chart);
        }
    }

    let pointer = response.hover_pos().map(|p| transform.to_chart(p));
    gantt.hover(pointer);
    if let Some(hit) = pointer.and_then(|p| gantt.hit(p)) {
        let icon = match hit.region {
            HitRegion::StartHandle | HitRegion::EndHandle | HitRegion::ProgressHandle => {
                CursorIcon::ResizeHorizontal
            }
            HitRegion::Body if gantt.permissions().dates => CursorIcon::Grab,
            HitRegion::Body => CursorIcon::PointingHand,
        };
        ui.ctx().set_cursor_icon(if gantt.is_dragging() { CursorIcon::Grabbing } else { icon });
    }
}

pub fn draw_arrows(painter: &Painter, origin: Pos2, arrows: &[Arrow], color: Color32) {
    let offset = origin.to_vec2();
    for arrow in arrows {
        let points: Vec<Pos2> = arrow.points.iter().map(|p| *p + offset).collect();
        painter.add(Shape::line(points, Stroke::new(theme::ARROW_STROKE, color)));
        let head: Vec<Pos2> = arrow.head.iter().map(|p| *p + offset).collect();
        painter.add(Shape::convex_polygon(head, color, Stroke::NONE));
    }
}

fn draw_bar(
    painter: &Painter,
    origin: Pos2,
    bar: &BarTask,
    state: &GanttState,
    selected: bool,
    show_handles: bool,
    permissions: Permissions,
) {
    let offset = origin.to_vec2();
    let (background, progress) = bar.styles.colors(selected);
    let rounding = Rounding::same(bar.corner_radius);
    let rtl = state.config.rtl;

    match bar.variant {
        BarVariant::Milestone => {
            let diamond: Vec<Pos2> = bar.diamond().iter().map(|p| *p + offset).collect();
            painter.add(Shape::convex_polygon(diamond, background, Stroke::NONE));
        }
        BarVariant::Project => {
            let (top, left, right) = bar.project_shape();
            painter.rect_filled(bar.rect().translate(offset), rounding, background);
            painter.rect_filled(bar.progress_rect().translate(offset), rounding, progress);
            painter.rect_filled(top.translate(offset), rounding, background);
            for triangle in [left, right] {
                let points: Vec<Pos2> = triangle.iter().map(|p| *p + offset).collect();
                painter.add(Shape::convex_polygon(points, background, Stroke::NONE));
            }
        }
        BarVariant::Bar | BarVariant::Small => {
            painter.rect_filled(bar.rect().translate(offset), rounding, background);
            if bar.progress_width > 0.0 {
                painter.rect_filled(bar.progress_rect().translate(offset), rounding, progress);
            }
            if show_handles {
                if bar.variant == BarVariant::Bar && bar.can_change_dates(permissions) {
                    for handle in [bar.start_handle(), bar.end_handle()] {
                        painter.rect_filled(handle.translate(offset), Rounding::same(1.0), theme::HANDLE_COLOR);
                    }
                }
                if bar.can_change_progress(permissions) {
                    let triangle: Vec<Pos2> = bar.progress_handle(rtl).iter().map(|p| *p + offset).collect();
                    painter.add(Shape::convex_polygon(triangle, theme::HANDLE_COLOR, Stroke::NONE));
                }
            }
        }
    }

    if selected {
        painter.rect_stroke(
            bar.rect().translate(offset).expand(1.5),
            Rounding::same(bar.corner_radius + 1.5),
            Stroke::new(1.5, theme::BORDER_ACCENT),
        );
    }
}

/// Where a bar's label goes: chart x, anchor and colour. Labels that do
/// not fit inside the bar sit beside it.
fn label_layout(bar: &BarTask, state: &GanttState, measure: &dyn TextMeasure) -> (f32, Align2, Color32) {
    let text_width = measure.text_width(&bar.task.name, state.config.font_size);
    let placement = bar.label_position(text_width, state.config.arrow_indent, state.config.rtl);
    if placement.inside {
        (placement.x, Align2::CENTER_CENTER, theme::TEXT_ON_BAR)
    } else {
        (placement.x, Align2::LEFT_CENTER, theme::TEXT_SECONDARY)
    }
}

fn draw_label(painter: &Painter, origin: Pos2, bar: &BarTask, state: &GanttState, measure: &dyn TextMeasure) {
    let (x, anchor, color) = label_layout(bar, state, measure);
    let y = origin.y + bar.y + bar.height / 2.0;
    painter.text(
        Pos2::new(origin.x + x, y),
        anchor,
        &bar.task.name,
        theme::font_bar(state.config.font_size),
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GanttConfig;
    use crate::model::Task;
    use crate::store::GanttStore;
    use crate::ui::text_measure::ApproxTextMeasure;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn approximate_widths_place_labels() {
        let tasks = vec![
            Task::new("wide", "Go", day(1), day(8)),
            Task::new("narrow", "A rather long label", day(8), day(9)),
        ];
        let store = GanttStore::new(tasks, GanttConfig::default());
        let state = store.get();
        let measure = ApproxTextMeasure;

        let wide = state.bar("wide").unwrap();
        let (x, anchor, color) = label_layout(wide, &state, &measure);
        assert_eq!(anchor, Align2::CENTER_CENTER);
        assert_eq!(color, theme::TEXT_ON_BAR);
        assert_eq!(x, wide.x1 + wide.width() / 2.0);

        let narrow = state.bar("narrow").unwrap();
        let (x, anchor, color) = label_layout(narrow, &state, &measure);
        assert_eq!(anchor, Align2::LEFT_CENTER);
        assert_eq!(color, theme::TEXT_SECONDARY);
        assert!(x > narrow.x2);
    }
}
