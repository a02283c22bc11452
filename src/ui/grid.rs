use chrono::NaiveDateTime;
use egui::{Painter, Pos2, Rect, Stroke, Vec2};

use crate::store::GanttState;
use crate::ui::theme;

/// Row stripes, row and column lines, and the highlighted column for `now`.
/// `origin` is the screen position of chart coordinate (0, 0).
pub fn draw_grid(painter: &Painter, clip: Rect, origin: Pos2, state: &GanttState, now: NaiveDateTime) {
    let Some(axis) = &state.derived.axis else {
        return;
    };
    let config = &state.config;
    let width = axis.width(config.column_width);
    let rows = state.row_count();

    for row in 0..rows {
        let y = origin.y + row as f32 * config.row_height;
        if y > clip.bottom() || y + config.row_height < clip.top() {
            continue;
        }
        let fill = if row % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, config.row_height)),
            0.0,
            fill,
        );
        painter.line_segment(
            [
                Pos2::new(origin.x, y + config.row_height),
                Pos2::new(origin.x + width, y + config.row_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }

    let bottom = origin.y + rows as f32 * config.row_height;
    for column in 0..axis.ticks.len() {
        let x = origin.x + column as f32 * config.column_width;
        if x < clip.left() - config.column_width || x > clip.right() {
            continue;
        }
        painter.line_segment(
            [Pos2::new(x, origin.y), Pos2::new(x, bottom)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }

    if let Some(column) = axis.today_column(now) {
        let x = if config.rtl {
            width - (column + 1) as f32 * config.column_width
        } else {
            column as f32 * config.column_width
        };
        painter.rect_filled(
            Rect::from_min_size(
                Pos2::new(origin.x + x, origin.y),
                Vec2::new(config.column_width, bottom - origin.y),
            ),
            0.0,
            config.palette.today,
        );
    }
}
