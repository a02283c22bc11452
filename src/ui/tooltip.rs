//! Hover tooltip: placement plus a pluggable content renderer.

use egui::{Area, Frame, Id, Margin, Order, Pos2, RichText, Rounding, Stroke, Ui, Vec2};

use crate::model::BarTask;
use crate::ui::theme;

/// Where the chart sits on screen, for tooltip placement. All values are
/// in widget-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipFrame {
    pub row_height: f32,
    pub header_height: f32,
    /// Left edge of the chart body.
    pub chart_left: f32,
    /// Width of the visible chart body.
    pub chart_width: f32,
    /// Header plus visible body height.
    pub container_height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub arrow_indent: f32,
    pub rtl: bool,
}

/// Top-left corner for a tooltip of `size` next to `bar`. Prefers the side
/// after the bar (right, or left when mirrored) and above it, falls back
/// to whichever side has more room, and always stays inside the chart.
pub fn tooltip_position(size: Vec2, bar: &BarTask, frame: &TooltipFrame) -> Pos2 {
    let gap_x = frame.arrow_indent * 1.5;
    let gap_y = frame.arrow_indent;
    let anchor_x = if frame.rtl { bar.x1 } else { bar.x2 };
    let task_x = anchor_x + frame.chart_left - frame.scroll_x;
    let task_y = bar.row as f32 * frame.row_height - frame.scroll_y + frame.header_height;
    let chart_right = frame.chart_left + frame.chart_width;

    let space_right = chart_right - (task_x + gap_x);
    let space_left = task_x - gap_x - frame.chart_left;
    let space_top = task_y - frame.header_height;
    let space_bottom = frame.container_height - task_y;

    let fits_right = size.x < space_right;
    let fits_left = size.x < space_left;
    let fits_top = size.y < space_top;
    let fits_bottom = size.y < space_bottom;

    let right = task_x + gap_x;
    let left = task_x - gap_x - size.x;
    let top = task_y - size.y - gap_y;
    let below = task_y + gap_y;

    let preferred = if frame.rtl {
        [(fits_left, left), (fits_right, right)]
    } else {
        [(fits_right, right), (fits_left, left)]
    };
    let placed = preferred.iter().find_map(|&(fits, x)| {
        if !fits {
            None
        } else if fits_top {
            Some(Pos2::new(x, top))
        } else if fits_bottom {
            Some(Pos2::new(x, below))
        } else {
            None
        }
    });

    let pos = placed.unwrap_or_else(|| {
        let use_right = if frame.rtl {
            space_right > space_left
        } else {
            space_right >= space_left
        };
        let x = if use_right { right } else { left };
        let y = if space_top >= space_bottom {
            top.max(frame.header_height)
        } else {
            below.min(frame.container_height - size.y)
        };
        Pos2::new(x, y)
    });

    Pos2::new(
        pos.x.min(chart_right - size.x).max(frame.chart_left),
        pos.y.min(frame.container_height - size.y).max(frame.header_height),
    )
}

/// Renders the inside of the tooltip.
pub trait TooltipContent {
    fn show(&self, ui: &mut Ui, bar: &BarTask, font_size: f32);
}

/// Name and date range, duration in whole days, and progress when non-zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTooltipContent;

impl StandardTooltipContent {
    pub fn lines(bar: &BarTask) -> Vec<String> {
        let task = &bar.task;
        let mut lines = vec![format!(
            "{}: {} - {}",
            task.name,
            task.start.format("%-d-%-m-%Y"),
            task.end.format("%-d-%-m-%Y")
        )];
        let span = task.end - task.start;
        if !span.is_zero() {
            lines.push(format!("Duration: {} day(s)", span.num_days()));
        }
        if task.progress != 0.0 {
            lines.push(format!("Progress: {} %", task.progress));
        }
        lines
    }
}

impl TooltipContent for StandardTooltipContent {
    fn show(&self, ui: &mut Ui, bar: &BarTask, font_size: f32) {
        let lines = Self::lines(bar);
        let mut iter = lines.iter();
        if let Some(title) = iter.next() {
            ui.label(RichText::new(title).strong().size(font_size + 2.0));
        }
        for line in iter {
            ui.label(RichText::new(line).size(font_size).color(theme::TEXT_SECONDARY));
        }
    }
}

/// Show the tooltip for `bar`. `origin` is the widget's top-left corner on
/// screen. The previous frame's measured size drives placement.
pub fn show_tooltip(
    ctx: &egui::Context,
    id: Id,
    origin: Pos2,
    bar: &BarTask,
    frame: &TooltipFrame,
    content: &dyn TooltipContent,
    font_size: f32,
) {
    let size_id = id.with("tooltip-size");
    let size = ctx
        .data(|d| d.get_temp::<Vec2>(size_id))
        .unwrap_or(Vec2::new(200.0, 60.0));
    let pos = origin + tooltip_position(size * 1.1, bar, frame).to_vec2();

    let response = Area::new(id.with("tooltip"))
        .order(Order::Tooltip)
        .fixed_pos(pos)
        .interactable(false)
        .show(ctx, |ui| {
            Frame::none()
                .fill(theme::BG_TOOLTIP)
                .stroke(Stroke::new(1.0, theme::BORDER_SUBTLE))
                .rounding(Rounding::same(theme::TOOLTIP_ROUNDING))
                .inner_margin(Margin::same(theme::TOOLTIP_PADDING))
                .show(ui, |ui| content.show(ui, bar, font_size));
        });
    ctx.data_mut(|d| d.insert_temp(size_id, response.response.rect.size()));
}
