//! Header calendar: two rows of date labels above the chart.

use chrono::{Datelike, NaiveDateTime};
use egui::{Align2, Painter, Pos2, Rect, Stroke};

use crate::model::{DateAxis, ViewMode};
use crate::ui::theme;

/// One label cell in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub text: String,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderLabels {
    /// Coarse labels; consecutive columns sharing a label are merged.
    pub top: Vec<HeaderCell>,
    /// One label per column.
    pub bottom: Vec<HeaderCell>,
}

fn top_label(date: NaiveDateTime, mode: ViewMode) -> Option<String> {
    match mode {
        ViewMode::Year => None,
        ViewMode::QuarterYear | ViewMode::Month => Some(date.year().to_string()),
        ViewMode::Week | ViewMode::Day => Some(date.format("%B %Y").to_string()),
        ViewMode::Hour | ViewMode::QuarterDay | ViewMode::HalfDay => {
            Some(date.format("%a, %-d %B").to_string())
        }
    }
}

fn bottom_label(date: NaiveDateTime, mode: ViewMode) -> String {
    match mode {
        ViewMode::Year => date.year().to_string(),
        ViewMode::QuarterYear => format!("Q{}", date.month0() / 3 + 1),
        ViewMode::Month => date.format("%B").to_string(),
        ViewMode::Week => date.format("W%V").to_string(),
        ViewMode::Day => date.format("%a, %-d").to_string(),
        ViewMode::Hour | ViewMode::QuarterDay | ViewMode::HalfDay => date.format("%H").to_string(),
    }
}

/// Labels for every column of `axis`, mirrored when `rtl` is set.
pub fn header_labels(axis: &DateAxis, column_width: f32, rtl: bool) -> HeaderLabels {
    let total = axis.width(column_width);
    let place = |column: usize, span: usize| {
        let x = column as f32 * column_width;
        let width = span as f32 * column_width;
        if rtl {
            total - x - width
        } else {
            x
        }
    };

    let bottom = axis
        .ticks
        .iter()
        .enumerate()
        .map(|(i, &date)| HeaderCell {
            text: bottom_label(date, axis.view_mode),
            x: place(i, 1),
            width: column_width,
        })
        .collect();

    let mut top = Vec::new();
    let mut run: Option<(String, usize, usize)> = None;
    for (i, &date) in axis.ticks.iter().enumerate() {
        let Some(label) = top_label(date, axis.view_mode) else {
            continue;
        };
        match &mut run {
            Some((text, _, span)) if *text == label => *span += 1,
            _ => {
                if let Some((text, start, span)) = run.take() {
                    top.push(HeaderCell {
                        text,
                        x: place(start, span),
                        width: span as f32 * column_width,
                    });
                }
                run = Some((label, i, 1));
            }
        }
    }
    if let Some((text, start, span)) = run {
        top.push(HeaderCell {
            text,
            x: place(start, span),
            width: span as f32 * column_width,
        });
    }

    HeaderLabels { top, bottom }
}

/// Long date for the task list, ordered by locale.
pub fn long_date(date: NaiveDateTime, locale: &str) -> String {
    if locale.eq_ignore_ascii_case("en-US") {
        date.format("%a, %B %-d, %Y").to_string()
    } else {
        date.format("%a, %-d %B %Y").to_string()
    }
}

/// Paint the header into `rect`, offset by the horizontal scroll.
pub fn draw_calendar(painter: &Painter, rect: Rect, labels: &HeaderLabels, scroll_x: f32, font_size: f32) {
    let painter = painter.with_clip_rect(rect);
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);
    painter.line_segment(
        [rect.left_bottom(), rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let mid = rect.top() + rect.height() / 2.0;
    let has_top = !labels.top.is_empty();
    let bottom_y = if has_top { rect.top() + rect.height() * 0.75 } else { rect.center().y };
    let left = rect.left() - scroll_x;

    for cell in &labels.bottom {
        let x = left + cell.x;
        if x + cell.width < rect.left() || x > rect.right() {
            continue;
        }
        let line_top = if has_top { mid } else { rect.top() };
        painter.line_segment(
            [Pos2::new(x, line_top), Pos2::new(x, rect.bottom())],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        painter.text(
            Pos2::new(x + cell.width / 2.0, bottom_y),
            Align2::CENTER_CENTER,
            &cell.text,
            theme::font_sub(font_size),
            theme::TEXT_SECONDARY,
        );
    }

    for cell in &labels.top {
        let x = left + cell.x;
        if x + cell.width < rect.left() || x > rect.right() {
            continue;
        }
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, mid)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        // Keep the label on screen while its span is partly scrolled away.
        let visible_left = x.max(rect.left());
        let visible_right = (x + cell.width).min(rect.right());
        painter.text(
            Pos2::new((visible_left + visible_right) / 2.0, rect.top() + rect.height() * 0.25),
            Align2::CENTER_CENTER,
            &cell.text,
            theme::font_header(font_size),
            theme::TEXT_PRIMARY,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn axis(mode: ViewMode, start: NaiveDateTime, end: NaiveDateTime) -> DateAxis {
        DateAxis::for_tasks(&[Task::new("a", "A", start, end)], mode, 1).unwrap()
    }

    #[test]
    fn day_view_groups_months_on_top() {
        let axis = axis(ViewMode::Day, at(2024, 1, 30), at(2024, 2, 2));
        let labels = header_labels(&axis, 60.0, false);
        assert_eq!(labels.bottom.len(), axis.ticks.len());
        assert_eq!(labels.bottom[0].text, "Mon, 29");
        let tops: Vec<_> = labels.top.iter().map(|c| (c.text.as_str(), c.width)).collect();
        assert_eq!(tops, vec![("January 2024", 180.0), ("February 2024", 180.0)]);
    }

    #[test]
    fn year_view_has_a_single_row() {
        let axis = axis(ViewMode::Year, at(2023, 6, 1), at(2024, 6, 1));
        let labels = header_labels(&axis, 300.0, false);
        assert!(labels.top.is_empty());
        assert_eq!(labels.bottom[0].text, "2022");
    }

    #[test]
    fn quarter_and_week_labels() {
        let axis_q = axis(ViewMode::QuarterYear, at(2024, 5, 1), at(2024, 8, 1));
        let labels = header_labels(&axis_q, 100.0, false);
        assert_eq!(labels.bottom[0].text, "Q1");
        assert_eq!(labels.bottom[1].text, "Q2");

        let axis_w = axis(ViewMode::Week, at(2024, 1, 10), at(2024, 1, 20));
        let labels = header_labels(&axis_w, 100.0, false);
        assert_eq!(labels.bottom[0].text, "W01");
    }

    #[test]
    fn rtl_mirrors_cells() {
        let axis = axis(ViewMode::Day, at(2024, 1, 30), at(2024, 2, 2));
        let ltr = header_labels(&axis, 60.0, false);
        let rtl = header_labels(&axis, 60.0, true);
        let total = axis.width(60.0);
        assert_eq!(rtl.bottom[0].x, total - 60.0);
        assert_eq!(rtl.top[0].x, total - ltr.top[0].x - ltr.top[0].width);
    }

    #[test]
    fn long_date_follows_locale_order() {
        let date = at(2024, 2, 2);
        assert_eq!(long_date(date, "en-GB"), "Fri, 2 February 2024");
        assert_eq!(long_date(date, "en-US"), "Fri, February 2, 2024");
    }
}
