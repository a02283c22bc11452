use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::task::Task;
use crate::error::GanttError;

/// Width of one chart column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Hour,
    QuarterDay,
    HalfDay,
    #[default]
    Day,
    Week,
    Month,
    QuarterYear,
    Year,
}

impl ViewMode {
    pub const ALL: [ViewMode; 8] = [
        ViewMode::Hour,
        ViewMode::QuarterDay,
        ViewMode::HalfDay,
        ViewMode::Day,
        ViewMode::Week,
        ViewMode::Month,
        ViewMode::QuarterYear,
        ViewMode::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Hour => "Hour",
            ViewMode::QuarterDay => "Quarter of Day",
            ViewMode::HalfDay => "Half of Day",
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
            ViewMode::QuarterYear => "Quarter of Year",
            ViewMode::Year => "Year",
        }
    }

    /// Round `date` down to the boundary of the unit containing it.
    pub fn align(self, date: NaiveDateTime) -> NaiveDateTime {
        let day = date.date();
        let aligned = match self {
            ViewMode::Hour => return midnight(day) + Duration::hours(date.hour() as i64),
            ViewMode::QuarterDay | ViewMode::HalfDay | ViewMode::Day => day,
            ViewMode::Week => day - Duration::days(day.weekday().num_days_from_monday() as i64),
            ViewMode::Month => day.with_day(1).unwrap_or(day),
            ViewMode::QuarterYear => {
                let month = (day.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(day.year(), month, 1).unwrap_or(day)
            }
            ViewMode::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day),
        };
        midnight(aligned)
    }

    /// Move `date` by `steps` units. Month-based units step by calendar
    /// months, never by a fixed number of days.
    pub fn shift(self, date: NaiveDateTime, steps: i64) -> Option<NaiveDateTime> {
        let fixed = |unit: Duration| unit.checked_mul(steps as i32).and_then(|d| date.checked_add_signed(d));
        let months = |per_step: i64| {
            let total = per_step * steps;
            let magnitude = Months::new(u32::try_from(total.unsigned_abs()).ok()?);
            if total >= 0 {
                date.checked_add_months(magnitude)
            } else {
                date.checked_sub_months(magnitude)
            }
        };
        match self {
            ViewMode::Hour => fixed(Duration::hours(1)),
            ViewMode::QuarterDay => fixed(Duration::hours(6)),
            ViewMode::HalfDay => fixed(Duration::hours(12)),
            ViewMode::Day => fixed(Duration::days(1)),
            ViewMode::Week => fixed(Duration::days(7)),
            ViewMode::Month => months(1),
            ViewMode::QuarterYear => months(3),
            ViewMode::Year => months(12),
        }
    }
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}

/// Earliest start minus `pre_steps` units and latest end plus one unit,
/// both on unit boundaries.
pub fn compute_range(
    tasks: &[Task],
    view_mode: ViewMode,
    pre_steps: u32,
) -> Result<(NaiveDateTime, NaiveDateTime), GanttError> {
    let earliest = tasks.iter().map(|t| t.start.min(t.end)).min();
    let latest = tasks.iter().map(|t| t.end.max(t.start)).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return Err(GanttError::EmptyTaskSet);
    };

    let start = view_mode
        .shift(view_mode.align(earliest), -(pre_steps as i64))
        .ok_or(GanttError::AxisOverflow)?;
    let end = view_mode
        .shift(view_mode.align(latest), 1)
        .ok_or(GanttError::AxisOverflow)?;
    Ok((start, end))
}

/// Every unit boundary from `start` to `end` inclusive.
pub fn seed_ticks(start: NaiveDateTime, end: NaiveDateTime, view_mode: ViewMode) -> Vec<NaiveDateTime> {
    let mut ticks = vec![start];
    let mut current = start;
    while current < end {
        match view_mode.shift(current, 1) {
            Some(next) if next > current => {
                ticks.push(next);
                current = next;
            }
            _ => break,
        }
    }
    ticks
}

/// The visible date axis: column boundaries for the active view mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DateAxis {
    pub view_mode: ViewMode,
    /// Strictly increasing; always at least two entries.
    pub ticks: Vec<NaiveDateTime>,
}

impl DateAxis {
    pub fn for_tasks(tasks: &[Task], view_mode: ViewMode, pre_steps: u32) -> Result<Self, GanttError> {
        let (start, end) = compute_range(tasks, view_mode, pre_steps)?;
        let mut ticks = seed_ticks(start, end, view_mode);
        if ticks.len() < 2 {
            let next = view_mode.shift(start, 1).ok_or(GanttError::AxisOverflow)?;
            ticks.push(next);
        }
        Ok(Self { view_mode, ticks })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.ticks[0]
    }

    pub fn end(&self) -> NaiveDateTime {
        self.ticks[self.ticks.len() - 1]
    }

    /// Total chart width: one column per tick.
    pub fn width(&self, column_width: f32) -> f32 {
        self.ticks.len() as f32 * column_width
    }

    /// Index of the interval `[ticks[i], ticks[i + 1])` containing `date`,
    /// clamped to the first/last interval outside the axis.
    fn interval_of(&self, date: NaiveDateTime) -> usize {
        let last = self.ticks.len() - 2;
        match self.ticks.iter().rposition(|t| *t <= date) {
            Some(i) => i.min(last),
            None => 0,
        }
    }

    fn interval_millis(&self, i: usize) -> f64 {
        (self.ticks[i + 1] - self.ticks[i]).num_milliseconds() as f64
    }

    /// Left-to-right x of `date`, interpolated inside its column.
    pub fn x_of(&self, date: NaiveDateTime, column_width: f32) -> f32 {
        let i = self.interval_of(date);
        let into = (date - self.ticks[i]).num_milliseconds() as f64;
        let fraction = into / self.interval_millis(i);
        (i as f64 * column_width as f64 + fraction * column_width as f64) as f32
    }

    /// `x_of` mirrored about the chart centre when `rtl` is set.
    pub fn x_for(&self, date: NaiveDateTime, column_width: f32, rtl: bool) -> f32 {
        let x = self.x_of(date, column_width);
        if rtl {
            self.width(column_width) - x
        } else {
            x
        }
    }

    /// Inverse of [`DateAxis::x_of`], to the millisecond.
    pub fn date_at(&self, x: f32, column_width: f32) -> NaiveDateTime {
        let columns = x as f64 / column_width as f64;
        let last = (self.ticks.len() - 2) as f64;
        let i = columns.floor().clamp(0.0, last) as usize;
        let fraction = columns - i as f64;
        let millis = (fraction * self.interval_millis(i)).round() as i64;
        self.ticks[i] + Duration::milliseconds(millis)
    }

    /// Inverse of [`DateAxis::x_for`].
    pub fn date_for(&self, x: f32, column_width: f32, rtl: bool) -> NaiveDateTime {
        let x = if rtl { self.width(column_width) - x } else { x };
        self.date_at(x, column_width)
    }

    /// Wall-clock length of the first column. Measured on naive local
    /// time, so a daylight-saving jump between ticks never skews it.
    pub fn first_interval(&self) -> Duration {
        self.ticks[1] - self.ticks[0]
    }

    /// Column containing `now`, if it lies on the axis.
    pub fn today_column(&self, now: NaiveDateTime) -> Option<usize> {
        self.ticks
            .windows(2)
            .position(|w| w[0] <= now && now < w[1])
    }

    /// Horizontal scroll that puts the column holding `view_date` first.
    pub fn scroll_to(&self, view_date: NaiveDateTime, column_width: f32, rtl: bool) -> Option<f32> {
        let column = self.today_column(view_date)?;
        let x = column as f32 * column_width;
        Some(if rtl {
            (self.width(column_width) - x - column_width).max(0.0)
        } else {
            x
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn single_day_task_gets_padding_and_trailing_tick() {
        let tasks = vec![Task::new("a", "A", at(2024, 5, 10, 0), at(2024, 5, 11, 0))];
        let axis = DateAxis::for_tasks(&tasks, ViewMode::Day, 1).unwrap();
        assert!(axis.ticks.len() >= 3);
        assert_eq!(axis.start(), at(2024, 5, 9, 0));
        assert!(axis.ticks.contains(&at(2024, 5, 10, 0)));
        assert!(axis.end() > at(2024, 5, 11, 0));
    }

    #[test]
    fn range_rounds_outward() {
        let tasks = vec![Task::new("a", "A", at(2024, 5, 10, 13), at(2024, 7, 2, 9))];
        let (start, end) = compute_range(&tasks, ViewMode::Month, 1).unwrap();
        assert_eq!(start, at(2024, 4, 1, 0));
        assert_eq!(end, at(2024, 8, 1, 0));

        let (start, end) = compute_range(&tasks, ViewMode::Year, 1).unwrap();
        assert_eq!(start, at(2023, 1, 1, 0));
        assert_eq!(end, at(2025, 1, 1, 0));
    }

    #[test]
    fn week_aligns_to_monday() {
        // 2024-05-16 is a Thursday.
        assert_eq!(ViewMode::Week.align(at(2024, 5, 16, 15)), at(2024, 5, 13, 0));
    }

    #[test]
    fn empty_task_set_is_an_error() {
        assert!(matches!(
            compute_range(&[], ViewMode::Day, 1),
            Err(GanttError::EmptyTaskSet)
        ));
    }

    #[test]
    fn month_ticks_follow_the_calendar() {
        let ticks = seed_ticks(at(2024, 1, 1, 0), at(2024, 4, 1, 0), ViewMode::Month);
        assert_eq!(
            ticks,
            vec![
                at(2024, 1, 1, 0),
                at(2024, 2, 1, 0),
                at(2024, 3, 1, 0),
                at(2024, 4, 1, 0)
            ]
        );
    }

    #[test]
    fn ticks_strictly_increase() {
        let ticks = seed_ticks(at(2024, 1, 1, 0), at(2024, 1, 3, 0), ViewMode::QuarterDay);
        assert_eq!(ticks.len(), 9);
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn x_is_continuous_inside_a_column() {
        let tasks = vec![Task::new("a", "A", at(2024, 5, 10, 0), at(2024, 5, 12, 0))];
        let axis = DateAxis::for_tasks(&tasks, ViewMode::Day, 1).unwrap();
        assert_eq!(axis.x_of(at(2024, 5, 10, 0), 60.0), 60.0);
        assert_eq!(axis.x_of(at(2024, 5, 10, 12), 60.0), 90.0);
        assert_eq!(axis.x_of(at(2024, 5, 10, 18), 60.0), 105.0);
    }

    #[test]
    fn date_at_inverts_x_of() {
        let tasks = vec![Task::new("a", "A", at(2024, 1, 10, 0), at(2024, 3, 12, 0))];
        let axis = DateAxis::for_tasks(&tasks, ViewMode::Month, 1).unwrap();
        let date = at(2024, 2, 17, 6);
        let x = axis.x_of(date, 300.0);
        let back = axis.date_at(x, 300.0);
        assert!((back - date).num_minutes().abs() <= 5);
    }

    #[test]
    fn rtl_mirrors_about_the_centre() {
        let tasks = vec![Task::new("a", "A", at(2024, 5, 10, 0), at(2024, 5, 12, 0))];
        let axis = DateAxis::for_tasks(&tasks, ViewMode::Day, 1).unwrap();
        let width = axis.width(60.0);
        let d = at(2024, 5, 11, 6);
        assert_eq!(axis.x_for(d, 60.0, true), width - axis.x_for(d, 60.0, false));
        assert_eq!(axis.date_for(axis.x_for(d, 60.0, true), 60.0, true), d);
    }

    #[test]
    fn today_column_and_scroll() {
        let tasks = vec![Task::new("a", "A", at(2024, 5, 10, 0), at(2024, 5, 12, 0))];
        let axis = DateAxis::for_tasks(&tasks, ViewMode::Day, 1).unwrap();
        assert_eq!(axis.today_column(at(2024, 5, 11, 8)), Some(2));
        assert_eq!(axis.today_column(at(2023, 1, 1, 0)), None);
        assert_eq!(axis.scroll_to(at(2024, 5, 11, 8), 60.0, false), Some(120.0));
    }
}
