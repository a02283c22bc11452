//! Dependency arrow routing.

use egui::Pos2;

use super::bar_task::BarTask;

/// Half size of the arrow head.
const HEAD: f32 = 5.0;

/// A routed dependency: an orthogonal polyline ending at the arrow tip.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub points: Vec<Pos2>,
    /// Tip first, then the two back corners.
    pub head: [Pos2; 3],
}

/// Route an arrow from the trailing edge of `from` to the leading edge of
/// `to`. The path leaves `from` by `indent`, steps half a row towards
/// `to`, doubles back if `to` starts too close, then enters `to`
/// horizontally.
pub fn arrow_path(
    from: &BarTask,
    to: &BarTask,
    row_height: f32,
    task_height: f32,
    indent: f32,
    rtl: bool,
) -> Arrow {
    let direction = if from.row > to.row { -1.0 } else { 1.0 };
    let from_y = from.y + task_height / 2.0;
    let to_y = to.y + task_height / 2.0;
    // Leading edge of the successor and trailing edge of the predecessor.
    // `sign` points from the predecessor towards later dates.
    let (exit_x, entry_x, sign) = if rtl {
        (from.x1, to.x2, -1.0)
    } else {
        (from.x2, to.x1, 1.0)
    };

    let mut points = vec![Pos2::new(exit_x, from_y)];
    let mut x = exit_x + sign * indent;
    let mut y = from_y;
    points.push(Pos2::new(x, y));
    y += direction * row_height / 2.0;
    points.push(Pos2::new(x, y));

    // Positive when the successor starts at least two indents past the exit.
    let clearance = sign * (entry_x - (exit_x + sign * indent * 2.0));
    if clearance <= 0.0 {
        x = entry_x - sign * indent;
        points.push(Pos2::new(x, y));
    }
    points.push(Pos2::new(x, to_y));
    let tail = if clearance < 0.0 {
        sign * indent
    } else {
        entry_x - exit_x - sign * indent
    };
    points.push(Pos2::new(x + tail, to_y));

    let head = [
        Pos2::new(entry_x, to_y),
        Pos2::new(entry_x - sign * HEAD, to_y - HEAD),
        Pos2::new(entry_x - sign * HEAD, to_y + HEAD),
    ];

    Arrow {
        from: from.task.id.clone(),
        to: to.task.id.clone(),
        points,
        head,
    }
}

/// Every arrow between compiled bars. Dependencies on tasks that are not
/// laid out (unknown or hidden) produce no arrow.
pub fn layout_arrows(
    bars: &[BarTask],
    row_height: f32,
    task_height: f32,
    indent: f32,
    rtl: bool,
) -> Vec<Arrow> {
    bars.iter()
        .flat_map(|from| {
            from.bar_children.iter().filter_map(move |child| {
                bars.get(child.index)
                    .map(|to| arrow_path(from, to, row_height, task_height, indent, rtl))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GanttConfig;
    use crate::model::bar_task::compile;
    use crate::model::{DateAxis, Task};
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bars(tasks: &[Task], rtl: bool) -> Vec<BarTask> {
        let config = GanttConfig {
            rtl,
            ..GanttConfig::default()
        };
        let axis = DateAxis::for_tasks(tasks, config.view_mode, 1).unwrap();
        compile(tasks, &axis, &config, &[])
    }

    #[test]
    fn spaced_successor_gets_a_direct_route() {
        let tasks = vec![
            Task::new("a", "A", day(2), day(4)),
            Task::new("b", "B", day(8), day(10)).depends_on("a"),
        ];
        let bars = bars(&tasks, false);
        let arrows = layout_arrows(&bars, 50.0, 30.0, 20.0, false);
        assert_eq!(arrows.len(), 1);
        let arrow = &arrows[0];
        let a = &bars[0];
        let b = &bars[1];
        assert_eq!(arrow.points.len(), 5);
        assert_eq!(arrow.points[0], Pos2::new(a.x2, a.y + 15.0));
        assert_eq!(arrow.points[2].y, a.y + 15.0 + 25.0);
        assert_eq!(*arrow.points.last().unwrap(), Pos2::new(b.x1, b.y + 15.0));
        assert_eq!(arrow.head[0], Pos2::new(b.x1, b.y + 15.0));
    }

    #[test]
    fn overlapping_successor_doubles_back() {
        let tasks = vec![
            Task::new("a", "A", day(2), day(6)),
            Task::new("b", "B", day(3), day(8)).depends_on("a"),
        ];
        let bars = bars(&tasks, false);
        let arrow = &layout_arrows(&bars, 50.0, 30.0, 20.0, false)[0];
        let b = &bars[1];
        assert_eq!(arrow.points.len(), 6);
        assert_eq!(arrow.points[3].x, b.x1 - 20.0);
        assert_eq!(*arrow.points.last().unwrap(), Pos2::new(b.x1, b.y + 15.0));
    }

    #[test]
    fn upward_dependency_steps_up() {
        let tasks = vec![
            Task::new("b", "B", day(8), day(10)).depends_on("a"),
            Task::new("a", "A", day(2), day(4)),
        ];
        let bars = bars(&tasks, false);
        let arrow = &layout_arrows(&bars, 50.0, 30.0, 20.0, false)[0];
        assert_eq!(arrow.from, "a");
        assert!(arrow.points[2].y < arrow.points[1].y);
    }

    #[test]
    fn rtl_enters_the_right_edge() {
        let tasks = vec![
            Task::new("a", "A", day(2), day(4)),
            Task::new("b", "B", day(8), day(10)).depends_on("a"),
        ];
        let bars = bars(&tasks, true);
        let arrow = &layout_arrows(&bars, 50.0, 30.0, 20.0, true)[0];
        let a = &bars[0];
        let b = &bars[1];
        assert_eq!(arrow.points[0].x, a.x1);
        assert_eq!(arrow.points.last().unwrap().x, b.x2);
        assert_eq!(arrow.head[1].x, b.x2 + 5.0);
    }

    #[test]
    fn missing_predecessor_draws_nothing() {
        let tasks = vec![Task::new("b", "B", day(8), day(10)).depends_on("ghost")];
        let bars = bars(&tasks, false);
        assert!(layout_arrows(&bars, 50.0, 30.0, 20.0, false).is_empty());
    }
}
