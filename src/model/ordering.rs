//! Display order and project hierarchy.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;

use super::task::Task;
use crate::error::GanttError;

/// Stable sort by `display_order`. Tasks without one keep their input
/// position after every ordered task.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(|t| t.display_order.unwrap_or(i64::MAX));
    sorted
}

/// Ids of every task below `root_id`, following `project` links
/// transitively. Cycles in the parent links are tolerated.
pub fn descendants(tasks: &[Task], root_id: &str) -> HashSet<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.project.as_deref() {
            children.entry(parent).or_default().push(task.id.as_str());
        }
    }

    let mut found = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        for child in children.get(id).into_iter().flatten() {
            if *child != root_id && found.insert(child.to_string()) {
                stack.push(*child);
            }
        }
    }
    found
}

/// Drop every task that has a collapsed project among its ancestors.
pub fn remove_hidden_tasks(tasks: &[Task]) -> Vec<Task> {
    let hidden: HashSet<String> = tasks
        .iter()
        .filter(|t| t.is_collapsed())
        .flat_map(|project| descendants(tasks, &project.id))
        .collect();
    tasks
        .iter()
        .filter(|t| !hidden.contains(&t.id))
        .cloned()
        .collect()
}

/// Visible tasks in display order.
pub fn visible_tasks(tasks: &[Task]) -> Vec<Task> {
    sort_tasks(&remove_hidden_tasks(tasks))
}

/// Sorted, de-duplicated resource names. A task without a resource
/// belongs to the unnamed resource `""`.
pub fn tasks_to_resources(tasks: &[Task]) -> Vec<String> {
    let mut resources: Vec<String> = tasks
        .iter()
        .map(|t| t.resource.clone().unwrap_or_default())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    resources.sort();
    resources
}

/// Earliest start and latest end over the direct children of a project.
pub fn project_span(tasks: &[Task], project_id: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut children = tasks
        .iter()
        .filter(|t| t.project.as_deref() == Some(project_id));
    let first = children.next()?;
    Some(children.fold((first.start, first.end), |(start, end), t| {
        (start.min(t.start), end.max(t.end))
    }))
}

/// Every problem in the task set. An empty result means the set is
/// well formed.
pub fn validate(tasks: &[Task]) -> Vec<GanttError> {
    let mut problems = Vec::new();
    if tasks.is_empty() {
        problems.push(GanttError::EmptyTaskSet);
        return problems;
    }

    let mut ids = HashSet::new();
    for task in tasks {
        if !ids.insert(task.id.as_str()) {
            problems.push(GanttError::DuplicateId { id: task.id.clone() });
        }
    }
    for task in tasks {
        if task.start > task.end {
            problems.push(GanttError::InvalidRange { id: task.id.clone() });
        }
        if let Some(parent) = &task.project {
            if !ids.contains(parent.as_str()) {
                problems.push(GanttError::UnknownParent {
                    id: task.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
        for dependency in &task.dependencies {
            if !ids.contains(dependency.as_str()) {
                problems.push(GanttError::UnknownDependency {
                    id: task.id.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn tree(collapsed: bool) -> Vec<Task> {
        vec![
            Task::project("root", "Root", day(1), day(20)).collapsed(collapsed),
            Task::project("sub", "Sub", day(2), day(10)).in_project("root"),
            Task::new("leaf", "Leaf", day(2), day(4)).in_project("sub"),
            Task::new("sibling", "Sibling", day(5), day(9)).in_project("root"),
            Task::new("other", "Other", day(3), day(6)),
        ]
    }

    #[test]
    fn sort_is_stable_and_unordered_tasks_go_last() {
        let tasks = vec![
            Task::new("a", "A", day(1), day(2)),
            Task::new("b", "B", day(1), day(2)).with_display_order(2),
            Task::new("c", "C", day(1), day(2)),
            Task::new("d", "D", day(1), day(2)).with_display_order(1),
            Task::new("e", "E", day(1), day(2)).with_display_order(2),
        ];
        assert_eq!(ids(&sort_tasks(&tasks)), vec!["d", "b", "e", "a", "c"]);
    }

    #[test]
    fn collapsing_hides_the_transitive_closure() {
        let visible = visible_tasks(&tree(true));
        assert_eq!(ids(&visible), vec!["root", "other"]);
    }

    #[test]
    fn grandchild_of_collapsed_project_stays_hidden_when_parent_is_expanded() {
        let mut tasks = tree(true);
        tasks[1].hide_children = Some(false);
        let visible = visible_tasks(&tasks);
        assert!(!ids(&visible).contains(&"leaf"));
    }

    #[test]
    fn expanding_restores_original_order() {
        let expanded = visible_tasks(&tree(false));
        assert_eq!(ids(&expanded), vec!["root", "sub", "leaf", "sibling", "other"]);
        let collapsed = visible_tasks(&tree(true));
        let mut reexpanded = tree(true);
        reexpanded[0].hide_children = Some(false);
        assert_eq!(visible_tasks(&reexpanded), expanded);
        assert!(collapsed.len() < expanded.len());
    }

    #[test]
    fn parent_cycles_do_not_hang() {
        let tasks = vec![
            Task::project("a", "A", day(1), day(2)).in_project("b").collapsed(true),
            Task::project("b", "B", day(1), day(2)).in_project("a"),
        ];
        let found = descendants(&tasks, "a");
        assert!(found.contains("b"));
        assert!(!found.contains("a"));
    }

    #[test]
    fn resources_are_sorted_and_unique() {
        let tasks = vec![
            Task::new("a", "A", day(1), day(2)).with_resource("Team 2"),
            Task::new("b", "B", day(1), day(2)).with_resource("Team 1"),
            Task::new("c", "C", day(1), day(2)).with_resource("Team 2"),
            Task::new("d", "D", day(1), day(2)),
        ];
        assert_eq!(tasks_to_resources(&tasks), vec!["", "Team 1", "Team 2"]);
    }

    #[test]
    fn project_span_covers_children() {
        assert_eq!(project_span(&tree(false), "root"), Some((day(2), day(10))));
        assert_eq!(project_span(&tree(false), "other"), None);
    }

    #[test]
    fn validate_reports_dangling_references() {
        let tasks = vec![
            Task::new("a", "A", day(3), day(2)),
            Task::new("b", "B", day(1), day(2)).in_project("nope").depends_on("ghost"),
            Task::new("b", "B again", day(1), day(2)),
        ];
        let problems = validate(&tasks);
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| matches!(p, GanttError::DuplicateId { id } if id == "b")));
        assert!(problems.iter().any(|p| matches!(p, GanttError::InvalidRange { id } if id == "a")));
    }
}
