use chrono::NaiveDateTime;
use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::config::hex_color;

/// What a task row represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Project,
    Milestone,
}

/// Per-task colour overrides. Unset fields fall back to the chart palette.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverride {
    #[serde(with = "hex_color::option", skip_serializing_if = "Option::is_none")]
    pub background: Option<Color32>,
    #[serde(with = "hex_color::option", skip_serializing_if = "Option::is_none")]
    pub background_selected: Option<Color32>,
    #[serde(with = "hex_color::option", skip_serializing_if = "Option::is_none")]
    pub progress: Option<Color32>,
    #[serde(with = "hex_color::option", skip_serializing_if = "Option::is_none")]
    pub progress_selected: Option<Color32>,
}

/// A single task, project or milestone as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Percent complete, 0 to 100.
    #[serde(default)]
    pub progress: f32,
    #[serde(rename = "type", default)]
    pub kind: TaskType,
    /// Id of the parent project.
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    /// Ids of predecessor tasks.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub disabled: bool,
    /// Only meaningful for projects: `Some(true)` collapses the children.
    #[serde(default)]
    pub hide_children: Option<bool>,
    #[serde(default)]
    pub styles: Option<StyleOverride>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
            progress: 0.0,
            kind: TaskType::Task,
            project: None,
            resource: None,
            dependencies: Vec::new(),
            display_order: None,
            disabled: false,
            hide_children: None,
            styles: None,
        }
    }

    /// Zero-width milestone at `at`.
    pub fn milestone(id: impl Into<String>, name: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            kind: TaskType::Milestone,
            ..Self::new(id, name, at, at)
        }
    }

    /// An expanded project bar.
    pub fn project(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            kind: TaskType::Project,
            hide_children: Some(false),
            ..Self::new(id, name, start, end)
        }
    }

    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = progress;
        self
    }

    pub fn in_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn depends_on(mut self, predecessor: impl Into<String>) -> Self {
        self.dependencies.push(predecessor.into());
        self
    }

    pub fn with_display_order(mut self, order: i64) -> Self {
        self.display_order = Some(order);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.hide_children = Some(collapsed);
        self
    }

    pub fn is_project(&self) -> bool {
        self.kind == TaskType::Project
    }

    pub fn is_milestone(&self) -> bool {
        self.kind == TaskType::Milestone
    }

    /// True for a project whose children are hidden.
    pub fn is_collapsed(&self) -> bool {
        self.is_project() && self.hide_children == Some(true)
    }

    /// Whether start, end and progress match `other`.
    pub fn same_schedule(&self, other: &Task) -> bool {
        self.start == other.start && self.end == other.end && self.progress == other.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn milestone_is_zero_width() {
        let m = Task::milestone("m", "Release", at(4));
        assert_eq!(m.start, m.end);
        assert!(m.is_milestone());
    }

    #[test]
    fn only_projects_collapse() {
        let p = Task::project("p", "Project", at(1), at(9)).collapsed(true);
        let t = Task::new("t", "Task", at(1), at(2)).collapsed(true);
        assert!(p.is_collapsed());
        assert!(!t.is_collapsed());
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r##"{
            "id": "a",
            "name": "Research",
            "start": "2024-03-02T00:00:00",
            "end": "2024-03-04T00:00:00",
            "type": "task",
            "dependencies": ["b"],
            "styles": { "background": "#112233" }
        }"##;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.kind, TaskType::Task);
        assert_eq!(task.dependencies, vec!["b".to_string()]);
        assert_eq!(
            task.styles.unwrap().background,
            Some(Color32::from_rgb(0x11, 0x22, 0x33))
        );
        assert!(!task.disabled);
    }
}
