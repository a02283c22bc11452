//! Chart configuration.
//!
//! Every layout and colour knob of the widget lives in [`GanttConfig`].
//! Colours serialise as `#RRGGBB` / `#RRGGBBAA` strings and every struct
//! carries `#[serde(default)]`, so a partial JSON document is valid and
//! missing keys fall back to the built-in defaults.

use chrono::NaiveDateTime;
use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::callbacks::UnspecifiedOutcome;
use crate::error::GanttError;
use crate::model::ViewMode;

// ─── Hex-colour serde helper ────────────────────────────────────────────────

pub mod hex_color {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_hex(*color))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex_color(&s).map_err(serde::de::Error::custom)
    }

    pub fn to_hex(color: Color32) -> String {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        if a == 255 {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }

    pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
        let s = s.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            s.get(range)
                .ok_or_else(|| format!("Invalid hex color '{}'", s))
                .and_then(|hex| u8::from_str_radix(hex, 16).map_err(|e| e.to_string()))
        };
        match s.len() {
            6 => Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color32::from_rgba_unmultiplied(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(format!("Invalid hex color '{}': expected 6 or 8 hex digits", s)),
        }
    }

    /// Same encoding for `Option<Color32>`.
    pub mod option {
        use egui::Color32;
        use serde::{self, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(color: &Option<Color32>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match color {
                Some(c) => serializer.serialize_some(&super::to_hex(*c)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s: Option<String> = Option::deserialize(deserializer)?;
            s.map(|s| super::parse_hex_color(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

// ─── Top-level definition ───────────────────────────────────────────────────

/// How rows are assigned to tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One row per visible task.
    #[default]
    Task,
    /// One row per resource; tasks sharing a resource share a row.
    Resource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    pub view_mode: ViewMode,
    pub group_by: GroupBy,
    /// Granularity steps added before the earliest task.
    pub pre_steps: u32,
    pub header_height: f32,
    pub column_width: f32,
    /// Width of each task-list column. `None` hides the task list.
    pub list_cell_width: Option<f32>,
    pub row_height: f32,
    /// Height cap of the chart body. `None` shows every row.
    pub gantt_height: Option<f32>,
    /// Bar height as a percentage of the row height.
    pub bar_fill: f32,
    pub bar_corner_radius: f32,
    pub handle_width: f32,
    /// Drag quantization step in milliseconds.
    pub time_step: i64,
    pub arrow_indent: f32,
    pub rtl: bool,
    pub locale: String,
    pub font_size: f32,
    /// Scroll so this date is in the leftmost column on first layout.
    pub view_date: Option<NaiveDateTime>,
    /// How a commit callback that returns no explicit verdict is treated.
    pub unspecified_outcome: UnspecifiedOutcome,
    pub palette: BarPalette,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Day,
            group_by: GroupBy::Task,
            pre_steps: 1,
            header_height: 50.0,
            column_width: 60.0,
            list_cell_width: Some(155.0),
            row_height: 50.0,
            gantt_height: None,
            bar_fill: 60.0,
            bar_corner_radius: 3.0,
            handle_width: 8.0,
            time_step: 300_000,
            arrow_indent: 20.0,
            rtl: false,
            locale: "en-GB".into(),
            font_size: 14.0,
            view_date: None,
            unspecified_outcome: UnspecifiedOutcome::Accept,
            palette: BarPalette::default(),
        }
    }
}

impl GanttConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, GanttError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pixel height of a bar inside its row.
    pub fn task_height(&self) -> f32 {
        self.row_height * self.bar_fill / 100.0
    }

    pub fn time_step(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.time_step.max(1))
    }
}

// ─── Colours ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarPalette {
    #[serde(with = "hex_color")]
    pub bar_progress: Color32,
    #[serde(with = "hex_color")]
    pub bar_progress_selected: Color32,
    #[serde(with = "hex_color")]
    pub bar_background: Color32,
    #[serde(with = "hex_color")]
    pub bar_background_selected: Color32,
    #[serde(with = "hex_color")]
    pub project_progress: Color32,
    #[serde(with = "hex_color")]
    pub project_progress_selected: Color32,
    #[serde(with = "hex_color")]
    pub project_background: Color32,
    #[serde(with = "hex_color")]
    pub project_background_selected: Color32,
    #[serde(with = "hex_color")]
    pub milestone_background: Color32,
    #[serde(with = "hex_color")]
    pub milestone_background_selected: Color32,
    #[serde(with = "hex_color")]
    pub arrow: Color32,
    #[serde(with = "hex_color")]
    pub today: Color32,
}

impl Default for BarPalette {
    fn default() -> Self {
        Self {
            bar_progress: Color32::from_rgb(0xa3, 0xa3, 0xff),
            bar_progress_selected: Color32::from_rgb(0x82, 0x82, 0xf5),
            bar_background: Color32::from_rgb(0xb8, 0xc2, 0xcc),
            bar_background_selected: Color32::from_rgb(0xae, 0xb8, 0xc2),
            project_progress: Color32::from_rgb(0x7d, 0xb5, 0x9a),
            project_progress_selected: Color32::from_rgb(0x59, 0xa9, 0x85),
            project_background: Color32::from_rgb(0xfa, 0xc4, 0x65),
            project_background_selected: Color32::from_rgb(0xf7, 0xbb, 0x53),
            milestone_background: Color32::from_rgb(0xf1, 0xc4, 0x53),
            milestone_background_selected: Color32::from_rgb(0xf2, 0x9e, 0x4c),
            arrow: Color32::GRAY,
            today: Color32::from_rgba_unmultiplied(252, 248, 227, 128),
        }
    }
}
