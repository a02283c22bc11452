//! egui render regions.

pub mod calendar;
pub mod gantt_chart;
pub mod grid;
pub mod scroll;
pub mod task_list;
pub mod text_measure;
pub mod theme;
pub mod toolbar;
pub mod tooltip;
pub mod widget;

pub use task_list::{
    DefaultTaskListHeader, DefaultTaskListTable, TaskListAction, TaskListHeader, TaskListHeaderProps,
    TaskListTable, TaskListTableProps,
};
pub use text_measure::{ApproxTextMeasure, EguiTextMeasure, TextMeasure};
pub use toolbar::{show_toolbar, ViewSwitcher};
pub use tooltip::{StandardTooltipContent, TooltipContent};
pub use widget::GanttWidget;

/// Register the Phosphor icon font as a fallback so expander glyphs
/// render inline with text.
pub fn install_icon_font(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
    ctx.set_fonts(fonts);
}
