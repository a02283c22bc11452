use egui::{menu, RichText, Ui};

use crate::config::{GanttConfig, GroupBy};
use crate::model::ViewMode;
use crate::ui::theme;

/// Toolbar state: granularity plus the task-list and grouping toggles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSwitcher {
    pub view_mode: ViewMode,
    pub show_task_list: bool,
    pub by_resource: bool,
    /// Cap the chart body height.
    pub limited_height: bool,
}

impl Default for ViewSwitcher {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Day,
            show_task_list: true,
            by_resource: false,
            limited_height: false,
        }
    }
}

impl ViewSwitcher {
    /// Column width that keeps header labels legible at each granularity.
    pub fn column_width(view_mode: ViewMode) -> f32 {
        match view_mode {
            ViewMode::Year => 350.0,
            ViewMode::Month => 300.0,
            ViewMode::Week => 250.0,
            _ => 65.0,
        }
    }

    /// `config` with this toolbar's choices applied.
    pub fn apply(&self, config: &GanttConfig) -> GanttConfig {
        GanttConfig {
            view_mode: self.view_mode,
            column_width: Self::column_width(self.view_mode),
            list_cell_width: self.show_task_list.then_some(155.0),
            group_by: if self.by_resource { GroupBy::Resource } else { GroupBy::Task },
            gantt_height: self.limited_height.then_some(300.0),
            ..config.clone()
        }
    }
}

/// Render the view menu and toggles. Returns true when anything changed.
pub fn show_toolbar(switcher: &mut ViewSwitcher, ui: &mut Ui) -> bool {
    let before = *switcher;
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Timeline Scale").small().weak());
            for mode in ViewMode::ALL {
                if ui.radio_value(&mut switcher.view_mode, mode, mode.label()).clicked() {
                    ui.close_menu();
                }
            }
        });
        ui.separator();
        ui.checkbox(&mut switcher.show_task_list, "Show Task List");
        ui.checkbox(&mut switcher.by_resource, "Show By Resource");
        ui.checkbox(&mut switcher.limited_height, "Limited Height");

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(switcher.view_mode.label()).size(11.0).weak());
        });
    });
    *switcher != before
}
