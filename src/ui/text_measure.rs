//! Text width measurement for label placement.

use egui::{Color32, FontId};

pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Character-count estimate, used when no font atlas is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }
}

/// Measures with the fonts loaded into an egui context.
#[derive(Clone)]
pub struct EguiTextMeasure {
    ctx: egui::Context,
}

impl EguiTextMeasure {
    pub fn new(ctx: &egui::Context) -> Self {
        Self { ctx: ctx.clone() }
    }
}

impl TextMeasure for EguiTextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let font = FontId::proportional(font_size);
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_string(), font, Color32::WHITE)
                .size()
                .x
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approximation_scales_with_length_and_size() {
        let measure = ApproxTextMeasure;
        assert_eq!(measure.text_width("", 14.0), 0.0);
        assert!((measure.text_width("abcde", 10.0) - 30.0).abs() < 1e-3);
        assert!(measure.text_width("wide label", 20.0) > measure.text_width("wide label", 10.0));
    }
}
