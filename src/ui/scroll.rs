//! Scrollbars bound to the store's scroll offsets.

use egui::{Id, Pos2, Rect, Rounding, Sense, Ui, Vec2};

use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Thumb `(start, length)` along a track, or `None` when everything fits.
pub fn thumb_geometry(track: f32, content: f32, viewport: f32, offset: f32) -> Option<(f32, f32)> {
    if content <= viewport || track <= 0.0 {
        return None;
    }
    let length = (track * viewport / content).clamp(theme::SCROLLBAR_SIZE * 2.0, track);
    let max_offset = content - viewport;
    let start = (offset / max_offset).clamp(0.0, 1.0) * (track - length);
    Some((start, length))
}

/// Content offset for a thumb dragged by `delta` track pixels.
pub fn offset_for_drag(track: f32, content: f32, viewport: f32, offset: f32, delta: f32) -> f32 {
    let Some((_, length)) = thumb_geometry(track, content, viewport, offset) else {
        return 0.0;
    };
    let travel = track - length;
    if travel <= 0.0 {
        return offset;
    }
    (offset + delta * (content - viewport) / travel).clamp(0.0, content - viewport)
}

/// Draw a scrollbar in `rect`. Returns the new offset while the thumb is
/// dragged or the track is clicked.
pub fn show_scrollbar(
    ui: &mut Ui,
    id: Id,
    rect: Rect,
    orientation: Orientation,
    content: f32,
    viewport: f32,
    offset: f32,
) -> Option<f32> {
    let track = match orientation {
        Orientation::Horizontal => rect.width(),
        Orientation::Vertical => rect.height(),
    };
    let (start, length) = thumb_geometry(track, content, viewport, offset)?;

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, theme::SCROLL_TRACK);

    let thumb = match orientation {
        Orientation::Horizontal => Rect::from_min_size(
            Pos2::new(rect.left() + start, rect.top() + 2.0),
            Vec2::new(length, rect.height() - 4.0),
        ),
        Orientation::Vertical => Rect::from_min_size(
            Pos2::new(rect.left() + 2.0, rect.top() + start),
            Vec2::new(rect.width() - 4.0, length),
        ),
    };

    let response = ui.interact(rect, id, Sense::click_and_drag());
    let fill = if response.dragged() || response.hovered() {
        theme::SCROLL_THUMB_ACTIVE
    } else {
        theme::SCROLL_THUMB
    };
    painter.rect_filled(thumb, Rounding::same(4.0), fill);

    let along = |v: Vec2| match orientation {
        Orientation::Horizontal => v.x,
        Orientation::Vertical => v.y,
    };
    if response.dragged() {
        let delta = along(response.drag_delta());
        if delta != 0.0 {
            return Some(offset_for_drag(track, content, viewport, offset, delta));
        }
    } else if response.clicked() {
        // Page towards the click.
        let pos = response.interact_pointer_pos()?;
        let at = along(pos - rect.min);
        let page = if at < start { -viewport } else { viewport };
        return Some((offset + page).clamp(0.0, content - viewport));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_thumb_when_content_fits() {
        assert_eq!(thumb_geometry(100.0, 80.0, 100.0, 0.0), None);
    }

    #[test]
    fn thumb_scales_and_tracks_offset() {
        let (start, length) = thumb_geometry(200.0, 1000.0, 200.0, 0.0).unwrap();
        assert_eq!((start, length), (0.0, 40.0));
        let (start, _) = thumb_geometry(200.0, 1000.0, 200.0, 800.0).unwrap();
        assert_eq!(start, 160.0);
    }

    #[test]
    fn dragging_the_thumb_maps_back_to_content() {
        let offset = offset_for_drag(200.0, 1000.0, 200.0, 0.0, 80.0);
        assert_eq!(offset, 400.0);
        assert_eq!(offset_for_drag(200.0, 1000.0, 200.0, 700.0, 500.0), 800.0);
    }
}
