//! Shared colours and helpers for the overlay UI.

use egui::{Color32, Frame, Stroke};

use crate::mapping::store::{parse_hex_color, DEFAULT_BACKGROUND_COLOR};

/// Palette of the controller schematic.
pub struct UiColors;

impl UiColors {
    /// Controller body
    pub const BODY: Color32 = Color32::from_rgb(30, 30, 30);

    /// Outline of buttons and body
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Directional button at rest
    pub const DIRECTIONAL: Color32 = Color32::from_rgb(120, 30, 30);

    /// Directional button while held
    pub const DIRECTIONAL_ACTIVE: Color32 = Color32::from_rgb(230, 60, 60);

    /// Action button at rest
    pub const ACTION: Color32 = Color32::from_rgb(70, 70, 70);

    /// Action button while held
    pub const ACTION_ACTIVE: Color32 = Color32::from_rgb(240, 240, 240);

    pub const LABEL: Color32 = Color32::from_rgb(200, 200, 200);

    /// Fill of the calibration highlight ring (yellow, 60 % opacity)
    pub const HIGHLIGHT_FILL: Color32 = Color32::from_rgba_premultiplied(153, 153, 0, 153);

    /// Stroke of the calibration highlight ring
    pub const HIGHLIGHT_STROKE: Color32 = Color32::from_rgb(0xff, 0x6b, 0x6b);

    /// Cat paws
    pub const PAW: Color32 = Color32::from_rgb(250, 245, 235);
}

pub fn panel_frame(fill: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::NONE)
        .fill(fill)
        .inner_margin(4)
}

/// `#RRGGBB` to a colour, falling back to the default background
pub fn color_from_hex(color: &str) -> Color32 {
    let [r, g, b] = parse_hex_color(color)
        .or_else(|| parse_hex_color(DEFAULT_BACKGROUND_COLOR))
        .unwrap_or([0, 255, 0]);
    Color32::from_rgb(r, g, b)
}

pub fn rgb_of(color: Color32) -> [u8; 3] {
    [color.r(), color.g(), color.b()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_convert_both_ways() {
        let color = color_from_hex("#ff6b6b");
        assert_eq!(color, UiColors::HIGHLIGHT_STROKE);
        assert_eq!(rgb_of(color), [0xff, 0x6b, 0x6b]);
        assert_eq!(color_from_hex("nonsense"), Color32::from_rgb(0, 255, 0));
    }
}
