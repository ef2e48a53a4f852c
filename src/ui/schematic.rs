//! Painter for the controller schematic and the cat's paws.

use eframe::egui::{self, pos2, vec2, Align2, FontId, Pos2, Rect, Sense, Stroke};

use super::common::UiColors;
use crate::calibration::steps::{position_of, HIGHLIGHT_RADIUS, SCHEMATIC_SIZE};
use crate::calibration::{CalibrationStep, CALIBRATION_STEPS};
use crate::mapping::LogicalInput;
use crate::visualization::{HandPose, VisualState};

const BUTTON_RADIUS: f32 = 18.0;
const UP_BUTTON_RADIUS: f32 = 24.0;
const PAW_RADIUS: f32 = 14.0;

// Paw positions while nothing is held
const LEFT_PAW_REST: (f32, f32) = (140.0, 215.0);
const RIGHT_PAW_REST: (f32, f32) = (320.0, 215.0);

/// Maps schematic coordinates into the allocated screen rect
struct Layout {
    origin: Pos2,
    scale: f32,
}

impl Layout {
    fn new(rect: Rect) -> Self {
        let (width, height) = SCHEMATIC_SIZE;
        let scale = (rect.width() / width).min(rect.height() / height).max(0.1);
        let origin = rect.center() - vec2(width, height) * scale / 2.0;
        Self { origin, scale }
    }

    fn to_screen(&self, (x, y): (f32, f32)) -> Pos2 {
        self.origin + vec2(x, y) * self.scale
    }

    fn size(&self, value: f32) -> f32 {
        value * self.scale
    }
}

fn label_of(input: LogicalInput) -> String {
    match (input, input.action_index()) {
        (_, Some(index)) => (index + 1).to_string(),
        (LogicalInput::Left, _) => "L".to_string(),
        (LogicalInput::Right, _) => "R".to_string(),
        (LogicalInput::Up, _) => "U".to_string(),
        _ => "D".to_string(),
    }
}

fn hand_target(pose: HandPose) -> (f32, f32) {
    let direction = match pose {
        HandPose::Neutral => return LEFT_PAW_REST,
        HandPose::Left => LogicalInput::Left,
        HandPose::Down => LogicalInput::Down,
        HandPose::Right => LogicalInput::Right,
        HandPose::Up => LogicalInput::Up,
    };
    position_of(direction).unwrap_or(LEFT_PAW_REST)
}

fn arm_target(arm_index: Option<usize>) -> (f32, f32) {
    arm_index
        .and_then(|index| LogicalInput::ACTIONS.get(index).copied())
        .and_then(position_of)
        .unwrap_or(RIGHT_PAW_REST)
}

/// Paints the schematic into the remaining space of `ui`.
pub fn paint(ui: &mut egui::Ui, visual: &VisualState, highlight: Option<&CalibrationStep>) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let layout = Layout::new(response.rect);

    let body = Rect::from_min_max(
        layout.to_screen((40.0, 20.0)),
        layout.to_screen((SCHEMATIC_SIZE.0 - 40.0, SCHEMATIC_SIZE.1 - 20.0)),
    );
    painter.rect_filled(body, layout.size(16.0), UiColors::BODY);

    for step in CALIBRATION_STEPS.iter() {
        let center = layout.to_screen(step.position);
        let radius = if step.input == LogicalInput::Up {
            UP_BUTTON_RADIUS
        } else {
            BUTTON_RADIUS
        };
        let active = visual.is_active(step.input);
        let fill = match (step.input.is_directional(), active) {
            (true, true) => UiColors::DIRECTIONAL_ACTIVE,
            (true, false) => UiColors::DIRECTIONAL,
            (false, true) => UiColors::ACTION_ACTIVE,
            (false, false) => UiColors::ACTION,
        };

        painter.circle(
            center,
            layout.size(radius),
            fill,
            Stroke::new(layout.size(2.0), UiColors::BORDER),
        );
        painter.text(
            center,
            Align2::CENTER_CENTER,
            label_of(step.input),
            FontId::proportional(layout.size(11.0)),
            if active { UiColors::BODY } else { UiColors::LABEL },
        );
    }

    if let Some(step) = highlight {
        painter.circle(
            layout.to_screen(step.position),
            layout.size(HIGHLIGHT_RADIUS),
            UiColors::HIGHLIGHT_FILL,
            Stroke::new(layout.size(4.0), UiColors::HIGHLIGHT_STROKE),
        );
    }

    // paws hover slightly below the button they rest on
    let paw_offset = vec2(0.0, layout.size(BUTTON_RADIUS + 4.0));
    for target in [hand_target(visual.hand_pose), arm_target(visual.arm_index)] {
        painter.circle(
            layout.to_screen(target) + paw_offset,
            layout.size(PAW_RADIUS),
            UiColors::PAW,
            Stroke::new(layout.size(1.5), UiColors::BORDER),
        );
    }

    painter.text(
        pos2(body.left() + layout.size(8.0), body.bottom() - layout.size(6.0)),
        Align2::LEFT_BOTTOM,
        format!(
            "hand {}  arm {}",
            visual.hand_pose.index(),
            visual
                .arm_index
                .map(|index| (index + 1).to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        FontId::monospace(layout.size(10.0)),
        UiColors::LABEL,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paws_follow_pose_and_arm() {
        assert_eq!(hand_target(HandPose::Neutral), LEFT_PAW_REST);
        assert_eq!(hand_target(HandPose::Up), (245.0, 180.0));
        assert_eq!(arm_target(None), RIGHT_PAW_REST);
        // Action5 sits top row left
        assert_eq!(arm_target(Some(4)), (260.0, 60.0));
        assert_eq!(arm_target(Some(42)), RIGHT_PAW_REST);
    }

    #[test]
    fn labels() {
        assert_eq!(label_of(LogicalInput::Action8), "8");
        assert_eq!(label_of(LogicalInput::Down), "D");
    }
}
