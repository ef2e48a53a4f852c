use crate::mapping::LogicalInput;

/// Radius of the highlight ring drawn around the button being calibrated
pub const HIGHLIGHT_RADIUS: f32 = 28.0;

/// Width and height of the schematic coordinate space the positions refer to
pub const SCHEMATIC_SIZE: (f32, f32) = (460.0, 240.0);

/// One prompt of the guided calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationStep {
    pub input: LogicalInput,
    pub display_name: &'static str,
    pub prompt: &'static str,
    /// Centre of the button on the controller schematic
    pub position: (f32, f32),
}

/// Fixed calibration order: directionals first, then the top row of action
/// buttons, then the bottom row.
pub const CALIBRATION_STEPS: [CalibrationStep; 12] = [
    CalibrationStep {
        input: LogicalInput::Left,
        display_name: "Left",
        prompt: "Press the LEFT (red, leftmost) button",
        position: (90.0, 100.0),
    },
    CalibrationStep {
        input: LogicalInput::Down,
        display_name: "Down",
        prompt: "Press the DOWN (red, upper middle) button",
        position: (140.0, 80.0),
    },
    CalibrationStep {
        input: LogicalInput::Right,
        display_name: "Right",
        prompt: "Press the RIGHT (red, rightmost) button",
        position: (190.0, 100.0),
    },
    CalibrationStep {
        input: LogicalInput::Up,
        display_name: "Up",
        prompt: "Press the UP (red, large, bottom) button",
        position: (245.0, 180.0),
    },
    CalibrationStep {
        input: LogicalInput::Action5,
        display_name: "Button 5",
        prompt: "Press the button that corresponds to Button 5 (top row, leftmost)",
        position: (260.0, 60.0),
    },
    CalibrationStep {
        input: LogicalInput::Action6,
        display_name: "Button 6",
        prompt: "Press the button that corresponds to Button 6 (top row, second)",
        position: (300.0, 60.0),
    },
    CalibrationStep {
        input: LogicalInput::Action7,
        display_name: "Button 7",
        prompt: "Press the button that corresponds to Button 7 (top row, third)",
        position: (340.0, 60.0),
    },
    CalibrationStep {
        input: LogicalInput::Action8,
        display_name: "Button 8",
        prompt: "Press the button that corresponds to Button 8 (top row, rightmost)",
        position: (380.0, 60.0),
    },
    CalibrationStep {
        input: LogicalInput::Action1,
        display_name: "Button 1",
        prompt: "Press the button that corresponds to Button 1 (bottom row, leftmost)",
        position: (260.0, 110.0),
    },
    CalibrationStep {
        input: LogicalInput::Action2,
        display_name: "Button 2",
        prompt: "Press the button that corresponds to Button 2 (bottom row, second)",
        position: (300.0, 110.0),
    },
    CalibrationStep {
        input: LogicalInput::Action3,
        display_name: "Button 3",
        prompt: "Press the button that corresponds to Button 3 (bottom row, third)",
        position: (340.0, 110.0),
    },
    CalibrationStep {
        input: LogicalInput::Action4,
        display_name: "Button 4",
        prompt: "Press the button that corresponds to Button 4 (bottom row, rightmost)",
        position: (380.0, 110.0),
    },
];

/// Schematic position of a role, regardless of calibration progress
pub fn position_of(input: LogicalInput) -> Option<(f32, f32)> {
    CALIBRATION_STEPS
        .iter()
        .find(|step| step.input == input)
        .map(|step| step.position)
}

pub fn progress_text(bound: usize) -> String {
    format!("{} of {} buttons mapped", bound, CALIBRATION_STEPS.len())
}
