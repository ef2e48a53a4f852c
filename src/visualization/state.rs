use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::mapping::LogicalInput;

/// Where directionals are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionalSource {
    /// Bound input of each directional role, or the configured stick
    #[default]
    Buttons,
    /// The configured stick only
    Axes,
}

/// Fixed stick settings for directionals, independent of calibration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectionalSettings {
    pub directional_source: DirectionalSource,
    pub axis_index_x: usize,
    pub axis_index_y: usize,
    pub invert_x: bool,
    pub invert_y: bool,
}

impl Default for DirectionalSettings {
    fn default() -> Self {
        Self {
            directional_source: DirectionalSource::Buttons,
            axis_index_x: 0,
            axis_index_y: 1,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Artwork variant of the directional hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandPose {
    #[default]
    Neutral,
    Left,
    Down,
    Right,
    Up,
}

impl HandPose {
    pub fn index(self) -> u8 {
        match self {
            HandPose::Neutral => 0,
            HandPose::Left => 1,
            HandPose::Down => 2,
            HandPose::Right => 3,
            HandPose::Up => 4,
        }
    }

    pub fn for_direction(direction: LogicalInput) -> Self {
        match direction {
            LogicalInput::Left => HandPose::Left,
            LogicalInput::Down => HandPose::Down,
            LogicalInput::Right => HandPose::Right,
            LogicalInput::Up => HandPose::Up,
            _ => HandPose::Neutral,
        }
    }
}

/// What the overlay shows this frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisualState {
    pub active_actions: BTreeSet<LogicalInput>,
    /// -1 left, 1 right, 0 neither or both
    pub directional_x: i8,
    /// -1 up, 1 down, 0 neither or both
    pub directional_y: i8,
    /// Index of the action the arm rests on (`Action1` is 0), `None` when idle
    pub arm_index: Option<usize>,
    pub hand_pose: HandPose,
}

impl VisualState {
    pub fn is_active(&self, role: LogicalInput) -> bool {
        match role {
            LogicalInput::Left => self.directional_x == -1,
            LogicalInput::Right => self.directional_x == 1,
            LogicalInput::Up => self.directional_y == -1,
            LogicalInput::Down => self.directional_y == 1,
            action => self.active_actions.contains(&action),
        }
    }
}

/// "Last pressed" memory carried from one frame to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReducerMemory {
    /// Index into `LogicalInput::ACTIONS`
    pub last_action: Option<usize>,
    /// Index into `LogicalInput::DIRECTIONALS`
    pub last_directional: Option<usize>,
    pub previous_actions: [bool; 8],
    pub previous_directionals: [bool; 4],
}
