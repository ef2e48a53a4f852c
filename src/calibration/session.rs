use tracing::{debug, info, warn};

use super::steps::{CalibrationStep, CALIBRATION_STEPS};
use crate::controller::Snapshot;
use crate::mapping::{AxisDirection, LogicalInput, Mapping, PhysicalInput};

/// Axis value that counts as a deliberate push
pub const AXIS_THRESHOLD: f32 = 0.5;

/// Distance from the resting value within which an axis counts as released
pub const AXIS_DEADZONE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    /// Waiting for a fresh press for the current step
    AwaitingInput,
    /// The given input was just bound and has to be let go first
    AwaitingRelease(PhysicalInput),
    Complete,
}

/// Emitted once per accepted binding
#[derive(Debug, Clone, PartialEq)]
pub struct StepAdvance {
    /// Number of roles bound so far, 1 after the first binding
    pub step_index: usize,
    pub total_steps: usize,
    /// Step that was just bound
    pub step: CalibrationStep,
}

/// Transient state of one guided calibration run.
///
/// Fed one snapshot per tick. Bindings are edge triggered and every binding has
/// to be released before the next step accepts input.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    step_index: usize,
    pending: Mapping,
    phase: CalibrationPhase,
    previous_buttons: Vec<bool>,
    previous_axes: Vec<f32>,
    resting_axes: Vec<f32>,
}

impl CalibrationSession {
    /// Starts at the first step. With a reading at hand, anything already held
    /// counts as "previous" and will not bind until pressed again.
    pub fn start(current: Option<&Snapshot>) -> Self {
        let (previous_buttons, previous_axes) = match current {
            Some(snapshot) => (snapshot.button_states(), snapshot.axes.clone()),
            None => (Vec::new(), Vec::new()),
        };

        info!("Calibration started: {}", CALIBRATION_STEPS[0].prompt);

        Self {
            step_index: 0,
            pending: Mapping::new(),
            phase: CalibrationPhase::AwaitingInput,
            resting_axes: previous_axes.clone(),
            previous_buttons,
            previous_axes,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn total_steps(&self) -> usize {
        CALIBRATION_STEPS.len()
    }

    /// Step waiting for input, `None` once complete
    pub fn current_step(&self) -> Option<&'static CalibrationStep> {
        CALIBRATION_STEPS.get(self.step_index)
    }

    #[cfg(test)]
    pub fn pending(&self) -> &Mapping {
        &self.pending
    }

    pub fn is_complete(&self) -> bool {
        self.phase == CalibrationPhase::Complete
    }

    /// Hands out the learned mapping
    pub fn into_mapping(self) -> Mapping {
        self.pending
    }

    /// Advances the state machine by one reading
    pub fn tick(&mut self, snapshot: &Snapshot) -> Option<StepAdvance> {
        let advance = match self.phase {
            CalibrationPhase::Complete => return None,
            CalibrationPhase::AwaitingRelease(bound) => {
                if self.is_released(bound, snapshot) {
                    debug!("{} released", bound);
                    self.phase = CalibrationPhase::AwaitingInput;
                    self.resting_axes = snapshot.axes.clone();
                }
                None
            }
            CalibrationPhase::AwaitingInput => self
                .detect_press(snapshot)
                .map(|physical| self.accept(physical, snapshot)),
        };

        self.previous_buttons = snapshot.button_states();
        self.previous_axes = snapshot.axes.clone();
        advance
    }

    fn is_released(&self, bound: PhysicalInput, snapshot: &Snapshot) -> bool {
        match bound {
            PhysicalInput::Button(index) => !snapshot.button_pressed(index),
            PhysicalInput::Axis { index, .. } => {
                let current = snapshot.axis(index).unwrap_or(0.0);
                let resting = self.resting_axes.get(index).copied().unwrap_or(0.0);
                (current - resting).abs() <= AXIS_DEADZONE
            }
        }
    }

    // Buttons win over axes within the same reading
    fn detect_press(&self, snapshot: &Snapshot) -> Option<PhysicalInput> {
        let button = snapshot
            .buttons
            .iter()
            .enumerate()
            .find(|(index, button)| {
                button.pressed && !self.previous_buttons.get(*index).copied().unwrap_or(false)
            })
            .map(|(index, _)| PhysicalInput::Button(index));

        button.or_else(|| {
            snapshot
                .axes
                .iter()
                .enumerate()
                .find(|(index, value)| {
                    let previous = self.previous_axes.get(*index).copied().unwrap_or(0.0);
                    previous <= AXIS_THRESHOLD && **value > AXIS_THRESHOLD
                })
                .map(|(index, _)| PhysicalInput::Axis {
                    index,
                    direction: AxisDirection::Positive,
                })
        })
    }

    fn accept(&mut self, physical: PhysicalInput, snapshot: &Snapshot) -> StepAdvance {
        let step = CALIBRATION_STEPS[self.step_index];

        let shared_with: Vec<LogicalInput> = self
            .pending
            .iter()
            .filter(|(_, existing)| *existing == physical)
            .map(|(role, _)| role)
            .collect();
        if !shared_with.is_empty() {
            warn!(
                "{} is already bound to {:?}, binding it to {} as well",
                physical, shared_with, step.display_name
            );
        }

        self.pending.bind(step.input, physical);
        self.step_index += 1;
        self.resting_axes = snapshot.axes.clone();

        self.phase = if self.step_index == CALIBRATION_STEPS.len() {
            info!("Calibration complete, all {} roles bound", self.step_index);
            CalibrationPhase::Complete
        } else {
            CalibrationPhase::AwaitingRelease(physical)
        };

        info!(
            "Bound {} to {} ({} of {})",
            step.display_name,
            physical,
            self.step_index,
            CALIBRATION_STEPS.len()
        );

        StepAdvance {
            step_index: self.step_index,
            total_steps: CALIBRATION_STEPS.len(),
            step,
        }
    }
}
