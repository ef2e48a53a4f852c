//! Per-frame visual state of the overlay.
//!
//! [`reduce`] is a pure function of mapping, reading and the previous frame's
//! memory. [`Visualizer`] owns that memory for the overlay loop and reports
//! only frames whose visual state differs from the last one.

pub mod reducer;
pub mod state;

pub use reducer::{input_active, reduce, role_active};
pub use state::{
    DirectionalSettings, DirectionalSource, HandPose, ReducerMemory, VisualState,
};

use crate::controller::Snapshot;
use crate::mapping::Mapping;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Visualizer {
    settings: DirectionalSettings,
    memory: ReducerMemory,
    last_state: Option<VisualState>,
}

impl Visualizer {
    pub fn new(settings: DirectionalSettings) -> Self {
        Self {
            settings,
            memory: ReducerMemory::default(),
            last_state: None,
        }
    }

    /// Reduces one reading; returns the new state only if it changed
    pub fn update(&mut self, mapping: &Mapping, snapshot: &Snapshot) -> Option<&VisualState> {
        let (state, memory) = reduce(mapping, snapshot, &self.settings, &self.memory);
        self.memory = memory;

        if self.last_state.as_ref() == Some(&state) {
            return None;
        }
        debug!(
            "Visual state: x {} y {} arm {:?} hand {:?}",
            state.directional_x, state.directional_y, state.arm_index, state.hand_pose
        );
        self.last_state = Some(state);
        self.last_state.as_ref()
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<&VisualState> {
        self.last_state.as_ref()
    }

    /// Forgets memories and the last reported state
    pub fn reset(&mut self) {
        self.memory = ReducerMemory::default();
        self.last_state = None;
    }
}
