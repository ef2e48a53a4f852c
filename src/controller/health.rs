use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::snapshot::Snapshot;

/// Limits a reading has to meet before it is fed to calibration or the reducer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HealthSettings {
    /// Fewer buttons than this marks the device as unhealthy
    pub min_buttons: usize,
    /// Fewer axes than this marks the device as unhealthy
    pub min_axes: usize,
    /// Consecutive bad readings before the monitor warns and starts over
    pub max_validation_errors: u32,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            min_buttons: 4,
            min_axes: 2,
            max_validation_errors: 10,
        }
    }
}

/// Tracks consecutive unusable readings.
#[derive(Debug, Clone, Default)]
pub struct InputHealth {
    settings: HealthSettings,
    validation_errors: u32,
}

impl InputHealth {
    pub fn new(settings: HealthSettings) -> Self {
        Self {
            settings,
            validation_errors: 0,
        }
    }

    /// Returns whether `snapshot` may be used this frame
    pub fn check(&mut self, snapshot: &Snapshot) -> bool {
        let healthy = snapshot.button_count() >= self.settings.min_buttons
            && snapshot.axis_count() >= self.settings.min_axes;

        if healthy {
            self.validation_errors = 0;
            return true;
        }

        self.validation_errors += 1;
        debug!(
            "Unusable gamepad reading ({} buttons, {} axes), {} in a row",
            snapshot.button_count(),
            snapshot.axis_count(),
            self.validation_errors
        );

        if self.validation_errors >= self.settings.max_validation_errors {
            warn!(
                "Gamepad reported {} unusable readings in a row, needs at least {} buttons and {} axes",
                self.validation_errors, self.settings.min_buttons, self.settings.min_axes
            );
            self.validation_errors = 0;
        }

        false
    }

    #[cfg(test)]
    pub fn validation_errors(&self) -> u32 {
        self.validation_errors
    }

    pub fn reset(&mut self) {
        self.validation_errors = 0;
    }
}
