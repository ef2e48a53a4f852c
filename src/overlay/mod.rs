//! # Overlay Controller
//!
//! Top-level owner of everything that lives across ticks: the live mapping,
//! the calibration session while one runs, the reducer memories and the device
//! health counter. The presentation layer calls [`OverlayController::tick`] once
//! per frame and receives declarative updates through an [`OverlaySink`].
//!
//! ## Tick Flow
//! ```text
//! poll() ──► None ─────────────► skip frame
//!        └─► Snapshot ─► health ─► unhealthy ─► skip frame
//!                               └─► Calibrating ─► CalibrationSession::tick ─► step advance / finish
//!                               └─► Visualizing ─► Visualizer::update ─► visual state changed
//! ```
//!
//! ## Error Handling Strategy
//! Nothing that happens inside a tick stops the loop. Failures are logged at
//! the tick boundary and the next frame proceeds. A calibration whose result
//! cannot be persisted stays live for the rest of the run.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::calibration::{CalibrationSession, CalibrationStep};
use crate::controller::{HealthSettings, InputHealth, Snapshot};
use crate::mapping::{ImportOutcome, Mapping, MappingError, MappingStore};
use crate::visualization::{DirectionalSettings, VisualState, Visualizer};

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Failed to persist calibration: {0}")]
    PersistError(MappingError),

    #[error("Mapping store error: {0}")]
    StoreError(#[from] MappingError),
}

/// How a calibration run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    Completed,
    Skipped,
}

/// Receives the controller's declarative updates.
pub trait OverlaySink {
    /// A role was bound. `step_index` counts bound roles, `display_name` names
    /// the step that was just bound.
    fn on_calibration_step_advance(
        &mut self,
        step_index: usize,
        total_steps: usize,
        display_name: &str,
    );

    /// The visual state differs from the last reported one
    fn on_visual_state_changed(&mut self, state: &VisualState);

    fn on_calibration_started(&mut self) {}

    fn on_calibration_finished(&mut self, _outcome: CalibrationOutcome) {}
}

pub enum OverlayMode {
    Calibrating(CalibrationSession),
    Visualizing,
}

pub struct OverlayController {
    mapping: Mapping,
    store: MappingStore,
    mode: OverlayMode,
    visualizer: Visualizer,
    health: InputHealth,
    last_snapshot: Option<Snapshot>,
}

impl OverlayController {
    /// Loads the stored mapping. Without one the defaults go live and a
    /// calibration run starts right away.
    pub fn new(
        store: MappingStore,
        directional: DirectionalSettings,
        health: HealthSettings,
    ) -> Self {
        let (mapping, mode) = match store.load() {
            Some(mapping) => {
                info!("Using stored calibration");
                (mapping.with_defaults(), OverlayMode::Visualizing)
            }
            None => {
                info!("No usable calibration stored, starting calibration");
                (
                    Mapping::default_bindings(),
                    OverlayMode::Calibrating(CalibrationSession::start(None)),
                )
            }
        };

        Self {
            mapping,
            store,
            mode,
            visualizer: Visualizer::new(directional),
            health: InputHealth::new(health),
            last_snapshot: None,
        }
    }

    /// Runs one frame. `None` means no device this frame.
    pub fn tick(&mut self, snapshot: Option<&Snapshot>, sink: &mut dyn OverlaySink) {
        if let Err(e) = self.try_tick(snapshot, sink) {
            error!("Overlay tick failed: {}", e);
        }
    }

    fn try_tick(
        &mut self,
        snapshot: Option<&Snapshot>,
        sink: &mut dyn OverlaySink,
    ) -> Result<(), OverlayError> {
        let Some(snapshot) = snapshot else {
            return Ok(());
        };
        if !self.health.check(snapshot) {
            return Ok(());
        }
        self.last_snapshot = Some(snapshot.clone());

        match &mut self.mode {
            OverlayMode::Calibrating(session) => {
                if let Some(advance) = session.tick(snapshot) {
                    sink.on_calibration_step_advance(
                        advance.step_index,
                        advance.total_steps,
                        advance.step.display_name,
                    );
                }
                if session.is_complete() {
                    self.finish_calibration(sink)?;
                }
            }
            OverlayMode::Visualizing => {
                if let Some(state) = self.visualizer.update(&self.mapping, snapshot) {
                    sink.on_visual_state_changed(state);
                }
            }
        }
        Ok(())
    }

    fn finish_calibration(&mut self, sink: &mut dyn OverlaySink) -> Result<(), OverlayError> {
        let mode = std::mem::replace(&mut self.mode, OverlayMode::Visualizing);
        let OverlayMode::Calibrating(session) = mode else {
            return Ok(());
        };

        let mapping = session.into_mapping();
        for (physical, roles) in mapping.duplicate_bindings() {
            warn!("{} is bound to several roles: {:?}", physical, roles);
        }

        self.mapping = mapping;
        self.reset_runtime_state();
        sink.on_calibration_finished(CalibrationOutcome::Completed);
        info!("Calibration finished, new mapping is live");

        self.store
            .save(&self.mapping)
            .map_err(OverlayError::PersistError)
    }

    /// Starts a fresh calibration run, dropping any run in progress
    pub fn start_calibration(&mut self, sink: &mut dyn OverlaySink) {
        let session = CalibrationSession::start(self.last_snapshot.as_ref());
        self.mode = OverlayMode::Calibrating(session);
        self.health.reset();
        sink.on_calibration_started();
    }

    /// Aborts calibration; the live mapping stays as it was
    pub fn skip_calibration(&mut self, sink: &mut dyn OverlaySink) {
        if let OverlayMode::Calibrating(session) = &self.mode {
            info!(
                "Calibration skipped after {} of {} steps",
                session.step_index(),
                session.total_steps()
            );
            self.mode = OverlayMode::Visualizing;
            self.reset_runtime_state();
            sink.on_calibration_finished(CalibrationOutcome::Skipped);
        }
    }

    /// Forgets the stored calibration and starts over
    pub fn reset_calibration(&mut self, sink: &mut dyn OverlaySink) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear stored calibration: {}", e);
        }
        self.start_calibration(sink);
    }

    /// Imports a document and makes its mapping live
    pub fn import_document(
        &mut self,
        text: &str,
        sink: &mut dyn OverlaySink,
    ) -> Result<ImportOutcome, OverlayError> {
        let outcome = self.store.import_document(text)?;
        self.mapping = outcome.mapping.clone().with_defaults();
        if let OverlayMode::Calibrating(_) = self.mode {
            self.mode = OverlayMode::Visualizing;
            sink.on_calibration_finished(CalibrationOutcome::Skipped);
        }
        self.reset_runtime_state();
        Ok(outcome)
    }

    pub fn export_document(&self) -> Result<String, OverlayError> {
        Ok(self.store.export_document()?)
    }

    pub fn background_color(&self) -> String {
        self.store.background_color()
    }

    pub fn set_background_color(&mut self, color: &str) -> Result<(), OverlayError> {
        Ok(self.store.set_background_color(color)?)
    }

    #[cfg(test)]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(self.mode, OverlayMode::Calibrating(_))
    }

    /// Step currently prompted for, if calibrating
    pub fn current_step(&self) -> Option<&'static CalibrationStep> {
        match &self.mode {
            OverlayMode::Calibrating(session) => session.current_step(),
            OverlayMode::Visualizing => None,
        }
    }

    /// `(bound, total)` while calibrating
    pub fn calibration_progress(&self) -> Option<(usize, usize)> {
        match &self.mode {
            OverlayMode::Calibrating(session) => {
                Some((session.step_index(), session.total_steps()))
            }
            OverlayMode::Visualizing => None,
        }
    }

    fn reset_runtime_state(&mut self) {
        self.visualizer.reset();
        self.health.reset();
    }
}
