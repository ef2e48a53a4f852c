//! # Calibration Module
//!
//! Guided learning of the mapping. The user is prompted for each of the twelve
//! roles in a fixed order and presses the matching control on their stick.
//!
//! ## Key Abstractions
//! - [`steps::CALIBRATION_STEPS`]: the prompts, in order, with the schematic
//!   position highlighted for each
//! - [`session::CalibrationSession`]: the per-tick state machine
//!   (`AwaitingInput` → `AwaitingRelease` → ... → `Complete`)
//!
//! ## Input Rules
//! - A binding is edge triggered: a button has to go from released to pressed
//!   between two readings, an axis has to cross `+0.5` upwards.
//! - Buttons are scanned before axes; the lowest index wins.
//! - After each binding the bound input has to be let go (buttons) or return
//!   within `0.2` of its resting value (axes) before the next step listens.
//!
//! The session only produces the learned mapping. Persisting it and switching
//! the overlay back to visualization is the caller's job.

pub mod session;
pub mod steps;

pub use session::{CalibrationPhase, CalibrationSession, StepAdvance};
pub use steps::{CalibrationStep, CALIBRATION_STEPS};
