//! Gamepad input: per-tick snapshots from gilrs plus device health and frame
//! statistics for the overlay loop.

pub mod frame_stats;
pub mod health;
pub mod snapshot;
pub mod source;

pub use frame_stats::FrameMonitor;
pub use health::{HealthSettings, InputHealth};
pub use snapshot::{ButtonValue, Snapshot};
pub use source::{GamepadSource, GilrsSource, SourceError};
