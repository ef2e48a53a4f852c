//! # Mapping Module
//!
//! Owns the association between the overlay's logical roles and the physical
//! buttons/axes of the connected gamepad, and its persistence.
//!
//! - [`types`]: `LogicalInput`, `PhysicalInput` and the `Mapping` itself
//! - [`store`]: load/save through a key-value store, JSON import and export
//! - [`error`]: `MappingError`

pub mod error;
pub mod store;
pub mod types;

pub use error::MappingError;
pub use store::{ImportOutcome, MappingStore};
pub use types::{AxisDirection, LogicalInput, Mapping, PhysicalInput};
