//! Error definitions for the mapping module

use crate::persistence::StoreError;
use thiserror::Error;

/// Errors raised while decoding, validating or persisting a mapping
#[derive(Debug, Error)]
pub enum MappingError {
    /// An axis descriptor carried a direction other than +1 / -1
    #[error("Invalid axis direction: {0}")]
    InvalidDirection(i64),

    /// A physical input descriptor could not be decoded
    #[error("Invalid input descriptor for {role}: {reason}")]
    InvalidDescriptor { role: String, reason: String },

    /// The document is not a usable mapping
    #[error("Invalid mapping document: {0}")]
    InvalidDocument(String),

    #[error("Invalid background color: {0}")]
    InvalidColor(String),

    #[error("Serialization failed: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
