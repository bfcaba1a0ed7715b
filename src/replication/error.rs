//! Replication error types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding replicated messages
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Envelope version is not supported by this version
    #[error("Unsupported envelope version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The envelope carries a different message type than requested
    #[error("Envelope carries {found}, expected {expected}")]
    TypeMismatch { expected: String, found: String },
}
