//! Replication of bus messages across a process boundary.
//!
//! A message leaving the process is wrapped in an [`Envelope`] recording its
//! Rust type, so the receiving side can refuse payloads meant for another
//! type instead of misreading them. Transport is left to the caller: these
//! functions only turn messages into bytes and back, and republish decoded
//! messages on a local bus.

use crate::bus::MessageBus;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::ReplicationError;

/// Version identifier for envelope format
pub const ENVELOPE_VERSION: u32 = 1;

/// Encoding used on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Human-readable, via serde_json
    #[default]
    Json,
    /// Compact, via bincode
    Binary,
}

/// A replicated message with its routing metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<M> {
    /// Envelope format version
    pub version: u32,

    /// Unique envelope identifier
    pub id: Uuid,

    /// When the envelope was created
    pub sent_at: DateTime<Utc>,

    /// Rust type name of the payload
    pub message_type: String,

    pub message: M,
}

/// Everything in an envelope but the payload; read first to vet the type.
#[derive(Deserialize)]
struct Header {
    version: u32,
    #[allow(dead_code)]
    id: Uuid,
    #[allow(dead_code)]
    sent_at: DateTime<Utc>,
    message_type: String,
}

impl<M> Envelope<M> {
    pub fn new(message: M) -> Self {
        Self::stamped(message, std::any::type_name::<M>())
    }

    /// A fresh envelope whose header names `message_type`.
    fn stamped(message: M, message_type: &str) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            id: Uuid::new_v4(),
            sent_at: Utc::now(),
            message_type: message_type.to_string(),
            message,
        }
    }
}

/// Wrap `message` in a fresh envelope and encode it.
pub fn encode<M: Serialize>(message: &M, format: WireFormat) -> Result<Vec<u8>, ReplicationError> {
    // Borrowed payload, but the header names `M` so `decode::<M>` accepts it.
    let envelope = Envelope::stamped(message, std::any::type_name::<M>());
    to_bytes(&envelope, format)
}

/// Decode an envelope carrying an `M`.
///
/// The version and type name are checked before the payload is read.
pub fn decode<M: DeserializeOwned>(
    bytes: &[u8],
    format: WireFormat,
) -> Result<Envelope<M>, ReplicationError> {
    let header: Header = from_bytes(bytes, format)?;
    if header.version != ENVELOPE_VERSION {
        return Err(ReplicationError::UnsupportedVersion {
            found: header.version,
            supported: ENVELOPE_VERSION,
        });
    }

    let expected = std::any::type_name::<M>();
    if header.message_type != expected {
        return Err(ReplicationError::TypeMismatch {
            expected: expected.to_string(),
            found: header.message_type,
        });
    }

    from_bytes(bytes, format)
}

/// Decode an `M` and publish it on `bus`; returns the number of receivers.
pub fn republish<M: DeserializeOwned + Clone + 'static>(
    bus: &MessageBus,
    bytes: &[u8],
    format: WireFormat,
) -> Result<usize, ReplicationError> {
    let envelope = decode::<M>(bytes, format)?;
    tracing::trace!(
        envelope = %envelope.id,
        message_type = %envelope.message_type,
        "republishing replicated message"
    );
    Ok(bus.publish(&envelope.message))
}

/// Publish `message` locally and return its encoding for remote peers.
pub fn publish_synced<M: Serialize + Clone + 'static>(
    bus: &MessageBus,
    message: &M,
    format: WireFormat,
) -> Result<Vec<u8>, ReplicationError> {
    let bytes = encode(message, format)?;
    bus.publish(message);
    Ok(bytes)
}

fn to_bytes<T: Serialize>(value: &T, format: WireFormat) -> Result<Vec<u8>, ReplicationError> {
    match format {
        WireFormat::Json => {
            serde_json::to_vec(value).map_err(|e| ReplicationError::SerializationFailed(e.to_string()))
        }
        WireFormat::Binary => {
            bincode::serialize(value).map_err(|e| ReplicationError::SerializationFailed(e.to_string()))
        }
    }
}

fn from_bytes<T: DeserializeOwned>(bytes: &[u8], format: WireFormat) -> Result<T, ReplicationError> {
    match format {
        WireFormat::Json => serde_json::from_slice(bytes)
            .map_err(|e| ReplicationError::DeserializationFailed(e.to_string())),
        WireFormat::Binary => bincode::deserialize(bytes)
            .map_err(|e| ReplicationError::DeserializationFailed(e.to_string())),
    }
}
