//! Composition error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when attaching or detaching model parts
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompositionError {
    /// Another part is already registered under the same data type
    #[error("Model {model} already has a different {part} part")]
    PartConflict { part: &'static str, model: Uuid },

    /// The part being removed is not the one registered under its type
    #[error("The {part} part being removed is not the one attached to model {model}")]
    PartMismatch { part: &'static str, model: Uuid },

    /// The part still belongs to another model
    #[error("The {part} part is still attached to model {owner}")]
    AttachedElsewhere { part: &'static str, owner: Uuid },
}
