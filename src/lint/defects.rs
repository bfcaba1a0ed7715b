//! Transition table defects.

use thiserror::Error;

/// A structural problem in a definition's transition table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableDefect {
    #[error("Transition #{index} from '{state}' can never fire: #{by} takes the same trigger unguarded")]
    Shadowed {
        state: String,
        index: usize,
        by: usize,
    },

    #[error("Unguarded instant transitions starting at '{state}' loop back to it")]
    InstantCycle { state: String },
}

impl TableDefect {
    /// Name of the state the defect was found in.
    pub fn state(&self) -> &str {
        match self {
            Self::Shadowed { state, .. } | Self::InstantCycle { state } => state,
        }
    }
}
