//! Build errors for definition and transition builders.

use crate::lint::TableDefect;
use thiserror::Error;

/// Errors that can occur when building definitions and transitions.
///
/// Each one is a defect in a behaviour's declaration, not a runtime condition.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Entry state not specified. Call .entry(state) before .build()")]
    MissingEntryState,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Instant transition {from} -> {to} has a guard or action that needs a message")]
    MessageArityOnInstant { from: String, to: String },

    #[error("Transition table has {} defect(s): {}", .0.len(), list(.0))]
    Defects(Vec<TableDefect>),
}

fn list(defects: &[TableDefect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
