//! Core State trait for state machine states.
//!
//! States are opaque, finite values. The resolution engine only needs to
//! compare them, hash them as table keys, and name them in traces.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: States are copied into traces and returned from resolution
/// - `Eq` + `Hash`: States key the transition table
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: Traces are serializable
///
/// # Example
///
/// ```rust
/// use tickmind::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Grazing {
///     Idle,
///     Walking,
///     Eating,
/// }
///
/// impl State for Grazing {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "Idle",
///             Self::Walking => "Walking",
///             Self::Eating => "Eating",
///         }
///     }
/// }
///
/// assert_eq!(Grazing::Walking.name(), "Walking");
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}
