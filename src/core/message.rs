//! Message families.
//!
//! A behaviour family talks in one closed enum. Each variant has a `Kind`,
//! a plain copyable discriminant that transitions are declared against.

use std::fmt::Debug;
use std::hash::Hash;

/// An immutable message belonging to one behaviour family.
///
/// # Example
///
/// ```rust
/// use tickmind::core::Message;
///
/// #[derive(Clone, Debug)]
/// enum Herd {
///     Tick(f32),
///     Spooked { by: u32 },
/// }
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum HerdKind {
///     Tick,
///     Spooked,
/// }
///
/// impl Message for Herd {
///     type Kind = HerdKind;
///
///     fn kind(&self) -> HerdKind {
///         match self {
///             Self::Tick(_) => HerdKind::Tick,
///             Self::Spooked { .. } => HerdKind::Spooked,
///         }
///     }
///
///     fn suppress_logs(&self) -> bool {
///         matches!(self, Self::Tick(_))
///     }
/// }
///
/// assert_eq!(Herd::Spooked { by: 3 }.kind(), HerdKind::Spooked);
/// assert!(!Herd::Spooked { by: 3 }.suppress_logs());
/// ```
pub trait Message: Clone + Debug + 'static {
    /// Discriminant that transitions match on.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;

    /// Whether processing this message alone is too routine to log.
    ///
    /// Default implementation returns `true`.
    fn suppress_logs(&self) -> bool {
        true
    }
}
