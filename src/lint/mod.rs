//! Validation-based lints for transition tables.
//!
//! A table can be well-typed and still be wrong: a transition hidden behind
//! an earlier unguarded one never fires, and a ring of unguarded instant
//! transitions spins until the step budget stops it. `Definition::lint`
//! reports every such defect at once using Stillwater's `Validation`.
//!
//! # Example
//!
//! ```rust
//! use tickmind::builder::message_transition;
//! use tickmind::machine::Definition;
//! use tickmind::state_enum;
//! # use tickmind::core::Message;
//! # #[derive(Clone, Debug)] struct Nudge;
//! # impl Message for Nudge { type Kind = (); fn kind(&self) -> Self::Kind {} }
//!
//! state_enum! {
//!     enum Valve {
//!         Shut,
//!         Open,
//!         Stuck,
//!     }
//! }
//!
//! let mut def: Definition<Valve, Nudge, ()> = Definition::new(Valve::Shut);
//! def.add_transition(message_transition(Valve::Shut, Valve::Open, ()));
//! def.add_transition(message_transition(Valve::Shut, Valve::Stuck, ()));
//!
//! assert!(!def.lint().is_success());
//! ```

pub mod defects;
mod rules;

pub use defects::TableDefect;
