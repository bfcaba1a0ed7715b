//! Tickmind: reactive, tick-driven state machines for game entities
//!
//! Every entity runs its behaviours as state machines. A behaviour's
//! transition table is declared once, shared by all its instances, and
//! resolved on every tick against the messages the entity received since
//! the previous one.
//!
//! # Core Concepts
//!
//! - **State / Message**: finite states and closed message families
//! - **Definition**: the shared, immutable transition table of a behaviour
//! - **Instance**: one entity's current state and double-buffered mailbox
//! - **MessageBus**: synchronous, typed fan-out to registered handlers
//! - **Model**: an entity composed of typed parts and their components
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use tickmind::builder::{DefinitionBuilder, TransitionBuilder};
//! use tickmind::core::Message;
//! use tickmind::state_enum;
//!
//! state_enum! {
//!     enum Sentry {
//!         Idle,
//!         Alert,
//!         Chase,
//!     }
//! }
//!
//! #[derive(Clone, Debug)]
//! enum Sense {
//!     Noise(f32),
//!     Sighting,
//! }
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
//! enum SenseKind {
//!     Noise,
//!     Sighting,
//! }
//!
//! impl Message for Sense {
//!     type Kind = SenseKind;
//!
//!     fn kind(&self) -> SenseKind {
//!         match self {
//!             Sense::Noise(_) => SenseKind::Noise,
//!             Sense::Sighting => SenseKind::Sighting,
//!         }
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Watch {
//!     suspicion: f32,
//! }
//!
//! let definition = DefinitionBuilder::new()
//!     .entry(Sentry::Idle)
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(Sentry::Idle)
//!             .to(Sentry::Alert)
//!             .on(SenseKind::Noise)
//!             .then_message(|watch: &mut Watch, sense: &Sense| {
//!                 if let Sense::Noise(loudness) = sense {
//!                     watch.suspicion += loudness;
//!                 }
//!                 true
//!             }),
//!     )?
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(Sentry::Alert)
//!             .to(Sentry::Chase)
//!             .on(SenseKind::Sighting),
//!     )?
//!     .build()?;
//!
//! let watch = Rc::new(RefCell::new(Watch::default()));
//! let mut guard = Arc::new(definition).create_instance(Rc::clone(&watch));
//!
//! guard.add_message(Sense::Noise(0.5));
//! guard.add_message(Sense::Sighting);
//! assert_eq!(guard.update(), &Sentry::Chase);
//! assert_eq!(watch.borrow().suspicion, 0.5);
//! # Ok::<(), tickmind::builder::BuildError>(())
//! ```

pub mod builder;
pub mod bus;
pub mod compose;
pub mod core;
pub mod lint;
pub mod machine;
pub mod replication;

// Re-export commonly used types
pub use builder::{BuildError, DefinitionBuilder, TransitionBuilder};
pub use bus::{Handles, MessageBus, MessageHandler, Subscriptions};
pub use compose::{Component, Model, ModelPart, StateMachineComponent};
pub use core::{Action, Guard, Message, State};
pub use machine::{Definition, Instance, Transition, Trigger};
