//! The state machine engine.
//!
//! A [`Definition`] is the shared, immutable transition table of a behaviour.
//! An [`Instance`] is one entity's running copy of it: a current state, a
//! double-buffered [`Mailbox`], and a reference to its context.
//!
//! Resolution is the heart of the engine: on every update an instance swaps
//! its queues and lets the definition walk instant transitions and queued
//! messages until nothing applies.

mod config;
mod definition;
mod instance;
mod transition;

pub use config::InstanceConfig;
pub use definition::{Definition, TickFactory, DEFAULT_MAX_STEPS};
pub use instance::{Instance, Mailbox};
pub use transition::{Transition, Trigger};
