//! Entity composition.
//!
//! An entity is a [`Model`]: a set of [`ModelPart`]s keyed by the type of the
//! data they carry, each holding an ordered list of [`Component`]s. Parts and
//! components are wired to the model's message bus when attached, and part
//! mutations can be held and replayed so that hooks may reshape the entity
//! while it is being iterated.
//!
//! State machines join an entity through [`StateMachineComponent`], usually
//! spawned from a [`BehaviourRegistry`] so that all instances of a behaviour
//! share one definition.

mod component;
mod error;
mod fsm_component;
mod model;
mod part;
mod protected;
mod registry;

pub use component::{AsAnyRc, Component, PartLink};
pub use error::CompositionError;
pub use fsm_component::StateMachineComponent;
pub use model::{HoldGuard, Model};
pub use part::{ModelPart, PartHook};
pub use protected::ProtectedList;
pub use registry::{Behaviour, BehaviourRegistry};
