//! Shared definitions, built once per behaviour.

use crate::builder::BuildError;
use crate::compose::fsm_component::StateMachineComponent;
use crate::core::{Message, State};
use crate::machine::{Definition, InstanceConfig};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// A kind of behaviour: its state, message family, context and table.
pub trait Behaviour: 'static {
    type State: State;
    type Message: Message;
    type Context: 'static;

    fn define() -> Result<Definition<Self::State, Self::Message, Self::Context>, BuildError>;
}

type SharedDefinition<B> = Arc<
    Definition<<B as Behaviour>::State, <B as Behaviour>::Message, <B as Behaviour>::Context>,
>;

/// Caches one [`Definition`] per [`Behaviour`] so every instance shares it.
#[derive(Default)]
pub struct BehaviourRegistry {
    definitions: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl BehaviourRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared definition of `B`, built on first request.
    pub fn definition<B: Behaviour>(&self) -> Result<SharedDefinition<B>, BuildError> {
        if let Some(cached) = self
            .definitions
            .borrow()
            .get(&TypeId::of::<B>())
            .and_then(|entry| entry.downcast_ref::<SharedDefinition<B>>())
        {
            return Ok(Arc::clone(cached));
        }

        let definition = Arc::new(B::define()?);
        tracing::debug!(
            behaviour = std::any::type_name::<B>(),
            machine = definition.name(),
            "definition built"
        );
        self.definitions
            .borrow_mut()
            .insert(TypeId::of::<B>(), Box::new(Arc::clone(&definition)));
        Ok(definition)
    }

    /// A new state machine component running `B` against `context`.
    pub fn spawn<B: Behaviour>(
        &self,
        context: Rc<RefCell<B::Context>>,
        config: InstanceConfig,
    ) -> Result<Rc<StateMachineComponent<B::State, B::Message, B::Context>>, BuildError> {
        let definition = self.definition::<B>()?;
        Ok(StateMachineComponent::spawn(&definition, context, config))
    }

    pub fn is_defined<B: Behaviour>(&self) -> bool {
        self.definitions.borrow().contains_key(&TypeId::of::<B>())
    }

    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{instant_transition, DefinitionBuilder};
    use std::cell::Cell;

    crate::state_enum! {
        enum Blink {
            Open,
            Shut,
        }
    }

    #[derive(Clone, Debug)]
    struct Dust;

    impl Message for Dust {
        type Kind = ();

        fn kind(&self) -> Self::Kind {}
    }

    thread_local! {
        static BUILDS: Cell<u32> = const { Cell::new(0) };
    }

    struct Eyelid;

    impl Behaviour for Eyelid {
        type State = Blink;
        type Message = Dust;
        type Context = ();

        fn define() -> Result<Definition<Blink, Dust, ()>, BuildError> {
            BUILDS.with(|builds| builds.set(builds.get() + 1));
            DefinitionBuilder::new()
                .entry(Blink::Open)
                .add_transition(instant_transition(Blink::Open, Blink::Shut))
                .build()
        }
    }

    struct Broken;

    impl Behaviour for Broken {
        type State = Blink;
        type Message = Dust;
        type Context = ();

        fn define() -> Result<Definition<Blink, Dust, ()>, BuildError> {
            DefinitionBuilder::new().build()
        }
    }

    #[test]
    fn definition_is_built_once_and_shared() {
        let registry = BehaviourRegistry::new();
        let before = BUILDS.with(Cell::get);

        let first = registry.definition::<Eyelid>().unwrap();
        let second = registry.definition::<Eyelid>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(BUILDS.with(Cell::get), before + 1);
        assert!(registry.is_defined::<Eyelid>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn build_errors_are_not_cached() {
        let registry = BehaviourRegistry::new();

        assert!(matches!(
            registry.definition::<Broken>(),
            Err(BuildError::MissingEntryState)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn spawned_components_share_the_definition() {
        let registry = BehaviourRegistry::new();
        let left = registry
            .spawn::<Eyelid>(Rc::new(RefCell::new(())), InstanceConfig::default())
            .unwrap();
        let right = registry
            .spawn::<Eyelid>(Rc::new(RefCell::new(())), InstanceConfig::default())
            .unwrap();

        assert_eq!(left.update(), Blink::Shut);
        assert_eq!(right.current_state(), Blink::Open);
        let shared = left.with_instance(|i| Arc::clone(i.definition()));
        assert!(right.with_instance(|i| Arc::ptr_eq(&shared, i.definition())));
    }
}
