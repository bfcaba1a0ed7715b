//! State machine instances as model components.

use crate::bus::{Handles, Subscriptions};
use crate::compose::component::{Component, PartLink};
use crate::core::{Message, State};
use crate::machine::{Definition, Instance, InstanceConfig, Mailbox};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Binds an [`Instance`] into a model part.
///
/// Bus messages of the machine's family are queued into the instance
/// mailbox. Each model tick queues the definition's tick message, if it has
/// one, and then updates the instance. While the instance resolves, the
/// model's bus holds delivery, so handlers reading the machine's context only
/// hear what its actions published after the pass has released it.
pub struct StateMachineComponent<S: State, M: Message, C: 'static> {
    link: PartLink,
    instance: RefCell<Instance<S, M, C>>,
    mailbox: Mailbox<M>,
}

impl<S: State, M: Message, C: 'static> StateMachineComponent<S, M, C> {
    pub fn new(instance: Instance<S, M, C>) -> Rc<Self> {
        Rc::new(Self {
            link: PartLink::new(),
            mailbox: instance.mailbox(),
            instance: RefCell::new(instance),
        })
    }

    /// Create an instance of `definition` bound to `context` and wrap it.
    pub fn spawn(
        definition: &Arc<Definition<S, M, C>>,
        context: Rc<RefCell<C>>,
        config: InstanceConfig,
    ) -> Rc<Self> {
        Self::new(definition.create_instance_with(context, config))
    }

    pub fn current_state(&self) -> S {
        self.instance.borrow().current_state().clone()
    }

    pub fn mailbox(&self) -> Mailbox<M> {
        self.mailbox.clone()
    }

    /// Run one resolve pass outside the tick schedule.
    pub fn update(&self) -> S {
        let model = self.link.model();
        let _hold = model.as_ref().map(|model| model.bus().hold_delivery());
        // The instance borrow must end before the hold flushes.
        let state = self.instance.borrow_mut().update().clone();
        state
    }

    /// Access the wrapped instance, e.g. to force a state.
    pub fn with_instance<R>(&self, f: impl FnOnce(&mut Instance<S, M, C>) -> R) -> R {
        f(&mut self.instance.borrow_mut())
    }
}

impl<S: State, M: Message, C: 'static> Handles<M> for StateMachineComponent<S, M, C> {
    fn handle_message(&self, message: &M) {
        self.mailbox.push(message.clone());
    }
}

impl<S: State, M: Message, C: 'static> Component for StateMachineComponent<S, M, C> {
    fn link(&self) -> &PartLink {
        &self.link
    }

    fn message_handlers(self: Rc<Self>) -> Subscriptions {
        Subscriptions::of(&self).handles::<M>().into()
    }

    fn tick(&self, delta: f32) {
        let tick = self.instance.borrow().definition().tick_message(delta);
        if let Some(message) = tick {
            self.mailbox.push(message);
        }
        self.update();
    }

    fn describe(&self) -> Option<String> {
        // Describing from inside one of this machine's own actions finds it mid-update.
        let line = match self.instance.try_borrow() {
            Ok(instance) => format!(
                "{}: {}",
                instance.definition().name(),
                instance.current_state().name()
            ),
            Err(_) => "<resolving>".to_string(),
        };
        Some(line)
    }
}
