//! Per-entity state machine instances.

use crate::bus::{Handles, MessageBus, MessageHandler, Subscriptions};
use crate::core::{Message, ResolveTrace, State};
use crate::machine::config::InstanceConfig;
use crate::machine::definition::Definition;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

struct QueuePair<M> {
    queues: [VecDeque<M>; 2],
    enqueue: usize,
}

/// Double-buffered message queue of one instance.
///
/// One side collects new messages while the other is drained by `update`.
/// The sides swap at the start of every update, so anything added while a
/// machine resolves (including its own messages) waits for the next update.
/// Cloning yields another handle to the same queues.
pub struct Mailbox<M> {
    inner: Rc<RefCell<QueuePair<M>>>,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M> Default for Mailbox<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Mailbox<M> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueuePair {
                queues: [VecDeque::new(), VecDeque::new()],
                enqueue: 0,
            })),
        }
    }

    /// Enqueue on the side currently collecting messages.
    pub fn push(&self, message: M) {
        let mut pair = self.inner.borrow_mut();
        let side = pair.enqueue;
        pair.queues[side].push_back(message);
    }

    /// Messages waiting on either side.
    pub fn pending(&self) -> usize {
        let pair = self.inner.borrow();
        pair.queues[0].len() + pair.queues[1].len()
    }

    /// Swap sides and take the side to drain.
    fn begin_drain(&self) -> VecDeque<M> {
        let mut pair = self.inner.borrow_mut();
        let drain = pair.enqueue;
        pair.enqueue = 1 - drain;
        mem::take(&mut pair.queues[drain])
    }

    /// Put back whatever the resolve pass left unprocessed.
    fn end_drain(&self, mut leftover: VecDeque<M>) {
        let mut pair = self.inner.borrow_mut();
        let drain = 1 - pair.enqueue;
        leftover.append(&mut pair.queues[drain]);
        pair.queues[drain] = leftover;
    }
}

impl<M: Message> Handles<M> for Mailbox<M> {
    fn handle_message(&self, message: &M) {
        self.push(message.clone());
    }
}

impl<M: Message> MessageHandler for Mailbox<M> {
    fn subscriptions(self: Rc<Self>) -> Subscriptions {
        Subscriptions::of(&self).handles::<M>().into()
    }
}

/// One entity's running copy of a [`Definition`].
///
/// The instance owns its current state and mailbox; the definition is shared
/// and the context is only referenced.
pub struct Instance<S: State, M: Message, C> {
    id: Uuid,
    definition: Arc<Definition<S, M, C>>,
    context: Rc<RefCell<C>>,
    current: S,
    mailbox: Mailbox<M>,
    config: InstanceConfig,
}

impl<S: State, M: Message, C> Instance<S, M, C> {
    pub(crate) fn new(
        definition: Arc<Definition<S, M, C>>,
        context: Rc<RefCell<C>>,
        config: InstanceConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            current: definition.entry().clone(),
            definition,
            context,
            mailbox: Mailbox::new(),
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &Arc<Definition<S, M, C>> {
        &self.definition
    }

    pub fn context(&self) -> &Rc<RefCell<C>> {
        &self.context
    }

    pub fn current_state(&self) -> &S {
        &self.current
    }

    /// Force the current state, bypassing the table.
    pub fn set_state(&mut self, state: S) {
        self.current = state;
    }

    /// A handle to this instance's queues, e.g. for bus registration.
    pub fn mailbox(&self) -> Mailbox<M> {
        self.mailbox.clone()
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    pub fn set_logging(&mut self, enabled: bool) {
        self.config.logging = enabled;
    }

    /// Queue a message for the next update.
    pub fn add_message(&self, message: M) {
        self.mailbox.push(message);
    }

    /// Swap queues and resolve everything that arrived before this call.
    pub fn update(&mut self) -> &S {
        let mut draining = self.mailbox.begin_drain();
        let before = self.current.clone();
        let mut trace = self.config.logging.then(ResolveTrace::new);

        let after = {
            let mut context = self.context.borrow_mut();
            self.definition
                .resolve(before.clone(), &mut context, &mut draining, trace.as_mut())
        };
        self.mailbox.end_drain(draining);

        if let Some(trace) = trace.filter(ResolveTrace::is_noteworthy) {
            let label = self
                .config
                .label
                .clone()
                .unwrap_or_else(|| format!("{}#{}", self.definition.name(), self.id));
            tracing::debug!(
                instance = %self.id,
                machine = self.definition.name(),
                "{}",
                trace.render(&label, &before, &after)
            );
        }

        self.current = after;
        &self.current
    }

    /// Update while holding delivery on `bus`.
    ///
    /// The context stays mutably borrowed for the whole pass, so handlers
    /// reached by messages the actions publish must not see them until the
    /// pass is over; they are delivered once the context is released.
    pub fn update_holding(&mut self, bus: &MessageBus) -> &S {
        {
            let _hold = bus.hold_delivery();
            self.update();
        }
        &self.current
    }
}
