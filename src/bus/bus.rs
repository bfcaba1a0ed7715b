//! Synchronous, type-routed message bus.

use crate::bus::handler::{Deliver, HandlerId, MessageHandler, Subscriptions};
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
struct Subscriber {
    id: HandlerId,
    deliver: Deliver,
}

/// A publish recorded while delivery was held.
type Deferred = Box<dyn FnOnce(&MessageBus)>;

/// Routes each published message to the handlers registered for its exact type.
///
/// Publishing is an inline call: every handler, including any nested
/// publishes they make, runs before `publish` returns. The subscriber list is
/// copied before dispatch, so handlers may register or unregister others
/// while a message is being delivered.
///
/// While delivery is held (see [`MessageBus::hold_delivery`]) published
/// messages are queued instead, and delivered in publish order once the
/// outermost hold ends.
#[derive(Default)]
pub struct MessageBus {
    routes: RefCell<HashMap<TypeId, Vec<Subscriber>>>,
    held: Cell<usize>,
    backlog: RefCell<VecDeque<Deferred>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every message type it declares.
    pub fn register<H: MessageHandler + ?Sized>(&self, handler: &Rc<H>) -> HandlerId {
        self.register_subscriptions(Rc::clone(handler).subscriptions())
    }

    /// Register pre-built subscriptions. Types already registered for this
    /// handler are left alone.
    pub fn register_subscriptions(&self, subscriptions: Subscriptions) -> HandlerId {
        let id = subscriptions.id;
        let mut routes = self.routes.borrow_mut();
        for route in subscriptions.routes {
            let subscribers = routes.entry(route.type_id).or_default();
            if subscribers.iter().any(|s| s.id == id) {
                continue;
            }
            tracing::trace!(handler = ?id, message_type = route.type_name, "handler subscribed");
            subscribers.push(Subscriber {
                id,
                deliver: route.deliver,
            });
        }
        id
    }

    /// Remove a handler from every type it was registered for.
    pub fn unregister<H: ?Sized>(&self, handler: &Rc<H>) -> bool {
        self.unregister_id(HandlerId::of(handler))
    }

    pub fn unregister_id(&self, id: HandlerId) -> bool {
        let mut removed = false;
        self.routes.borrow_mut().retain(|_, subscribers| {
            let before = subscribers.len();
            subscribers.retain(|s| s.id != id);
            removed |= subscribers.len() != before;
            !subscribers.is_empty()
        });
        removed
    }

    /// Deliver `message` to every handler of its type, in registration order.
    /// Returns how many handlers received it; a message queued behind a
    /// delivery hold counts as received by none yet.
    pub fn publish<M: Clone + 'static>(&self, message: &M) -> usize {
        if self.is_holding_delivery() {
            let message = message.clone();
            self.backlog
                .borrow_mut()
                .push_back(Box::new(move |bus: &MessageBus| {
                    bus.deliver(&message);
                }));
            tracing::trace!(
                message_type = std::any::type_name::<M>(),
                "message deferred"
            );
            return 0;
        }
        self.deliver(message)
    }

    /// Queue publishes until the returned guard is dropped. Holds nest.
    pub fn hold_delivery(&self) -> DeliveryHold<'_> {
        self.held.set(self.held.get() + 1);
        DeliveryHold { bus: self }
    }

    pub fn is_holding_delivery(&self) -> bool {
        self.held.get() > 0
    }

    /// Messages waiting for the delivery hold to end.
    pub fn deferred_count(&self) -> usize {
        self.backlog.borrow().len()
    }

    fn end_hold(&self) {
        let depth = self.held.get().saturating_sub(1);
        self.held.set(depth);
        if depth > 0 {
            return;
        }
        loop {
            let next = self.backlog.borrow_mut().pop_front();
            let Some(deferred) = next else {
                break;
            };
            deferred(self);
        }
    }

    fn deliver<M: 'static>(&self, message: &M) -> usize {
        let snapshot = match self.routes.borrow().get(&TypeId::of::<M>()) {
            Some(subscribers) => subscribers.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut dropped = Vec::new();
        for subscriber in &snapshot {
            if (subscriber.deliver)(message as &dyn Any) {
                delivered += 1;
            } else {
                dropped.push(subscriber.id);
            }
        }

        for id in dropped {
            self.unregister_id(id);
        }

        tracing::trace!(
            message_type = std::any::type_name::<M>(),
            delivered,
            "message published"
        );
        delivered
    }

    pub fn subscriber_count<M: 'static>(&self) -> usize {
        self.routes
            .borrow()
            .get(&TypeId::of::<M>())
            .map_or(0, Vec::len)
    }

    pub fn is_registered(&self, id: HandlerId) -> bool {
        self.routes
            .borrow()
            .values()
            .any(|subscribers| subscribers.iter().any(|s| s.id == id))
    }
}

/// Scope of [`MessageBus::hold_delivery`]; dropping it delivers the backlog.
#[must_use = "delivery resumes as soon as the guard is dropped"]
pub struct DeliveryHold<'a> {
    bus: &'a MessageBus,
}

impl Drop for DeliveryHold<'_> {
    fn drop(&mut self) {
        self.bus.end_hold();
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes = self.routes.borrow();
        f.debug_struct("MessageBus")
            .field("message_types", &routes.len())
            .field(
                "subscriptions",
                &routes.values().map(Vec::len).sum::<usize>(),
            )
            .field("deferred", &self.deferred_count())
            .finish()
    }
}
