//! Handler capabilities.
//!
//! A handler declares which message types it wants by implementing
//! [`Handles<M>`] once per type and listing those types in
//! [`MessageHandler::subscriptions`]. The list is checked at compile time:
//! `handles::<M>()` only exists when the handler implements `Handles<M>`.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Capability: "handles messages of type `M`".
///
/// Handlers receive `&self`; anything they change goes through their own
/// interior mutability, since delivery may be reentrant.
pub trait Handles<M: 'static> {
    fn handle_message(&self, message: &M);
}

/// Enumerates every message type a handler accepts.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use tickmind::bus::{Handles, MessageBus, MessageHandler, Subscriptions};
///
/// #[derive(Clone)]
/// struct Hunger(f32);
/// #[derive(Clone)]
/// struct Fright;
///
/// #[derive(Default)]
/// struct Stomach {
///     level: Cell<f32>,
///     startled: Cell<u32>,
/// }
///
/// impl Handles<Hunger> for Stomach {
///     fn handle_message(&self, message: &Hunger) {
///         self.level.set(self.level.get() + message.0);
///     }
/// }
///
/// impl Handles<Fright> for Stomach {
///     fn handle_message(&self, _message: &Fright) {
///         self.startled.set(self.startled.get() + 1);
///     }
/// }
///
/// impl MessageHandler for Stomach {
///     fn subscriptions(self: Rc<Self>) -> Subscriptions {
///         Subscriptions::of(&self)
///             .handles::<Hunger>()
///             .handles::<Fright>()
///             .into()
///     }
/// }
///
/// let bus = MessageBus::new();
/// let stomach = Rc::new(Stomach::default());
/// bus.register(&stomach);
///
/// bus.publish(&Hunger(0.5));
/// bus.publish(&Fright);
/// assert_eq!(stomach.level.get(), 0.5);
/// assert_eq!(stomach.startled.get(), 1);
/// ```
pub trait MessageHandler: 'static {
    fn subscriptions(self: Rc<Self>) -> Subscriptions;
}

/// Identity of a registered handler: the address of its shared allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

impl HandlerId {
    pub fn of<H: ?Sized>(handler: &Rc<H>) -> Self {
        HandlerId(Rc::as_ptr(handler).cast::<()>() as usize)
    }
}

/// Delivers an erased message; returns `false` once the handler is gone.
pub(crate) type Deliver = Rc<dyn Fn(&dyn Any) -> bool>;

pub(crate) struct Route {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) deliver: Deliver,
}

/// The message types one handler has declared, ready for registration.
pub struct Subscriptions {
    pub(crate) id: HandlerId,
    pub(crate) routes: Vec<Route>,
}

impl Subscriptions {
    /// Start declaring the message types `handler` accepts.
    pub fn of<H: 'static>(handler: &Rc<H>) -> SubscriptionSet<H> {
        SubscriptionSet {
            id: HandlerId::of(handler),
            handler: Rc::downgrade(handler),
            routes: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// A handler that accepts nothing.
    pub fn empty() -> Self {
        Self {
            id: HandlerId(0),
            routes: Vec::new(),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Names of the declared message types, in declaration order.
    pub fn message_types(&self) -> Vec<&'static str> {
        self.routes.iter().map(|route| route.type_name).collect()
    }
}

/// Typed builder behind [`Subscriptions::of`].
pub struct SubscriptionSet<H> {
    id: HandlerId,
    handler: Weak<H>,
    routes: Vec<Route>,
    _phantom: PhantomData<H>,
}

impl<H: 'static> SubscriptionSet<H> {
    /// Declare that the handler accepts `M`.
    pub fn handles<M: 'static>(mut self) -> Self
    where
        H: Handles<M>,
    {
        let type_id = TypeId::of::<M>();
        if self.routes.iter().any(|route| route.type_id == type_id) {
            return self;
        }

        let handler = self.handler.clone();
        let deliver: Deliver = Rc::new(move |message: &dyn Any| {
            let Some(handler) = handler.upgrade() else {
                return false;
            };
            if let Some(message) = message.downcast_ref::<M>() {
                handler.handle_message(message);
            }
            true
        });

        self.routes.push(Route {
            type_id,
            type_name: std::any::type_name::<M>(),
            deliver,
        });
        self
    }
}

impl<H: 'static> From<SubscriptionSet<H>> for Subscriptions {
    fn from(set: SubscriptionSet<H>) -> Self {
        Subscriptions {
            id: set.id,
            routes: set.routes,
        }
    }
}
