//! Behaviour units living inside model parts.

use crate::bus::Subscriptions;
use crate::compose::model::Model;
use crate::compose::part::ModelPart;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Upcast to `Rc<dyn Any>` so components can be found by concrete type.
pub trait AsAnyRc {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAnyRc for T {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A unit of behaviour attached to exactly one [`ModelPart`] at a time.
///
/// Every hook has a default, so a component only overrides what it uses.
/// Components that want bus messages list them in `message_handlers`; they
/// are registered when their part is attached to a model and unregistered
/// when it is detached.
pub trait Component: AsAnyRc + 'static {
    /// Back-reference to the owning part.
    fn link(&self) -> &PartLink;

    fn message_handlers(self: Rc<Self>) -> Subscriptions {
        Subscriptions::empty()
    }

    fn on_attached(&self, _model: &Model) {}

    fn on_detached(&self) {}

    fn on_ready(&self, _model: &Model) {}

    fn tick(&self, _delta: f32) {}

    /// One-line status for [`Model::describe_states`].
    fn describe(&self) -> Option<String> {
        None
    }
}

/// Non-owning link from a component to its part.
#[derive(Default)]
pub struct PartLink {
    part: RefCell<Weak<ModelPart>>,
}

impl PartLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(&self) -> Option<Rc<ModelPart>> {
        self.part.borrow().upgrade()
    }

    /// The model the owning part is attached to, if any.
    pub fn model(&self) -> Option<Model> {
        self.part().and_then(|part| part.model())
    }

    pub fn is_linked(&self) -> bool {
        self.part().is_some()
    }

    pub(crate) fn set(&self, part: &Rc<ModelPart>) {
        *self.part.borrow_mut() = Rc::downgrade(part);
    }

    pub(crate) fn clear(&self) {
        *self.part.borrow_mut() = Weak::new();
    }
}

/// Identity comparison for trait-object components.
pub(crate) fn same_component(a: &Rc<dyn Component>, b: &Rc<dyn Component>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
