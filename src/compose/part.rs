//! Model parts: typed data plus the components that act on it.

use crate::bus::MessageHandler;
use crate::compose::component::{same_component, AsAnyRc, Component};
use crate::compose::model::{Model, ModelInner};
use crate::compose::protected::ProtectedList;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Hook run with the model and the part it concerns.
pub type PartHook = Box<dyn Fn(&Model, &Rc<ModelPart>)>;

/// One facet of an entity: a piece of data keyed by its type, and an ordered
/// list of components.
///
/// A model holds at most one part per key. A part may also carry bus
/// handlers of its own; they are registered while the part is attached.
pub struct ModelPart {
    key: TypeId,
    type_name: &'static str,
    data: Rc<dyn Any>,
    components: RefCell<ProtectedList<Rc<dyn Component>>>,
    handlers: Vec<Rc<dyn MessageHandler>>,
    model: RefCell<Weak<ModelInner>>,
    attached_hook: Option<PartHook>,
    ready_hook: Option<PartHook>,
}

impl ModelPart {
    pub fn new<T: 'static>(data: T) -> Self {
        Self {
            key: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            data: Rc::new(RefCell::new(data)),
            components: RefCell::new(ProtectedList::new()),
            handlers: Vec::new(),
            model: RefCell::new(Weak::new()),
            attached_hook: None,
            ready_hook: None,
        }
    }

    /// Run `hook` whenever this part is attached (not for quiet attaches).
    pub fn on_attached<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Model, &Rc<ModelPart>) + 'static,
    {
        self.attached_hook = Some(Box::new(hook));
        self
    }

    /// Run `hook` once the model is ready, or on attach if it already is.
    pub fn on_ready<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Model, &Rc<ModelPart>) + 'static,
    {
        self.ready_hook = Some(Box::new(hook));
        self
    }

    /// Subscribe `handler` to the bus of whichever model this part joins.
    /// The part keeps it alive; the bus only holds it weakly.
    pub fn with_handler<H: MessageHandler>(mut self, handler: Rc<H>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn key(&self) -> TypeId {
        self.key
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The part's data, if it is a `T`.
    pub fn data<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        Rc::clone(&self.data).downcast::<RefCell<T>>().ok()
    }

    pub fn model(&self) -> Option<Model> {
        self.model.borrow().upgrade().map(Model::from_inner)
    }

    pub fn is_attached(&self) -> bool {
        self.model.borrow().strong_count() > 0
    }

    /// Add a component, moving it out of any other part first.
    ///
    /// Returns `false` if the component already belongs to this part.
    pub fn add_component(self: &Rc<Self>, component: Rc<dyn Component>) -> bool {
        if let Some(current) = component.link().part() {
            if Rc::ptr_eq(&current, self) {
                return false;
            }
            current.remove_component(&component);
        }

        component.link().set(self);
        self.components.borrow_mut().add(Rc::clone(&component));

        if let Some(model) = self.model() {
            model.attach_component(&component);
        }
        true
    }

    /// Remove a component from this part.
    pub fn remove_component(&self, component: &Rc<dyn Component>) -> bool {
        let removed = self
            .components
            .borrow_mut()
            .remove_where(|c| same_component(c, component));

        let Some(removed) = removed else {
            return false;
        };
        if let Some(model) = self.model() {
            model.detach_component(&removed);
        }
        removed.link().clear();
        true
    }

    /// The first component of concrete type `T`.
    pub fn component<T: Component>(&self) -> Option<Rc<T>> {
        self.components
            .borrow()
            .iter()
            .find_map(|c| AsAnyRc::into_any(Rc::clone(c)).downcast::<T>().ok())
    }

    /// The current components, in insertion order.
    pub fn components(&self) -> Vec<Rc<dyn Component>> {
        self.components.borrow().iter().cloned().collect()
    }

    pub fn component_count(&self) -> usize {
        self.components.borrow().len()
    }

    /// Tick every component over a protected snapshot.
    pub(crate) fn tick(&self, delta: f32) {
        let snapshot = self.components.borrow_mut().start_protection();
        for component in snapshot.iter() {
            component.tick(delta);
        }
        self.components.borrow_mut().stop_protection();
    }

    pub(crate) fn handlers(&self) -> Vec<Rc<dyn MessageHandler>> {
        self.handlers.clone()
    }

    pub(crate) fn link_model(&self, model: &Rc<ModelInner>) {
        *self.model.borrow_mut() = Rc::downgrade(model);
    }

    pub(crate) fn unlink_model(&self) {
        *self.model.borrow_mut() = Weak::new();
    }

    pub(crate) fn notify_attached(self: &Rc<Self>, model: &Model) {
        for component in self.components() {
            component.on_attached(model);
        }
        if let Some(hook) = &self.attached_hook {
            hook(model, self);
        }
    }

    pub(crate) fn notify_ready(self: &Rc<Self>, model: &Model) {
        for component in self.components() {
            component.on_ready(model);
        }
        if let Some(hook) = &self.ready_hook {
            hook(model, self);
        }
    }
}

impl fmt::Debug for ModelPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelPart")
            .field("type", &self.type_name)
            .field("components", &self.component_count())
            .field("handlers", &self.handlers.len())
            .field("attached", &self.is_attached())
            .finish()
    }
}
