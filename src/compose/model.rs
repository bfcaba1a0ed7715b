//! The entity model: a set of typed parts sharing one message bus.

use crate::bus::{HandlerId, MessageBus};
use crate::compose::component::Component;
use crate::compose::error::CompositionError;
use crate::compose::part::ModelPart;
use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::Rc;
use uuid::Uuid;

/// A part mutation recorded while the model is held.
#[derive(Debug)]
enum PartCommand {
    Attach {
        key: TypeId,
        part: Rc<ModelPart>,
        quiet: bool,
    },
    Detach {
        key: TypeId,
        part: Rc<ModelPart>,
    },
}

pub(crate) struct ModelInner {
    id: Uuid,
    bus: Rc<MessageBus>,
    /// Key to part, in attach order. One part may sit under several keys.
    parts: RefCell<Vec<(TypeId, Rc<ModelPart>)>>,
    pending: RefCell<Vec<PartCommand>>,
    hold_depth: Cell<usize>,
    ready: Cell<bool>,
}

/// Handle to an entity model. Clones share the same model.
///
/// Part mutations requested while the model is held (see [`Model::hold`])
/// are recorded and replayed in order when the outermost hold ends, so
/// hooks and components can add or remove parts while the model iterates
/// over them.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    /// A model with its own bus.
    pub fn new() -> Self {
        Self::with_bus(Rc::new(MessageBus::new()))
    }

    /// A model publishing on a shared bus.
    pub fn with_bus(bus: Rc<MessageBus>) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                id: Uuid::new_v4(),
                bus,
                parts: RefCell::new(Vec::new()),
                pending: RefCell::new(Vec::new()),
                hold_depth: Cell::new(0),
                ready: Cell::new(false),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ModelInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn bus(&self) -> &Rc<MessageBus> {
        &self.inner.bus
    }

    /// Publish on the model's bus; returns the number of receivers.
    pub fn publish<M: Clone + 'static>(&self, message: &M) -> usize {
        self.inner.bus.publish(message)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.get()
    }

    pub fn is_held(&self) -> bool {
        self.inner.hold_depth.get() > 0
    }

    /// Part mutations waiting for the hold to end.
    pub fn pending_changes(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Attach `part` under its own data type and run its attach hooks.
    ///
    /// Returns `Ok(false)` if this very part is already attached under that
    /// key. While the model is held the request is recorded and `Ok(true)`
    /// returned.
    pub fn add_part(&self, part: Rc<ModelPart>) -> Result<bool, CompositionError> {
        let key = part.key();
        self.request_attach(key, part, false)
    }

    /// Attach `part` without running attach or ready hooks. Its handlers are
    /// still registered.
    pub fn add_part_quiet(&self, part: Rc<ModelPart>) -> Result<bool, CompositionError> {
        let key = part.key();
        self.request_attach(key, part, true)
    }

    /// Attach `part` under the key `K` instead of its own data type.
    ///
    /// A part already attached here may be added again under other keys; it
    /// is linked and its handlers registered only once. Pass `quiet` to skip
    /// the attach and ready hooks for such an alias.
    pub fn add_part_as<K: 'static>(
        &self,
        part: Rc<ModelPart>,
        quiet: bool,
    ) -> Result<bool, CompositionError> {
        self.request_attach(TypeId::of::<K>(), part, quiet)
    }

    /// Remove whatever part sits under the key `K`.
    ///
    /// Only that key is dropped. The part itself is detached once no key
    /// refers to it any more.
    pub fn remove_part<K: 'static>(&self) -> bool {
        let key = TypeId::of::<K>();
        let Some(part) = self.part_by_key(key) else {
            return false;
        };
        if self.defer(PartCommand::Detach { key, part }) {
            return true;
        }
        self.remove_key(key);
        true
    }

    /// Detach exactly this part from under its own data type.
    pub fn remove_part_instance(&self, part: &Rc<ModelPart>) -> Result<bool, CompositionError> {
        let key = part.key();
        if self.defer(PartCommand::Detach {
            key,
            part: Rc::clone(part),
        }) {
            return Ok(true);
        }
        self.apply_detach(key, part)
    }

    pub fn has_part<K: 'static>(&self) -> bool {
        self.part_by_key(TypeId::of::<K>()).is_some()
    }

    pub fn part<K: 'static>(&self) -> Option<Rc<ModelPart>> {
        self.part_by_key(TypeId::of::<K>())
    }

    /// Shortcut for the data of the part keyed by `T`.
    pub fn data<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        self.part::<T>().and_then(|part| part.data::<T>())
    }

    /// Attached parts in attach order, each listed once however many keys
    /// it sits under.
    pub fn parts(&self) -> Vec<Rc<ModelPart>> {
        let entries = self.inner.parts.borrow();
        let mut parts: Vec<Rc<ModelPart>> = Vec::with_capacity(entries.len());
        for (_, part) in entries.iter() {
            if !parts.iter().any(|seen| Rc::ptr_eq(seen, part)) {
                parts.push(Rc::clone(part));
            }
        }
        parts
    }

    /// Number of keys in use. Aliased parts count once per key.
    pub fn key_count(&self) -> usize {
        self.inner.parts.borrow().len()
    }

    /// Hold part mutations until the returned guard is released or dropped.
    /// Holds nest; only the outermost one replays.
    pub fn hold(&self) -> HoldGuard {
        self.inner.hold_depth.set(self.inner.hold_depth.get() + 1);
        HoldGuard {
            model: self.clone(),
            released: false,
        }
    }

    /// Mark the model ready and notify every part, holding mutations made by
    /// the ready hooks until all parts have been notified.
    pub fn ready(&self) -> Result<(), CompositionError> {
        self.inner.ready.set(true);
        let hold = self.hold();
        for part in self.parts() {
            part.notify_ready(self);
        }
        hold.release()
    }

    /// Tick every component of every part.
    pub fn tick(&self, delta: f32) {
        for part in self.parts() {
            part.tick(delta);
        }
    }

    /// One line per component that can describe itself, prefixed by its part.
    pub fn describe_states(&self) -> Vec<String> {
        self.parts()
            .iter()
            .flat_map(|part| {
                let name = short_name(part.type_name());
                part.components()
                    .into_iter()
                    .filter_map(move |c| c.describe().map(|line| format!("[{name}] {line}")))
            })
            .collect()
    }

    pub(crate) fn attach_component(&self, component: &Rc<dyn Component>) {
        self.inner
            .bus
            .register_subscriptions(Rc::clone(component).message_handlers());
        component.on_attached(self);
        if self.is_ready() {
            component.on_ready(self);
        }
    }

    pub(crate) fn detach_component(&self, component: &Rc<dyn Component>) {
        self.inner.bus.unregister_id(HandlerId::of(component));
        component.on_detached();
    }

    fn part_by_key(&self, key: TypeId) -> Option<Rc<ModelPart>> {
        self.inner
            .parts
            .borrow()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, part)| Rc::clone(part))
    }

    fn is_linked_here(&self, part: &ModelPart) -> bool {
        part.model()
            .is_some_and(|owner| Rc::ptr_eq(&owner.inner, &self.inner))
    }

    fn request_attach(
        &self,
        key: TypeId,
        part: Rc<ModelPart>,
        quiet: bool,
    ) -> Result<bool, CompositionError> {
        if self.defer(PartCommand::Attach {
            key,
            part: Rc::clone(&part),
            quiet,
        }) {
            return Ok(true);
        }
        self.attach(key, part, quiet)
    }

    /// Record `command` if the model is held.
    fn defer(&self, command: PartCommand) -> bool {
        if !self.is_held() {
            return false;
        }
        self.inner.pending.borrow_mut().push(command);
        true
    }

    fn attach(&self, key: TypeId, part: Rc<ModelPart>, quiet: bool) -> Result<bool, CompositionError> {
        if let Some(existing) = self.part_by_key(key) {
            if Rc::ptr_eq(&existing, &part) {
                return Ok(false);
            }
            return Err(CompositionError::PartConflict {
                part: part.type_name(),
                model: self.id(),
            });
        }
        let alias = self.is_linked_here(&part);
        if !alias {
            if let Some(owner) = part.model() {
                return Err(CompositionError::AttachedElsewhere {
                    part: part.type_name(),
                    owner: owner.id(),
                });
            }
        }

        self.inner.parts.borrow_mut().push((key, Rc::clone(&part)));
        if !alias {
            part.link_model(&self.inner);
            for component in part.components() {
                self.inner
                    .bus
                    .register_subscriptions(Rc::clone(&component).message_handlers());
            }
            for handler in part.handlers() {
                self.inner.bus.register(&handler);
            }
        }

        if !quiet {
            part.notify_attached(self);
            if self.is_ready() {
                part.notify_ready(self);
            }
        }
        tracing::trace!(model = %self.id(), part = part.type_name(), alias, quiet, "part attached");
        Ok(true)
    }

    fn apply_detach(&self, key: TypeId, part: &Rc<ModelPart>) -> Result<bool, CompositionError> {
        match self.part_by_key(key) {
            None => Ok(false),
            Some(registered) if !Rc::ptr_eq(&registered, part) => {
                Err(CompositionError::PartMismatch {
                    part: part.type_name(),
                    model: self.id(),
                })
            }
            Some(_) => {
                self.remove_key(key);
                Ok(true)
            }
        }
    }

    /// Drop `key`; detach its part if no other key still refers to it.
    fn remove_key(&self, key: TypeId) {
        let part = {
            let mut entries = self.inner.parts.borrow_mut();
            let Some(index) = entries.iter().position(|(k, _)| *k == key) else {
                return;
            };
            let (_, part) = entries.remove(index);
            if entries.iter().any(|(_, other)| Rc::ptr_eq(other, &part)) {
                tracing::trace!(model = %self.id(), part = part.type_name(), "part alias removed");
                return;
            }
            part
        };
        self.detach(&part);
    }

    fn detach(&self, part: &Rc<ModelPart>) {
        for handler in part.handlers() {
            self.inner.bus.unregister(&handler);
        }
        for component in part.components() {
            self.detach_component(&component);
        }
        part.unlink_model();
        tracing::trace!(model = %self.id(), part = part.type_name(), "part detached");
    }

    /// Leave one hold level; the outermost replays everything recorded.
    fn end_hold(&self) -> Result<(), CompositionError> {
        let depth = self.inner.hold_depth.get().saturating_sub(1);
        self.inner.hold_depth.set(depth);
        if depth > 0 {
            return Ok(());
        }

        let commands = mem::take(&mut *self.inner.pending.borrow_mut());
        let mut first_error = None;
        for command in commands {
            let result = match command {
                PartCommand::Attach { key, part, quiet } => self.attach(key, part, quiet).map(|_| ()),
                PartCommand::Detach { key, part } => self.apply_detach(key, &part).map(|_| ()),
            };
            if let Err(error) = result {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.inner.id)
            .field("parts", &self.parts().len())
            .field("keys", &self.key_count())
            .field("held", &self.is_held())
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Scope of a [`Model::hold`].
///
/// Dropping the guard ends the hold too; replay errors are then logged
/// instead of returned.
#[must_use = "the hold ends as soon as the guard is dropped"]
pub struct HoldGuard {
    model: Model,
    released: bool,
}

impl HoldGuard {
    /// End the hold and report the first replayed mutation that failed.
    pub fn release(mut self) -> Result<(), CompositionError> {
        self.released = true;
        self.model.end_hold()
    }
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(error) = self.model.end_hold() {
            tracing::error!(model = %self.model.id(), %error, "held part change rejected");
        }
    }
}

fn short_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}
