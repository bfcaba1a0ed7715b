//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Action, Guard, Message, State};
use crate::machine::{Transition, Trigger};

/// Builder for constructing transitions with a fluent API.
///
/// Without `.on(kind)` or `.on_any()` the transition is instant.
pub struct TransitionBuilder<S: State, M: Message, C> {
    from: Option<S>,
    to: Option<S>,
    trigger: Trigger<M::Kind>,
    guard: Option<Guard<C, M>>,
    action: Option<Action<C, M>>,
}

impl<S: State, M: Message, C> TransitionBuilder<S, M, C> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            trigger: Trigger::Instant,
            guard: None,
            action: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Fire on messages of one kind.
    pub fn on(mut self, kind: M::Kind) -> Self {
        self.trigger = Trigger::On(kind);
        self
    }

    /// Fire on any message of the family.
    pub fn on_any(mut self) -> Self {
        self.trigger = Trigger::Any;
        self
    }

    /// Add a guard (optional).
    pub fn guard(mut self, guard: Guard<C, M>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard over the context only.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add a guard that also inspects the message.
    pub fn when_message<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C, &M) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::on_message(predicate));
        self
    }

    /// Set the action (optional; without one, messages are consumed).
    pub fn action(mut self, action: Action<C, M>) -> Self {
        self.action = Some(action);
        self
    }

    /// Set an action over the context only.
    pub fn then<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut C) -> bool + Send + Sync + 'static,
    {
        self.action = Some(Action::new(effect));
        self
    }

    /// Set an action that also reads the message.
    pub fn then_message<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut C, &M) -> bool + Send + Sync + 'static,
    {
        self.action = Some(Action::on_message(effect));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, M, C>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        let transition = Transition {
            from,
            to,
            trigger: self.trigger,
            guard: self.guard,
            action: self.action,
        };
        if !transition.is_well_formed() {
            return Err(BuildError::MessageArityOnInstant {
                from: transition.from.name().to_string(),
                to: transition.to.name().to_string(),
            });
        }
        Ok(transition)
    }
}

impl<S: State, M: Message, C> Default for TransitionBuilder<S, M, C> {
    fn default() -> Self {
        Self::new()
    }
}
