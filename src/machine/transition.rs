//! Transition table entries.

use crate::core::{Action, Guard, Message, State};

/// What makes a transition eligible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger<K> {
    /// Eligible without consuming a message
    Instant,
    /// Eligible on a message of exactly this kind
    On(K),
    /// Eligible on any message of the family
    Any,
}

impl<K: PartialEq> Trigger<K> {
    pub fn is_instant(&self) -> bool {
        matches!(self, Trigger::Instant)
    }

    /// Whether a queued message of `kind` can fire this trigger.
    pub fn accepts(&self, kind: &K) -> bool {
        match self {
            Trigger::Instant => false,
            Trigger::On(expected) => expected == kind,
            Trigger::Any => true,
        }
    }

    /// Whether every message this trigger could see would first be taken by `earlier`.
    pub(crate) fn covered_by(&self, earlier: &Trigger<K>) -> bool {
        match (earlier, self) {
            (Trigger::Instant, Trigger::Instant) => true,
            (Trigger::Any, Trigger::On(_) | Trigger::Any) => true,
            (Trigger::On(a), Trigger::On(b)) => a == b,
            _ => false,
        }
    }
}

/// A guarded edge from one state to another.
///
/// Transitions are plain data: once registered in a definition they are
/// never mutated.
pub struct Transition<S: State, M: Message, C> {
    pub from: S,
    pub to: S,
    pub trigger: Trigger<M::Kind>,
    pub guard: Option<Guard<C, M>>,
    pub action: Option<Action<C, M>>,
}

impl<S: State, M: Message, C> Transition<S, M, C> {
    /// Unguarded transition without an action.
    pub fn new(from: S, to: S, trigger: Trigger<M::Kind>) -> Self {
        Self {
            from,
            to,
            trigger,
            guard: None,
            action: None,
        }
    }

    /// Whether the guard or the action can only run with a message.
    pub fn needs_message(&self) -> bool {
        self.guard.as_ref().is_some_and(Guard::needs_message)
            || self.action.as_ref().is_some_and(Action::needs_message)
    }

    /// An instant transition never sees a message, so it must not need one.
    pub fn is_well_formed(&self) -> bool {
        !(self.trigger.is_instant() && self.needs_message())
    }

    /// Check whether this transition may fire for the given message (or none,
    /// for the instant pass).
    pub fn can_fire(&self, context: &C, message: Option<&M>) -> bool {
        let trigger_matches = match message {
            None => self.trigger.is_instant(),
            Some(message) => self.trigger.accepts(&message.kind()),
        };
        if !trigger_matches {
            return false;
        }

        self.guard
            .as_ref()
            .is_none_or(|guard| guard.check(context, message))
    }

    /// Run the action. Without one, a message is always consumed.
    pub fn fire(&self, context: &mut C, message: Option<&M>) -> bool {
        self.action
            .as_ref()
            .is_none_or(|action| action.run(context, message))
    }
}
