//! Builder API for ergonomic behaviour construction.
//!
//! This module provides fluent builders and macros for declaring transition
//! tables with minimal boilerplate while keeping the arity rules checked.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::DefinitionBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Guard, Message, State};
use crate::machine::{Transition, Trigger};

/// Create an unguarded instant transition.
///
/// # Example
///
/// ```
/// use tickmind::builder::instant_transition;
/// use tickmind::machine::Transition;
/// use tickmind::state_enum;
/// # use tickmind::core::Message;
/// # #[derive(Clone, Debug)] struct Poke;
/// # impl Message for Poke { type Kind = (); fn kind(&self) -> Self::Kind {} }
///
/// state_enum! {
///     enum Light {
///         Red,
///         Green,
///     }
/// }
///
/// let transition: Transition<Light, Poke, ()> = instant_transition(Light::Red, Light::Green);
/// assert!(transition.trigger.is_instant());
/// ```
pub fn instant_transition<S: State, M: Message, C>(from: S, to: S) -> Transition<S, M, C> {
    Transition::new(from, to, Trigger::Instant)
}

/// Create an unguarded transition on one message kind that always consumes.
pub fn message_transition<S: State, M: Message, C>(
    from: S,
    to: S,
    kind: M::Kind,
) -> Transition<S, M, C> {
    Transition::new(from, to, Trigger::On(kind))
}

/// Create an instant transition with a context guard.
pub fn guarded_transition<S, M, C, F>(from: S, to: S, guard: F) -> Transition<S, M, C>
where
    S: State,
    M: Message,
    F: Fn(&C) -> bool + Send + Sync + 'static,
{
    let mut transition = Transition::new(from, to, Trigger::Instant);
    transition.guard = Some(Guard::new(guard));
    transition
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    crate::state_enum! {
        enum Gate {
            Closed,
            Open,
        }
    }

    #[derive(Clone, Debug)]
    struct Key;

    impl Message for Key {
        type Kind = ();

        fn kind(&self) -> Self::Kind {}
    }

    #[test]
    fn instant_transition_fires_without_messages() {
        let definition = DefinitionBuilder::<Gate, Key, ()>::new()
            .entry(Gate::Closed)
            .add_transition(instant_transition(Gate::Closed, Gate::Open))
            .build()
            .unwrap();

        let state = definition.resolve(Gate::Closed, &mut (), &mut VecDeque::new(), None);
        assert_eq!(state, Gate::Open);
    }

    #[test]
    fn message_transition_waits_for_its_kind() {
        let definition = DefinitionBuilder::<Gate, Key, ()>::new()
            .entry(Gate::Closed)
            .add_transition(message_transition(Gate::Closed, Gate::Open, ()))
            .build()
            .unwrap();

        let state = definition.resolve(Gate::Closed, &mut (), &mut VecDeque::new(), None);
        assert_eq!(state, Gate::Closed);

        let mut queue = VecDeque::from([Key]);
        let state = definition.resolve(Gate::Closed, &mut (), &mut queue, None);
        assert_eq!(state, Gate::Open);
        assert!(queue.is_empty());
    }

    #[test]
    fn guarded_transition_checks_context() {
        let definition = DefinitionBuilder::<Gate, Key, bool>::new()
            .entry(Gate::Closed)
            .add_transition(guarded_transition(Gate::Closed, Gate::Open, |unlocked: &bool| {
                *unlocked
            }))
            .build()
            .unwrap();

        let mut locked = false;
        let state = definition.resolve(Gate::Closed, &mut locked, &mut VecDeque::new(), None);
        assert_eq!(state, Gate::Closed);

        let mut unlocked = true;
        let state = definition.resolve(Gate::Closed, &mut unlocked, &mut VecDeque::new(), None);
        assert_eq!(state, Gate::Open);
    }
}
