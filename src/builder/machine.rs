//! Builder for constructing machine definitions.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Message, State};
use crate::machine::{Definition, Transition};
use stillwater::validation::Validation;

/// Builder for constructing definitions with a fluent API.
pub struct DefinitionBuilder<S: State, M: Message, C> {
    entry: Option<S>,
    name: Option<String>,
    max_steps: Option<usize>,
    tick: Option<Box<dyn Fn(f32) -> M + Send + Sync>>,
    transitions: Vec<Transition<S, M, C>>,
}

impl<S: State, M: Message, C> DefinitionBuilder<S, M, C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            entry: None,
            name: None,
            max_steps: None,
            tick: None,
            transitions: Vec::new(),
        }
    }

    /// Set the entry state (required).
    pub fn entry(mut self, state: S) -> Self {
        self.entry = Some(state);
        self
    }

    /// Name used in resolve traces. Defaults to the state type's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Cap on transitions fired per resolve pass (at least one).
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Message queued on every model tick, built from the elapsed time.
    pub fn tick_message<F>(mut self, factory: F) -> Self
    where
        F: Fn(f32) -> M + Send + Sync + 'static,
    {
        self.tick = Some(Box::new(factory));
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, M, C>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, M, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, M, C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the definition.
    ///
    /// An empty table is allowed: every instance simply sits in its entry
    /// state as a dead end.
    pub fn build(self) -> Result<Definition<S, M, C>, BuildError> {
        let entry = self.entry.ok_or(BuildError::MissingEntryState)?;

        let mut definition = Definition::new(entry);
        if let Some(name) = self.name {
            definition.set_name(name);
        }
        if let Some(max_steps) = self.max_steps {
            definition.set_max_steps(max_steps);
        }
        if let Some(tick) = self.tick {
            definition.set_tick(tick);
        }
        for transition in self.transitions {
            if !transition.is_well_formed() {
                return Err(BuildError::MessageArityOnInstant {
                    from: transition.from.name().to_string(),
                    to: transition.to.name().to_string(),
                });
            }
            definition.add_transition(transition);
        }

        Ok(definition)
    }

    /// Build the definition and reject tables with shadowed transitions or
    /// runaway instant cycles.
    pub fn build_checked(self) -> Result<Definition<S, M, C>, BuildError> {
        let definition = self.build()?;
        match definition.lint() {
            Validation::Success(_) => Ok(definition),
            Validation::Failure(defects) => {
                Err(BuildError::Defects(defects.iter().cloned().collect()))
            }
        }
    }
}

impl<S: State, M: Message, C> Default for DefinitionBuilder<S, M, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;
    use crate::machine::Trigger;
    use std::collections::VecDeque;

    crate::state_enum! {
        enum Door {
            Shut,
            Ajar,
            Open,
        }
    }

    #[derive(Clone, Debug)]
    enum Push {
        Shove,
        Knock,
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum PushKind {
        Shove,
        Knock,
    }

    impl Message for Push {
        type Kind = PushKind;

        fn kind(&self) -> PushKind {
            match self {
                Self::Shove => PushKind::Shove,
                Self::Knock => PushKind::Knock,
            }
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = DefinitionBuilder::<Door, Push, ()>::new().build();

        assert!(matches!(result, Err(BuildError::MissingEntryState)));
    }

    #[test]
    fn empty_table_builds_a_dead_end() {
        let definition = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .build()
            .unwrap();

        assert!(definition.is_dead_end(&Door::Shut));
        assert_eq!(definition.name(), "Door");
    }

    #[test]
    fn fluent_api_builds_definition() {
        let definition = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .name("front door")
            .max_steps(16)
            .transition(
                TransitionBuilder::new()
                    .from(Door::Shut)
                    .to(Door::Ajar)
                    .on(PushKind::Shove),
            )
            .unwrap()
            .add_transition(Transition::new(Door::Ajar, Door::Open, Trigger::Instant))
            .build()
            .unwrap();

        assert_eq!(definition.name(), "front door");
        assert_eq!(definition.max_steps(), 16);

        let mut queue = VecDeque::from([Push::Shove]);
        let state = definition.resolve(Door::Shut, &mut (), &mut queue, None);
        assert_eq!(state, Door::Open);
        assert!(queue.is_empty());
    }

    #[test]
    fn transition_errors_propagate() {
        let result = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .transition(TransitionBuilder::new().from(Door::Shut));

        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn add_multiple_transitions() {
        let definition = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .transitions(vec![
                Transition::new(Door::Shut, Door::Ajar, Trigger::On(PushKind::Knock)),
                Transition::new(Door::Shut, Door::Open, Trigger::On(PushKind::Shove)),
            ])
            .build()
            .unwrap();

        assert_eq!(definition.transitions_from(&Door::Shut).len(), 2);
    }

    #[test]
    fn tick_message_is_installed() {
        let definition = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .tick_message(|_| Push::Knock)
            .build()
            .unwrap();

        assert!(matches!(definition.tick_message(0.5), Some(Push::Knock)));
    }

    #[test]
    fn build_checked_rejects_shadowed_transitions() {
        let result = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .add_transition(Transition::new(Door::Shut, Door::Ajar, Trigger::Any))
            .add_transition(Transition::new(
                Door::Shut,
                Door::Open,
                Trigger::On(PushKind::Shove),
            ))
            .build_checked();

        match result {
            Err(BuildError::Defects(defects)) => assert_eq!(defects.len(), 1),
            other => panic!("expected defects, got {:?}", other.err()),
        }
    }

    #[test]
    fn build_checked_accepts_clean_table() {
        let result = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .add_transition(Transition::new(
                Door::Shut,
                Door::Ajar,
                Trigger::On(PushKind::Knock),
            ))
            .add_transition(Transition::new(Door::Shut, Door::Open, Trigger::Any))
            .build_checked();

        assert!(result.is_ok());
    }

    #[test]
    fn raw_instant_transition_needing_a_message_fails_to_build() {
        let mut hasty = Transition::new(Door::Shut, Door::Open, Trigger::Instant);
        hasty.action = Some(Action::on_message(|_: &mut (), _: &Push| true));

        let result = DefinitionBuilder::<Door, Push, ()>::new()
            .entry(Door::Shut)
            .add_transition(hasty)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::MessageArityOnInstant { from, to }) if from == "Shut" && to == "Open"
        ));
    }
}
