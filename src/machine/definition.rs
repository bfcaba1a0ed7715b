//! Shared, immutable state machine definitions and the resolution algorithm.

use crate::core::{Halt, Message, ResolveTrace, State, StepTrigger, TraceStep};
use crate::machine::config::InstanceConfig;
use crate::machine::instance::Instance;
use crate::machine::transition::Transition;
use chrono::Utc;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

/// Default number of transitions a single resolve pass may fire.
pub const DEFAULT_MAX_STEPS: usize = 1024;

/// Factory for the periodic message a behaviour wants on every tick.
pub type TickFactory<M> = Box<dyn Fn(f32) -> M + Send + Sync>;

/// The transition table of one behaviour, shared by every instance of it.
pub struct Definition<S: State, M: Message, C> {
    name: String,
    entry: S,
    table: HashMap<S, Vec<Transition<S, M, C>>>,
    max_steps: usize,
    tick: Option<TickFactory<M>>,
}

impl<S: State, M: Message, C> Definition<S, M, C> {
    /// Create an empty definition starting in `entry`.
    pub fn new(entry: S) -> Self {
        Self {
            name: std::any::type_name::<S>()
                .rsplit("::")
                .next()
                .unwrap_or("machine")
                .to_string(),
            entry,
            table: HashMap::new(),
            max_steps: DEFAULT_MAX_STEPS,
            tick: None,
        }
    }

    /// Append a transition to the ordered list of its source state.
    ///
    /// The target state does not need transitions of its own; states without
    /// any are dead ends.
    ///
    /// # Panics
    ///
    /// If the transition is instant but its guard or action takes a message.
    pub fn add_transition(&mut self, transition: Transition<S, M, C>) {
        assert!(
            transition.is_well_formed(),
            "instant transition {} -> {} has a guard or action that needs a message",
            transition.from.name(),
            transition.to.name()
        );
        self.table
            .entry(transition.from.clone())
            .or_default()
            .push(transition);
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps.max(1);
    }

    pub(crate) fn set_tick(&mut self, tick: TickFactory<M>) {
        self.tick = Some(tick);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &S {
        &self.entry
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Ordered transitions leaving `state`; empty for dead ends.
    pub fn transitions_from(&self, state: &S) -> &[Transition<S, M, C>] {
        self.table.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_dead_end(&self, state: &S) -> bool {
        !self.table.contains_key(state)
    }

    /// States that have at least one outgoing transition.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.table.keys()
    }

    /// Synthesize this behaviour's tick message, if it has one.
    pub fn tick_message(&self, delta: f32) -> Option<M> {
        self.tick.as_ref().map(|tick| tick(delta))
    }

    /// Create an instance in the entry state bound to `context`.
    pub fn create_instance(self: &Arc<Self>, context: Rc<RefCell<C>>) -> Instance<S, M, C> {
        Instance::new(Arc::clone(self), context, InstanceConfig::default())
    }

    /// Create an instance with explicit configuration.
    pub fn create_instance_with(
        self: &Arc<Self>,
        context: Rc<RefCell<C>>,
        config: InstanceConfig,
    ) -> Instance<S, M, C> {
        Instance::new(Arc::clone(self), context, config)
    }

    /// Resolve `state` against `queue`, returning the state reached.
    ///
    /// Instant transitions are tried first; the first whose guard passes is
    /// taken without touching the queue. Otherwise the head message is matched
    /// against the state's transitions in declaration order. A matching
    /// transition pops the head only if its action reports consumption; a head
    /// nothing wants is dropped. Every transition taken restarts resolution
    /// from the new state, until a dead end is reached, nothing applies to an
    /// empty queue, or `max_steps` transitions have fired.
    pub fn resolve(
        &self,
        state: S,
        context: &mut C,
        queue: &mut VecDeque<M>,
        mut trace: Option<&mut ResolveTrace<S>>,
    ) -> S {
        let mut state = state;
        let mut fired = 0usize;

        'resolve: loop {
            let Some(transitions) = self.table.get(&state) else {
                if let Some(trace) = trace.as_deref_mut() {
                    trace.finish(Halt::DeadEnd);
                }
                return state;
            };

            if let Some(transition) = transitions.iter().find(|t| t.can_fire(context, None)) {
                if fired == self.max_steps {
                    return self.exhausted(state, trace);
                }
                let consumed = transition.fire(context, None);
                if let Some(trace) = trace.as_deref_mut() {
                    trace.record(TraceStep {
                        from: state.clone(),
                        to: transition.to.clone(),
                        trigger: StepTrigger::Instant,
                        consumed,
                        timestamp: Utc::now(),
                    });
                }
                state = transition.to.clone();
                fired += 1;
                continue 'resolve;
            }

            while let Some(head) = queue.front() {
                let kind = head.kind();
                if let Some(trace) = trace.as_deref_mut() {
                    trace.saw_message(head.suppress_logs());
                }

                let Some(transition) = transitions.iter().find(|t| t.can_fire(context, Some(head)))
                else {
                    queue.pop_front();
                    if let Some(trace) = trace.as_deref_mut() {
                        trace.discard(format!("{kind:?}"));
                    }
                    continue;
                };

                if fired == self.max_steps {
                    return self.exhausted(state, trace);
                }
                let consumed = transition.fire(context, Some(head));
                if consumed {
                    queue.pop_front();
                }
                if let Some(trace) = trace.as_deref_mut() {
                    trace.record(TraceStep {
                        from: state.clone(),
                        to: transition.to.clone(),
                        trigger: StepTrigger::Message {
                            kind: format!("{kind:?}"),
                        },
                        consumed,
                        timestamp: Utc::now(),
                    });
                }
                state = transition.to.clone();
                fired += 1;
                continue 'resolve;
            }

            if let Some(trace) = trace.as_deref_mut() {
                trace.finish(Halt::Settled);
            }
            return state;
        }
    }

    fn exhausted(&self, state: S, trace: Option<&mut ResolveTrace<S>>) -> S {
        tracing::warn!(
            machine = %self.name,
            state = state.name(),
            max_steps = self.max_steps,
            "resolve pass hit its step budget; remaining work deferred to the next update"
        );
        if let Some(trace) = trace {
            trace.finish(Halt::StepBudget);
        }
        state
    }
}
