//! Diagnostic trace of a single resolve pass.
//!
//! A trace is only built when an instance has logging enabled. It is not
//! part of the functional contract of resolution.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// What fired a traced transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepTrigger {
    /// Instant transition, no message involved
    Instant,
    /// Transition taken on a queued message of this kind
    Message { kind: String },
}

/// Why a resolve pass stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// Reached a state with no outgoing transitions
    DeadEnd,
    /// Nothing applicable and the queue ran dry
    Settled,
    /// Fired as many transitions as the definition allows per pass
    StepBudget,
}

/// Record of a single fired transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TraceStep<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// What fired the transition
    pub trigger: StepTrigger,
    /// Whether the action claimed the message
    pub consumed: bool,
    /// When the transition fired
    pub timestamp: DateTime<Utc>,
}

/// Ordered path of transitions taken during one resolve pass.
///
/// # Example
///
/// ```rust
/// use tickmind::core::{ResolveTrace, State, StepTrigger, TraceStep};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Phase { One, Two }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::One => "One",
///             Self::Two => "Two",
///         }
///     }
/// }
///
/// let mut trace = ResolveTrace::new();
/// trace.record(TraceStep {
///     from: Phase::One,
///     to: Phase::Two,
///     trigger: StepTrigger::Instant,
///     consumed: false,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(trace.get_path(), vec![&Phase::One, &Phase::Two]);
/// assert!(trace.is_noteworthy());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ResolveTrace<S: State> {
    steps: Vec<TraceStep<S>>,
    discarded: Vec<String>,
    halt: Option<Halt>,
    loud: bool,
}

impl<S: State> Default for ResolveTrace<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> ResolveTrace<S> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            discarded: Vec::new(),
            halt: None,
            loud: false,
        }
    }

    /// Record a fired transition.
    pub fn record(&mut self, step: TraceStep<S>) {
        self.steps.push(step);
    }

    /// Record a message dropped because nothing in the current state wanted it.
    pub fn discard(&mut self, kind: String) {
        self.discarded.push(kind);
    }

    /// Note that a message was looked at. Messages that do not suppress logs
    /// make the whole pass worth printing.
    pub fn saw_message(&mut self, suppress_logs: bool) {
        self.loud |= !suppress_logs;
    }

    pub fn finish(&mut self, halt: Halt) {
        self.halt = Some(halt);
    }

    pub fn steps(&self) -> &[TraceStep<S>] {
        &self.steps
    }

    pub fn discarded(&self) -> &[String] {
        &self.discarded
    }

    pub fn halt(&self) -> Option<Halt> {
        self.halt
    }

    /// States traversed: the first `from`, then each `to`.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.steps.first() {
            path.push(&first.from);
        }
        for step in &self.steps {
            path.push(&step.to);
        }
        path
    }

    /// Whether the pass changed state or handled a message that asked to be logged.
    pub fn is_noteworthy(&self) -> bool {
        self.loud || self.steps.iter().any(|step| step.from != step.to)
    }

    /// Human readable rendering for a log sink.
    pub fn render(&self, label: &str, before: &S, after: &S) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Processing: {label}");
        let _ = writeln!(out, "Current State: {}", before.name());
        for step in &self.steps {
            let consumed = if step.consumed { "consumed" } else { "kept" };
            match &step.trigger {
                StepTrigger::Instant => {
                    let _ = writeln!(out, "  {} -> {} (instant)", step.from.name(), step.to.name());
                }
                StepTrigger::Message { kind } => {
                    let _ = writeln!(
                        out,
                        "  {} -> {} on {kind} ({consumed})",
                        step.from.name(),
                        step.to.name()
                    );
                }
            }
        }
        for kind in &self.discarded {
            let _ = writeln!(out, "  discarded {kind}");
        }
        if let Some(halt) = self.halt {
            let _ = writeln!(out, "  halted: {halt:?}");
        }
        let _ = write!(out, "New State: {}", after.name());
        out
    }
}
