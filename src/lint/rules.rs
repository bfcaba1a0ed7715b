//! Lint rules over transition tables using Validation.

use crate::core::{Message, State};
use crate::lint::defects::TableDefect;
use crate::machine::{Definition, Transition};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TableDefect>>;

impl<S: State, M: Message, C> Definition<S, M, C> {
    /// Check the whole table, accumulating ALL defects.
    /// Returns Validation::Success(()) if the table is clean.
    pub fn lint(&self) -> Check {
        let mut checks: Vec<Check> = Vec::new();

        for state in self.states() {
            let transitions = self.transitions_from(state);
            checks.extend(shadowed(state, transitions));
            checks.push(instant_cycle(self, state));
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

/// One check per transition: fails if an earlier unguarded transition
/// always wins on the same trigger.
fn shadowed<S: State, M: Message, C>(state: &S, transitions: &[Transition<S, M, C>]) -> Vec<Check> {
    transitions
        .iter()
        .enumerate()
        .map(|(index, later)| {
            let winner = transitions[..index].iter().position(|earlier| {
                earlier.guard.is_none() && later.trigger.covered_by(&earlier.trigger)
            });
            match winner {
                Some(by) => Validation::fail(TableDefect::Shadowed {
                    state: state.name().to_string(),
                    index,
                    by,
                }),
                None => Validation::success(()),
            }
        })
        .collect()
}

/// Follow the leading instant transition while it is unguarded; coming back
/// to `start` means every resolve pass through it exhausts the step budget.
fn instant_cycle<S: State, M: Message, C>(definition: &Definition<S, M, C>, start: &S) -> Check {
    let mut visited: HashSet<&S> = HashSet::new();
    let mut current = start;

    loop {
        let leading = definition
            .transitions_from(current)
            .iter()
            .find(|t| t.trigger.is_instant());

        match leading {
            Some(t) if t.guard.is_none() => {
                if &t.to == start {
                    return Validation::fail(TableDefect::InstantCycle {
                        state: start.name().to_string(),
                    });
                }
                if !visited.insert(&t.to) {
                    return Validation::success(());
                }
                current = &t.to;
            }
            _ => return Validation::success(()),
        }
    }
}
