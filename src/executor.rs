//! This module defines the `Executor`, which walks a machine over an input sequence and
//! collects the emitted signals.
//!
//! The model-specific move rule lives in the `Step` trait. `Executor::run` picks the
//! implementation once per run by matching on the `StateMachine` variant.

use crate::machine::{MealyMachine, MooreMachine, StateMachine};
use crate::types::{MachineError, OnUnmatched, StateId};
use serde::Serialize;
use tracing::{debug, warn};

/// The move rule of a machine model.
pub trait Step {
    /// Moves from `state` on `symbol`.
    ///
    /// # Returns
    ///
    /// * `Some((signal, next))` with the emitted signal and the next state.
    /// * `None` if `state` has no transition for `symbol`.
    fn advance(&self, state: StateId, symbol: &str) -> Option<(&str, StateId)>;

    /// Returns the name of a state, for diagnostics.
    fn state_name(&self, state: StateId) -> &str;
}

impl Step for MealyMachine {
    /// A Mealy machine emits the signal written on the transition.
    fn advance(&self, state: StateId, symbol: &str) -> Option<(&str, StateId)> {
        self.transition(state, symbol)
            .map(|transition| (transition.signal.as_str(), transition.target))
    }

    fn state_name(&self, state: StateId) -> &str {
        self.name(state)
    }
}

impl Step for MooreMachine {
    /// A Moore machine emits the signal of the state it enters.
    fn advance(&self, state: StateId, symbol: &str) -> Option<(&str, StateId)> {
        self.transition(state, symbol)
            .map(|transition| (self.state(transition.target).signal(), transition.target))
    }

    fn state_name(&self, state: StateId) -> &str {
        self.name(state)
    }
}

/// An input symbol that was skipped because the current state had no transition for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// Index of the symbol in the input sequence.
    pub position: usize,
    /// The state the machine was in.
    pub state: String,
    pub symbol: String,
}

/// The outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    /// Emitted signals, one per consumed input symbol, in order.
    pub signals: Vec<String>,
    /// Symbols skipped under `OnUnmatched::SkipAndWarn`.
    pub skipped: Vec<Skipped>,
    /// The state the machine ended in.
    pub final_state: String,
}

/// Runs input sequences against machines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    on_unmatched: OnUnmatched,
}

impl Executor {
    /// Creates an executor with the given policy for unmatched input symbols.
    pub fn new(on_unmatched: OnUnmatched) -> Self {
        Self { on_unmatched }
    }

    pub fn on_unmatched(&self) -> OnUnmatched {
        self.on_unmatched
    }

    /// Runs `input` against `machine` starting from the state named `start`.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::StartStateNotFound)` if there is no such state.
    /// * Otherwise the result of `Executor::run`.
    pub fn run_from<S: AsRef<str>>(
        &self,
        machine: &StateMachine,
        start: &str,
        input: &[S],
    ) -> Result<Trace, MachineError> {
        self.run(machine, machine.find(start)?, input)
    }

    /// Runs `input` against `machine` starting from state `start`.
    ///
    /// # Returns
    ///
    /// * `Ok(Trace)` once every symbol has been consumed or skipped.
    /// * `Err(MachineError::UnexpectedInput)` on the first unmatched symbol under
    ///   `OnUnmatched::Abort`; no signals are returned in that case.
    /// * `Err(MachineError::StartStateNotFound)` if `start` is not a state of `machine`.
    pub fn run<S: AsRef<str>>(
        &self,
        machine: &StateMachine,
        start: StateId,
        input: &[S],
    ) -> Result<Trace, MachineError> {
        if start >= machine.state_count() {
            return Err(MachineError::StartStateNotFound(format!("#{start}")));
        }

        match machine {
            StateMachine::Mealy(machine) => self.walk(machine, start, input),
            StateMachine::Moore(machine) => self.walk(machine, start, input),
        }
    }

    fn walk<M: Step, S: AsRef<str>>(
        &self,
        machine: &M,
        start: StateId,
        input: &[S],
    ) -> Result<Trace, MachineError> {
        let mut state = start;
        let mut signals = Vec::with_capacity(input.len());
        let mut skipped = Vec::new();

        for (position, symbol) in input.iter().enumerate() {
            let symbol = symbol.as_ref();

            let Some((signal, next)) = machine.advance(state, symbol) else {
                let error = MachineError::UnexpectedInput {
                    state: machine.state_name(state).to_string(),
                    symbol: symbol.to_string(),
                };

                match self.on_unmatched {
                    OnUnmatched::Abort => return Err(error),
                    OnUnmatched::SkipAndWarn => {
                        warn!(position, %error, "skipping input symbol");
                        skipped.push(Skipped {
                            position,
                            state: machine.state_name(state).to_string(),
                            symbol: symbol.to_string(),
                        });
                        continue;
                    }
                }
            };

            debug!(
                from = machine.state_name(state),
                to = machine.state_name(next),
                symbol,
                signal,
                "step"
            );
            signals.push(signal.to_string());
            state = next;
        }

        Ok(Trace {
            signals,
            skipped,
            final_state: machine.state_name(state).to_string(),
        })
    }
}
