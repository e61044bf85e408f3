//! This module defines the state machine model: Mealy and Moore states, their transitions,
//! and the `Machine` arena that owns them.
//!
//! States are stored in creation order and referenced everywhere else by `StateId`, so
//! self-loops and cycles need no shared ownership. Each machine also keeps a name index
//! and its input alphabet in first-seen order, which together fix a canonical ordering
//! for serialization.

use crate::types::{MachineError, MachineKind, StateId};
use std::collections::HashMap;

/// Common behaviour of Mealy and Moore states, as needed by the `Machine` arena.
pub trait State {
    /// The transition type stored per input symbol.
    type Transition;

    /// Returns the state's unique name.
    fn name(&self) -> &str;

    /// Returns the state's transition table, keyed by input symbol.
    fn transitions(&self) -> &HashMap<String, Self::Transition>;

    /// Returns the state's transition table for construction.
    fn transitions_mut(&mut self) -> &mut HashMap<String, Self::Transition>;
}

/// A transition of a Mealy machine: the signal emitted on the edge and the state it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealyTransition {
    pub signal: String,
    pub target: StateId,
}

/// A state of a Mealy machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealyState {
    name: String,
    transitions: HashMap<String, MealyTransition>,
}

impl MealyState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: HashMap::new(),
        }
    }
}

impl State for MealyState {
    type Transition = MealyTransition;

    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self) -> &HashMap<String, MealyTransition> {
        &self.transitions
    }

    fn transitions_mut(&mut self) -> &mut HashMap<String, MealyTransition> {
        &mut self.transitions
    }
}

/// A transition of a Moore machine. The emitted signal belongs to the target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MooreTransition {
    pub target: StateId,
}

/// A state of a Moore machine, carrying the signal emitted when the state is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MooreState {
    name: String,
    signal: String,
    transitions: HashMap<String, MooreTransition>,
}

impl MooreState {
    pub fn new(name: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signal: signal.into(),
            transitions: HashMap::new(),
        }
    }

    /// Returns the signal emitted on entering this state.
    pub fn signal(&self) -> &str {
        &self.signal
    }
}

impl State for MooreState {
    type Transition = MooreTransition;

    fn name(&self) -> &str {
        &self.name
    }

    fn transitions(&self) -> &HashMap<String, MooreTransition> {
        &self.transitions
    }

    fn transitions_mut(&mut self) -> &mut HashMap<String, MooreTransition> {
        &mut self.transitions
    }
}

/// An arena of uniquely named states together with the machine's input alphabet.
///
/// Machines are assembled by the parser and the converter and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine<S> {
    states: Vec<S>,
    index: HashMap<String, StateId>,
    alphabet: Vec<String>,
}

/// A Mealy machine.
pub type MealyMachine = Machine<MealyState>;
/// A Moore machine.
pub type MooreMachine = Machine<MooreState>;

impl<S> Default for Machine<S> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            index: HashMap::new(),
            alphabet: Vec::new(),
        }
    }
}

impl<S: State> Machine<S> {
    /// Creates an empty machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state and returns its handle.
    ///
    /// # Returns
    ///
    /// * `Ok(StateId)` for the newly added state.
    /// * `Err(MachineError::DuplicateState)` if a state with the same name already exists.
    pub(crate) fn add_state(&mut self, state: S) -> Result<StateId, MachineError> {
        if self.index.contains_key(state.name()) {
            return Err(MachineError::DuplicateState(state.name().to_string()));
        }

        let id = self.states.len();
        self.index.insert(state.name().to_string(), id);
        self.states.push(state);

        Ok(id)
    }

    /// Adds a transition for `symbol` to the state `id`, extending the alphabet on first sight
    /// of the symbol.
    pub(crate) fn add_transition(
        &mut self,
        id: StateId,
        symbol: &str,
        transition: S::Transition,
    ) -> Result<(), MachineError> {
        let state = &mut self.states[id];
        if state.transitions().contains_key(symbol) {
            return Err(MachineError::DuplicateInput {
                state: state.name().to_string(),
                symbol: symbol.to_string(),
            });
        }
        state
            .transitions_mut()
            .insert(symbol.to_string(), transition);

        if !self.alphabet.iter().any(|s| s == symbol) {
            self.alphabet.push(symbol.to_string());
        }

        Ok(())
    }

    /// Looks up a state handle by name.
    pub fn find(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    /// Returns the state behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this machine.
    pub fn state(&self, id: StateId) -> &S {
        &self.states[id]
    }

    /// Returns the name of the state behind a handle.
    pub fn name(&self, id: StateId) -> &str {
        self.states[id].name()
    }

    /// Returns the transition of state `id` for `symbol`, if any.
    pub fn transition(&self, id: StateId, symbol: &str) -> Option<&S::Transition> {
        self.states.get(id)?.transitions().get(symbol)
    }

    /// Returns all states in creation order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Iterates over `(handle, state)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &S)> {
        self.states.iter().enumerate()
    }

    /// Returns the input alphabet in first-seen order.
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }

    /// Returns the number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the total number of transitions over all states.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions().len()).sum()
    }
}

/// A machine of either model, for callers that pick the model at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMachine {
    Mealy(MealyMachine),
    Moore(MooreMachine),
}

impl StateMachine {
    /// Returns which model this machine uses.
    pub fn kind(&self) -> MachineKind {
        match self {
            StateMachine::Mealy(_) => MachineKind::Mealy,
            StateMachine::Moore(_) => MachineKind::Moore,
        }
    }

    /// Resolves a start state by name.
    ///
    /// # Returns
    ///
    /// * `Ok(StateId)` if the state exists.
    /// * `Err(MachineError::StartStateNotFound)` otherwise.
    pub fn find(&self, name: &str) -> Result<StateId, MachineError> {
        let id = match self {
            StateMachine::Mealy(machine) => machine.find(name),
            StateMachine::Moore(machine) => machine.find(name),
        };

        id.ok_or_else(|| MachineError::StartStateNotFound(name.to_string()))
    }

    pub fn state_count(&self) -> usize {
        match self {
            StateMachine::Mealy(machine) => machine.len(),
            StateMachine::Moore(machine) => machine.len(),
        }
    }

    pub fn alphabet(&self) -> &[String] {
        match self {
            StateMachine::Mealy(machine) => machine.alphabet(),
            StateMachine::Moore(machine) => machine.alphabet(),
        }
    }

    pub fn state_name(&self, id: StateId) -> &str {
        match self {
            StateMachine::Mealy(machine) => machine.name(id),
            StateMachine::Moore(machine) => machine.name(id),
        }
    }
}

impl From<MealyMachine> for StateMachine {
    fn from(machine: MealyMachine) -> Self {
        StateMachine::Mealy(machine)
    }
}

impl From<MooreMachine> for StateMachine {
    fn from(machine: MooreMachine) -> Self {
        StateMachine::Moore(machine)
    }
}
