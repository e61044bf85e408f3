//! This module defines the shared types used throughout the crate: state handles, the
//! machine variant tags, the executor's unmatched-symbol policy, and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The field separator used by the tabular machine format.
pub const FIELD_SEPARATOR: char = ';';
/// Separates the target state from the emitted signal in a Mealy transition cell.
pub const SIGNAL_SEPARATOR: char = '/';

/// A handle to a state inside the machine that owns it.
///
/// Handles are indices into the machine's state arena and are only meaningful
/// for the machine that produced them.
pub type StateId = usize;

/// A rectangular grid of text cells, as read from or written to the tabular format.
pub type Grid = Vec<Vec<String>>;

/// The two supported state machine models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineKind {
    /// Output is emitted on transitions.
    Mealy,
    /// Output is emitted on entering a state.
    Moore,
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineKind::Mealy => write!(f, "mealy"),
            MachineKind::Moore => write!(f, "moore"),
        }
    }
}

impl FromStr for MachineKind {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mealy" => Ok(MachineKind::Mealy),
            "moore" => Ok(MachineKind::Moore),
            other => Err(MachineError::UnknownMachineKind(other.to_string())),
        }
    }
}

/// What the executor does with an input symbol the current state has no transition for.
///
/// - `Abort` (default): the run fails with `MachineError::UnexpectedInput`.
/// - `SkipAndWarn`: the symbol is logged, recorded in the trace and skipped without
///   changing the current state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnUnmatched {
    /// Unmatched symbols are errors.
    #[default]
    Abort,
    /// Unmatched symbols are skipped with a warning.
    SkipAndWarn,
}

/// Represents various errors that can occur while reading, converting or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// Indicates an error related to file system operations on a machine table.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates that the tabular text itself could not be parsed.
    #[error("Table parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a grid whose shape does not match the expected layout.
    #[error("Malformed grid: {0}")]
    MalformedGrid(String),
    /// Indicates a Mealy transition cell that is not of the form `target/signal`.
    #[error("Malformed cell {cell:?} at row {row}, column {column}: expected \"<state>/<signal>\"")]
    MalformedCell {
        row: usize,
        column: usize,
        cell: String,
    },
    /// Indicates a transition that names a state which does not exist in the machine.
    #[error("Unresolved state {name:?} at row {row}, column {column}")]
    UnresolvedState {
        name: String,
        row: usize,
        column: usize,
    },
    /// Indicates that two states share the same name.
    #[error("Duplicate state: {0}")]
    DuplicateState(String),
    /// Indicates that a state defines two transitions for the same input symbol.
    #[error("Duplicate input symbol {symbol:?} for state {state}")]
    DuplicateInput { state: String, symbol: String },
    /// Indicates that a state has no transition for a symbol of the machine's alphabet.
    #[error("State {state} has no transition for input symbol {symbol:?}")]
    MissingTransition { state: String, symbol: String },
    /// Indicates that the requested start state does not exist.
    #[error("Start state not found: {0}")]
    StartStateNotFound(String),
    /// Indicates that the current state has no transition for an input symbol.
    #[error("Unexpected input symbol {symbol:?} in state {state}")]
    UnexpectedInput { state: String, symbol: String },
    /// Indicates an unsupported machine type name.
    #[error("Unknown machine type: {0} (expected 'mealy' or 'moore')")]
    UnknownMachineKind(String),
    /// Indicates that a machine failed the checks required before conversion.
    #[error("Machine validation error: {0}")]
    ValidationError(String),
}
