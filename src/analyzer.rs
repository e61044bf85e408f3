//! This module checks machines for the one property conversion depends on: every state
//! defines a transition for every symbol of the machine's alphabet.

use crate::machine::{Machine, State};
use crate::types::MachineError;

/// Represents problems found while analyzing a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// `(state, symbol)` pairs for which no transition is defined.
    MissingTransitions(Vec<(String, String)>),
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into a `MachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::MissingTransitions(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(state, symbol)| format!("{state} on {symbol:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                MachineError::ValidationError(format!("Missing transitions: {pairs}"))
            }
        }
    }
}

/// Analyzes a machine before conversion.
///
/// # Returns
///
/// * `Ok(())` if every state handles every symbol of the alphabet.
/// * `Err(MachineError::ValidationError)` listing every missing `(state, symbol)` pair.
pub fn analyze<S: State>(machine: &Machine<S>) -> Result<(), MachineError> {
    check_complete(machine)?;
    Ok(())
}

fn check_complete<S: State>(machine: &Machine<S>) -> Result<(), AnalysisError> {
    let missing = machine
        .states()
        .iter()
        .flat_map(|state| {
            machine
                .alphabet()
                .iter()
                .filter(move |symbol| !state.transitions().contains_key(symbol.as_str()))
                .map(move |symbol| (state.name().to_string(), symbol.clone()))
        })
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(AnalysisError::MissingTransitions(missing));
    }

    Ok(())
}
