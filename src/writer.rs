//! This module serializes machines back into the `Grid` layouts read by the parser.
//!
//! Columns follow the machine's state creation order and rows follow its alphabet's
//! first-seen order, so the same machine always produces the same grid.

use crate::machine::{MealyMachine, MooreMachine, StateMachine};
use crate::types::{Grid, MachineError, StateId, SIGNAL_SEPARATOR};
use std::iter;

/// Serializes a machine of either model.
pub fn write(machine: &StateMachine) -> Result<Grid, MachineError> {
    match machine {
        StateMachine::Mealy(machine) => write_mealy(machine),
        StateMachine::Moore(machine) => write_moore(machine),
    }
}

/// Serializes a Mealy machine: a header row of state names followed by one row of
/// `"<target>/<signal>"` cells per input symbol.
///
/// # Returns
///
/// * `Ok(Grid)` that parses back into an equal machine.
/// * `Err(MachineError::MissingTransition)` if a state lacks a transition for a symbol of
///   the alphabet.
/// * `Err(MachineError::ValidationError)` if a signal contains the `/` separator.
pub fn write_mealy(machine: &MealyMachine) -> Result<Grid, MachineError> {
    let header = iter::once(String::new())
        .chain(machine.iter().map(|(id, _)| machine.name(id).to_string()))
        .collect::<Vec<_>>();

    let mut grid = vec![header];
    for symbol in machine.alphabet() {
        let mut row = vec![symbol.clone()];
        for (id, _) in machine.iter() {
            let transition = machine
                .transition(id, symbol)
                .ok_or_else(|| missing(machine.name(id), symbol))?;

            if transition.signal.contains(SIGNAL_SEPARATOR) {
                return Err(MachineError::ValidationError(format!(
                    "Signal {:?} of state {} contains '{SIGNAL_SEPARATOR}'",
                    transition.signal,
                    machine.name(id)
                )));
            }

            row.push(format!(
                "{}{SIGNAL_SEPARATOR}{}",
                machine.name(transition.target),
                transition.signal
            ));
        }
        grid.push(row);
    }

    Ok(grid)
}

/// Serializes a Moore machine: a row of signals, a row of state names, then one row of
/// target state names per input symbol.
///
/// # Returns
///
/// * `Ok(Grid)` that parses back into an equal machine.
/// * `Err(MachineError::MissingTransition)` if a state lacks a transition for a symbol of
///   the alphabet.
/// * `Err(MachineError::ValidationError)` if a state has an empty signal, which the
///   layout reserves for padding columns.
pub fn write_moore(machine: &MooreMachine) -> Result<Grid, MachineError> {
    let mut signals = vec![String::new()];
    let mut names = vec![String::new()];
    for (id, state) in machine.iter() {
        if state.signal().is_empty() {
            return Err(MachineError::ValidationError(format!(
                "State {} has an empty signal",
                machine.name(id)
            )));
        }
        signals.push(state.signal().to_string());
        names.push(machine.name(id).to_string());
    }

    let mut grid = vec![signals, names];
    for symbol in machine.alphabet() {
        let row = iter::once(Ok(symbol.clone()))
            .chain(machine.iter().map(|(id, _)| target_name(machine, id, symbol)))
            .collect::<Result<Vec<_>, _>>()?;
        grid.push(row);
    }

    Ok(grid)
}

fn target_name(machine: &MooreMachine, id: StateId, symbol: &str) -> Result<String, MachineError> {
    machine
        .transition(id, symbol)
        .map(|transition| machine.name(transition.target).to_string())
        .ok_or_else(|| missing(machine.name(id), symbol))
}

fn missing(state: &str, symbol: &str) -> MachineError {
    MachineError::MissingTransition {
        state: state.to_string(),
        symbol: symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{MealyState, MealyTransition, MooreState, MooreTransition};
    use crate::parser::{parse_mealy, parse_moore};

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_write_mealy() {
        let input = grid(&[
            &["", "A", "B"],
            &["0", "B/x", "A/z"],
            &["1", "A/y", "B/w"],
        ]);
        let machine = parse_mealy(&input).unwrap();

        assert_eq!(write_mealy(&machine).unwrap(), input);
    }

    #[test]
    fn test_write_moore() {
        let input = grid(&[
            &["", "u", "v"],
            &["", "S0", "S1"],
            &["a", "S1", "S0"],
            &["b", "S0", "S1"],
        ]);
        let machine = parse_moore(&input).unwrap();

        assert_eq!(write_moore(&machine).unwrap(), input);
    }

    #[test]
    fn test_write_drops_padding_columns() {
        let input = grid(&[&["", "u", "", "v"], &["", "S0", "", "S1"], &["a", "S1", "", "S0"]]);
        let machine = parse_moore(&input).unwrap();

        let output = write_moore(&machine).unwrap();
        assert_eq!(
            output,
            grid(&[&["", "u", "v"], &["", "S0", "S1"], &["a", "S1", "S0"]])
        );
        assert_eq!(parse_moore(&output).unwrap(), machine);
    }

    #[test]
    fn test_write_is_reproducible() {
        let mut machine = MealyMachine::new();
        let names = ["q3", "q1", "q4", "q0", "q2"];
        let ids = names
            .iter()
            .map(|name| machine.add_state(MealyState::new(*name)).unwrap())
            .collect::<Vec<_>>();
        for (i, &id) in ids.iter().enumerate() {
            for symbol in ["z", "a", "m"] {
                let transition = MealyTransition {
                    signal: format!("{symbol}{i}"),
                    target: ids[(i + 1) % ids.len()],
                };
                machine.add_transition(id, symbol, transition).unwrap();
            }
        }

        let first = write_mealy(&machine).unwrap();
        for _ in 0..10 {
            assert_eq!(write_mealy(&machine).unwrap(), first);
        }
        assert_eq!(first[0], vec!["", "q3", "q1", "q4", "q0", "q2"]);
        assert_eq!(first[1][0], "z");
        assert_eq!(first[1][1], "q1/z0");
        assert_eq!(parse_mealy(&first).unwrap(), machine);
    }

    #[test]
    fn test_write_missing_transition() {
        let mut machine = MooreMachine::new();
        let s0 = machine.add_state(MooreState::new("S0", "u")).unwrap();
        let s1 = machine.add_state(MooreState::new("S1", "v")).unwrap();
        machine
            .add_transition(s0, "a", MooreTransition { target: s1 })
            .unwrap();

        let result = write_moore(&machine);
        assert_eq!(
            result,
            Err(MachineError::MissingTransition {
                state: "S1".into(),
                symbol: "a".into(),
            })
        );
    }

    #[test]
    fn test_write_rejects_unwritable_signals() {
        let mut machine = MealyMachine::new();
        let a = machine.add_state(MealyState::new("A")).unwrap();
        machine
            .add_transition(
                a,
                "0",
                MealyTransition {
                    signal: "x/y".into(),
                    target: a,
                },
            )
            .unwrap();
        assert!(matches!(
            write_mealy(&machine),
            Err(MachineError::ValidationError(_))
        ));

        let mut machine = MooreMachine::new();
        machine.add_state(MooreState::new("S0", "")).unwrap();
        assert!(matches!(
            write_moore(&machine),
            Err(MachineError::ValidationError(_))
        ));
    }

    #[test]
    fn test_write_by_kind() {
        let input = grid(&[&["", "A"], &["0", "A/x"]]);
        let machine = StateMachine::Mealy(parse_mealy(&input).unwrap());

        assert_eq!(write(&machine).unwrap(), input);
    }
}
