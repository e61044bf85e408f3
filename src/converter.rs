//! This module converts machines between the Mealy and Moore models.
//!
//! Mealy to Moore splits states: every distinct `(target, signal)` pair reached by some
//! Mealy transition becomes one Moore state named `"<target>/<signal>"` that emits
//! `signal` on entry. Moore to Mealy keeps the states one to one and moves each state's
//! signal onto the edges that lead into it.

use crate::analyzer::analyze;
use crate::loader::MachineLoader;
use crate::machine::{
    MealyMachine, MealyState, MealyTransition, MooreMachine, MooreState, MooreTransition, State,
};
use crate::types::{MachineError, StateId, SIGNAL_SEPARATOR};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Maps a `(mealy target, signal)` pair to the Moore state generated for it.
type SplitStates<'a> = HashMap<(StateId, &'a str), StateId>;

/// Converts a Mealy machine into an equivalent Moore machine.
///
/// The Mealy machine must define a transition for every symbol in every state. States
/// that no transition leads into have no Moore counterpart.
///
/// # Returns
///
/// * `Ok(MooreMachine)` with one state per distinct reachable `(target, signal)` pair.
/// * `Err(MachineError::ValidationError)` if the Mealy machine is incomplete.
pub fn mealy_to_moore(mealy: &MealyMachine) -> Result<MooreMachine, MachineError> {
    analyze(mealy)?;

    let mut moore = MooreMachine::new();
    let split = generate_moore_states(mealy, &mut moore)?;
    fill_moore_transitions(mealy, &mut moore, &split)?;

    Ok(moore)
}

/// Creates one Moore state per distinct `(target, signal)` pair, in the order the pairs
/// are first met walking states in creation order and symbols in alphabet order.
fn generate_moore_states<'a>(
    mealy: &'a MealyMachine,
    moore: &mut MooreMachine,
) -> Result<SplitStates<'a>, MachineError> {
    let mut split = SplitStates::new();

    for (id, _) in mealy.iter() {
        for symbol in mealy.alphabet() {
            let Some(transition) = mealy.transition(id, symbol) else {
                continue;
            };

            let key = (transition.target, transition.signal.as_str());
            if split.contains_key(&key) {
                continue;
            }

            let name = format!(
                "{}{SIGNAL_SEPARATOR}{}",
                mealy.name(transition.target),
                transition.signal
            );
            let state = moore.add_state(MooreState::new(name, transition.signal.as_str()))?;
            split.insert(key, state);
        }
    }
    info!(states = moore.len(), "generated moore states");

    Ok(split)
}

/// Fills the transitions of every generated Moore state.
///
/// The Moore state for `(T, g)` goes, on input `j`, to the Moore state for wherever Mealy
/// state `T` goes on `j` and what it emits there. Each `(source, input)` pair is decided
/// once; the input symbol is part of that key so two inputs leading to the same
/// destination both get their transition.
fn fill_moore_transitions(
    mealy: &MealyMachine,
    moore: &mut MooreMachine,
    split: &SplitStates,
) -> Result<(), MachineError> {
    let mut filled = HashSet::new();

    for (id, _) in mealy.iter() {
        for symbol in mealy.alphabet() {
            let Some(transition) = mealy.transition(id, symbol) else {
                continue;
            };
            let source = split_state(mealy, split, transition.target, &transition.signal)?;

            for input in mealy.alphabet() {
                if !filled.insert((source, input.as_str())) {
                    continue;
                }

                let next = mealy.transition(transition.target, input).ok_or_else(|| {
                    MachineError::MissingTransition {
                        state: mealy.name(transition.target).to_string(),
                        symbol: input.clone(),
                    }
                })?;
                let target = split_state(mealy, split, next.target, &next.signal)?;

                moore.add_transition(source, input, MooreTransition { target })?;
            }
        }
    }
    info!(transitions = filled.len(), "filled moore transitions");

    Ok(())
}

fn split_state(
    mealy: &MealyMachine,
    split: &SplitStates,
    target: StateId,
    signal: &str,
) -> Result<StateId, MachineError> {
    split.get(&(target, signal)).copied().ok_or_else(|| {
        MachineError::ValidationError(format!(
            "No moore state generated for {}{SIGNAL_SEPARATOR}{signal}",
            mealy.name(target)
        ))
    })
}

/// Converts a Moore machine into an equivalent Mealy machine.
///
/// Every Moore state becomes a Mealy state of the same name, and each transition emits
/// the signal of the Moore state it leads to.
pub fn moore_to_mealy(moore: &MooreMachine) -> Result<MealyMachine, MachineError> {
    let mut mealy = MealyMachine::new();
    for state in moore.states() {
        mealy.add_state(MealyState::new(state.name()))?;
    }
    info!(states = mealy.len(), "generated mealy states");

    // Handles carry over unchanged since states are created in the same order.
    for (id, _) in moore.iter() {
        for symbol in moore.alphabet() {
            let Some(transition) = moore.transition(id, symbol) else {
                continue;
            };

            let signal = moore.state(transition.target).signal().to_string();
            let target = transition.target;
            mealy.add_transition(id, symbol, MealyTransition { signal, target })?;
        }
    }
    info!(
        transitions = mealy.transition_count(),
        "filled mealy transitions"
    );

    Ok(mealy)
}

/// Reads a Mealy table from `input` and writes the equivalent Moore table to `output`.
pub fn convert_mealy_file(input: &Path, output: &Path) -> Result<(), MachineError> {
    let mealy = MachineLoader::load_mealy(input)?;
    let moore = mealy_to_moore(&mealy)?;
    MachineLoader::save_moore(output, &moore)
}

/// Reads a Moore table from `input` and writes the equivalent Mealy table to `output`.
pub fn convert_moore_file(input: &Path, output: &Path) -> Result<(), MachineError> {
    let moore = MachineLoader::load_moore(input)?;
    let mealy = moore_to_mealy(&moore)?;
    MachineLoader::save_mealy(output, &mealy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use crate::machine::StateMachine;
    use std::fs;
    use tempfile::tempdir;

    const MEALY: &str = include_str!("../machines/mealy.csv");
    const MOORE: &str = include_str!("../machines/moore.csv");

    fn create_mealy_machine() -> MealyMachine {
        MachineLoader::load_mealy_from_string(MEALY).unwrap()
    }

    fn names<S: State>(machine: &crate::machine::Machine<S>) -> Vec<&str> {
        machine.states().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_mealy_to_moore_states() {
        let moore = mealy_to_moore(&create_mealy_machine()).unwrap();

        assert_eq!(names(&moore), vec!["B/x", "A/y", "A/z", "B/w"]);
        let signals = moore.states().iter().map(|s| s.signal()).collect::<Vec<_>>();
        assert_eq!(signals, vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn test_mealy_to_moore_transitions() {
        let moore = mealy_to_moore(&create_mealy_machine()).unwrap();
        let target = |from: &str, input: &str| {
            let id = moore.find(from).unwrap();
            moore.name(moore.transition(id, input).unwrap().target).to_string()
        };

        // B/x behaves like B: 0 -> A emitting z, 1 -> B emitting w
        assert_eq!(target("B/x", "0"), "A/z");
        assert_eq!(target("B/x", "1"), "B/w");
        // A/y and A/z both behave like A
        assert_eq!(target("A/y", "0"), "B/x");
        assert_eq!(target("A/z", "1"), "A/y");
        assert_eq!(moore.transition_count(), 8);
    }

    #[test]
    fn test_equal_pairs_merge() {
        let mealy = MachineLoader::load_mealy_from_string(";A;B\n0;B/x;B/x\n1;A/x;A/x\n").unwrap();

        let moore = mealy_to_moore(&mealy).unwrap();
        assert_eq!(names(&moore), vec!["B/x", "A/x"]);
    }

    #[test]
    fn test_every_input_gets_its_own_transition() {
        // B sends both inputs to the same (A, y) pair; each input still needs its own entry.
        let mealy = MachineLoader::load_mealy_from_string(";A;B\n0;B/x;A/y\n1;B/x;A/y\n").unwrap();

        let moore = mealy_to_moore(&mealy).unwrap();
        assert_eq!(names(&moore), vec!["B/x", "A/y"]);
        for (id, state) in moore.iter() {
            assert_eq!(
                state.transitions().len(),
                2,
                "state {} is missing a transition",
                moore.name(id)
            );
        }

        let b_x = moore.find("B/x").unwrap();
        let a_y = moore.find("A/y").unwrap();
        assert_eq!(moore.transition(b_x, "0").unwrap().target, a_y);
        assert_eq!(moore.transition(b_x, "1").unwrap().target, a_y);
    }

    #[test]
    fn test_mealy_to_moore_incomplete() {
        let mealy = MachineLoader::load_mealy_from_string(";A\n0;A/x\n").unwrap();
        assert!(mealy_to_moore(&mealy).is_ok());

        let mut mealy = MealyMachine::new();
        let a = mealy.add_state(MealyState::new("A")).unwrap();
        let b = mealy.add_state(MealyState::new("B")).unwrap();
        mealy
            .add_transition(a, "0", MealyTransition { signal: "x".into(), target: b })
            .unwrap();

        let result = mealy_to_moore(&mealy);
        assert!(matches!(result, Err(MachineError::ValidationError(_))));
    }

    #[test]
    fn test_round_trip_state_count() {
        let moore = mealy_to_moore(&create_mealy_machine()).unwrap();
        let mealy = moore_to_mealy(&moore).unwrap();

        assert_eq!(mealy.len(), moore.len());
        assert_eq!(names(&mealy), names(&moore));
    }

    #[test]
    fn test_signal_relocation() {
        let original = create_mealy_machine();
        let moore = mealy_to_moore(&original).unwrap();

        for (id, _) in original.iter() {
            for symbol in original.alphabet() {
                let transition = original.transition(id, symbol).unwrap();
                let name = format!("{}/{}", original.name(transition.target), transition.signal);
                let state = moore.find(&name).unwrap();
                assert_eq!(moore.state(state).signal(), transition.signal);
            }
        }

        let mealy = moore_to_mealy(&moore).unwrap();
        for (id, _) in moore.iter() {
            for symbol in moore.alphabet() {
                let target = moore.transition(id, symbol).unwrap().target;
                let transition = mealy.transition(id, symbol).unwrap();
                assert_eq!(transition.signal, moore.state(target).signal());
                assert_eq!(mealy.name(transition.target), moore.name(target));
            }
        }
    }

    #[test]
    fn test_moore_to_mealy() {
        let moore = MachineLoader::load_moore_from_string(MOORE).unwrap();
        let mealy = moore_to_mealy(&moore).unwrap();

        assert_eq!(names(&mealy), vec!["S0", "S1", "S2", "S3"]);
        let s0 = mealy.find("S0").unwrap();
        let s1 = mealy.find("S1").unwrap();
        assert_eq!(
            mealy.transition(s0, "x1"),
            Some(&MealyTransition {
                signal: "u2".into(),
                target: s1,
            })
        );
        assert_eq!(mealy.transition(s0, "x2").unwrap().signal, "u2");
    }

    #[test]
    fn test_converted_machine_is_equivalent() {
        let mealy = create_mealy_machine();
        let moore = StateMachine::Moore(mealy_to_moore(&mealy).unwrap());
        let mealy = StateMachine::Mealy(mealy);
        let executor = Executor::default();

        // Entering A/y behaves like being in A, and B/x like being in B.
        let starts = [("A", "A/y"), ("B", "B/x")];
        let mut inputs: Vec<Vec<&str>> = vec![vec![]];
        for _ in 0..4 {
            inputs = inputs
                .iter()
                .flat_map(|prefix| {
                    ["0", "1"].into_iter().map(move |symbol| {
                        let mut next = prefix.clone();
                        next.push(symbol);
                        next
                    })
                })
                .collect();

            for input in &inputs {
                for (mealy_start, moore_start) in starts {
                    let expected = executor
                        .run(&mealy, mealy.find(mealy_start).unwrap(), input)
                        .unwrap();
                    let actual = executor
                        .run(&moore, moore.find(moore_start).unwrap(), input)
                        .unwrap();
                    assert_eq!(expected.signals, actual.signals, "input {input:?}");
                }
            }
        }
    }

    #[test]
    fn test_convert_mealy_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("mealy.csv");
        let output = dir.path().join("moore.csv");
        fs::write(&input, MEALY).unwrap();

        convert_mealy_file(&input, &output).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            ";x;y;z;w\n;B/x;A/y;A/z;B/w\n0;A/z;B/x;B/x;A/z\n1;B/w;A/y;A/y;B/w\n"
        );
    }

    #[test]
    fn test_convert_moore_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("moore.csv");
        let output = dir.path().join("mealy.csv");
        fs::write(&input, MOORE).unwrap();

        convert_moore_file(&input, &output).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            ";S0;S1;S2;S3\nx1;S1/u2;S2/u1;S3/u2;S0/u1\nx2;S3/u2;S0/u1;S1/u2;S2/u1\n"
        );
    }

    #[test]
    fn test_convert_file_round_trip() {
        let dir = tempdir().unwrap();
        let mealy_path = dir.path().join("mealy.csv");
        let moore_path = dir.path().join("moore.csv");
        let back_path = dir.path().join("back.csv");
        fs::write(&mealy_path, MEALY).unwrap();

        convert_mealy_file(&mealy_path, &moore_path).unwrap();
        convert_moore_file(&moore_path, &back_path).unwrap();

        let back = MachineLoader::load_mealy(&back_path).unwrap();
        assert_eq!(names(&back), vec!["B/x", "A/y", "A/z", "B/w"]);
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");

        let result = convert_mealy_file(&dir.path().join("missing.csv"), &output);
        assert!(matches!(result, Err(MachineError::FileError(_))));
        assert!(!output.exists());
    }
}
