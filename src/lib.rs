//! This crate provides the core logic for working with Mealy and Moore state machines.
//! It includes modules for reading machines from semicolon separated tables, converting
//! between the two models, and running input sequences through a machine.

pub mod analyzer;
pub mod converter;
pub mod executor;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod table;
pub mod types;
pub mod writer;

/// Re-exports the `Rule` enum from the table module, used by the `pest` grammar.
pub use crate::table::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the conversion functions from the converter module.
pub use converter::{convert_mealy_file, convert_moore_file, mealy_to_moore, moore_to_mealy};
/// Re-exports the `Executor` and its run results from the executor module.
pub use executor::{Executor, Skipped, Step, Trace};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::MachineLoader;
/// Re-exports the machine model from the machine module.
pub use machine::{
    Machine, MealyMachine, MealyState, MealyTransition, MooreMachine, MooreState,
    MooreTransition, State, StateMachine,
};
/// Re-exports the grid parsing functions from the parser module.
pub use parser::{parse, parse_mealy, parse_moore};
/// Re-exports the table reading and writing functions from the table module.
pub use table::{read_table, write_table};
/// Re-exports the shared types from the types module.
pub use types::{Grid, MachineError, MachineKind, OnUnmatched, StateId};
/// Re-exports the grid serialization functions from the writer module.
pub use writer::{write, write_mealy, write_moore};
