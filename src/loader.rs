//! This module provides the `MachineLoader` struct, responsible for reading machines from
//! and writing machines to table files.

use crate::machine::{MealyMachine, MooreMachine, StateMachine};
use crate::parser::{parse, parse_mealy, parse_moore};
use crate::table::{read_table, write_table};
use crate::types::{Grid, MachineError, MachineKind};
use crate::writer::{write, write_mealy, write_moore};
use std::fs;
use std::path::Path;
use tracing::info;

/// `MachineLoader` is a utility struct for loading and saving state machines.
/// It provides methods to load machines from files or string content, and to save
/// machines back to files in the same table format.
pub struct MachineLoader;

impl MachineLoader {
    /// Reads and parses a table file into a `Grid`.
    ///
    /// # Returns
    ///
    /// * `Ok(Grid)` if the file is read and its table syntax is valid.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` if the content is not a valid table.
    pub fn load_table(path: &Path) -> Result<Grid, MachineError> {
        info!(path = %path.display(), "reading machine table");
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        read_table(&content)
    }

    /// Loads a Mealy machine from the specified file path.
    pub fn load_mealy(path: &Path) -> Result<MealyMachine, MachineError> {
        parse_mealy(&Self::load_table(path)?)
    }

    /// Loads a Moore machine from the specified file path.
    pub fn load_moore(path: &Path) -> Result<MooreMachine, MachineError> {
        parse_moore(&Self::load_table(path)?)
    }

    /// Loads a machine of the given model from the specified file path.
    pub fn load(kind: MachineKind, path: &Path) -> Result<StateMachine, MachineError> {
        parse(kind, &Self::load_table(path)?)
    }

    /// Loads a Mealy machine from table text, e.g. from user input.
    pub fn load_mealy_from_string(content: &str) -> Result<MealyMachine, MachineError> {
        parse_mealy(&read_table(content)?)
    }

    /// Loads a Moore machine from table text.
    pub fn load_moore_from_string(content: &str) -> Result<MooreMachine, MachineError> {
        parse_moore(&read_table(content)?)
    }

    /// Writes a `Grid` to the specified file path, replacing any existing file.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the file was written.
    /// * `Err(MachineError::FileError)` if the file cannot be created or written.
    pub fn save_table(path: &Path, grid: &Grid) -> Result<(), MachineError> {
        info!(path = %path.display(), rows = grid.len(), "writing machine table");
        fs::write(path, write_table(grid)).map_err(|e| {
            MachineError::FileError(format!("Failed to write file {}: {}", path.display(), e))
        })
    }

    /// Saves a Mealy machine to the specified file path.
    pub fn save_mealy(path: &Path, machine: &MealyMachine) -> Result<(), MachineError> {
        Self::save_table(path, &write_mealy(machine)?)
    }

    /// Saves a Moore machine to the specified file path.
    pub fn save_moore(path: &Path, machine: &MooreMachine) -> Result<(), MachineError> {
        Self::save_table(path, &write_moore(machine)?)
    }

    /// Saves a machine of either model to the specified file path.
    pub fn save(path: &Path, machine: &StateMachine) -> Result<(), MachineError> {
        Self::save_table(path, &write(machine)?)
    }
}
