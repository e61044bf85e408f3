//! This module builds Mealy and Moore machines from a `Grid` of table cells.
//!
//! Both layouts are read in two passes: the header row(s) create every state first, then
//! the transition rows are resolved against the name index, so a cell may refer to a
//! state whose column comes later.

use crate::machine::{
    Machine, MealyMachine, MealyState, MealyTransition, MooreMachine, MooreState,
    MooreTransition, State, StateMachine,
};
use crate::types::{Grid, MachineError, MachineKind, StateId, SIGNAL_SEPARATOR};
use tracing::{debug, info};

/// Parses a grid in either layout, selected by `kind`.
pub fn parse(kind: MachineKind, grid: &Grid) -> Result<StateMachine, MachineError> {
    match kind {
        MachineKind::Mealy => parse_mealy(grid).map(StateMachine::Mealy),
        MachineKind::Moore => parse_moore(grid).map(StateMachine::Moore),
    }
}

/// Parses a Mealy machine.
///
/// Layout: row 0 holds the state names from column 1 on (column 0 is ignored and empty
/// header cells are padding); every following row holds an input symbol in column 0 and
/// a `"<target>/<signal>"` cell per state column.
///
/// # Returns
///
/// * `Ok(MealyMachine)` if the grid is well formed.
/// * `Err(MachineError::MalformedGrid)` for a missing header, ragged rows or empty input symbols.
/// * `Err(MachineError::MalformedCell)` for a cell that is not `target/signal`.
/// * `Err(MachineError::UnresolvedState)` for a target that is not a state of the machine.
pub fn parse_mealy(grid: &Grid) -> Result<MealyMachine, MachineError> {
    let header = check_header(grid, 1)?;
    let width = header[0].len();
    let mut machine = MealyMachine::new();

    // Pass 1: states
    let mut columns = Vec::new();
    for (column, name) in header[0].iter().enumerate().skip(1) {
        if name.is_empty() {
            debug!(column, "skipping padding column");
            continue;
        }
        columns.push((column, machine.add_state(MealyState::new(name.as_str()))?));
    }
    info!(states = machine.len(), "parsed mealy states");

    // Pass 2: transitions
    for (row, cells) in grid.iter().enumerate().skip(1) {
        check_row_width(row, cells, width)?;
        let symbol = parse_symbol(row, cells)?;

        for &(column, state) in &columns {
            let cell = &cells[column];
            let (target, signal) = parse_mealy_cell(row, column, cell)?;
            let target = resolve(&machine, target, row, column)?;

            machine.add_transition(
                state,
                symbol,
                MealyTransition {
                    signal: signal.to_string(),
                    target,
                },
            )?;
        }
    }
    info!(
        transitions = machine.transition_count(),
        "filled mealy transitions"
    );

    Ok(machine)
}

/// Parses a Moore machine.
///
/// Layout: row 0 holds the signal of each state column (an empty signal marks a padding
/// column, skipped in every row), row 1 holds the state names, and every following row
/// holds an input symbol in column 0 and a target state name per state column.
///
/// # Returns
///
/// * `Ok(MooreMachine)` if the grid is well formed.
/// * `Err(MachineError::MalformedGrid)` for missing header rows, ragged rows, unnamed
///   states or empty input symbols.
/// * `Err(MachineError::UnresolvedState)` for a target that is not a state of the machine.
pub fn parse_moore(grid: &Grid) -> Result<MooreMachine, MachineError> {
    let header = check_header(grid, 2)?;
    let width = header[0].len();
    check_row_width(1, &header[1], width)?;
    let mut machine = MooreMachine::new();

    // Pass 1: states
    let mut columns = Vec::new();
    for (column, (signal, name)) in header[0].iter().zip(&header[1]).enumerate().skip(1) {
        if signal.is_empty() {
            debug!(column, "skipping padding column");
            continue;
        }
        if name.is_empty() {
            return Err(MachineError::MalformedGrid(format!(
                "State in column {column} has signal {signal:?} but no name"
            )));
        }
        let state = MooreState::new(name.as_str(), signal.as_str());
        columns.push((column, machine.add_state(state)?));
    }
    info!(states = machine.len(), "parsed moore states");

    // Pass 2: transitions
    for (row, cells) in grid.iter().enumerate().skip(2) {
        check_row_width(row, cells, width)?;
        let symbol = parse_symbol(row, cells)?;

        for &(column, state) in &columns {
            let target = resolve(&machine, &cells[column], row, column)?;
            machine.add_transition(state, symbol, MooreTransition { target })?;
        }
    }
    info!(
        transitions = machine.transition_count(),
        "filled moore transitions"
    );

    Ok(machine)
}

/// Returns the first `rows` rows of the grid, or an error if the grid is shorter.
fn check_header(grid: &Grid, rows: usize) -> Result<&[Vec<String>], MachineError> {
    match grid.get(..rows) {
        Some(header) if header.iter().all(|row| !row.is_empty()) => Ok(header),
        _ => Err(MachineError::MalformedGrid(format!(
            "Expected {rows} header row(s), found {}",
            grid.iter().take(rows).take_while(|row| !row.is_empty()).count()
        ))),
    }
}

/// Checks that a row has as many cells as the header.
fn check_row_width(row: usize, cells: &[String], width: usize) -> Result<(), MachineError> {
    if cells.len() != width {
        return Err(MachineError::MalformedGrid(format!(
            "Row {row} has {} cells, expected {width}",
            cells.len()
        )));
    }
    Ok(())
}

/// Extracts the input symbol from column 0 of a transition row.
fn parse_symbol(row: usize, cells: &[String]) -> Result<&str, MachineError> {
    match cells.first() {
        Some(symbol) if !symbol.is_empty() => Ok(symbol.as_str()),
        _ => Err(MachineError::MalformedGrid(format!(
            "Row {row} has no input symbol"
        ))),
    }
}

/// Splits a `"<target>/<signal>"` cell on its last separator, so converted state names such
/// as `A/x` can appear as targets. Both parts must be non-empty.
fn parse_mealy_cell(row: usize, column: usize, cell: &str) -> Result<(&str, &str), MachineError> {
    match cell.rsplit_once(SIGNAL_SEPARATOR) {
        Some((target, signal)) if !target.is_empty() && !signal.is_empty() => Ok((target, signal)),
        _ => Err(MachineError::MalformedCell {
            row,
            column,
            cell: cell.to_string(),
        }),
    }
}

/// Resolves a target state name against the states created in pass 1.
fn resolve<S: State>(
    machine: &Machine<S>,
    name: &str,
    row: usize,
    column: usize,
) -> Result<StateId, MachineError> {
    machine
        .find(name)
        .ok_or_else(|| MachineError::UnresolvedState {
            name: name.to_string(),
            row,
            column,
        })
}
