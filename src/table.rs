//! This module reads and writes the semicolon separated tables machines are stored in,
//! utilizing the `pest` crate for reading. It knows nothing about machines: a table is
//! just a rectangular `Grid` of text cells.

use crate::types::{Grid, MachineError, FIELD_SEPARATOR};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::borrow::Cow;

/// Derives a `PestParser` for the table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

/// Parses semicolon separated text into a `Grid`.
///
/// Blank lines are skipped and every remaining record must have as many fields as the
/// first one.
///
/// # Returns
///
/// * `Ok(Grid)` with one row per non-blank record.
/// * `Err(MachineError::ParseError)` on syntax errors (e.g. an unterminated quote) or
///   ragged rows.
pub fn read_table(input: &str) -> Result<Grid, MachineError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let root = TableParser::parse(Rule::table, input)
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next();

    let Some(root) = root else {
        return Ok(Grid::new());
    };

    let mut grid = Grid::new();
    for record in root.into_inner() {
        if record.as_rule() != Rule::record || record.as_str().is_empty() {
            continue;
        }

        let span = record.as_span();
        let row = record.into_inner().map(parse_field).collect::<Vec<_>>();

        if let Some(first) = grid.first() {
            if first.len() != row.len() {
                return Err(parse_error(
                    &format!(
                        "Record has {} fields, expected {}",
                        row.len(),
                        first.len()
                    ),
                    span,
                ));
            }
        }

        grid.push(row);
    }

    Ok(grid)
}

/// Renders a `Grid` as semicolon separated text, one `\n` terminated line per row.
pub fn write_table(grid: &Grid) -> String {
    let separator = FIELD_SEPARATOR.to_string();
    let mut output = String::new();

    for row in grid {
        let line = row
            .iter()
            .map(|field| quote_field(field))
            .collect::<Vec<_>>()
            .join(separator.as_str());

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Extracts the text of a `quoted` or `bare` field.
fn parse_field(pair: Pair<Rule>) -> String {
    match pair.as_rule() {
        Rule::quoted => pair
            .into_inner()
            .next()
            .map(|text| text.as_str().replace("\"\"", "\""))
            .unwrap_or_default(),
        _ => pair.as_str().to_string(),
    }
}

/// Quotes a field if it could not be read back verbatim otherwise.
fn quote_field(field: &str) -> Cow<'_, str> {
    let needs_quotes = field.contains([FIELD_SEPARATOR, '"', '\n', '\r'])
        || field.starts_with([' ', '\t']);

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
