#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! The format consists of:
//! - Comment lines starting with `c`. A comment of the form `c NAME -> IDX`
//!   gives variable `IDX` the name `NAME`.
//! - A problem line `p cnf <num_variables> <num_clauses>`. The variable count
//!   is a lower bound; variables mentioned in clauses may raise it. It must
//!   fit a packed literal, so at most `2^31 - 1`. The clause count is checked
//!   for syntax only.
//! - Clauses as whitespace-separated signed integers, each terminated by `0`.
//!   A clause may span lines, and a `0` on its own is an empty clause.
//! - An optional `%` line ending the data, as found in some benchmark sets.

use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;

#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    /// A token in clause data that is not a valid literal.
    Literal { line: usize, token: String },
    /// A problem line not of the form `p cnf <vars> <clauses>`.
    Header { line: usize },
    /// A `c NAME -> IDX` comment whose index is not a variable.
    Name { line: usize, index: String },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Literal { line, token } => {
                write!(f, "line {line}: '{token}' is not a literal")
            }
            Self::Header { line } => {
                write!(f, "line {line}: expected 'p cnf <variables> <clauses>'")
            }
            Self::Name { line, index } => {
                write!(f, "line {line}: '{index}' is not a variable index")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Parses DIMACS data from any buffered reader.
///
/// Literals after the last `0` form a final clause.
///
/// # Errors
///
/// On a read failure or malformed content, with the 1-based line number.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, ParseError> {
    let mut cnf = Cnf::default();
    let mut clause = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.starts_with('%') {
            break;
        }

        if let Some(comment) = trimmed.strip_prefix('c') {
            if let Some((var, name)) = parse_name(comment, line_no)? {
                cnf.set_name(var, name);
            }
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('p') {
            let num_vars = parse_header(header, line_no)?;
            cnf.num_vars = cnf.num_vars.max(num_vars);
            continue;
        }

        for token in trimmed.split_whitespace() {
            match token.parse::<i32>() {
                Ok(0) => cnf.add_clause(clause.drain(..)),
                Ok(value) if value != i32::MIN => clause.push(Literal::from_i32(value)),
                _ => {
                    return Err(ParseError::Literal {
                        line: line_no,
                        token: token.to_string(),
                    });
                }
            }
        }
    }

    if !clause.is_empty() {
        cnf.add_clause(clause);
    }

    Ok(cnf)
}

/// `p cnf <vars> <clauses>`, with the leading `p` already stripped.
fn parse_header(header: &str, line: usize) -> Result<usize, ParseError> {
    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        ["cnf", vars, clauses] => match (vars.parse::<usize>(), clauses.parse::<usize>()) {
            (Ok(vars), Ok(_)) if vars <= (Variable::MAX >> 1) as usize => Ok(vars),
            _ => Err(ParseError::Header { line }),
        },
        _ => Err(ParseError::Header { line }),
    }
}

/// `NAME -> IDX`, with the leading `c` already stripped. Comments of any other
/// shape are not names.
fn parse_name(comment: &str, line: usize) -> Result<Option<(Variable, String)>, ParseError> {
    let Some((name, index)) = comment.split_once("->") else {
        return Ok(None);
    };
    let (name, index) = (name.trim(), index.trim());
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Ok(None);
    }

    match index.parse::<Variable>() {
        Ok(var) if var > 0 && var <= Variable::MAX >> 1 => Ok(Some((var, name.to_string()))),
        _ => Err(ParseError::Name {
            line,
            index: index.to_string(),
        }),
    }
}

/// Parses a DIMACS file.
///
/// # Errors
///
/// If the file cannot be opened or its content is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, ParseError> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}

/// Parses DIMACS text held in memory, e.g. `"1 -2 0\n2 3 0"`.
///
/// # Errors
///
/// If the text is malformed.
pub fn parse_text(input: &str) -> Result<Cnf, ParseError> {
    parse_dimacs(Cursor::new(input))
}
