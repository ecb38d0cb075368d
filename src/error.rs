//! Error types
//!
//! Errors are grouped by source. Usage violations (invalid indices,
//! reference-count underflow) are programmer errors and panic instead of
//! surfacing here; the types below cover the recoverable conditions: asking
//! a contradiction for a solution, and malformed DIMACS input.

use std::fmt;
use std::io;

/// The function is the constant FALSE: there is no satisfying assignment.
///
/// A distinct, non-exceptional signal rather than a panic, because asking an
/// unsatisfiable formula for a model is a perfectly ordinary query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSolutionError;

impl fmt::Display for NoSolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the function is unsatisfiable; no assignment exists")
    }
}

impl std::error::Error for NoSolutionError {}

impl From<NoSolutionError> for io::Error {
    fn from(err: NoSolutionError) -> Self {
        io::Error::new(io::ErrorKind::NotFound, err)
    }
}

/// Errors raised while reading DIMACS CNF input.
///
/// These never leave partial state behind: a formula is parsed completely
/// before any node is built, so the engine stays usable after a failure.
#[derive(Debug)]
pub enum DimacsError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// No `p cnf` problem line before the first clause.
    MissingHeader { line: usize },
    /// A `p` line that is not `p cnf <variables> <clauses>`.
    InvalidHeader { line: usize, content: String },
    /// A second problem line.
    DuplicateHeader { line: usize },
    /// A token that is not an integer literal.
    InvalidLiteral { line: usize, token: String },
    /// A literal whose variable exceeds the declared count.
    LiteralOutOfRange { line: usize, literal: i64, variables: usize },
    /// Input ended inside a clause (no terminating `0`).
    UnterminatedClause { line: usize },
}

impl fmt::Display for DimacsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimacsError::Io(err) => write!(f, "I/O error while reading DIMACS input: {err}"),
            DimacsError::MissingHeader { line } => {
                write!(f, "line {line}: clause data before the 'p cnf' problem line")
            }
            DimacsError::InvalidHeader { line, content } => {
                write!(
                    f,
                    "line {line}: malformed problem line {content:?}, expected 'p cnf <variables> <clauses>'"
                )
            }
            DimacsError::DuplicateHeader { line } => {
                write!(f, "line {line}: second problem line")
            }
            DimacsError::InvalidLiteral { line, token } => {
                write!(f, "line {line}: {token:?} is not an integer literal")
            }
            DimacsError::LiteralOutOfRange { line, literal, variables } => {
                write!(
                    f,
                    "line {line}: literal {literal} outside the declared {variables} variables"
                )
            }
            DimacsError::UnterminatedClause { line } => {
                write!(f, "line {line}: input ended inside a clause, missing terminating 0")
            }
        }
    }
}

impl std::error::Error for DimacsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DimacsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DimacsError {
    fn from(err: io::Error) -> Self {
        DimacsError::Io(err)
    }
}

impl From<DimacsError> for io::Error {
    fn from(err: DimacsError) -> Self {
        match err {
            DimacsError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
