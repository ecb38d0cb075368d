//! DIMACS CNF front-end
//!
//! A line-oriented, hand-written reader for the DIMACS conjunctive normal
//! form format: `c` comment lines, one `p cnf <variables> <clauses>` problem
//! line, then clauses of whitespace-separated signed literals, each clause
//! terminated by `0` and free to span lines.
//!
//! Parsing and construction are separate steps: [`CnfProblem`] holds the
//! parsed clauses, and [`CnfProblem::build`] turns them into a node through
//! the public engine API. A malformed file therefore never touches engine
//! state.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::engine::Bdd;
use crate::error::DimacsError;
use crate::node::NodeId;

/// A propositional formula in conjunctive normal form, as read from DIMACS
/// input. Variable `i` of the formula (1-based in the format) maps to engine
/// variable `i - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnfProblem {
    variables: usize,
    clauses: Vec<Vec<i64>>,
}

impl CnfProblem {
    /// Read a problem from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DimacsError> {
        let mut variables = None;
        let mut clauses = Vec::new();
        let mut current = Vec::new();
        let mut line_number = 0;

        for line in reader.lines() {
            line_number += 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('c') {
                continue;
            }
            // Some generators close their files with a lone '%'.
            if trimmed == "%" {
                break;
            }

            if let Some(rest) = trimmed.strip_prefix('p') {
                if variables.is_some() {
                    return Err(DimacsError::DuplicateHeader { line: line_number });
                }
                variables = Some(parse_header(rest, line_number, trimmed)?);
                continue;
            }

            let Some(declared) = variables else {
                return Err(DimacsError::MissingHeader { line: line_number });
            };

            for token in trimmed.split_whitespace() {
                let literal: i64 = token.parse().map_err(|_| DimacsError::InvalidLiteral {
                    line: line_number,
                    token: token.to_string(),
                })?;
                if literal == 0 {
                    clauses.push(std::mem::take(&mut current));
                } else {
                    if literal.unsigned_abs() > declared as u64 {
                        return Err(DimacsError::LiteralOutOfRange {
                            line: line_number,
                            literal,
                            variables: declared,
                        });
                    }
                    current.push(literal);
                }
            }
        }

        if !current.is_empty() {
            return Err(DimacsError::UnterminatedClause { line: line_number });
        }
        let Some(variables) = variables else {
            return Err(DimacsError::MissingHeader { line: line_number });
        };

        Ok(CnfProblem { variables, clauses })
    }

    /// Read a problem from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DimacsError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a problem from in-memory text.
    pub fn from_dimacs(input: &str) -> Result<Self, DimacsError> {
        Self::from_reader(input.as_bytes())
    }

    /// Number of variables the problem declares.
    pub fn num_variables(&self) -> usize {
        self.variables
    }

    /// Number of parsed clauses.
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// The parsed clauses, with DIMACS sign conventions intact.
    pub fn clauses(&self) -> &[Vec<i64>] {
        &self.clauses
    }

    /// Build the conjunction of all clauses in the engine, creating any
    /// missing variables first.
    ///
    /// The returned node carries one reference owned by the caller, so it
    /// survives collections until explicitly dereferenced. An empty clause
    /// yields FALSE, an empty clause list TRUE.
    pub fn build(&self, bdd: &mut Bdd) -> NodeId {
        while bdd.number_of_variables() < self.variables {
            bdd.create_variable();
        }

        let truth = bdd.true_node();
        let mut formula = bdd.reference(truth);
        for clause in &self.clauses {
            let mut disjunction = bdd.false_node();
            for &literal in clause {
                let variable = bdd.variable_node((literal.unsigned_abs() - 1) as u32);
                let node = if literal < 0 { bdd.not(variable) } else { variable };
                let extended = bdd.or(disjunction, node);
                disjunction = bdd.update_with(extended, disjunction);
            }
            let conjoined = bdd.and(formula, disjunction);
            formula = bdd.consume(conjoined, formula, disjunction);
        }
        formula
    }
}

fn parse_header(rest: &str, line: usize, full: &str) -> Result<usize, DimacsError> {
    let mut tokens = rest.split_whitespace();
    let format = tokens.next();
    let variables = tokens.next().and_then(|t| t.parse::<usize>().ok());
    let clauses = tokens.next().and_then(|t| t.parse::<usize>().ok());
    match (format, variables, clauses, tokens.next()) {
        (Some("cnf"), Some(variables), Some(_), None) => Ok(variables),
        _ => Err(DimacsError::InvalidHeader { line, content: full.to_string() }),
    }
}
