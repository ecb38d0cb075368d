//! # ROBDD engine
//!
//! This crate implements reduced ordered binary decision diagrams (ROBDDs):
//! a canonical DAG representation of Boolean functions over a growing set of
//! variables, with the full algebra of Boolean operations, quantification,
//! composition, model enumeration, and model counting.
//!
//! ## Overview
//!
//! All functions managed by one [`Bdd`] engine share a single hash-consed
//! node table, which makes the representation canonical:
//!
//! - **Equality is index equality**: two functions are equivalent exactly
//!   when their node indices are equal
//! - **Polynomial operations**: AND, OR, NOT, XOR and friends are computed by
//!   recursive Shannon expansion with memoisation
//! - **Compact storage**: each node is two packed machine words, and
//!   structurally equal nodes are never allocated twice
//! - **Reference-counted collection**: dead nodes are reclaimed by
//!   mark-and-sweep from the externally declared roots
//!
//! ## Quick start
//!
//! ```
//! use robdd::Bdd;
//!
//! let mut bdd = Bdd::with_capacity(1 << 12);
//! let x0 = bdd.create_variable();
//! let x1 = bdd.create_variable();
//! let x2 = bdd.create_variable();
//!
//! // f = (x0 AND x1) OR (NOT x0 AND x2)
//! let high = bdd.and(x0, x1);
//! bdd.reference(high);
//! let not_x0 = bdd.not(x0);
//! let low = bdd.and(not_x0, x2);
//! bdd.reference(low);
//! let f = bdd.or(high, low);
//! let f = bdd.consume(f, high, low);
//!
//! assert_eq!(bdd.count_satisfying_assignments(f), 4u8.into());
//! for assignment in bdd.solutions(f) {
//!     assert!(bdd.evaluate(f, &assignment));
//! }
//! ```
//!
//! ## Reference counting
//!
//! The engine keeps no implicit roots: nodes you want to keep across further
//! operations must be protected with [`Bdd::reference`] and released with
//! [`Bdd::dereference`]. [`Bdd::consume`] and [`Bdd::update_with`] combine
//! the two for the common build-up patterns. Terminals and variable literals
//! are permanently live and exempt. See the [`engine`] module documentation
//! for the full protocol.
//!
//! ## Loading CNF formulas
//!
//! The [`dimacs`] module reads DIMACS CNF files and builds the conjunction
//! of their clauses through the public API:
//!
//! ```
//! use robdd::{Bdd, CnfProblem};
//!
//! let problem = CnfProblem::from_dimacs("p cnf 2 2\n1 2 0\n-1 -2 0\n")?;
//! let mut bdd = Bdd::with_capacity(1 << 10);
//! let formula = problem.build(&mut bdd);
//! assert_eq!(bdd.count_satisfying_assignments(formula), 2u8.into());
//! # Ok::<(), robdd::DimacsError>(())
//! ```
//!
//! ## Threading
//!
//! A [`Bdd`] engine is single-threaded by construction; [`SharedBdd`] wraps
//! it in a reader–writer lock and classifies every operation as read-only or
//! read-write for concurrent use.

pub mod dimacs;
pub mod engine;
pub mod error;
pub mod node;
pub mod shared;
pub mod solutions;

pub(crate) mod cache;
pub(crate) mod table;

pub use dimacs::CnfProblem;
pub use engine::{Bdd, BddConfig};
pub use error::{DimacsError, NoSolutionError};
pub use node::{NodeId, VarId, FALSE_NODE, MAX_VARIABLES, TRUE_NODE};
pub use shared::SharedBdd;
pub use solutions::SolutionIterator;
