//! Shared engine wrapper
//!
//! The core engine is single-threaded: every operation that can allocate
//! takes `&mut self`. [`SharedBdd`] layers a reader–writer lock on top and
//! classifies each operation. Pure reads (evaluation, accessors, solution
//! enumeration) take the read lock and may run concurrently; anything that
//! can reach `make_node` or touch the caches takes the write lock. Node
//! indices remain plain integers and may be passed freely between threads.

use std::sync::{Arc, RwLock};

use fixedbitset::FixedBitSet;
use num_bigint::BigUint;

use crate::engine::{Bdd, BddConfig};
use crate::error::NoSolutionError;
use crate::node::{NodeId, VarId};

/// A cloneable, thread-safe handle to a [`Bdd`] engine.
///
/// ```
/// use robdd::{Bdd, SharedBdd};
///
/// let shared = SharedBdd::new(Bdd::with_capacity(1 << 10));
/// let x = shared.create_variable();
/// let y = shared.create_variable();
/// let conjunction = shared.and(x, y);
///
/// let worker = shared.clone();
/// let handle = std::thread::spawn(move || worker.count_satisfying_assignments(conjunction));
/// assert_eq!(handle.join().unwrap(), 1u8.into());
/// ```
#[derive(Clone)]
pub struct SharedBdd {
    inner: Arc<RwLock<Bdd>>,
}

impl Default for SharedBdd {
    fn default() -> Self {
        SharedBdd::new(Bdd::default())
    }
}

impl SharedBdd {
    /// Wrap an engine for shared access.
    pub fn new(bdd: Bdd) -> Self {
        SharedBdd { inner: Arc::new(RwLock::new(bdd)) }
    }

    /// Wrap a freshly configured engine.
    pub fn with_config(initial_capacity: usize, config: BddConfig) -> Self {
        SharedBdd::new(Bdd::new(initial_capacity, config))
    }

    /// Run a read-only closure under the read lock.
    ///
    /// The closure must not call any `&mut self` engine method; use
    /// [`SharedBdd::write`] for those.
    pub fn read<R>(&self, f: impl FnOnce(&Bdd) -> R) -> R {
        f(&self.inner.read().unwrap())
    }

    /// Run a mutating closure under the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut Bdd) -> R) -> R {
        f(&mut self.inner.write().unwrap())
    }

    // Write operations: everything that can allocate nodes.

    /// See [`Bdd::create_variable`].
    pub fn create_variable(&self) -> NodeId {
        self.write(|bdd| bdd.create_variable())
    }

    /// See [`Bdd::create_variables`].
    pub fn create_variables(&self, count: usize) -> Vec<NodeId> {
        self.write(|bdd| bdd.create_variables(count))
    }

    /// See [`Bdd::not`].
    pub fn not(&self, node: NodeId) -> NodeId {
        self.write(|bdd| bdd.not(node))
    }

    /// See [`Bdd::and`].
    pub fn and(&self, a: NodeId, b: NodeId) -> NodeId {
        self.write(|bdd| bdd.and(a, b))
    }

    /// See [`Bdd::or`].
    pub fn or(&self, a: NodeId, b: NodeId) -> NodeId {
        self.write(|bdd| bdd.or(a, b))
    }

    /// See [`Bdd::xor`].
    pub fn xor(&self, a: NodeId, b: NodeId) -> NodeId {
        self.write(|bdd| bdd.xor(a, b))
    }

    /// See [`Bdd::if_then_else`].
    pub fn if_then_else(&self, condition: NodeId, then_node: NodeId, else_node: NodeId) -> NodeId {
        self.write(|bdd| bdd.if_then_else(condition, then_node, else_node))
    }

    /// See [`Bdd::reference`].
    pub fn reference(&self, node: NodeId) -> NodeId {
        self.write(|bdd| bdd.reference(node))
    }

    /// See [`Bdd::dereference`].
    pub fn dereference(&self, node: NodeId) -> NodeId {
        self.write(|bdd| bdd.dereference(node))
    }

    /// Model counting consults and fills the satcount cache, so it counts as
    /// a write. See [`Bdd::count_satisfying_assignments`].
    pub fn count_satisfying_assignments(&self, node: NodeId) -> BigUint {
        self.write(|bdd| bdd.count_satisfying_assignments(node))
    }

    // Read operations: structure queries and enumeration never allocate.

    /// See [`Bdd::variable_node`].
    pub fn variable_node(&self, var: VarId) -> NodeId {
        self.read(|bdd| bdd.variable_node(var))
    }

    /// See [`Bdd::number_of_variables`].
    pub fn number_of_variables(&self) -> usize {
        self.read(|bdd| bdd.number_of_variables())
    }

    /// See [`Bdd::evaluate`].
    pub fn evaluate(&self, node: NodeId, assignment: &FixedBitSet) -> bool {
        self.read(|bdd| bdd.evaluate(node, assignment))
    }

    /// See [`Bdd::support`].
    pub fn support(&self, node: NodeId) -> FixedBitSet {
        self.read(|bdd| bdd.support(node))
    }

    /// See [`Bdd::satisfying_assignment`].
    pub fn satisfying_assignment(&self, node: NodeId) -> Result<FixedBitSet, NoSolutionError> {
        self.read(|bdd| bdd.satisfying_assignment(node))
    }

    /// Collect every satisfying assignment under a single read lock.
    pub fn solutions(&self, node: NodeId) -> Vec<FixedBitSet> {
        self.read(|bdd| bdd.solutions(node).collect())
    }
}
