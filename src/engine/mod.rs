//! The BDD engine
//!
//! [`Bdd`] owns a hash-consed node table, the operation caches, and the
//! variable table, and exposes the node-level API: nodes are plain `u32`
//! indices, Boolean operations return indices, and the caller keeps results
//! alive through the explicit reference-counting protocol.
//!
//! # Reference counting
//!
//! The engine keeps no implicit roots. A node returned by an operation stays
//! valid until the next garbage collection unless it is protected: call
//! [`Bdd::reference`] on anything that must outlive further operations, and
//! [`Bdd::dereference`] once it is no longer needed. [`Bdd::consume`] and
//! [`Bdd::update_with`] wrap the common "protect the result, release the
//! inputs" patterns so transient intermediates never become garbage while a
//! successor still depends on them:
//!
//! ```
//! use robdd::Bdd;
//!
//! let mut bdd = Bdd::with_capacity(1 << 10);
//! let x = bdd.create_variable();
//! let y = bdd.create_variable();
//! let z = bdd.create_variable();
//!
//! let xy = bdd.and(x, y);
//! bdd.reference(xy);
//! let f = bdd.or(xy, z);
//! // `f` replaces `xy` as the protected root.
//! let f = bdd.update_with(f, xy);
//! assert_eq!(bdd.count_satisfying_assignments(f), 5u8.into());
//! ```
//!
//! Variable literals and terminals are saturated (permanently live) and never
//! need reference management.
//!
//! # Single-threaded by construction
//!
//! Every mutating operation takes `&mut self`, so one engine instance cannot
//! be mutated concurrently. For shared access across threads wrap the engine
//! in [`SharedBdd`](crate::shared::SharedBdd).

use std::collections::HashSet;

use fixedbitset::FixedBitSet;

use crate::cache::OperationCache;
use crate::node::{NodeId, VarId, FALSE_NODE, MAX_VARIABLES, TRUE_NODE, VAR_SENTINEL};
use crate::table::NodeTable;

pub(crate) mod apply;
mod count;
mod quantify;

#[cfg(test)]
mod tests;

const DEFAULT_CAPACITY: usize = 1 << 12;

/// Tuning knobs for a [`Bdd`] engine.
///
/// The defaults are sensible for small to medium workloads; the cache sizes
/// trade memory for recomputation and the table parameters control how
/// eagerly the engine grows instead of collecting.
#[derive(Debug, Clone)]
pub struct BddConfig {
    /// Number of variables created eagerly at construction time.
    ///
    /// **Default:** `0`
    pub initial_variable_nodes: usize,

    /// Minimum fraction of the table that must be free after a collection.
    /// When a collection recovers less than this, the table grows.
    ///
    /// **Default:** `0.05`
    pub min_free_node_ratio: f64,

    /// Factor applied to the capacity when the table grows; the actual new
    /// capacity is the next prime at or above the product.
    ///
    /// **Default:** `2`
    pub growth_factor: usize,

    /// Slots in the binary-operation cache (AND/OR/XOR/NAND/EQV/IMP).
    ///
    /// **Default:** `1 << 14`
    pub binary_cache_size: usize,

    /// Slots in the negation cache.
    ///
    /// **Default:** `1 << 12`
    pub negation_cache_size: usize,

    /// Slots in the if-then-else cache.
    ///
    /// **Default:** `1 << 13`
    pub ite_cache_size: usize,

    /// Slots in the composition cache.
    ///
    /// **Default:** `1 << 10`
    pub compose_cache_size: usize,

    /// Slots in the quantification cache (shared by exists and forall).
    ///
    /// **Default:** `1 << 10`
    pub quantify_cache_size: usize,

    /// Slots in the model-count cache.
    ///
    /// **Default:** `1 << 10`
    pub satcount_cache_size: usize,

    /// Detect usage bugs such as dereferencing below zero. Costs a branch on
    /// the reference operations; disable only in throughput-critical release
    /// builds.
    ///
    /// **Default:** `true`
    pub usage_checks: bool,
}

impl Default for BddConfig {
    fn default() -> Self {
        BddConfig {
            initial_variable_nodes: 0,
            min_free_node_ratio: 0.05,
            growth_factor: 2,
            binary_cache_size: 1 << 14,
            negation_cache_size: 1 << 12,
            ite_cache_size: 1 << 13,
            compose_cache_size: 1 << 10,
            quantify_cache_size: 1 << 10,
            satcount_cache_size: 1 << 10,
            usage_checks: true,
        }
    }
}

/// A reduced ordered binary decision diagram engine.
///
/// Boolean functions are nodes in a shared, canonical DAG: two functions are
/// equal exactly when their node indices are equal. See the
/// [module documentation](self) for the reference-counting protocol.
pub struct Bdd {
    table: NodeTable,
    cache: OperationCache,
    variables: Vec<NodeId>,
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Bdd {
    /// Create an engine with the given initial node-table capacity.
    ///
    /// The capacity is rounded up to a prime. The table grows on demand, so
    /// the initial value only controls how soon the first collections and
    /// resizes happen.
    pub fn new(initial_capacity: usize, config: BddConfig) -> Self {
        let table = NodeTable::new(
            initial_capacity,
            config.min_free_node_ratio,
            config.growth_factor,
            config.usage_checks,
        );
        let cache = OperationCache::new(&config);
        let mut bdd = Bdd { table, cache, variables: Vec::new() };
        for _ in 0..config.initial_variable_nodes {
            bdd.create_variable();
        }
        bdd
    }

    /// Create an engine with the default configuration.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Bdd::new(initial_capacity, BddConfig::default())
    }

    /// The terminal node of the constant TRUE function.
    #[inline]
    pub fn true_node(&self) -> NodeId {
        TRUE_NODE
    }

    /// The terminal node of the constant FALSE function.
    #[inline]
    pub fn false_node(&self) -> NodeId {
        FALSE_NODE
    }

    /// Number of variables created so far.
    #[inline]
    pub fn number_of_variables(&self) -> usize {
        self.variables.len()
    }

    /// Create the next variable and return its literal node.
    ///
    /// Variables are append-only and keep their creation order for the life
    /// of the engine. The literal and its negation are saturated, so they
    /// survive every collection without reference management.
    pub fn create_variable(&mut self) -> NodeId {
        let var = self.variables.len();
        assert!(var < MAX_VARIABLES, "variable limit of {MAX_VARIABLES} reached");

        let literal = self.make_node(var as VarId, FALSE_NODE, TRUE_NODE);
        self.table.saturate_node(literal);
        let negated = self.make_node(var as VarId, TRUE_NODE, FALSE_NODE);
        self.table.saturate_node(negated);

        self.variables.push(literal);
        self.cache.clear_compose_and_satcount();
        self.cache.negation_insert(literal, negated);
        self.cache.negation_insert(negated, literal);
        log::trace!("created variable {var} as node {literal}");
        literal
    }

    /// Create `count` variables and return their literal nodes.
    pub fn create_variables(&mut self, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.create_variable()).collect()
    }

    /// The literal node of variable `var`.
    ///
    /// Panics if the variable has not been created.
    #[inline]
    pub fn variable_node(&self, var: VarId) -> NodeId {
        self.variables[var as usize]
    }

    /// Whether `node` is the positive literal of some variable.
    pub fn is_variable(&self, node: NodeId) -> bool {
        self.assert_valid_node(node);
        node > TRUE_NODE
            && self.table.low_of(node) == FALSE_NODE
            && self.table.high_of(node) == TRUE_NODE
    }

    /// Whether `node` is the negated literal of some variable.
    pub fn is_variable_negated(&self, node: NodeId) -> bool {
        self.assert_valid_node(node);
        node > TRUE_NODE
            && self.table.low_of(node) == TRUE_NODE
            && self.table.high_of(node) == FALSE_NODE
    }

    /// Whether `node` is a positive or negated variable literal.
    pub fn is_variable_or_negated(&self, node: NodeId) -> bool {
        self.is_variable(node) || self.is_variable_negated(node)
    }

    /// The branching variable of an inner node.
    #[inline]
    pub fn variable(&self, node: NodeId) -> VarId {
        self.assert_valid_node(node);
        self.table.variable_of(node)
    }

    /// The cofactor of `node` with its branching variable set to 0.
    #[inline]
    pub fn low(&self, node: NodeId) -> NodeId {
        self.assert_valid_node(node);
        self.table.low_of(node)
    }

    /// The cofactor of `node` with its branching variable set to 1.
    #[inline]
    pub fn high(&self, node: NodeId) -> NodeId {
        self.assert_valid_node(node);
        self.table.high_of(node)
    }

    /// Whether `node` is one of the two terminals.
    #[inline]
    pub fn is_terminal(&self, node: NodeId) -> bool {
        node <= TRUE_NODE
    }

    /// Whether `node` currently denotes an allocated node of this engine.
    #[inline]
    pub fn is_valid(&self, node: NodeId) -> bool {
        self.table.is_valid(node)
    }

    /// Evaluate the function under a variable assignment.
    ///
    /// Bit `v` of `assignment` is the value of variable `v`; bits beyond the
    /// set's length read as 0.
    pub fn evaluate(&self, node: NodeId, assignment: &FixedBitSet) -> bool {
        self.assert_valid_node(node);
        let mut current = node;
        while current > TRUE_NODE {
            let var = self.table.variable_of(current) as usize;
            current = if assignment.contains(var) {
                self.table.high_of(current)
            } else {
                self.table.low_of(current)
            };
        }
        current == TRUE_NODE
    }

    /// The set of variables the function depends on.
    pub fn support(&self, node: NodeId) -> FixedBitSet {
        self.support_within(node, self.number_of_variables())
    }

    /// The support restricted to variables below `bound`.
    ///
    /// The variable ordering makes the cone below `bound` prunable: once a
    /// node branches at or above the bound, everything beneath it does too.
    pub fn support_within(&self, node: NodeId, bound: usize) -> FixedBitSet {
        self.assert_valid_node(node);
        let mut support = FixedBitSet::with_capacity(bound);
        let mut seen = HashSet::new();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if current <= TRUE_NODE || !seen.insert(current) {
                continue;
            }
            let var = self.table.variable_of(current) as usize;
            if var >= bound {
                continue;
            }
            support.insert(var);
            pending.push(self.table.low_of(current));
            pending.push(self.table.high_of(current));
        }
        support
    }

    /// Number of distinct nodes reachable from `node`, terminals included.
    pub fn node_count(&self, node: NodeId) -> usize {
        self.assert_valid_node(node);
        let mut seen = HashSet::new();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            if current > TRUE_NODE {
                pending.push(self.table.low_of(current));
                pending.push(self.table.high_of(current));
            }
        }
        seen.len()
    }

    /// Declare an external root: the node survives garbage collection until
    /// dereferenced. Returns the node for chaining. No-op on terminals and
    /// saturated nodes.
    #[inline]
    pub fn reference(&mut self, node: NodeId) -> NodeId {
        self.assert_valid_node(node);
        self.table.reference(node);
        node
    }

    /// Release one external reference. Returns the node for chaining.
    /// Releasing below zero is a usage bug, detected when
    /// [`BddConfig::usage_checks`] is enabled.
    #[inline]
    pub fn dereference(&mut self, node: NodeId) -> NodeId {
        self.assert_valid_node(node);
        self.table.dereference(node);
        node
    }

    /// External reference count of a node; `None` for terminals and
    /// saturated nodes, whose count is conceptually infinite.
    #[inline]
    pub fn reference_count(&self, node: NodeId) -> Option<usize> {
        self.assert_valid_node(node);
        self.table.reference_count(node)
    }

    /// Protect `result` and release both inputs of the operation that
    /// produced it: `reference(result); dereference(in1); dereference(in2)`.
    pub fn consume(&mut self, result: NodeId, in1: NodeId, in2: NodeId) -> NodeId {
        self.reference(result);
        self.dereference(in1);
        self.dereference(in2);
        result
    }

    /// Protect `result` and release the single input it replaces.
    pub fn update_with(&mut self, result: NodeId, input: NodeId) -> NodeId {
        self.reference(result);
        self.dereference(input);
        result
    }

    /// Force a mark-and-sweep collection and clear the operation caches.
    /// Returns the number of nodes freed.
    pub fn collect_garbage(&mut self) -> usize {
        let freed = self.table.collect();
        self.cache.clear_all();
        freed
    }

    /// Current node-table capacity in slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Number of allocated nodes, terminals included.
    #[inline]
    pub fn active_node_count(&self) -> usize {
        self.table.active_node_count()
    }

    /// Panic if any structural invariant of the node store is violated:
    /// reduction, uniqueness, variable ordering, or chain consistency.
    /// Intended for tests and embedders that want a consistency probe.
    pub fn check_invariants(&self) {
        self.table.verify_invariants();
        for (var, &literal) in self.variables.iter().enumerate() {
            assert!(self.table.is_valid(literal));
            assert_eq!(self.table.variable_of(literal), var as VarId);
            assert!(self.table.is_saturated_node(literal));
        }
    }

    /// Find or create a node, watching the table generation so a collection
    /// or resize inside the allocation invalidates the operation caches.
    pub(crate) fn make_node(&mut self, var: VarId, low: NodeId, high: NodeId) -> NodeId {
        let generation = self.table.generation();
        let node = self.table.make_node(var, low, high);
        if self.table.generation() != generation {
            self.cache.clear_all();
        }
        node
    }

    /// Variable of a node with terminals reporting the ordering sentinel,
    /// so `min` picks the branching level directly.
    #[inline]
    pub(crate) fn level(&self, node: NodeId) -> VarId {
        self.table.level_of(node)
    }

    /// Cofactors of `node` at `level`: its children when it branches there,
    /// the node itself when its variable lies deeper.
    #[inline]
    pub(crate) fn cofactors_at(&self, node: NodeId, level: VarId) -> (NodeId, NodeId) {
        if node > TRUE_NODE && self.table.variable_of(node) == level {
            (self.table.low_of(node), self.table.high_of(node))
        } else {
            (node, node)
        }
    }

    #[inline]
    pub(crate) fn assert_valid_node(&self, node: NodeId) {
        debug_assert!(
            self.table.is_valid(node),
            "node {node} is not a valid node of this engine"
        );
    }
}

// Sanity bound: the sentinel must sort above every creatable variable.
const _: () = assert!((MAX_VARIABLES as u32) == VAR_SENTINEL);
