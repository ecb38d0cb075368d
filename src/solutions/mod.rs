//! Satisfying-assignment extraction and enumeration
//!
//! Everything in this module reads the diagram without allocating nodes, so
//! it works on `&Bdd` and can run under a shared read lock.
//!
//! The solution iterator is a hand-rolled resumable state machine, not a
//! coroutine. Its state is the current root-to-TRUE path (one node per
//! branched variable), the current assignment bits, and two flags saying
//! whether more off-path combinations or another path remain. The outer
//! dimension enumerates the distinct paths in canonical low-first order; the
//! inner dimension runs a binary counter over the variables the path does
//! not bind.

use fixedbitset::FixedBitSet;
use std::collections::HashMap;

use crate::engine::Bdd;
use crate::error::NoSolutionError;
use crate::node::{NodeId, FALSE_NODE, TRUE_NODE};


const NO_NODE: NodeId = NodeId::MAX;

impl Bdd {
    /// One satisfying assignment of the function, or [`NoSolutionError`] for
    /// the FALSE terminal.
    ///
    /// Descends from the root, taking the low edge whenever it leads
    /// somewhere, so the result is the lexicographically smallest solution
    /// restricted to the variables the diagram actually branches on.
    pub fn satisfying_assignment(&self, node: NodeId) -> Result<FixedBitSet, NoSolutionError> {
        self.assert_valid_node(node);
        if node == FALSE_NODE {
            return Err(NoSolutionError);
        }
        let mut assignment = FixedBitSet::with_capacity(self.number_of_variables());
        let mut current = node;
        while current > TRUE_NODE {
            let low = self.low(current);
            if low == FALSE_NODE {
                assignment.insert(self.variable(current) as usize);
                current = self.high(current);
            } else {
                current = low;
            }
        }
        Ok(assignment)
    }

    /// Iterator over every satisfying assignment, each exactly once, as bit
    /// sets over all currently created variables.
    ///
    /// ```
    /// use robdd::Bdd;
    ///
    /// let mut bdd = Bdd::with_capacity(1 << 10);
    /// let x = bdd.create_variable();
    /// let y = bdd.create_variable();
    /// let different = bdd.xor(x, y);
    /// assert_eq!(bdd.solutions(different).count(), 2);
    /// ```
    pub fn solutions(&self, node: NodeId) -> SolutionIterator<'_> {
        let count = self.number_of_variables();
        let mut domain = FixedBitSet::with_capacity(count);
        for var in 0..count {
            domain.insert(var);
        }
        SolutionIterator::new(self, node, domain)
    }

    /// Iterator over the satisfying assignments restricted to an enumeration
    /// domain, which must cover the support of the function. Variables
    /// outside the domain stay 0 in every produced assignment.
    pub fn solutions_over(&self, node: NodeId, domain: &FixedBitSet) -> SolutionIterator<'_> {
        let count = self.number_of_variables();
        let mut sanitised = FixedBitSet::with_capacity(count);
        for var in domain.ones().filter(|&var| var < count) {
            sanitised.insert(var);
        }
        for var in self.support(node).ones() {
            assert!(
                sanitised.contains(var),
                "enumeration domain is missing support variable {var}"
            );
        }
        SolutionIterator::new(self, node, sanitised)
    }

    /// Call `f` with every satisfying assignment, exactly once each.
    pub fn for_each_solution<F>(&self, node: NodeId, mut f: F)
    where
        F: FnMut(&FixedBitSet),
    {
        for assignment in self.solutions(node) {
            f(&assignment);
        }
    }

    /// Call `f` with the `(positive, negative)` literal sets of every
    /// root-to-TRUE path. Each pair is a cube of the function; together the
    /// cubes cover the on-set exactly.
    pub fn for_each_path<F>(&self, node: NodeId, mut f: F)
    where
        F: FnMut(&FixedBitSet, &FixedBitSet),
    {
        self.assert_valid_node(node);
        let count = self.number_of_variables();
        let mut positive = FixedBitSet::with_capacity(count);
        let mut negative = FixedBitSet::with_capacity(count);
        self.walk_paths(node, &mut positive, &mut negative, &mut f);
    }

    /// Like [`Bdd::for_each_path`] but skips the empty cube, so the TRUE
    /// terminal visits nothing.
    pub fn for_each_non_empty_path<F>(&self, node: NodeId, f: F)
    where
        F: FnMut(&FixedBitSet, &FixedBitSet),
    {
        self.assert_valid_node(node);
        if node == TRUE_NODE {
            return;
        }
        self.for_each_path(node, f);
    }

    /// Call `f` only with path cubes that cannot be weakened: dropping any
    /// literal would leave the on-set. These are the path cubes that are
    /// prime implicants of the function.
    pub fn for_each_minimal_solution<F>(&self, node: NodeId, mut f: F)
    where
        F: FnMut(&FixedBitSet, &FixedBitSet),
    {
        self.assert_valid_node(node);
        let count = self.number_of_variables();
        let mut positive = FixedBitSet::with_capacity(count);
        let mut negative = FixedBitSet::with_capacity(count);
        self.walk_paths(node, &mut positive, &mut negative, &mut |pos, neg| {
            if self.cube_is_minimal(node, pos, neg) {
                f(pos, neg);
            }
        });
    }

    fn walk_paths<F>(&self, node: NodeId, positive: &mut FixedBitSet, negative: &mut FixedBitSet, f: &mut F)
    where
        F: FnMut(&FixedBitSet, &FixedBitSet),
    {
        if node == FALSE_NODE {
            return;
        }
        if node == TRUE_NODE {
            f(positive, negative);
            return;
        }
        let var = self.variable(node) as usize;
        negative.insert(var);
        self.walk_paths(self.low(node), positive, negative, f);
        negative.set(var, false);
        positive.insert(var);
        self.walk_paths(self.high(node), positive, negative, f);
        positive.set(var, false);
    }

    fn cube_is_minimal(&self, root: NodeId, positive: &FixedBitSet, negative: &FixedBitSet) -> bool {
        positive
            .ones()
            .chain(negative.ones())
            .all(|var| !self.cube_implies(root, positive, negative, var))
    }

    /// Whether the cube with `skip` dropped still lies inside the on-set.
    fn cube_implies(
        &self,
        root: NodeId,
        positive: &FixedBitSet,
        negative: &FixedBitSet,
        skip: usize,
    ) -> bool {
        let mut memo = HashMap::new();
        self.cube_implies_rec(root, positive, negative, skip, &mut memo)
    }

    fn cube_implies_rec(
        &self,
        node: NodeId,
        positive: &FixedBitSet,
        negative: &FixedBitSet,
        skip: usize,
        memo: &mut HashMap<NodeId, bool>,
    ) -> bool {
        if node == TRUE_NODE {
            return true;
        }
        if node == FALSE_NODE {
            return false;
        }
        if let Some(&known) = memo.get(&node) {
            return known;
        }
        let var = self.variable(node) as usize;
        let result = if var != skip && positive.contains(var) {
            self.cube_implies_rec(self.high(node), positive, negative, skip, memo)
        } else if var != skip && negative.contains(var) {
            self.cube_implies_rec(self.low(node), positive, negative, skip, memo)
        } else {
            self.cube_implies_rec(self.low(node), positive, negative, skip, memo)
                && self.cube_implies_rec(self.high(node), positive, negative, skip, memo)
        };
        memo.insert(node, result);
        result
    }
}

/// Resumable iterator over the satisfying assignments of a node.
///
/// Construction is read-only; the iterator borrows the engine and never
/// allocates nodes. Produced while holding the exactly-once guarantee: every
/// assignment in the on-set appears once, nothing else appears at all.
pub struct SolutionIterator<'a> {
    bdd: &'a Bdd,
    domain: FixedBitSet,
    /// Node at which each variable was branched on the current path, or
    /// `NO_NODE` for variables the path skips.
    path: Vec<NodeId>,
    assignment: FixedBitSet,
    has_next_assignment: bool,
    has_next_path: bool,
    exhausted: bool,
}

impl<'a> SolutionIterator<'a> {
    fn new(bdd: &'a Bdd, root: NodeId, domain: FixedBitSet) -> Self {
        bdd.assert_valid_node(root);
        let count = bdd.number_of_variables();
        let mut iterator = SolutionIterator {
            bdd,
            domain,
            path: vec![NO_NODE; count],
            assignment: FixedBitSet::with_capacity(count),
            has_next_assignment: false,
            has_next_path: false,
            exhausted: root == FALSE_NODE,
        };
        if !iterator.exhausted {
            iterator.descend(root);
            iterator.update_flags();
        }
        iterator
    }

    /// Follow the canonical first path from `node` to TRUE: low when the low
    /// child is not FALSE, high otherwise. Reduction guarantees a non-FALSE
    /// node always has such a path.
    fn descend(&mut self, mut node: NodeId) {
        while node > TRUE_NODE {
            let var = self.bdd.variable(node) as usize;
            debug_assert!(self.domain.contains(var));
            self.path[var] = node;
            let low = self.bdd.low(node);
            if low == FALSE_NODE {
                self.assignment.insert(var);
                node = self.bdd.high(node);
            } else {
                self.assignment.set(var, false);
                node = low;
            }
        }
        debug_assert_eq!(node, TRUE_NODE);
    }

    fn update_flags(&mut self) {
        self.has_next_assignment = false;
        self.has_next_path = false;
        for var in self.domain.ones() {
            let node = self.path[var];
            if node == NO_NODE {
                if !self.assignment.contains(var) {
                    self.has_next_assignment = true;
                }
            } else if !self.assignment.contains(var) && self.bdd.high(node) != FALSE_NODE {
                self.has_next_path = true;
            }
        }
    }

    /// Binary increment over the variables the current path does not bind.
    fn step_assignment(&mut self) {
        for var in self.domain.ones() {
            if self.path[var] != NO_NODE {
                continue;
            }
            if self.assignment.contains(var) {
                self.assignment.set(var, false);
            } else {
                self.assignment.insert(var);
                self.has_next_assignment = self.any_free_zero();
                return;
            }
        }
        unreachable!("stepped the inner counter with no combinations left");
    }

    fn any_free_zero(&self) -> bool {
        self.domain
            .ones()
            .any(|var| self.path[var] == NO_NODE && !self.assignment.contains(var))
    }

    /// Advance to the next root-to-TRUE path: flip the deepest low-taken
    /// branch with a live high child, discard the path below it, and restart
    /// the inner counter at zero.
    fn step_path(&mut self) {
        let mut branch = None;
        for var in self.domain.ones() {
            let node = self.path[var];
            if node != NO_NODE
                && !self.assignment.contains(var)
                && self.bdd.high(node) != FALSE_NODE
            {
                branch = Some(var);
            }
        }
        let var = branch.expect("stepped the path with no further paths left");
        let node = self.path[var];

        for other in self.domain.ones() {
            if other > var {
                self.path[other] = NO_NODE;
            }
            if other != var && self.path[other] == NO_NODE {
                self.assignment.set(other, false);
            }
        }
        self.assignment.insert(var);
        self.descend(self.bdd.high(node));
        self.update_flags();
    }
}

impl Iterator for SolutionIterator<'_> {
    type Item = FixedBitSet;

    fn next(&mut self) -> Option<FixedBitSet> {
        if self.exhausted {
            return None;
        }
        let result = self.assignment.clone();
        if self.has_next_assignment {
            self.step_assignment();
        } else if self.has_next_path {
            self.step_path();
        } else {
            self.exhausted = true;
        }
        Some(result)
    }
}
