//! Model counting

use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::node::{NodeId, FALSE_NODE, TRUE_NODE};

use super::Bdd;

impl Bdd {
    /// Number of satisfying assignments over all currently created variables.
    ///
    /// Every variable skipped along an edge doubles the count below it, and
    /// the variables above the root contribute a trailing power of two, so
    /// `count(TRUE)` is exactly `2^V`.
    ///
    /// ```
    /// use robdd::Bdd;
    ///
    /// let mut bdd = Bdd::with_capacity(1 << 10);
    /// let x = bdd.create_variable();
    /// let y = bdd.create_variable();
    /// let either = bdd.or(x, y);
    /// assert_eq!(bdd.count_satisfying_assignments(either), 3u8.into());
    /// ```
    pub fn count_satisfying_assignments(&mut self, node: NodeId) -> BigUint {
        self.assert_valid_node(node);
        let below = self.count_rec(node);
        below << self.count_level(node) as usize
    }

    /// Number of satisfying assignments over an explicit support set, which
    /// must cover every variable the function depends on.
    pub fn count_satisfying_assignments_over(
        &self,
        node: NodeId,
        support: &FixedBitSet,
    ) -> BigUint {
        self.assert_valid_node(node);
        for var in self.support(node).ones() {
            assert!(
                support.contains(var),
                "support set is missing variable {var} of the counted function"
            );
        }

        // rank[v] = number of support variables strictly below v.
        let total = self.number_of_variables();
        let mut rank = Vec::with_capacity(total + 1);
        let mut seen = 0u64;
        for var in 0..=total {
            rank.push(seen);
            if var < total && support.contains(var) {
                seen += 1;
            }
        }

        let mut memo = HashMap::new();
        let below = self.count_over_rec(node, &rank, &mut memo);
        below << rank[self.count_level(node) as usize] as usize
    }

    /// Count of the sub-function relative to its own branching level, with
    /// terminals pinned at the variable count. Cached per node; the cache is
    /// dropped whenever a variable is created, which shifts the terminal
    /// level, and whenever the table generation moves.
    fn count_rec(&mut self, node: NodeId) -> BigUint {
        if node == FALSE_NODE {
            return BigUint::zero();
        }
        if node == TRUE_NODE {
            return BigUint::one();
        }
        if let Some(cached) = self.cache.satcount_lookup(node) {
            return cached;
        }

        let var = self.table.variable_of(node);
        let low = self.table.low_of(node);
        let high = self.table.high_of(node);
        let low_count = self.count_rec(low) << (self.count_level(low) - var - 1) as usize;
        let high_count = self.count_rec(high) << (self.count_level(high) - var - 1) as usize;
        let result = low_count + high_count;

        self.cache.satcount_insert(node, result.clone());
        result
    }

    fn count_over_rec(
        &self,
        node: NodeId,
        rank: &[u64],
        memo: &mut HashMap<NodeId, BigUint>,
    ) -> BigUint {
        if node == FALSE_NODE {
            return BigUint::zero();
        }
        if node == TRUE_NODE {
            return BigUint::one();
        }
        if let Some(cached) = memo.get(&node) {
            return cached.clone();
        }

        let var = self.table.variable_of(node) as usize;
        let low = self.table.low_of(node);
        let high = self.table.high_of(node);
        let low_gap = rank[self.count_level(low) as usize] - rank[var + 1];
        let high_gap = rank[self.count_level(high) as usize] - rank[var + 1];
        let result = (self.count_over_rec(low, rank, memo) << low_gap as usize)
            + (self.count_over_rec(high, rank, memo) << high_gap as usize);

        memo.insert(node, result.clone());
        result
    }

    /// Branching variable with terminals reporting the variable count, so
    /// level differences directly give the number of skipped variables.
    #[inline]
    fn count_level(&self, node: NodeId) -> u32 {
        if node <= TRUE_NODE {
            self.number_of_variables() as u32
        } else {
            self.table.variable_of(node)
        }
    }
}
