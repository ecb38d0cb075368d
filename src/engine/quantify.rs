//! Quantification, composition, restriction, and cube construction

use std::collections::HashMap;
use std::sync::Arc;

use fixedbitset::FixedBitSet;

use crate::node::{NodeId, VarId, FALSE_NODE, TRUE_NODE};

use super::apply::BinaryOp;
use super::Bdd;

impl Bdd {
    /// Existential quantification: `EXISTS v in variables. node`.
    ///
    /// Shannon expansion where every quantified level collapses into the
    /// disjunction of its cofactors.
    pub fn exists(&mut self, node: NodeId, variables: &FixedBitSet) -> NodeId {
        self.quantify(node, variables, false)
    }

    /// Universal quantification, the conjunctive dual of [`Bdd::exists`].
    pub fn forall(&mut self, node: NodeId, variables: &FixedBitSet) -> NodeId {
        self.quantify(node, variables, true)
    }

    fn quantify(&mut self, node: NodeId, variables: &FixedBitSet, conjunction: bool) -> NodeId {
        self.assert_valid_node(node);
        let Some(top) = variables.ones().last() else {
            return node;
        };
        let key = Arc::new(variables.clone());
        self.table.push_work(node);
        let result = self.quantify_rec(node, &key, top as VarId, conjunction);
        self.table.pop_work(1);
        result
    }

    fn quantify_rec(
        &mut self,
        node: NodeId,
        variables: &Arc<FixedBitSet>,
        top: VarId,
        conjunction: bool,
    ) -> NodeId {
        if node <= TRUE_NODE {
            return node;
        }
        let var = self.table.variable_of(node);
        // Ordering guarantees no quantified variable occurs below this level.
        if var > top {
            return node;
        }
        if let Some(cached) = self.cache.quantify_lookup(node, variables, conjunction) {
            return cached;
        }

        let low = self.quantify_rec(self.table.low_of(node), variables, top, conjunction);
        self.table.push_work(low);
        let high = self.quantify_rec(self.table.high_of(node), variables, top, conjunction);
        self.table.push_work(high);
        let result = if variables.contains(var as usize) {
            let op = if conjunction { BinaryOp::And } else { BinaryOp::Or };
            self.apply_rec(op, low, high)
        } else {
            self.make_node(var, low, high)
        };
        self.table.pop_work(2);

        self.cache.quantify_insert(node, Arc::clone(variables), conjunction, result);
        result
    }

    /// Simultaneous composition: replace variable `v` by `substitution[v]`
    /// wherever it is provided; `None` keeps the variable. Substitutions for
    /// variables outside the support have no effect.
    pub fn compose(&mut self, node: NodeId, substitution: &[Option<NodeId>]) -> NodeId {
        self.assert_valid_node(node);
        let Some(top) = substitution.iter().rposition(Option::is_some) else {
            return node;
        };

        let key: Arc<[Option<NodeId>]> = Arc::from(substitution);
        let mark = self.table.work_len();
        self.table.push_work(node);
        for replacement in substitution.iter().flatten() {
            self.assert_valid_node(*replacement);
            self.table.push_work(*replacement);
        }
        let result = self.compose_rec(node, &key, top as VarId);
        self.table.truncate_work(mark);
        result
    }

    fn compose_rec(
        &mut self,
        node: NodeId,
        substitution: &Arc<[Option<NodeId>]>,
        top: VarId,
    ) -> NodeId {
        if node <= TRUE_NODE {
            return node;
        }
        let var = self.table.variable_of(node);
        if var > top {
            return node;
        }
        if let Some(cached) = self.cache.compose_lookup(node, substitution) {
            return cached;
        }

        let low = self.compose_rec(self.table.low_of(node), substitution, top);
        self.table.push_work(low);
        let high = self.compose_rec(self.table.high_of(node), substitution, top);
        self.table.push_work(high);
        let result = match substitution.get(var as usize).copied().flatten() {
            // The replacement decides between the composed cofactors; ITE
            // repairs any ordering violation the substitution introduces.
            Some(replacement) => self.ite_rec(replacement, high, low),
            None => self.make_node(var, low, high),
        };
        self.table.pop_work(2);

        self.cache.compose_insert(node, Arc::clone(substitution), result);
        result
    }

    /// Restriction: fix every variable in `mask` to its bit in `values`.
    ///
    /// The specialisation of [`Bdd::compose`] to constant substitutions;
    /// restricted levels short-circuit to the selected cofactor.
    pub fn restrict(&mut self, node: NodeId, mask: &FixedBitSet, values: &FixedBitSet) -> NodeId {
        self.assert_valid_node(node);
        let Some(top) = mask.ones().last() else {
            return node;
        };

        let mut memo = HashMap::new();
        let mark = self.table.work_len();
        self.table.push_work(node);
        let result = self.restrict_rec(node, mask, values, top as VarId, &mut memo);
        self.table.truncate_work(mark);
        result
    }

    fn restrict_rec(
        &mut self,
        node: NodeId,
        mask: &FixedBitSet,
        values: &FixedBitSet,
        top: VarId,
        memo: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        if node <= TRUE_NODE {
            return node;
        }
        let var = self.table.variable_of(node);
        if var > top {
            return node;
        }
        if let Some(&known) = memo.get(&node) {
            return known;
        }

        let result = if mask.contains(var as usize) {
            let child = if values.contains(var as usize) {
                self.table.high_of(node)
            } else {
                self.table.low_of(node)
            };
            self.restrict_rec(child, mask, values, top, memo)
        } else {
            // Both children are parked by their own recursive calls (or are
            // reachable from the parked root), so no extra protection is
            // needed before the allocation.
            let low = self.restrict_rec(self.table.low_of(node), mask, values, top, memo);
            let high = self.restrict_rec(self.table.high_of(node), mask, values, top, memo);
            self.make_node(var, low, high)
        };

        // The memo is not invalidated when a collection runs mid-walk, so
        // every memoised node stays parked until the top-level call returns.
        self.table.push_work(result);
        memo.insert(node, result);
        result
    }

    /// The conjunction of literals selected by `variables`, with polarities
    /// taken from `values`: a straight-line descent in variable order, no
    /// apply recursion involved.
    pub fn cube(&mut self, variables: &FixedBitSet, values: &FixedBitSet) -> NodeId {
        let selected: Vec<usize> = variables.ones().collect();
        let mark = self.table.work_len();
        let mut result = TRUE_NODE;
        for &var in selected.iter().rev() {
            debug_assert!(var < self.number_of_variables());
            result = if values.contains(var) {
                self.make_node(var as VarId, FALSE_NODE, result)
            } else {
                self.make_node(var as VarId, result, FALSE_NODE)
            };
            self.table.push_work(result);
        }
        self.table.truncate_work(mark);
        result
    }
}
