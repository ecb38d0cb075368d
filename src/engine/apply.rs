//! Shannon-expansion apply algorithms
//!
//! Every binary Boolean operation shares one recursive template: dispatch the
//! terminal cases of the operation, probe the result cache, cofactor both
//! operands at the smaller branching variable, recurse, and rebuild with
//! `make_node`. The operations differ only in their terminal-case tables,
//! captured by [`BinaryOp`].
//!
//! Sub-results produced mid-recursion have no external reference yet must
//! survive any collection a later allocation may trigger, so each one is
//! parked on the table's work stack until its parent node exists. Public
//! entry points additionally park their operands, which keeps every cofactor
//! in the recursion reachable.

use std::collections::HashSet;

use crate::node::{NodeId, FALSE_NODE, TRUE_NODE};

use super::Bdd;

/// Tag selecting the terminal-case table of a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    And,
    Or,
    Xor,
    Nand,
    Equivalence,
    Implication,
}

impl BinaryOp {
    /// Symmetric operations canonicalise their operands to `a <= b` before
    /// touching the cache, halving the key space.
    #[inline]
    fn is_commutative(self) -> bool {
        !matches!(self, BinaryOp::Implication)
    }
}

impl Bdd {
    /// Negation.
    pub fn not(&mut self, node: NodeId) -> NodeId {
        self.assert_valid_node(node);
        self.table.push_work(node);
        let result = self.negate_rec(node);
        self.table.pop_work(1);
        result
    }

    /// Conjunction.
    pub fn and(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(BinaryOp::And, a, b)
    }

    /// Disjunction.
    pub fn or(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(BinaryOp::Or, a, b)
    }

    /// Exclusive or.
    pub fn xor(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(BinaryOp::Xor, a, b)
    }

    /// Negated conjunction.
    pub fn nand(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(BinaryOp::Nand, a, b)
    }

    /// If-and-only-if.
    pub fn equivalence(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(BinaryOp::Equivalence, a, b)
    }

    /// Material implication `a -> b`.
    pub fn implication(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.binary(BinaryOp::Implication, a, b)
    }

    /// If-then-else: `(condition AND then) OR (NOT condition AND else)`.
    ///
    /// Implemented natively rather than through AND/OR so the shared ternary
    /// cache catches the sharing the decomposition would miss.
    pub fn if_then_else(
        &mut self,
        condition: NodeId,
        then_node: NodeId,
        else_node: NodeId,
    ) -> NodeId {
        self.assert_valid_node(condition);
        self.assert_valid_node(then_node);
        self.assert_valid_node(else_node);
        self.table.push_work(condition);
        self.table.push_work(then_node);
        self.table.push_work(else_node);
        let result = self.ite_rec(condition, then_node, else_node);
        self.table.pop_work(3);
        result
    }

    /// Whether `a -> b` is a tautology.
    ///
    /// Unlike [`Bdd::implication`] this never allocates nodes: it
    /// short-circuits through the cofactor recursion and memoises proven
    /// pairs for the duration of the call.
    pub fn implies(&self, a: NodeId, b: NodeId) -> bool {
        self.assert_valid_node(a);
        self.assert_valid_node(b);
        let mut proven = HashSet::new();
        self.implies_rec(a, b, &mut proven)
    }

    fn binary(&mut self, op: BinaryOp, a: NodeId, b: NodeId) -> NodeId {
        self.assert_valid_node(a);
        self.assert_valid_node(b);
        self.table.push_work(a);
        self.table.push_work(b);
        let result = self.apply_rec(op, a, b);
        self.table.pop_work(2);
        result
    }

    pub(crate) fn apply_rec(&mut self, op: BinaryOp, a: NodeId, b: NodeId) -> NodeId {
        use BinaryOp::*;
        match op {
            And => {
                if a == FALSE_NODE || b == FALSE_NODE {
                    return FALSE_NODE;
                }
                if a == TRUE_NODE {
                    return b;
                }
                if b == TRUE_NODE || a == b {
                    return a;
                }
            }
            Or => {
                if a == TRUE_NODE || b == TRUE_NODE {
                    return TRUE_NODE;
                }
                if a == FALSE_NODE {
                    return b;
                }
                if b == FALSE_NODE || a == b {
                    return a;
                }
            }
            Xor => {
                if a == FALSE_NODE {
                    return b;
                }
                if b == FALSE_NODE {
                    return a;
                }
                if a == b {
                    return FALSE_NODE;
                }
                if a == TRUE_NODE {
                    return self.negate_rec(b);
                }
                if b == TRUE_NODE {
                    return self.negate_rec(a);
                }
                if self.known_complement(a, b) {
                    return TRUE_NODE;
                }
            }
            Nand => {
                if a == FALSE_NODE || b == FALSE_NODE {
                    return TRUE_NODE;
                }
                if a == TRUE_NODE {
                    return self.negate_rec(b);
                }
                if b == TRUE_NODE || a == b {
                    return self.negate_rec(a);
                }
            }
            Equivalence => {
                if a == b {
                    return TRUE_NODE;
                }
                if a == TRUE_NODE {
                    return b;
                }
                if b == TRUE_NODE {
                    return a;
                }
                if a == FALSE_NODE {
                    return self.negate_rec(b);
                }
                if b == FALSE_NODE {
                    return self.negate_rec(a);
                }
                if self.known_complement(a, b) {
                    return FALSE_NODE;
                }
            }
            Implication => {
                if a == FALSE_NODE || b == TRUE_NODE || a == b {
                    return TRUE_NODE;
                }
                if a == TRUE_NODE {
                    return b;
                }
                if b == FALSE_NODE {
                    return self.negate_rec(a);
                }
            }
        }

        let (a, b) = if op.is_commutative() && a > b { (b, a) } else { (a, b) };
        if let Some(cached) = self.cache.binary_lookup(op, a, b) {
            return cached;
        }

        let level = self.level(a).min(self.level(b));
        let (a0, a1) = self.cofactors_at(a, level);
        let (b0, b1) = self.cofactors_at(b, level);

        let low = self.apply_rec(op, a0, b0);
        self.table.push_work(low);
        let high = self.apply_rec(op, a1, b1);
        self.table.push_work(high);
        let result = self.make_node(level, low, high);
        self.table.pop_work(2);

        self.cache.binary_insert(op, a, b, result);
        result
    }

    pub(crate) fn negate_rec(&mut self, node: NodeId) -> NodeId {
        if node == FALSE_NODE {
            return TRUE_NODE;
        }
        if node == TRUE_NODE {
            return FALSE_NODE;
        }
        if let Some(cached) = self.cache.negation_lookup(node) {
            return cached;
        }

        let var = self.table.variable_of(node);
        let low = self.negate_rec(self.table.low_of(node));
        self.table.push_work(low);
        let high = self.negate_rec(self.table.high_of(node));
        self.table.push_work(high);
        let result = self.make_node(var, low, high);
        self.table.pop_work(2);

        self.cache.negation_insert(node, result);
        self.cache.negation_insert(result, node);
        result
    }

    pub(crate) fn ite_rec(
        &mut self,
        condition: NodeId,
        then_node: NodeId,
        else_node: NodeId,
    ) -> NodeId {
        if condition == TRUE_NODE {
            return then_node;
        }
        if condition == FALSE_NODE {
            return else_node;
        }
        if then_node == else_node {
            return then_node;
        }
        if then_node == TRUE_NODE && else_node == FALSE_NODE {
            return condition;
        }
        if then_node == FALSE_NODE && else_node == TRUE_NODE {
            return self.negate_rec(condition);
        }
        if let Some(cached) = self.cache.ite_lookup(condition, then_node, else_node) {
            return cached;
        }

        let level = self
            .level(condition)
            .min(self.level(then_node))
            .min(self.level(else_node));
        let (c0, c1) = self.cofactors_at(condition, level);
        let (t0, t1) = self.cofactors_at(then_node, level);
        let (e0, e1) = self.cofactors_at(else_node, level);

        let low = self.ite_rec(c0, t0, e0);
        self.table.push_work(low);
        let high = self.ite_rec(c1, t1, e1);
        self.table.push_work(high);
        let result = self.make_node(level, low, high);
        self.table.pop_work(2);

        self.cache.ite_insert(condition, then_node, else_node, result);
        result
    }

    /// Negation-cache probe for the `a = NOT b` terminal cases. Lossy: a miss
    /// just falls through to the recursion, which produces the same result.
    fn known_complement(&self, a: NodeId, b: NodeId) -> bool {
        self.cache.negation_lookup(a) == Some(b) || self.cache.negation_lookup(b) == Some(a)
    }

    fn implies_rec(&self, a: NodeId, b: NodeId, proven: &mut HashSet<(NodeId, NodeId)>) -> bool {
        if a == FALSE_NODE || b == TRUE_NODE || a == b {
            return true;
        }
        if a == TRUE_NODE || b == FALSE_NODE {
            // `a` is satisfiable here, so it cannot imply FALSE; and TRUE
            // only implies TRUE, handled above.
            return false;
        }
        if !proven.insert((a, b)) {
            return true;
        }

        let level = self.level(a).min(self.level(b));
        let (a0, a1) = self.cofactors_at(a, level);
        let (b0, b1) = self.cofactors_at(b, level);
        self.implies_rec(a0, b0, proven) && self.implies_rec(a1, b1, proven)
    }
}
