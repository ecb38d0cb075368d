//! Operation result caches
//!
//! One direct-mapped, fixed-capacity table per operation family. Lookups hash
//! the operands onto a slot; on a miss the slot is simply overwritten, so the
//! caches are lossy by design. A miss costs a recomputation, nothing more; a
//! hit must always be exact, which is why every slot stores its full key and
//! why the compose and quantification slots hold a shared copy of the
//! substitution or variable set and compare it on every probe.
//!
//! The caches store node indices verbatim. After a collection or a table
//! resize those indices can refer to recycled slots, so the engine clears
//! everything whenever the table generation moves. Creating a variable only
//! clears the compose and satcount tables; the other families stay valid.

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::engine::apply::BinaryOp;
use crate::engine::BddConfig;
use crate::node::{mix64, NodeId};


const EMPTY_KEY: NodeId = NodeId::MAX;

#[derive(Clone, Copy)]
struct BinaryEntry {
    op: BinaryOp,
    a: NodeId,
    b: NodeId,
    result: NodeId,
}

#[derive(Clone, Copy)]
struct NegationEntry {
    node: NodeId,
    result: NodeId,
}

#[derive(Clone, Copy)]
struct IteEntry {
    condition: NodeId,
    then_node: NodeId,
    else_node: NodeId,
    result: NodeId,
}

#[derive(Clone)]
struct ComposeEntry {
    node: NodeId,
    substitution: Option<Arc<[Option<NodeId>]>>,
    result: NodeId,
}

#[derive(Clone)]
struct QuantifyEntry {
    node: NodeId,
    variables: Option<Arc<FixedBitSet>>,
    conjunction: bool,
    result: NodeId,
}

#[derive(Clone)]
struct SatCountEntry {
    node: NodeId,
    count: BigUint,
}

pub(crate) struct OperationCache {
    binary: Vec<BinaryEntry>,
    negation: Vec<NegationEntry>,
    ite: Vec<IteEntry>,
    compose: Vec<ComposeEntry>,
    quantify: Vec<QuantifyEntry>,
    satcount: Vec<SatCountEntry>,
}

impl OperationCache {
    pub(crate) fn new(config: &BddConfig) -> Self {
        let empty_binary = BinaryEntry { op: BinaryOp::And, a: EMPTY_KEY, b: EMPTY_KEY, result: 0 };
        let empty_negation = NegationEntry { node: EMPTY_KEY, result: 0 };
        let empty_ite =
            IteEntry { condition: EMPTY_KEY, then_node: EMPTY_KEY, else_node: EMPTY_KEY, result: 0 };
        let empty_compose = ComposeEntry { node: EMPTY_KEY, substitution: None, result: 0 };
        let empty_quantify =
            QuantifyEntry { node: EMPTY_KEY, variables: None, conjunction: false, result: 0 };
        let empty_satcount = SatCountEntry { node: EMPTY_KEY, count: BigUint::zero() };

        OperationCache {
            binary: vec![empty_binary; config.binary_cache_size.max(1)],
            negation: vec![empty_negation; config.negation_cache_size.max(1)],
            ite: vec![empty_ite; config.ite_cache_size.max(1)],
            compose: vec![empty_compose; config.compose_cache_size.max(1)],
            quantify: vec![empty_quantify; config.quantify_cache_size.max(1)],
            satcount: vec![empty_satcount; config.satcount_cache_size.max(1)],
        }
    }

    pub(crate) fn binary_lookup(&self, op: BinaryOp, a: NodeId, b: NodeId) -> Option<NodeId> {
        let entry = &self.binary[binary_slot(op, a, b, self.binary.len())];
        (entry.op == op && entry.a == a && entry.b == b).then_some(entry.result)
    }

    pub(crate) fn binary_insert(&mut self, op: BinaryOp, a: NodeId, b: NodeId, result: NodeId) {
        let slot = binary_slot(op, a, b, self.binary.len());
        self.binary[slot] = BinaryEntry { op, a, b, result };
    }

    pub(crate) fn negation_lookup(&self, node: NodeId) -> Option<NodeId> {
        let entry = &self.negation[slot_of(u64::from(node), self.negation.len())];
        (entry.node == node).then_some(entry.result)
    }

    pub(crate) fn negation_insert(&mut self, node: NodeId, result: NodeId) {
        let slot = slot_of(u64::from(node), self.negation.len());
        self.negation[slot] = NegationEntry { node, result };
    }

    pub(crate) fn ite_lookup(
        &self,
        condition: NodeId,
        then_node: NodeId,
        else_node: NodeId,
    ) -> Option<NodeId> {
        let entry = &self.ite[ite_slot(condition, then_node, else_node, self.ite.len())];
        (entry.condition == condition
            && entry.then_node == then_node
            && entry.else_node == else_node)
            .then_some(entry.result)
    }

    pub(crate) fn ite_insert(
        &mut self,
        condition: NodeId,
        then_node: NodeId,
        else_node: NodeId,
        result: NodeId,
    ) {
        let slot = ite_slot(condition, then_node, else_node, self.ite.len());
        self.ite[slot] = IteEntry { condition, then_node, else_node, result };
    }

    pub(crate) fn compose_lookup(
        &self,
        node: NodeId,
        substitution: &Arc<[Option<NodeId>]>,
    ) -> Option<NodeId> {
        let entry = &self.compose[slot_of(u64::from(node), self.compose.len())];
        if entry.node != node {
            return None;
        }
        match &entry.substitution {
            Some(stored) if Arc::ptr_eq(stored, substitution) || **stored == **substitution => {
                Some(entry.result)
            }
            _ => None,
        }
    }

    pub(crate) fn compose_insert(
        &mut self,
        node: NodeId,
        substitution: Arc<[Option<NodeId>]>,
        result: NodeId,
    ) {
        let slot = slot_of(u64::from(node), self.compose.len());
        self.compose[slot] = ComposeEntry { node, substitution: Some(substitution), result };
    }

    pub(crate) fn quantify_lookup(
        &self,
        node: NodeId,
        variables: &Arc<FixedBitSet>,
        conjunction: bool,
    ) -> Option<NodeId> {
        let entry = &self.quantify[quantify_slot(node, conjunction, self.quantify.len())];
        if entry.node != node || entry.conjunction != conjunction {
            return None;
        }
        match &entry.variables {
            Some(stored) if Arc::ptr_eq(stored, variables) || **stored == **variables => {
                Some(entry.result)
            }
            _ => None,
        }
    }

    pub(crate) fn quantify_insert(
        &mut self,
        node: NodeId,
        variables: Arc<FixedBitSet>,
        conjunction: bool,
        result: NodeId,
    ) {
        let slot = quantify_slot(node, conjunction, self.quantify.len());
        self.quantify[slot] = QuantifyEntry { node, variables: Some(variables), conjunction, result };
    }

    pub(crate) fn satcount_lookup(&self, node: NodeId) -> Option<BigUint> {
        let entry = &self.satcount[slot_of(u64::from(node), self.satcount.len())];
        (entry.node == node).then(|| entry.count.clone())
    }

    pub(crate) fn satcount_insert(&mut self, node: NodeId, count: BigUint) {
        let slot = slot_of(u64::from(node), self.satcount.len());
        self.satcount[slot] = SatCountEntry { node, count };
    }

    /// Drop every cached result. Required after any collection or resize,
    /// when cached indices may refer to recycled slots.
    pub(crate) fn clear_all(&mut self) {
        for entry in &mut self.binary {
            entry.a = EMPTY_KEY;
        }
        for entry in &mut self.negation {
            entry.node = EMPTY_KEY;
        }
        for entry in &mut self.ite {
            entry.condition = EMPTY_KEY;
        }
        for entry in &mut self.compose {
            entry.node = EMPTY_KEY;
            entry.substitution = None;
        }
        for entry in &mut self.quantify {
            entry.node = EMPTY_KEY;
            entry.variables = None;
        }
        for entry in &mut self.satcount {
            entry.node = EMPTY_KEY;
        }
        log::trace!("operation caches cleared");
    }

    /// Invalidation on variable creation: compose results depend on the
    /// substitution width and satcount results on the variable count; the
    /// other families are unaffected.
    pub(crate) fn clear_compose_and_satcount(&mut self) {
        for entry in &mut self.compose {
            entry.node = EMPTY_KEY;
            entry.substitution = None;
        }
        for entry in &mut self.satcount {
            entry.node = EMPTY_KEY;
        }
    }
}

#[inline]
fn slot_of(key: u64, len: usize) -> usize {
    (mix64(key) % len as u64) as usize
}

#[inline]
fn binary_slot(op: BinaryOp, a: NodeId, b: NodeId, len: usize) -> usize {
    slot_of((u64::from(op as u8) << 58) ^ (u64::from(a) << 29) ^ u64::from(b), len)
}

#[inline]
fn ite_slot(condition: NodeId, then_node: NodeId, else_node: NodeId, len: usize) -> usize {
    slot_of(
        mix64(u64::from(condition)) ^ (u64::from(then_node) << 29) ^ u64::from(else_node),
        len,
    )
}

#[inline]
fn quantify_slot(node: NodeId, conjunction: bool, len: usize) -> usize {
    slot_of(u64::from(node) << 1 | u64::from(conjunction), len)
}
