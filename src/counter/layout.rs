//! The bit-allocation layout shared by the DP counter and the unranking
//! generator (§9 "Bit allocation": "it is crucial that ... the counter and
//! unranker use identical bit assignments — derive them from one layout
//! routine").
//!
//! A node's bit, once assigned, means "this node was purchased at rank ≥
//! 1". Two kinds of consumer need that fact kept alive: a descendant node
//! checking that at least one of its prerequisites was purchased
//! (accessibility), and a conditional constraint's enforcement step. Both
//! are modeled as one "tracked node" concept so a node that happens to be
//! both an ancestor and a conditional trigger naturally shares one bit,
//! which is the reuse the reference design calls for.

use std::collections::{HashMap, HashSet};

use crate::catalog::{NodeId, TalentTree};
use crate::constraints::ConstraintSet;

#[derive(Debug, Clone)]
pub struct EnforcementPlan {
    pub target: NodeId,
    pub expr: crate::constraints::BooleanExpr,
    /// Processing-order position after which this conditional is checked.
    pub enforce_at: usize,
}

#[derive(Debug, Clone)]
pub struct BitLayout {
    /// Total number of live bit slots ever in use simultaneously.
    pub width: u32,
    bit_of: HashMap<NodeId, u32>,
    /// Per processing-order position, the node id (if any) that claims a
    /// fresh bit right before that node is transitioned.
    claims_at: Vec<Option<NodeId>>,
    /// Per processing-order position, the node ids whose bit is released
    /// right after that node is transitioned (and any enforcement at that
    /// position has run).
    retires_at: Vec<Vec<NodeId>>,
    pub enforcements: Vec<EnforcementPlan>,
    pub unresolvable: Vec<NodeId>,
}

impl BitLayout {
    pub fn bit_of(&self, id: NodeId) -> Option<u32> {
        self.bit_of.get(&id).copied()
    }

    pub fn claim_at(&self, position: usize) -> Option<NodeId> {
        self.claims_at[position]
    }

    pub fn retires_at(&self, position: usize) -> &[NodeId] {
        &self.retires_at[position]
    }
}

pub fn compute_layout(tree: &TalentTree, constraints: &ConstraintSet) -> BitLayout {
    let order = tree.processing_order();
    let position_of: HashMap<NodeId, usize> =
        order.iter().enumerate().map(|(pos, idx)| (tree.node(*idx).id, pos)).collect();

    let mut ancestor_last_consumer: HashMap<NodeId, usize> = HashMap::new();
    for (pos, idx) in order.iter().enumerate() {
        let node = tree.node(*idx);
        if node.free_node || node.entry_node || node.prev.is_empty() {
            continue;
        }
        for &ancestor in &node.prev {
            ancestor_last_consumer
                .entry(ancestor)
                .and_modify(|p| *p = (*p).max(pos))
                .or_insert(pos);
        }
    }

    let tree_node_ids: HashSet<NodeId> = tree.nodes().iter().map(|n| n.id).collect();
    let mut enforcements = Vec::new();
    let mut unresolvable = Vec::new();
    let mut condition_retire: HashMap<NodeId, usize> = HashMap::new();

    for c in constraints.conditionals() {
        let Some(expr) = c.condition.clone() else { continue };
        let triggers = expr.referenced_nodes();
        let all_known = triggers.iter().all(|id| tree_node_ids.contains(id)) && tree_node_ids.contains(&c.node_id);
        if !all_known {
            unresolvable.push(c.node_id);
            continue;
        }
        let mut enforce_at = position_of[&c.node_id];
        for t in &triggers {
            enforce_at = enforce_at.max(position_of[t]);
        }
        for t in triggers.iter().chain(std::iter::once(&c.node_id)) {
            condition_retire.entry(*t).and_modify(|p| *p = (*p).max(enforce_at)).or_insert(enforce_at);
        }
        enforcements.push(EnforcementPlan { target: c.node_id, expr, enforce_at });
    }

    let mut retire_at: HashMap<NodeId, usize> = ancestor_last_consumer;
    for (id, pos) in condition_retire {
        retire_at.entry(id).and_modify(|p| *p = (*p).max(pos)).or_insert(pos);
    }

    let tracked: HashSet<NodeId> = retire_at.keys().copied().collect();

    let mut claims_at = vec![None; order.len()];
    let mut retires_at = vec![Vec::new(); order.len()];
    let mut bit_of: HashMap<NodeId, u32> = HashMap::new();
    let mut free: Vec<u32> = Vec::new();
    let mut next_new: u32 = 0;

    for (pos, idx) in order.iter().enumerate() {
        let id = tree.node(*idx).id;
        if tracked.contains(&id) {
            let bit = free.pop().unwrap_or_else(|| {
                let b = next_new;
                next_new += 1;
                b
            });
            bit_of.insert(id, bit);
            claims_at[pos] = Some(id);
        }
        for (&other_id, &retire_pos) in &retire_at {
            if retire_pos == pos && bit_of.contains_key(&other_id) {
                retires_at[pos].push(other_id);
            }
        }
        for id in &retires_at[pos] {
            if let Some(&b) = bit_of.get(id) {
                free.push(b);
            }
        }
    }

    BitLayout { width: next_new, bit_of, claims_at, retires_at, enforcements, unresolvable }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::Entry;
    use crate::catalog::{Node, NodeKind, TreeKind};

    fn node(id: NodeId, prev: Vec<NodeId>) -> Node {
        Node {
            id,
            kind: NodeKind::Single,
            max_ranks: 1,
            entries: vec![Entry::new(id * 10, format!("n{id}"), 1, 0)],
            next: vec![],
            prev,
            req_points: 0,
            row: 0,
            col: 0,
            free_node: false,
            entry_node: false,
            is_apex: false,
            sub_tree_id: None,
            name: format!("Node {id}"),
        }
    }

    #[test]
    fn non_ancestor_nodes_get_no_bit() {
        let mut a = node(1, vec![]);
        a.entry_node = true;
        let tree = TalentTree::new(TreeKind::Class, vec![a], 1);
        let layout = compute_layout(&tree, &ConstraintSet::new());
        assert!(layout.bit_of(1).is_none());
        assert_eq!(layout.width, 0);
    }

    #[test]
    fn ancestor_gets_a_bit_retired_after_last_consumer() {
        let mut a = node(1, vec![]);
        a.entry_node = true;
        let b = node(2, vec![1]);
        let tree = TalentTree::new(TreeKind::Class, vec![a, b], 2);
        let layout = compute_layout(&tree, &ConstraintSet::new());
        assert!(layout.bit_of(1).is_some());
        let b_pos = tree.processing_order().iter().position(|idx| tree.node(*idx).id == 2).unwrap();
        assert_eq!(layout.retires_at(b_pos), &[1]);
    }

    #[test]
    fn bit_positions_recycle_via_free_list() {
        let mut a = node(1, vec![]);
        a.entry_node = true;
        let b = node(2, vec![1]);
        let mut c = node(3, vec![]);
        c.entry_node = true;
        let d = node(4, vec![3]);
        let tree = TalentTree::new(TreeKind::Class, vec![a, b, c, d], 4);
        let layout = compute_layout(&tree, &ConstraintSet::new());
        // Only two ancestors (1, 3) ever need tracking, but 1 retires
        // before 3 is claimed if the processing order allows it — either
        // way width must stay small, never one bit per ancestor blindly.
        assert!(layout.width <= 2);
    }
}
