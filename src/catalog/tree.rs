use std::collections::HashMap;

use super::node::{Node, NodeId, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    Class,
    Spec,
    Hero,
}

/// A gate: no node at or beyond `row` may be selected until `required_points`
/// have been spent on nodes with a strictly lower `req_points`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub row: u32,
    pub required_points: u32,
}

/// A DAG of nodes, plus the layout/budget metadata the counter and validator
/// need. Immutable after [`TalentTree::new`] returns.
#[derive(Debug, Clone)]
pub struct TalentTree {
    pub kind: TreeKind,
    nodes: Vec<Node>,
    id_to_index: HashMap<NodeId, NodeIndex>,
    /// Node indices ordered primarily by `req_points` ascending, then `row`
    /// ascending — the order the DP counter and unranking generator both
    /// walk in lock-step.
    processing_order: Vec<NodeIndex>,
    pub gates: Vec<Gate>,
    pub point_budget: u32,
    pub max_points: u32,
    pub sub_tree_id: Option<u32>,
    pub sub_tree_name: Option<String>,
}

impl TalentTree {
    pub fn new(kind: TreeKind, nodes: Vec<Node>, point_budget: u32) -> Self {
        let mut id_to_index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            id_to_index.insert(node.id, NodeIndex(i as u32));
        }

        let mut processing_order: Vec<NodeIndex> =
            (0..nodes.len()).map(|i| NodeIndex(i as u32)).collect();
        processing_order.sort_by_key(|idx| {
            let n = &nodes[idx.as_usize()];
            (n.req_points, n.row)
        });

        let gates = derive_gates(&nodes);
        let max_points = nodes.iter().map(Node::max_cost).sum();

        TalentTree {
            kind,
            nodes,
            id_to_index,
            processing_order,
            gates,
            point_budget,
            max_points,
            sub_tree_id: None,
            sub_tree_name: None,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.as_usize()]
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_to_index.get(&id).copied()
    }

    pub fn processing_order(&self) -> &[NodeIndex] {
        &self.processing_order
    }

    /// Indices of `node.next`, resolved and filtered to ids actually present
    /// in this tree (defensive: a malformed catalog may reference a pruned
    /// node).
    pub fn next_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.node(index)
            .next
            .iter()
            .filter_map(|id| self.index_of(*id))
            .collect()
    }

    pub fn prev_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.node(index)
            .prev
            .iter()
            .filter_map(|id| self.index_of(*id))
            .collect()
    }
}

/// One gate per distinct `req_points` value greater than zero, at the lowest
/// row any node with that threshold sits on.
fn derive_gates(nodes: &[Node]) -> Vec<Gate> {
    let mut by_threshold: HashMap<u32, u32> = HashMap::new();
    for node in nodes {
        if node.req_points == 0 {
            continue;
        }
        by_threshold
            .entry(node.req_points)
            .and_modify(|row| *row = (*row).min(node.row))
            .or_insert(node.row);
    }
    let mut gates: Vec<Gate> = by_threshold
        .into_iter()
        .map(|(required_points, row)| Gate { row, required_points })
        .collect();
    gates.sort_by_key(|g| g.required_points);
    gates
}
