use crate::catalog::{Node, NodeId, NodeKind};
use crate::error::CoreError;

use super::expr::BooleanExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Always,
    Never,
    Conditional,
}

/// A user-imposed pin on one node: must-take, forbidden, or required under
/// a boolean condition over other nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub node_id: NodeId,
    pub kind: ConstraintKind,
    pub entry_index: Option<u32>,
    pub exact_rank: Option<u32>,
    pub condition: Option<BooleanExpr>,
}

impl Constraint {
    /// Builds a constraint, checking it against `node`:
    /// - `entry_index` only on `choice` nodes.
    /// - `exact_rank` only on non-free `single` nodes, and within `[1, maxRanks]`.
    /// - `condition` set if and only if `kind = Conditional`.
    pub fn new(
        node: &Node,
        kind: ConstraintKind,
        entry_index: Option<u32>,
        exact_rank: Option<u32>,
        condition: Option<BooleanExpr>,
    ) -> Result<Self, CoreError> {
        if entry_index.is_some() && node.kind != NodeKind::Choice {
            return Err(CoreError::Other(format!(
                "node {} is not a choice node, entry_index is not applicable",
                node.id
            )));
        }
        if let Some(rank) = exact_rank {
            if node.kind != NodeKind::Single || node.free_node {
                return Err(CoreError::Other(format!(
                    "node {} cannot take exact_rank (not a non-free single node)",
                    node.id
                )));
            }
            if rank == 0 || rank > node.max_ranks {
                return Err(CoreError::Other(format!(
                    "node {} exact_rank {rank} out of range [1, {}]",
                    node.id, node.max_ranks
                )));
            }
        }
        match (kind, &condition) {
            (ConstraintKind::Conditional, None) => {
                return Err(CoreError::Other(format!(
                    "node {} is conditional but carries no condition",
                    node.id
                )))
            }
            (ConstraintKind::Conditional, Some(_)) => {}
            (_, Some(_)) => {
                return Err(CoreError::Other(format!(
                    "node {} carries a condition but is not conditional",
                    node.id
                )))
            }
            (_, None) => {}
        }

        Ok(Constraint { node_id: node.id, kind, entry_index, exact_rank, condition })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::Entry;

    fn choice_node(id: NodeId) -> Node {
        Node {
            id,
            kind: NodeKind::Choice,
            max_ranks: 1,
            entries: vec![Entry::new(id * 10, "a", 1, 0), Entry::new(id * 10 + 1, "b", 1, 1)],
            next: vec![],
            prev: vec![],
            req_points: 0,
            row: 0,
            col: 0,
            free_node: false,
            entry_node: true,
            is_apex: false,
            sub_tree_id: None,
            name: "choice".into(),
        }
    }

    fn single_node(id: NodeId, max_ranks: u32, free_node: bool) -> Node {
        Node {
            id,
            kind: NodeKind::Single,
            max_ranks,
            entries: vec![Entry::new(id * 10, "s", max_ranks, 0)],
            next: vec![],
            prev: vec![],
            req_points: 0,
            row: 0,
            col: 0,
            free_node,
            entry_node: true,
            is_apex: false,
            sub_tree_id: None,
            name: "single".into(),
        }
    }

    #[test]
    fn entry_index_rejected_on_single_node() {
        let n = single_node(1, 2, false);
        let err = Constraint::new(&n, ConstraintKind::Always, Some(0), None, None);
        assert!(err.is_err());
    }

    #[test]
    fn exact_rank_rejected_out_of_range() {
        let n = single_node(1, 2, false);
        assert!(Constraint::new(&n, ConstraintKind::Always, None, Some(0), None).is_err());
        assert!(Constraint::new(&n, ConstraintKind::Always, None, Some(3), None).is_err());
        assert!(Constraint::new(&n, ConstraintKind::Always, None, Some(2), None).is_ok());
    }

    #[test]
    fn exact_rank_rejected_on_free_node() {
        let n = single_node(1, 2, true);
        assert!(Constraint::new(&n, ConstraintKind::Always, None, Some(1), None).is_err());
    }

    #[test]
    fn condition_required_iff_conditional() {
        let n = choice_node(1);
        let cond = BooleanExpr::selected(2);
        assert!(Constraint::new(&n, ConstraintKind::Conditional, None, None, None).is_err());
        assert!(Constraint::new(&n, ConstraintKind::Always, None, None, Some(cond.clone())).is_err());
        assert!(Constraint::new(&n, ConstraintKind::Conditional, None, None, Some(cond)).is_ok());
    }
}
