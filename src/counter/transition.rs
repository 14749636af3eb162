//! Per-node branch enumeration, shared verbatim by the DP counter and the
//! unranking generator so both walk identical branches in identical order
//! (§4.5 canonical order: skip < entry index ascending < rank ascending).

use crate::catalog::{Node, NodeKind};
use crate::constraints::Constraint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// `single` node purchased at this rank.
    Rank(u32),
    /// `choice` node purchasing the entry at this ordinal index.
    Entry(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub cost: u32,
    pub selection: Option<Selection>,
}

impl Branch {
    pub fn is_skip(&self) -> bool {
        self.selection.is_none()
    }
}

/// All branches available at `node`, in canonical order, given whether the
/// node is pinned `always`/`never` and whether its prerequisites are
/// currently satisfied. Returns an empty vec only when the node is both
/// inaccessible and `always` (a dead state the caller must drop).
pub fn branches(node: &Node, constraint: Option<&Constraint>, always: bool, never: bool, accessible: bool) -> Vec<Branch> {
    if node.free_node {
        // Granted, not purchased: cost stays 0 but the node still shows up in
        // a build's output at its full rank (§4.6 encodes this as
        // `selected=1, purchased=0`, distinct from "not selected").
        return vec![Branch { cost: 0, selection: Some(Selection::Rank(node.max_ranks)) }];
    }

    if never || !accessible {
        return if always {
            vec![]
        } else {
            vec![Branch { cost: 0, selection: None }]
        };
    }

    let mut out = Vec::new();
    if !always {
        out.push(Branch { cost: 0, selection: None });
    }

    match node.kind {
        NodeKind::Choice => {
            let only_index = constraint.and_then(|c| c.entry_index);
            for entry in &node.entries {
                if let Some(idx) = only_index {
                    if entry.index != idx {
                        continue;
                    }
                }
                out.push(Branch { cost: entry.max_ranks, selection: Some(Selection::Entry(entry.index)) });
            }
        }
        NodeKind::Single => {
            let exact = constraint.and_then(|c| c.exact_rank);
            let range: Vec<u32> = match exact {
                Some(r) => vec![r],
                None => (1..=node.max_ranks).collect(),
            };
            for rank in range {
                out.push(Branch { cost: rank, selection: Some(Selection::Rank(rank)) });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::Entry;
    use crate::catalog::NodeId;

    fn single(id: NodeId, max_ranks: u32, free_node: bool) -> Node {
        Node {
            id,
            kind: NodeKind::Single,
            max_ranks,
            entries: vec![Entry::new(id, "s", max_ranks, 0)],
            next: vec![],
            prev: vec![],
            req_points: 0,
            row: 0,
            col: 0,
            free_node,
            entry_node: true,
            is_apex: false,
            sub_tree_id: None,
            name: "s".into(),
        }
    }

    #[test]
    fn single_node_has_skip_then_ascending_ranks() {
        let n = single(1, 3, false);
        let b = branches(&n, None, false, false, true);
        assert_eq!(b.len(), 4);
        assert!(b[0].is_skip());
        assert_eq!(b[1].selection, Some(Selection::Rank(1)));
        assert_eq!(b[3].selection, Some(Selection::Rank(3)));
    }

    #[test]
    fn always_node_has_no_skip_branch() {
        let n = single(1, 2, false);
        let b = branches(&n, None, true, false, true);
        assert_eq!(b.len(), 2);
        assert!(!b[0].is_skip());
    }

    #[test]
    fn never_node_has_only_skip() {
        let n = single(1, 2, false);
        let b = branches(&n, None, false, true, true);
        assert_eq!(b, vec![Branch { cost: 0, selection: None }]);
    }

    #[test]
    fn inaccessible_always_node_has_no_branches() {
        let n = single(1, 2, false);
        let b = branches(&n, None, true, false, false);
        assert!(b.is_empty());
    }

    #[test]
    fn free_node_has_single_zero_cost_branch_at_max_rank() {
        let n = single(1, 3, true);
        let b = branches(&n, None, false, false, true);
        assert_eq!(b, vec![Branch { cost: 0, selection: Some(Selection::Rank(3)) }]);
    }
}
