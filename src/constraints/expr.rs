use crate::catalog::NodeId;

/// A boolean expression over other nodes' selection state, used as the
/// payload of a `conditional` [`super::constraint::Constraint`].
///
/// `And`/`Or` children are always non-empty; construction through
/// [`BooleanExpr::and`]/[`BooleanExpr::or`] enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanExpr {
    TalentSelected { node_id: NodeId, min_rank: Option<u32> },
    And(Vec<BooleanExpr>),
    Or(Vec<BooleanExpr>),
}

impl BooleanExpr {
    pub fn selected(node_id: NodeId) -> Self {
        BooleanExpr::TalentSelected { node_id, min_rank: None }
    }

    pub fn selected_at_least(node_id: NodeId, min_rank: u32) -> Self {
        BooleanExpr::TalentSelected { node_id, min_rank: Some(min_rank) }
    }

    /// Returns `None` if `children` is empty; `And`/`Or` have no identity
    /// element in this expression language.
    pub fn and(children: Vec<BooleanExpr>) -> Option<Self> {
        (!children.is_empty()).then_some(BooleanExpr::And(children))
    }

    pub fn or(children: Vec<BooleanExpr>) -> Option<Self> {
        (!children.is_empty()).then_some(BooleanExpr::Or(children))
    }

    /// Every node id this expression references, for trigger-set collection
    /// (§4.4 "Conditionals").
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        match self {
            BooleanExpr::TalentSelected { node_id, .. } => out.push(*node_id),
            BooleanExpr::And(children) | BooleanExpr::Or(children) => {
                for child in children {
                    child.collect_nodes(out);
                }
            }
        }
    }

    /// Evaluate against a predicate giving each referenced node's purchased
    /// rank (0 if not selected). `min_rank` defaults to 1 when unset.
    pub fn evaluate(&self, rank_of: &impl Fn(NodeId) -> u32) -> bool {
        match self {
            BooleanExpr::TalentSelected { node_id, min_rank } => {
                rank_of(*node_id) >= min_rank.unwrap_or(1)
            }
            BooleanExpr::And(children) => children.iter().all(|c| c.evaluate(rank_of)),
            BooleanExpr::Or(children) => children.iter().any(|c| c.evaluate(rank_of)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_or_reject_empty_children() {
        assert!(BooleanExpr::and(vec![]).is_none());
        assert!(BooleanExpr::or(vec![]).is_none());
    }

    #[test]
    fn evaluates_and_of_two_talents() {
        let expr =
            BooleanExpr::and(vec![BooleanExpr::selected(1), BooleanExpr::selected_at_least(2, 2)])
                .unwrap();
        let ranks = |id: NodeId| if id == 1 { 1 } else { 2 };
        assert!(expr.evaluate(&ranks));

        let ranks_fail = |id: NodeId| if id == 1 { 1 } else { 1 };
        assert!(!expr.evaluate(&ranks_fail));
    }

    #[test]
    fn referenced_nodes_collects_across_nesting() {
        let expr = BooleanExpr::or(vec![
            BooleanExpr::selected(1),
            BooleanExpr::and(vec![BooleanExpr::selected(2), BooleanExpr::selected(3)]).unwrap(),
        ])
        .unwrap();
        let mut nodes = expr.referenced_nodes();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![1, 2, 3]);
    }
}
