//! Fast-fail diagnostics, run before (or instead of) the DP counter (§4.3).

pub mod warning;

pub use warning::{Severity, Warning};

use std::collections::{HashMap, HashSet, VecDeque};

use crate::catalog::{Node, NodeId, NodeKind, TalentTree};
use crate::constraints::ConstraintSet;

/// BFS from roots (`entryNode`, `freeNode`, or no `prev`), forward through
/// `next`, never stepping into a `never_nodes` member. Exposed standalone
/// per §6 so a UI can render connector reachability without a full
/// validation pass.
pub fn compute_reachable(tree: &TalentTree, never_nodes: &HashSet<NodeId>) -> HashSet<NodeId> {
    let roots: Vec<NodeId> = tree
        .nodes()
        .iter()
        .filter(|n| (n.entry_node || n.free_node || n.prev.is_empty()) && !never_nodes.contains(&n.id))
        .map(|n| n.id)
        .collect();

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for root in roots {
        if visited.insert(root) {
            queue.push_back(root);
        }
    }

    while let Some(id) = queue.pop_front() {
        let Some(index) = tree.index_of(id) else { continue };
        for next in tree.next_indices(index) {
            let next_id = tree.node(next).id;
            if never_nodes.contains(&next_id) {
                continue;
            }
            if visited.insert(next_id) {
                queue.push_back(next_id);
            }
        }
    }

    visited
}

/// The minimum rank a node must be purchased at to be considered
/// "selected" at all: `exactRank` if the constraint pins one, else the
/// cheapest `choice` entry's `maxRanks`, else 1 for `single` — 0 for a
/// `freeNode`, which costs nothing regardless.
fn mandatory_rank(node: &Node, constraints: &ConstraintSet) -> u32 {
    if node.free_node {
        return 0;
    }
    if let Some(exact) = constraints.get(node.id).and_then(|c| c.exact_rank) {
        return exact;
    }
    match node.kind {
        NodeKind::Single => 1,
        NodeKind::Choice => node.entries.iter().map(|e| e.max_ranks).min().unwrap_or(1),
    }
}

/// Run every check in §4.3, in order, returning every finding (later checks
/// still run even after an error-severity finding, so a caller gets the
/// full diagnostic picture in one pass).
pub fn validate(tree: &TalentTree, constraints: &ConstraintSet) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let always = constraints.always_nodes(tree);
    let never = constraints.never_nodes();

    check_always_never_collision(&always, &never, &mut warnings);
    check_reachability(tree, &always, &never, &mut warnings);
    check_total_selectable(tree, &never, &mut warnings);

    let forced = forced_cost_check(tree, constraints, &always, &mut warnings);
    per_gate_feasibility(tree, constraints, &never, &forced, &mut warnings);

    for w in &warnings {
        tracing::debug!(severity = ?w.severity, message = %w.message, nodes = ?w.node_ids, "validator finding");
    }
    warnings
}

fn check_always_never_collision(
    always: &HashSet<NodeId>,
    never: &HashSet<NodeId>,
    warnings: &mut Vec<Warning>,
) {
    let collision: Vec<NodeId> = always.intersection(never).copied().collect();
    if !collision.is_empty() {
        warnings.push(Warning::error(
            "a node is both required and forbidden",
            collision,
        ));
    }
}

fn check_reachability(
    tree: &TalentTree,
    always: &HashSet<NodeId>,
    never: &HashSet<NodeId>,
    warnings: &mut Vec<Warning>,
) {
    let reachable = compute_reachable(tree, never);
    let mut unreachable: Vec<NodeId> = always.iter().filter(|id| !reachable.contains(id)).copied().collect();
    unreachable.sort_unstable();
    if !unreachable.is_empty() {
        warnings.push(Warning::error("a required talent is unreachable", unreachable));
    }
}

fn check_total_selectable(tree: &TalentTree, never: &HashSet<NodeId>, warnings: &mut Vec<Warning>) {
    let total: u32 = tree
        .nodes()
        .iter()
        .filter(|n| !n.free_node && !never.contains(&n.id))
        .map(|n| n.max_ranks)
        .sum();
    if total < tree.point_budget {
        warnings.push(Warning::error("not enough selectable talents to fill the point budget", vec![]));
    }
}

/// Min-cost-to-root DP (§4.3 step 4). Returns the set of nodes forced onto
/// the minimal predecessor chain of every `always` node.
fn forced_cost_check(
    tree: &TalentTree,
    constraints: &ConstraintSet,
    always: &HashSet<NodeId>,
    warnings: &mut Vec<Warning>,
) -> HashSet<NodeId> {
    let mut dist: HashMap<NodeId, u32> = HashMap::new();
    let mut via: HashMap<NodeId, Option<NodeId>> = HashMap::new();

    for &index in tree.processing_order() {
        let node = tree.node(index);
        let self_cost = if always.contains(&node.id) { 0 } else { mandatory_rank(node, constraints) };

        if node.entry_node || node.free_node || node.prev.is_empty() {
            let d = self_cost;
            let better = dist.get(&node.id).map_or(true, |&cur| d < cur);
            if better {
                dist.insert(node.id, d);
                via.insert(node.id, None);
            }
        }

        for &pred_id in &node.prev {
            let Some(&pred_dist) = dist.get(&pred_id) else { continue };
            let candidate = pred_dist + self_cost;
            let better = dist.get(&node.id).map_or(true, |&cur| candidate < cur);
            if better {
                dist.insert(node.id, candidate);
                via.insert(node.id, Some(pred_id));
            }
        }
    }

    let mut forced: HashSet<NodeId> = HashSet::new();
    for &node_id in always {
        let mut cursor = Some(node_id);
        while let Some(id) = cursor {
            if !forced.insert(id) {
                break;
            }
            cursor = via.get(&id).copied().flatten();
        }
    }

    let total_forced_cost: u32 = forced
        .iter()
        .filter_map(|id| tree.index_of(*id))
        .map(|idx| mandatory_rank(tree.node(idx), constraints))
        .sum();

    if total_forced_cost > tree.point_budget {
        let mut nodes: Vec<NodeId> = forced.iter().copied().collect();
        nodes.sort_unstable();
        warnings.push(Warning::error(
            "required talents and their prerequisites exceed the point budget",
            nodes,
        ));
    }

    forced
}

fn per_gate_feasibility(
    tree: &TalentTree,
    constraints: &ConstraintSet,
    never: &HashSet<NodeId>,
    forced: &HashSet<NodeId>,
    warnings: &mut Vec<Warning>,
) {
    for gate in &tree.gates {
        let req = gate.required_points;

        let forced_before: u32 = forced
            .iter()
            .filter_map(|id| tree.index_of(*id))
            .map(|idx| tree.node(idx))
            .filter(|n| n.req_points < req)
            .map(|n| mandatory_rank(n, constraints))
            .sum();
        let forced_after: u32 = forced
            .iter()
            .filter_map(|id| tree.index_of(*id))
            .map(|idx| tree.node(idx))
            .filter(|n| n.req_points >= req)
            .map(|n| mandatory_rank(n, constraints))
            .sum();

        if forced_before.max(req) + forced_after > tree.point_budget {
            warnings.push(Warning::error(
                format!("required talents exceed the budget after gate at {req} points"),
                vec![],
            ));
        }

        let selectable_before: u32 = tree
            .nodes()
            .iter()
            .filter(|n| !n.free_node && !never.contains(&n.id) && n.req_points < req)
            .map(|n| n.max_ranks)
            .sum();
        if selectable_before < req {
            warnings.push(Warning::error(
                format!("not enough talents below the gate at {req} points to unlock it"),
                vec![],
            ));
        }

        let selectable_after: u32 = tree
            .nodes()
            .iter()
            .filter(|n| !n.free_node && !never.contains(&n.id) && n.req_points >= req)
            .map(|n| n.max_ranks)
            .sum();
        if selectable_after < tree.point_budget.saturating_sub(req) {
            warnings.push(Warning::error(
                format!("not enough talents at or beyond the gate at {req} points to spend the remaining budget"),
                vec![],
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::Entry;
    use crate::catalog::{NodeKind as Kind, TreeKind};
    use crate::constraints::{Constraint, ConstraintKind};

    fn node(id: NodeId, req_points: u32, row: u32, prev: Vec<NodeId>, max_ranks: u32) -> Node {
        Node {
            id,
            kind: Kind::Single,
            max_ranks,
            entries: vec![Entry::new(id * 10, format!("n{id}"), max_ranks, 0)],
            next: vec![],
            prev,
            req_points,
            row,
            col: 0,
            free_node: false,
            entry_node: row == 0,
            is_apex: false,
            sub_tree_id: None,
            name: format!("Node {id}"),
        }
    }

    /// Derives `next` from the `prev` lists set up by the test cases.
    fn link(mut nodes: Vec<Node>) -> Vec<Node> {
        for i in 0..nodes.len() {
            let prevs = nodes[i].prev.clone();
            for p in prevs {
                if let Some(parent) = nodes.iter_mut().find(|n| n.id == p) {
                    parent.next.push(nodes[i].id);
                }
            }
        }
        nodes
    }

    #[test]
    fn reports_always_never_collision() {
        let tree = TalentTree::new(TreeKind::Class, link(vec![node(1, 0, 0, vec![], 1)]), 1);
        let mut cs = ConstraintSet::new();
        let n = &tree.nodes()[0];
        cs.insert(Constraint::new(n, ConstraintKind::Always, None, None, None).unwrap());
        cs.insert(Constraint::new(n, ConstraintKind::Never, None, None, None).unwrap());
        let warnings = validate(&tree, &cs);
        assert!(warnings.iter().any(|w| w.is_error() && w.message.contains("required and forbidden")));
    }

    #[test]
    fn reports_unreachable_always_node() {
        // Node 2's only predecessor is node 1, which is never-pinned, so
        // node 2 becomes unreachable once it's also pinned always.
        let a = node(1, 0, 0, vec![], 1);
        let b = node(2, 0, 1, vec![1], 1);
        let tree = TalentTree::new(TreeKind::Class, link(vec![a, b]), 2);
        let mut cs = ConstraintSet::new();
        let a_ref = tree.nodes().iter().find(|n| n.id == 1).unwrap();
        cs.insert(Constraint::new(a_ref, ConstraintKind::Never, None, None, None).unwrap());
        let b_ref = tree.nodes().iter().find(|n| n.id == 2).unwrap();
        cs.insert(Constraint::new(b_ref, ConstraintKind::Always, None, None, None).unwrap());

        let warnings = validate(&tree, &cs);
        assert!(warnings.iter().any(|w| w.is_error() && w.message.contains("unreachable")));
    }

    #[test]
    fn total_selectable_short_of_budget_is_reported() {
        let tree = TalentTree::new(TreeKind::Class, link(vec![node(1, 0, 0, vec![], 1)]), 5);
        let cs = ConstraintSet::new();
        let warnings = validate(&tree, &cs);
        assert!(warnings.iter().any(|w| w.message.contains("not enough selectable")));
    }

    #[test]
    fn forced_chain_cost_included_in_budget_check() {
        let a = node(1, 0, 0, vec![], 1);
        let b = node(2, 0, 1, vec![1], 1);
        let tree = TalentTree::new(TreeKind::Class, link(vec![a, b]), 1);
        let mut cs = ConstraintSet::new();
        let b_ref = tree.nodes().iter().find(|n| n.id == 2).unwrap();
        cs.insert(Constraint::new(b_ref, ConstraintKind::Always, None, None, None).unwrap());
        let warnings = validate(&tree, &cs);
        assert!(warnings.iter().any(|w| w.message.contains("exceed the point budget")));
    }
}
