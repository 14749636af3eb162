//! Shared tree-building helpers for the integration test suite. Mirrors the
//! fixture shape used throughout the library's own `#[cfg(test)]` modules.

use talent_engine::prelude::*;

pub fn single(id: NodeId, max_ranks: u32, prev: Vec<NodeId>) -> Node {
    Node {
        id,
        kind: NodeKind::Single,
        max_ranks,
        entries: vec![Entry::new(id, format!("n{id}"), max_ranks, 0)],
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

pub fn root(id: NodeId, max_ranks: u32) -> Node {
    let mut n = single(id, max_ranks, vec![]);
    n.entry_node = true;
    n
}

pub fn free_root(id: NodeId, max_ranks: u32) -> Node {
    let mut n = root(id, max_ranks);
    n.free_node = true;
    n
}

pub fn choice(id: NodeId, entries: Vec<(EntryId, u32)>) -> Node {
    let entries = entries
        .into_iter()
        .enumerate()
        .map(|(i, (entry_id, max_ranks))| Entry::new(entry_id, format!("e{entry_id}"), max_ranks, i as u32))
        .collect();
    Node {
        id,
        kind: NodeKind::Choice,
        max_ranks: 1,
        entries,
        next: vec![],
        prev: vec![],
        req_points: 0,
        row: 0,
        col: 0,
        free_node: false,
        entry_node: true,
        is_apex: false,
        sub_tree_id: None,
        name: format!("Choice {id}"),
    }
}

/// Derives each node's `next` list from the `prev` lists already set on
/// `nodes`, the way a parsed catalog's edges would already be bidirectional.
pub fn linked(mut nodes: Vec<Node>) -> Vec<Node> {
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

pub fn entry_sets(builds: &[Build]) -> Vec<Vec<(EntryId, u32)>> {
    builds
        .iter()
        .map(|b| {
            let mut v: Vec<(EntryId, u32)> = b.entries.iter().map(|(&k, &v)| (k, v)).collect();
            v.sort_unstable();
            v
        })
        .collect()
}
