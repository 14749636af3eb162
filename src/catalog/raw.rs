//! Raw catalog shapes and the normalizing parser (§4.1).
//!
//! The wire shape mirrors the game client's own trait API: `posX`/`posY`,
//! `maxRanks`, `subTreeId`, entries carrying an optional `spellId`, and
//! edges recorded by target node id.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::config::PointBudgets;
use crate::error::CoreError;

use super::entry::Entry;
use super::node::{Node, NodeKind};
use super::specialization::Specialization;
use super::tree::{TalentTree, TreeKind};

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_max_ranks")]
    pub max_ranks: u32,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub spell_id: Option<u32>,
}

fn default_max_ranks() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RawNodeKind {
    Single,
    Choice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub node_type: RawNodeKind,
    #[serde(default = "default_max_ranks")]
    pub max_ranks: u32,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
    #[serde(default)]
    pub next: Vec<u32>,
    #[serde(default)]
    pub prev: Vec<u32>,
    pub pos_x: f64,
    pub pos_y: f64,
    #[serde(default)]
    pub free_node: bool,
    #[serde(default)]
    pub entry_node: bool,
    #[serde(default)]
    pub sub_tree_id: Option<u32>,
    /// Gate threshold this node lives at or beyond, as assigned by the
    /// catalog itself (not derived from layout).
    #[serde(default)]
    pub req_points: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSubTree {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSpecializationRecord {
    pub class_name: String,
    pub spec_name: String,
    #[serde(default)]
    pub class_nodes: Vec<RawNode>,
    #[serde(default)]
    pub spec_nodes: Vec<RawNode>,
    #[serde(default)]
    pub hero_nodes: Vec<RawNode>,
    #[serde(default)]
    pub sub_trees: Vec<RawSubTree>,
    /// Parent display name such as "Vengeance / Havoc", used as a fallback
    /// when `sub_trees` carries no matching entry for a given subtree id.
    #[serde(default)]
    pub hero_parent_name: Option<String>,
}

/// Parse a raw catalog payload (a JSON array of per-specialization records)
/// into normalized [`Specialization`]s.
///
/// Never fails on content that parses as the expected shape; the only error
/// case is a document that isn't a JSON array of records at all.
pub fn parse_specializations(
    raw_json: &str,
    budgets: PointBudgets,
) -> Result<Vec<Specialization>, CoreError> {
    let value: serde_json::Value = serde_json::from_str(raw_json)?;
    let records: Vec<RawSpecializationRecord> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        _ => {
            return Err(CoreError::CatalogFormat(
                "top-level catalog payload must be a JSON array".into(),
            ))
        }
    };

    Ok(records.into_iter().map(|r| build_specialization(r, budgets)).collect())
}

fn build_specialization(raw: RawSpecializationRecord, budgets: PointBudgets) -> Specialization {
    let class_tree = build_tree(TreeKind::Class, raw.class_nodes, budgets.class);
    let spec_tree = build_tree(TreeKind::Spec, raw.spec_nodes, budgets.spec);
    let hero_trees = build_hero_trees(raw.hero_nodes, &raw.sub_trees, raw.hero_parent_name.as_deref(), budgets.hero);

    Specialization {
        class_name: raw.class_name,
        spec_name: raw.spec_name,
        class_tree,
        spec_tree,
        hero_trees,
    }
}

fn build_hero_trees(
    raw_nodes: Vec<RawNode>,
    sub_trees: &[RawSubTree],
    parent_name: Option<&str>,
    budget: u32,
) -> Vec<TalentTree> {
    let mut by_sub_tree: HashMap<u32, Vec<RawNode>> = HashMap::new();
    for node in raw_nodes {
        let id = node.sub_tree_id.unwrap_or(0);
        by_sub_tree.entry(id).or_default().push(node);
    }

    let all_ids: Vec<u32> = {
        let mut ids: Vec<u32> = by_sub_tree.keys().copied().collect();
        ids.sort_unstable();
        ids
    };

    let mut trees: Vec<TalentTree> = by_sub_tree
        .into_iter()
        .map(|(sub_tree_id, nodes)| {
            let mut tree = build_tree(TreeKind::Hero, nodes, budget);
            tree.sub_tree_id = Some(sub_tree_id);
            tree.sub_tree_name =
                resolve_sub_tree_name(sub_tree_id, sub_trees, parent_name, &all_ids);
            tree
        })
        .collect();
    trees.sort_by_key(|t| t.sub_tree_id.unwrap_or(0));
    trees
}

/// Resolve a hero sub-tree's display name: first by scanning the explicit
/// sub-tree metadata, falling back to splitting a `"A / B"` parent name
/// against the sorted distinct sub-tree ids.
fn resolve_sub_tree_name(
    sub_tree_id: u32,
    sub_trees: &[RawSubTree],
    parent_name: Option<&str>,
    all_ids: &[u32],
) -> Option<String> {
    if let Some(st) = sub_trees.iter().find(|st| st.id == sub_tree_id) {
        return Some(st.name.clone());
    }

    let parent_name = parent_name?;
    let parts: Vec<&str> = parent_name.split('/').map(|s| s.trim()).collect();
    if parts.len() != all_ids.len() {
        return None;
    }
    let position = all_ids.iter().position(|id| *id == sub_tree_id)?;
    parts.get(position).map(|s| s.to_string())
}

fn build_tree(kind: TreeKind, raw_nodes: Vec<RawNode>, budget: u32) -> TalentTree {
    let filtered: Vec<RawNode> = raw_nodes
        .into_iter()
        .filter(|n| n.name.as_deref().is_some_and(|s| !s.is_empty()) || !n.entries.is_empty())
        .collect();

    let rows = densify_rows(&filtered);
    let known_ids: HashSet<u32> = filtered.iter().map(|n| n.id).collect();

    let is_hero = matches!(kind, TreeKind::Hero);

    let nodes: Vec<Node> = filtered
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let row = rows[i];
            let col = (raw.pos_x / 300.0).round() as i32;

            let next: Vec<u32> = raw
                .next
                .iter()
                .copied()
                .filter(|id| known_ids.contains(id))
                .collect();
            let next_rows_ok: Vec<u32> = next
                .into_iter()
                .filter(|id| {
                    let j = filtered.iter().position(|n| n.id == *id).unwrap();
                    rows[j] > row
                })
                .collect();

            let entries: Vec<Entry> = if raw.entries.is_empty() {
                vec![Entry::new(raw.id, display_name(raw), raw.max_ranks, 0)]
            } else {
                raw.entries
                    .iter()
                    .map(|e| {
                        let mut entry = Entry::new(
                            e.id,
                            e.name.clone().unwrap_or_else(|| format!("Entry {}", e.id)),
                            e.max_ranks,
                            e.index,
                        );
                        entry.spell_id = e.spell_id;
                        entry
                    })
                    .collect()
            };

            let kind = if entries.len() > 1 { NodeKind::Choice } else { raw.node_type.into() };

            let req_points = if raw.entry_node { 0 } else { raw.req_points };

            Some(Node {
                id: raw.id,
                kind,
                max_ranks: raw.max_ranks.max(1),
                entries,
                next: next_rows_ok,
                prev: Vec::new(),
                req_points,
                row,
                col,
                free_node: raw.free_node,
                entry_node: raw.entry_node,
                is_apex: false,
                sub_tree_id: raw.sub_tree_id,
                name: display_name(raw),
            })
        })
        .collect();

    let mut nodes = complete_prev_edges(nodes);
    if is_hero {
        for node in &mut nodes {
            if node.next.is_empty() {
                node.is_apex = true;
            }
        }
    }

    TalentTree::new(kind, nodes, budget)
}

impl From<RawNodeKind> for NodeKind {
    fn from(kind: RawNodeKind) -> Self {
        match kind {
            RawNodeKind::Single => NodeKind::Single,
            RawNodeKind::Choice => NodeKind::Choice,
        }
    }
}

fn display_name(raw: &RawNode) -> String {
    if let Some(name) = &raw.name {
        if !name.is_empty() {
            return name.clone();
        }
    }
    if let Some(first) = raw.entries.first() {
        if let Some(name) = &first.name {
            if !name.is_empty() {
                return name.clone();
            }
        }
    }
    format!("Node {}", raw.id)
}

/// `row := round(raw.posY / 300)`, then rows are remapped to consecutive
/// non-negative integers preserving order.
fn densify_rows(nodes: &[RawNode]) -> Vec<u32> {
    let raw_rows: Vec<i64> = nodes.iter().map(|n| (n.pos_y / 300.0).round() as i64).collect();
    let mut distinct: Vec<i64> = raw_rows.clone();
    distinct.sort_unstable();
    distinct.dedup();
    let rank: HashMap<i64, u32> = distinct
        .into_iter()
        .enumerate()
        .map(|(i, r)| (r, i as u32))
        .collect();
    raw_rows.into_iter().map(|r| rank[&r]).collect()
}

/// Complete `prev` from the `next` lists so `b ∈ next(a) ⇔ a ∈ prev(b)`.
fn complete_prev_edges(mut nodes: Vec<Node>) -> Vec<Node> {
    let mut prev_of: HashMap<u32, Vec<u32>> = HashMap::new();
    for node in &nodes {
        for &target in &node.next {
            prev_of.entry(target).or_default().push(node.id);
        }
    }
    for node in &mut nodes {
        if let Some(prev) = prev_of.remove(&node.id) {
            node.prev = prev;
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_node(id: u32, pos_y: f64, next: Vec<u32>) -> RawNode {
        RawNode {
            id,
            name: Some(format!("n{id}")),
            node_type: RawNodeKind::Single,
            max_ranks: 1,
            entries: vec![],
            next,
            prev: vec![],
            pos_x: 0.0,
            pos_y,
            free_node: false,
            entry_node: pos_y == 0.0,
            sub_tree_id: None,
            req_points: 0,
        }
    }

    #[test]
    fn densifies_rows_preserving_order() {
        let nodes = vec![raw_node(1, 0.0, vec![]), raw_node(2, 900.0, vec![]), raw_node(3, 1800.0, vec![])];
        let rows = densify_rows(&nodes);
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn discards_edges_going_backward_in_row() {
        let mut a = raw_node(1, 300.0, vec![2]);
        a.entry_node = true;
        let b = raw_node(2, 0.0, vec![]);
        let tree = build_tree(TreeKind::Class, vec![a, b], 2);
        let node_a = tree.node(tree.index_of(1).unwrap());
        assert!(node_a.next.is_empty(), "edge to an earlier row must be discarded");
    }

    #[test]
    fn discards_node_without_name_or_entry_id() {
        let mut orphan = raw_node(9, 0.0, vec![]);
        orphan.name = None;
        let tree = build_tree(TreeKind::Class, vec![orphan], 0);
        assert!(tree.index_of(9).is_none());
    }

    #[test]
    fn discards_node_with_empty_name_and_no_entries() {
        let mut orphan = raw_node(10, 0.0, vec![]);
        orphan.name = Some(String::new());
        let tree = build_tree(TreeKind::Class, vec![orphan], 0);
        assert!(tree.index_of(10).is_none());
    }

    #[test]
    fn synthesizes_node_name_when_missing() {
        let mut n = raw_node(7, 0.0, vec![]);
        n.name = None;
        n.entries = vec![RawEntry { id: 70, name: None, max_ranks: 1, index: 0, spell_id: None }];
        let tree = build_tree(TreeKind::Class, vec![n], 1);
        assert_eq!(tree.node(tree.index_of(7).unwrap()).name, "Node 7");
    }

    #[test]
    fn req_points_passes_through_from_catalog() {
        let mut gated = raw_node(2, 300.0, vec![]);
        gated.req_points = 5;
        let tree = build_tree(TreeKind::Class, vec![gated], 10);
        assert_eq!(tree.node(tree.index_of(2).unwrap()).req_points, 5);
        assert_eq!(tree.gates.len(), 1);
        assert_eq!(tree.gates[0].required_points, 5);
    }

    #[test]
    fn hero_nodes_group_by_sub_tree_and_mark_apex() {
        let mut a = raw_node(1, 0.0, vec![2]);
        a.sub_tree_id = Some(10);
        a.entry_node = true;
        let mut b = raw_node(2, 300.0, vec![]);
        b.sub_tree_id = Some(10);
        let sub_trees = vec![RawSubTree { id: 10, name: "Aldrachi Reaver".into() }];
        let trees = build_hero_trees(vec![a, b], &sub_trees, None, 3);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].sub_tree_name.as_deref(), Some("Aldrachi Reaver"));
        let leaf = trees[0].node(trees[0].index_of(2).unwrap());
        assert!(leaf.is_apex);
    }

    #[test]
    fn resolves_hero_name_from_parent_split_when_no_sub_tree_metadata() {
        let mut a = raw_node(1, 0.0, vec![]);
        a.sub_tree_id = Some(5);
        a.entry_node = true;
        let mut b = raw_node(2, 0.0, vec![]);
        b.sub_tree_id = Some(9);
        b.entry_node = true;
        let trees = build_hero_trees(vec![a, b], &[], Some("Vengeance / Havoc"), 3);
        let names: Vec<Option<String>> = trees.iter().map(|t| t.sub_tree_name.clone()).collect();
        assert_eq!(names, vec![Some("Vengeance".to_string()), Some("Havoc".to_string())]);
    }
}
