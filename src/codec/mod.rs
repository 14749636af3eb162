//! The wire codec (§4.6): a caller-supplied flat node list, a hand-rolled
//! bit cursor, and a fixed base64 alphabet — deliberately not delegated to a
//! byte-oriented base64 crate, since this format's bit order and per-node
//! record schema don't match one.

mod base64;
mod bitstream;
mod frame;

pub use frame::{decode_talent_hash, encode_talent_hash};

use std::collections::HashMap;

use crate::catalog::{Entry, EntryId, Node, NodeId, NodeKind};

/// A node as the wire codec sees it: just enough to size and interpret its
/// record (`id`, `kind`, `maxRanks`, `entries`). Callers assemble this list
/// themselves from the union of a class's nodes plus every same-class spec's
/// and hero tree's nodes, in ascending ID order — independent of any single
/// [`crate::catalog::TalentTree`].
#[derive(Debug, Clone)]
pub struct TalentNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub max_ranks: u32,
    pub entries: Vec<Entry>,
}

impl From<&Node> for TalentNode {
    fn from(node: &Node) -> Self {
        TalentNode { id: node.id, kind: node.kind, max_ranks: node.max_ranks, entries: node.entries.clone() }
    }
}

/// One node's state in a decoded/encoded hash. A `single` node not at its
/// full `maxRanks` is `Rank`; a `choice` node's chosen option is `Entry`; a
/// free/granted node (cost 0 regardless of rank) is `Granted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSelection {
    Granted,
    Rank(u32),
    Entry(u32),
}

/// The full decoded payload of a talent hash string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentSelection {
    pub version: u8,
    pub spec_id: u16,
    pub tree_hash: [u8; 16],
    pub nodes: HashMap<NodeId, NodeSelection>,
}

impl TalentSelection {
    /// An empty selection for `spec_id`/`tree_hash`, defaulting to the
    /// current game-client write version (§4.6: "version 2 ... is the
    /// default on write").
    pub fn new(spec_id: u16, tree_hash: [u8; 16]) -> Self {
        TalentSelection {
            version: frame::DEFAULT_WRITE_VERSION,
            spec_id,
            tree_hash,
            nodes: HashMap::new(),
        }
    }
}

/// Where one entry lives: which node, and at what ordinal index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLocation {
    pub node_id: NodeId,
    pub entry_index: u32,
}

/// Flattens a node list into an entry -> location index, for a caller
/// rendering a decoded selection back against entry-keyed UI state.
pub fn build_entry_lookup(nodes: &[TalentNode]) -> HashMap<EntryId, EntryLocation> {
    let mut map = HashMap::new();
    for node in nodes {
        for entry in &node.entries {
            map.insert(entry.id, EntryLocation { node_id: node.id, entry_index: entry.index });
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_lookup_maps_back_to_owning_node() {
        let node = Node {
            id: 7,
            kind: NodeKind::Choice,
            max_ranks: 1,
            entries: vec![Entry::new(70, "a", 1, 0), Entry::new(71, "b", 1, 1)],
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
        };
        let talent_node: TalentNode = (&node).into();
        let lookup = build_entry_lookup(&[talent_node]);
        assert_eq!(lookup.get(&71), Some(&EntryLocation { node_id: 7, entry_index: 1 }));
    }
}
