//! The per-node record schema and frame header (§4.6).

use std::collections::HashMap;

use super::base64::{decode_groups, encode_groups};
use super::bitstream::{BitReader, BitWriter};
use super::{NodeSelection, TalentNode, TalentSelection};

const ACCEPTED_VERSIONS: [u8; 2] = [1, 2];
const CURRENT_VERSION: u8 = 2;

pub fn encode_talent_hash(selection: &TalentSelection, nodes: &[TalentNode]) -> String {
    let mut w = BitWriter::new();
    w.write_bits(selection.version as u32, 8);
    w.write_bits(selection.spec_id as u32, 16);
    for byte in selection.tree_hash {
        w.write_bits(byte as u32, 8);
    }

    for node in nodes {
        match selection.nodes.get(&node.id) {
            None => w.write_bit(false), // selected = 0
            Some(sel) => {
                w.write_bit(true); // selected = 1
                encode_node_record(&mut w, node, *sel);
            }
        }
    }

    encode_groups(&w.finish())
}

fn encode_node_record(w: &mut BitWriter, node: &TalentNode, selection: NodeSelection) {
    match selection {
        NodeSelection::Granted => {
            w.write_bit(false); // purchased = 0
        }
        NodeSelection::Rank(rank) => {
            w.write_bit(true); // purchased = 1
            if rank < node.max_ranks {
                w.write_bit(true); // partiallyRanked = 1
                w.write_bits(rank, 6);
            } else {
                w.write_bit(false); // partiallyRanked = 0, full maxRanks implied
            }
            w.write_bit(false); // isChoice = 0
        }
        NodeSelection::Entry(entry_index) => {
            w.write_bit(true); // purchased = 1
            w.write_bit(false); // partiallyRanked = 0, a choice entry is all-or-nothing
            w.write_bit(true); // isChoice = 1
            w.write_bits(entry_index, 2);
        }
    }
}

/// Decodes a hash against `nodes`. Returns `None` on a malformed string or
/// an unrecognized version — the decoder never panics, only refuses.
pub fn decode_talent_hash(s: &str, nodes: &[TalentNode]) -> Option<TalentSelection> {
    let groups = decode_groups(s)?;
    let mut r = BitReader::new(&groups);

    let version = r.read_bits(8) as u8;
    if !ACCEPTED_VERSIONS.contains(&version) {
        return None;
    }
    let spec_id = r.read_bits(16) as u16;
    let mut tree_hash = [0u8; 16];
    for byte in &mut tree_hash {
        *byte = r.read_bits(8) as u8;
    }

    let mut selections = HashMap::new();
    for node in nodes {
        if !r.read_bit() {
            continue; // selected = 0
        }
        if !r.read_bit() {
            selections.insert(node.id, NodeSelection::Granted);
            continue;
        }
        let partially_ranked = r.read_bit();
        let rank = if partially_ranked { r.read_bits(6) } else { node.max_ranks };
        let is_choice = r.read_bit();
        if is_choice {
            let entry_index = r.read_bits(2);
            selections.insert(node.id, NodeSelection::Entry(entry_index));
        } else {
            selections.insert(node.id, NodeSelection::Rank(rank));
        }
    }

    Some(TalentSelection { version, spec_id, tree_hash, nodes: selections })
}

pub(crate) const DEFAULT_WRITE_VERSION: u8 = CURRENT_VERSION;
