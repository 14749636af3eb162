//! The unranking generator (§4.5): precomputed suffix tables plus a single
//! forward pass per requested build that reconstructs the k-th allocation by
//! digit-by-digit subtraction, without materializing any of the others.

mod build;
pub(crate) mod suffix;

pub use build::Build;

use std::collections::HashMap;

use crate::catalog::{EntryId, Node, TalentTree};
use crate::constraints::ConstraintSet;
use crate::counter::layout::{compute_layout, BitLayout};
use crate::counter::transition::{self, Selection};
use crate::counter::is_accessible;
use crate::validator::{self, Warning};

use suffix::{build_suffix_tables, violates_enforcement, SuffixTables};

/// Runs the validator, then counts and generates builds from the exact same
/// layout the counter would use. Returns an empty vec if the validator
/// reports any error-severity finding or if the tree admits no build at all.
///
/// `limit` samples `generateTreeBuilds(limit)`'s evenly-spaced indices
/// (`floor(i * N / limit)` for `i` in `[0, limit)`) rather than returning the
/// first `limit` builds, per §4.5. `None` returns every build in canonical
/// order.
pub fn generate_tree_builds(tree: &TalentTree, constraints: &ConstraintSet, limit: Option<usize>) -> Vec<Build> {
    let warnings = validator::validate(tree, constraints);
    if warnings.iter().any(Warning::is_error) {
        return Vec::new();
    }

    let layout = compute_layout(tree, constraints);
    let tables = build_suffix_tables(tree, constraints, &layout);
    let total = tables.total();
    if total == 0 {
        return Vec::new();
    }

    let indices: Vec<u64> = match limit {
        Some(limit) if (limit as u64) < total => {
            (0..limit as u64).map(|i| i * total / limit as u64).collect()
        }
        _ => (0..total).collect(),
    };

    indices.into_iter().map(|k| unrank(tree, constraints, &layout, &tables, k)).collect()
}

fn unrank(
    tree: &TalentTree,
    constraints: &ConstraintSet,
    layout: &BitLayout,
    tables: &SuffixTables,
    mut k: u64,
) -> Build {
    let order = tree.processing_order();
    let always = constraints.always_nodes(tree);
    let never = constraints.never_nodes();

    let mut bitmap: u32 = 0;
    let mut remaining = tree.point_budget;
    let mut entries: HashMap<EntryId, u32> = HashMap::new();

    for (pos, idx) in order.iter().enumerate() {
        let node = tree.node(*idx);
        let bit = layout.bit_of(node.id);
        let constraint = constraints.get(node.id);
        let is_always = always.contains(&node.id);
        let is_never = never.contains(&node.id);
        let accessible = is_accessible(node, bitmap, layout);
        let branches = transition::branches(node, constraint, is_always, is_never, accessible);

        let mut committed = false;
        for branch in &branches {
            if branch.cost > remaining {
                continue;
            }
            let mut after = match bit {
                Some(b) if !branch.is_skip() => bitmap | (1 << b),
                _ => bitmap,
            };
            if violates_enforcement(layout, pos, after) {
                continue;
            }
            for &rid in layout.retires_at(pos) {
                if let Some(b) = layout.bit_of(rid) {
                    after &= !(1u32 << b);
                }
            }
            let remaining_after = remaining - branch.cost;
            let count = tables.tables[pos + 1].get(&after).map(|p| p.coeff(remaining_after)).unwrap_or(0);
            if count == 0 {
                continue;
            }
            if k < count {
                if let Some(selection) = branch.selection {
                    record_selection(node, selection, &mut entries);
                }
                bitmap = after;
                remaining = remaining_after;
                committed = true;
                break;
            }
            k -= count;
        }
        debug_assert!(committed, "unrank index exceeded the suffix table total at node {}", node.id);
    }

    Build { entries }
}

fn record_selection(node: &Node, selection: Selection, entries: &mut HashMap<EntryId, u32>) {
    match selection {
        Selection::Rank(rank) => {
            if rank > 0 {
                entries.insert(node.entries[0].id, rank);
            }
        }
        Selection::Entry(index) => {
            if let Some(entry) = node.entries.iter().find(|e| e.index == index) {
                entries.insert(entry.id, entry.max_ranks);
            }
        }
    }
}
