//! JSON shapes this CLI reads for convenience (§6: "a serde-derived
//! `LoadoutFile` type exists only so the CLI front-end can read one"). None
//! of this is interpreted by the core itself — by the time a tree sees a
//! constraint it's already a plain [`ConstraintSet`].

use std::collections::HashMap;

use serde::Deserialize;
use talent_engine::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadoutFile {
    pub version: u32,
    pub class_name: String,
    pub spec_name: String,
    #[serde(default)]
    pub hero_tree_name: Option<String>,
    #[serde(default)]
    pub constraints: Vec<RawConstraint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConstraint {
    pub node_id: NodeId,
    pub kind: RawConstraintKind,
    #[serde(default)]
    pub entry_index: Option<u32>,
    #[serde(default)]
    pub exact_rank: Option<u32>,
    #[serde(default)]
    pub condition: Option<RawExpr>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawConstraintKind {
    Always,
    Never,
    Conditional,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum RawExpr {
    Selected {
        node_id: NodeId,
        #[serde(default)]
        min_rank: Option<u32>,
    },
    And {
        children: Vec<RawExpr>,
    },
    Or {
        children: Vec<RawExpr>,
    },
}

impl RawExpr {
    fn into_boolean_expr(self) -> Option<BooleanExpr> {
        match self {
            RawExpr::Selected { node_id, min_rank } => Some(match min_rank {
                Some(r) => BooleanExpr::selected_at_least(node_id, r),
                None => BooleanExpr::selected(node_id),
            }),
            RawExpr::And { children } => {
                BooleanExpr::and(children.into_iter().filter_map(RawExpr::into_boolean_expr).collect())
            }
            RawExpr::Or { children } => {
                BooleanExpr::or(children.into_iter().filter_map(RawExpr::into_boolean_expr).collect())
            }
        }
    }
}

/// Builds a [`ConstraintSet`] out of the subset of `raw` that actually names
/// a node in `tree` — a loadout file spans a whole specialization's class,
/// spec, and hero trees at once, so most constraints are irrelevant to any
/// one tree and are silently skipped rather than treated as an error.
pub fn build_constraint_set(tree: &TalentTree, raw: Vec<RawConstraint>) -> Result<ConstraintSet> {
    let mut set = ConstraintSet::new();
    for rc in raw {
        let Some(node) = tree.nodes().iter().find(|n| n.id == rc.node_id) else {
            continue;
        };
        let kind = match rc.kind {
            RawConstraintKind::Always => ConstraintKind::Always,
            RawConstraintKind::Never => ConstraintKind::Never,
            RawConstraintKind::Conditional => ConstraintKind::Conditional,
        };
        let condition = rc.condition.and_then(RawExpr::into_boolean_expr);
        let constraint = Constraint::new(node, kind, rc.entry_index, rc.exact_rank, condition)?;
        set.insert(constraint);
    }
    Ok(set)
}

/// The selection side of a wire hash: what `encode` reads from disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionFile {
    pub spec_id: u16,
    #[serde(default)]
    pub tree_hash: Option<String>,
    pub nodes: HashMap<NodeId, RawSelection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawSelection {
    Granted,
    Rank(u32),
    Entry(u32),
}

/// Parses a 32-character hex string into the codec's 16-byte tree hash.
pub fn parse_tree_hash(s: &str) -> Option<[u8; 16]> {
    if s.len() != 32 || !s.is_ascii() {
        return None;
    }
    let mut out = [0u8; 16];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}
