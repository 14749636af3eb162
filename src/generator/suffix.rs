//! Suffix completion tables (§4.5): the generator's dual of the counter's
//! forward sweep, built by walking `tree.processing_order()` in reverse and
//! reusing the same `transition::branches` call per node so both walks stay
//! in lock-step.

use std::collections::{HashMap, HashSet};

use crate::catalog::{NodeId, TalentTree};
use crate::constraints::ConstraintSet;
use crate::counter::layout::BitLayout;
use crate::counter::polynomial::Polynomial;
use crate::counter::{is_accessible, transition};

/// `tables[i]` is keyed by the bitmap entering position `i` (post gate trim,
/// pre node transition); its value is a polynomial indexed by points still
/// to spend, counting completions of `processing_order()[i..]`.
/// `tables[order.len()]` is the trivial base case: one way to finish with
/// zero points remaining.
pub(crate) struct SuffixTables {
    pub tables: Vec<HashMap<u32, Polynomial>>,
}

impl SuffixTables {
    pub fn total(&self) -> u64 {
        self.tables[0].get(&0).map(|p| p.coeff(p.budget())).unwrap_or(0)
    }
}

pub(crate) fn build_suffix_tables(
    tree: &TalentTree,
    constraints: &ConstraintSet,
    layout: &BitLayout,
) -> SuffixTables {
    let order = tree.processing_order();
    let budget = tree.point_budget;
    let always = constraints.always_nodes(tree);
    let never = constraints.never_nodes();
    let reachable = reachable_bitmaps(tree, constraints, layout);
    let floor_at = gate_floors(tree);

    let mut tables: Vec<HashMap<u32, Polynomial>> = vec![HashMap::new(); order.len() + 1];
    tables[order.len()].insert(0, Polynomial::one(budget));

    for pos in (0..order.len()).rev() {
        let node = tree.node(order[pos]);
        let bit = layout.bit_of(node.id);
        let constraint = constraints.get(node.id);
        let is_always = always.contains(&node.id);
        let is_never = never.contains(&node.id);

        let mut table: HashMap<u32, Polynomial> = HashMap::new();
        for &bitmap in &reachable[pos] {
            let accessible = is_accessible(node, bitmap, layout);
            let branches = transition::branches(node, constraint, is_always, is_never, accessible);
            let mut acc = Polynomial::zero(budget);
            for branch in &branches {
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
                if let Some(next_poly) = tables[pos + 1].get(&after) {
                    acc.add_assign(&next_poly.shifted(branch.cost));
                }
            }
            if !acc.is_zero() {
                table.insert(bitmap, acc);
            }
        }

        let floor = floor_at[pos];
        if floor > 0 {
            let ceiling = budget.saturating_sub(floor);
            for poly in table.values_mut() {
                *poly = poly.trimmed_above(ceiling);
            }
            table.retain(|_, p| !p.is_zero());
        }
        tables[pos] = table;
    }

    SuffixTables { tables }
}

/// Bitmaps actually reachable as the entering state of each position,
/// ignoring cost entirely. Restricting suffix table construction to these
/// keeps it from ever touching the full `0..2^width` range the bit layout
/// could in principle produce — mirrors `counter::run_sweep`'s own
/// transition logic, minus the polynomial/budget dimension.
fn reachable_bitmaps(tree: &TalentTree, constraints: &ConstraintSet, layout: &BitLayout) -> Vec<HashSet<u32>> {
    let order = tree.processing_order();
    let always = constraints.always_nodes(tree);
    let never = constraints.never_nodes();

    let mut per_position: Vec<HashSet<u32>> = Vec::with_capacity(order.len() + 1);
    let mut current: HashSet<u32> = HashSet::from([0]);

    for (pos, idx) in order.iter().enumerate() {
        per_position.push(current.clone());
        let node = tree.node(*idx);
        let bit = layout.bit_of(node.id);
        let constraint = constraints.get(node.id);
        let is_always = always.contains(&node.id);
        let is_never = never.contains(&node.id);

        let mut next: HashSet<u32> = HashSet::new();
        for &bitmap in &current {
            let accessible = is_accessible(node, bitmap, layout);
            let branches = transition::branches(node, constraint, is_always, is_never, accessible);
            for branch in &branches {
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
                next.insert(after);
            }
        }
        current = next;
    }
    per_position.push(current);
    per_position
}

/// Whether `bitmap` (the post-transition state at `pos`, before retirement)
/// fails a conditional whose enforcement index is `pos` — same predicate
/// `run_sweep` applies, shared here so both walks can't drift apart.
pub(crate) fn violates_enforcement(layout: &BitLayout, pos: usize, bitmap: u32) -> bool {
    layout.enforcements.iter().filter(|p| p.enforce_at == pos).any(|plan| {
        let target_bit = layout.bit_of(plan.target);
        let rank_of =
            |id: NodeId| layout.bit_of(id).map_or(0, |b| if bitmap & (1 << b) != 0 { 1 } else { 0 });
        let satisfied = plan.expr.evaluate(&rank_of);
        let target_set = target_bit.map_or(false, |b| bitmap & (1 << b) != 0);
        satisfied && !target_set
    })
}

fn gate_floors(tree: &TalentTree) -> Vec<u32> {
    let order = tree.processing_order();
    let mut floors = Vec::with_capacity(order.len());
    let mut gate_ptr = 0usize;
    let mut floor = 0u32;
    for idx in order {
        let node = tree.node(*idx);
        while gate_ptr < tree.gates.len() && tree.gates[gate_ptr].required_points <= node.req_points {
            floor = tree.gates[gate_ptr].required_points;
            gate_ptr += 1;
        }
        floors.push(floor);
    }
    floors
}
