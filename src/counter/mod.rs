//! The DP build counter (§4.4): an ordered sweep over a tree's nodes
//! producing a compressed `bitmap → points-spent polynomial` state, summed
//! at the budget index for the exact count.

pub mod layout;
pub mod polynomial;
pub mod transition;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use num_bigint::BigUint;

use crate::catalog::{NodeId, TalentTree};
use crate::constraints::ConstraintSet;
use crate::validator::{self, Warning};

use layout::compute_layout;
use polynomial::Polynomial;

#[derive(Debug, Clone)]
pub struct CountReport {
    pub count: BigUint,
    pub duration: Duration,
    pub warnings: Vec<Warning>,
}

pub fn count_tree_builds(tree: &TalentTree, constraints: &ConstraintSet) -> CountReport {
    let start = Instant::now();
    let mut warnings = validator::validate(tree, constraints);

    if warnings.iter().any(Warning::is_error) {
        tracing::debug!("count short-circuited to 0 by validator errors");
        return CountReport { count: BigUint::from(0u32), duration: start.elapsed(), warnings };
    }

    let layout = compute_layout(tree, constraints);
    for &id in &layout.unresolvable {
        warnings.push(Warning::warning(
            "a conditional references a node outside this tree and cannot be evaluated",
            vec![id],
        ));
    }

    let states = run_sweep(tree, constraints, &layout);

    let budget = tree.point_budget;
    let total: u64 = states.values().map(|p| p.coeff(budget)).sum();

    tracing::debug!(count = total, "dp counter finished");
    CountReport { count: BigUint::from(total), duration: start.elapsed(), warnings }
}

/// Runs the forward DP sweep and returns the final `bitmap → polynomial`
/// state map (surviving, non-zero entries only). Shared shape with the
/// generator's suffix-table construction, which walks the same layout and
/// branch enumeration in reverse.
pub(crate) fn run_sweep(
    tree: &TalentTree,
    constraints: &ConstraintSet,
    layout: &layout::BitLayout,
) -> HashMap<u32, Polynomial> {
    let always = constraints.always_nodes(tree);
    let never = constraints.never_nodes();
    let budget = tree.point_budget;

    let mut states: HashMap<u32, Polynomial> = HashMap::new();
    states.insert(0, Polynomial::one(budget));

    let mut gate_ptr = 0usize;

    for (pos, idx) in tree.processing_order().iter().enumerate() {
        let node = tree.node(*idx);

        while gate_ptr < tree.gates.len() && tree.gates[gate_ptr].required_points <= node.req_points {
            let floor = tree.gates[gate_ptr].required_points;
            for poly in states.values_mut() {
                *poly = poly.trimmed_below(floor);
            }
            states.retain(|_, p| !p.is_zero());
            gate_ptr += 1;
        }

        let bit = layout.bit_of(node.id);
        let constraint = constraints.get(node.id);
        let is_always = always.contains(&node.id);
        let is_never = never.contains(&node.id);

        let mut next_states: HashMap<u32, Polynomial> = HashMap::new();
        for (&bitmap, poly) in &states {
            let accessible = is_accessible(node, bitmap, layout);
            let branches = transition::branches(node, constraint, is_always, is_never, accessible);
            for branch in &branches {
                let shifted = poly.shifted(branch.cost);
                if shifted.is_zero() {
                    continue;
                }
                let target_bitmap = match bit {
                    Some(b) if !branch.is_skip() => bitmap | (1 << b),
                    _ => bitmap,
                };
                next_states
                    .entry(target_bitmap)
                    .or_insert_with(|| Polynomial::zero(budget))
                    .add_assign(&shifted);
            }
        }
        states = next_states;
        states.retain(|_, p| !p.is_zero());

        for plan in layout.enforcements.iter().filter(|p| p.enforce_at == pos) {
            let target_bit = layout.bit_of(plan.target);
            states.retain(|&bitmap, _| {
                let rank_of = |id: NodeId| {
                    layout.bit_of(id).map_or(0, |b| if bitmap & (1 << b) != 0 { 1 } else { 0 })
                };
                let satisfied = plan.expr.evaluate(&rank_of);
                let target_set = target_bit.map_or(false, |b| bitmap & (1 << b) != 0);
                !(satisfied && !target_set)
            });
        }

        for &id in layout.retires_at(pos) {
            if let Some(b) = layout.bit_of(id) {
                let mask = !(1u32 << b);
                let mut merged: HashMap<u32, Polynomial> = HashMap::new();
                for (bitmap, poly) in states.drain() {
                    merged
                        .entry(bitmap & mask)
                        .or_insert_with(|| Polynomial::zero(budget))
                        .add_assign(&poly);
                }
                states = merged;
            }
        }
    }

    states
}

pub(crate) fn is_accessible(
    node: &crate::catalog::Node,
    bitmap: u32,
    layout: &layout::BitLayout,
) -> bool {
    if node.entry_node || node.free_node || node.prev.is_empty() {
        return true;
    }
    node.prev
        .iter()
        .any(|pid| layout.bit_of(*pid).map_or(false, |b| bitmap & (1 << b) != 0))
}
