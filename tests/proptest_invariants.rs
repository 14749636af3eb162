//! Property-based check of the counter/generator pair against a closed-form
//! reference: a tree of `n` independent one-rank entry nodes and no edges is
//! exactly "choose `budget` of `n`", so the engine's count must equal the
//! binomial coefficient and the generator must produce that many distinct
//! builds.

mod common;

use common::root;
use proptest::prelude::*;
use talent_engine::prelude::*;

fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
    }
    result as u64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn independent_nodes_count_matches_binomial_coefficient(n in 0u32..8, budget in 0u32..8) {
        let nodes: Vec<Node> = (1..=n).map(|id| root(id, 1)).collect();
        let tree = TalentTree::new(TreeKind::Class, nodes, budget);

        let report = count_tree_builds(&tree, &ConstraintSet::new());
        let expected = binomial(n as u64, budget as u64);
        prop_assert_eq!(&report.count, &num_bigint::BigUint::from(expected));

        let builds = generate_tree_builds(&tree, &ConstraintSet::new(), None);
        prop_assert_eq!(builds.len() as u64, expected);

        // Canonical order must not repeat a build twice.
        let mut seen = std::collections::HashSet::new();
        for build in &builds {
            let mut key: Vec<_> = build.entries.iter().map(|(&id, &rank)| (id, rank)).collect();
            key.sort_unstable();
            prop_assert!(seen.insert(key), "duplicate build in canonical order");
        }

        // Every build spends exactly `budget` points across `min(n, budget)` nodes.
        for build in &builds {
            let spent: u32 = build.entries.values().sum();
            prop_assert_eq!(spent, budget.min(n));
        }
    }
}
