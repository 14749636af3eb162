//! Tunable constants supplied by external collaborators (the catalog fetcher
//! knows which season/patch is live and what its point budgets are); the core
//! only needs a place to receive them with sane defaults.

use derive_builder::Builder;

/// Per-tree-type point budgets, i.e. the exact number of non-free points a
/// player must spend before a tree is considered "complete".
///
/// Defaults match the constants in effect today (class=34, spec=34, hero=13).
#[derive(Builder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointBudgets {
    #[builder(default = "34")]
    pub class: u32,
    #[builder(default = "34")]
    pub spec: u32,
    #[builder(default = "13")]
    pub hero: u32,
}

impl Default for PointBudgets {
    fn default() -> Self {
        PointBudgetsBuilder::default().build().unwrap()
    }
}
