use super::tree::TalentTree;

/// A named (class, spec) bundle: one class tree, one spec tree, and zero or
/// more hero trees (one per sub-tree id under `heroNodes`).
#[derive(Debug, Clone)]
pub struct Specialization {
    pub class_name: String,
    pub spec_name: String,
    pub class_tree: TalentTree,
    pub spec_tree: TalentTree,
    pub hero_trees: Vec<TalentTree>,
}

impl Specialization {
    pub fn hero_tree_by_name(&self, name: &str) -> Option<&TalentTree> {
        self.hero_trees
            .iter()
            .find(|t| t.sub_tree_name.as_deref() == Some(name))
    }

    /// Every tree in this specialization, class first, then spec, then hero
    /// trees in catalog order.
    pub fn all_trees(&self) -> Vec<&TalentTree> {
        let mut trees = vec![&self.class_tree, &self.spec_tree];
        trees.extend(self.hero_trees.iter());
        trees
    }
}
