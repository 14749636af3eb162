/// Stable integer identifier for an [`Entry`].
pub type EntryId = u32;

/// One selectable option inside a [`crate::catalog::node::Node`].
///
/// Created during parse and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub max_ranks: u32,
    pub index: u32,
    pub spell_id: Option<u32>,
}

impl Entry {
    pub fn new(id: EntryId, name: impl Into<String>, max_ranks: u32, index: u32) -> Self {
        Entry {
            id,
            name: name.into(),
            max_ranks: max_ranks.max(1),
            index,
            spell_id: None,
        }
    }
}
