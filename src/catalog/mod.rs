pub mod entry;
pub mod node;
pub mod raw;
pub mod specialization;
pub mod tree;

pub use entry::{Entry, EntryId};
pub use node::{Node, NodeId, NodeIndex, NodeKind};
pub use raw::parse_specializations;
pub use specialization::Specialization;
pub use tree::{Gate, TalentTree, TreeKind};
