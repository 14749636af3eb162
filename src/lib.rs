pub mod catalog;
pub mod codec;
pub mod config;
pub mod constraints;
pub mod counter;
pub mod error;
pub mod generator;
pub mod validator;

/// Re-exports of the surface a host application actually needs: parse a
/// catalog, build a constraint set, run the validator/counter/generator, and
/// round-trip a wire hash.
pub mod prelude {
    // Useful structs
    pub use crate::catalog::{
        Entry, EntryId, Gate, Node, NodeId, NodeIndex, NodeKind, Specialization, TalentTree,
        TreeKind,
    };
    pub use crate::codec::{EntryLocation, NodeSelection, TalentNode, TalentSelection};
    pub use crate::config::PointBudgets;
    pub use crate::constraints::{BooleanExpr, Constraint, ConstraintKind, ConstraintSet};
    pub use crate::counter::CountReport;
    pub use crate::error::{CoreError, Result};
    pub use crate::generator::Build;
    pub use crate::validator::{Severity, Warning};

    // Useful functions
    pub use crate::catalog::parse_specializations;
    pub use crate::codec::{build_entry_lookup, decode_talent_hash, encode_talent_hash};
    pub use crate::counter::count_tree_builds;
    pub use crate::generator::generate_tree_builds;
    pub use crate::validator::{compute_reachable, validate};
}
