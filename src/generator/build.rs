use std::collections::HashMap;

use crate::catalog::EntryId;

/// A single valid allocation of ranks to entries, as produced by the
/// unranking generator. Only entries with a positive rank appear — a node
/// skipped in this build has no key (§4.5 "Output").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Build {
    pub entries: HashMap<EntryId, u32>,
}
