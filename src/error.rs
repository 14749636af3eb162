use thiserror::Error;

/// Crate-wide error type.
///
/// Content-level infeasibility (an unsatisfiable constraint set, an
/// unreachable always-node, ...) is never represented here: that is carried
/// as a [`crate::validator::Warning`] alongside a valid count. This type is
/// reserved for catalog input that cannot be interpreted at all, and for the
/// small set of caller-facing usage errors the CLI front-end surfaces.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("catalog is not structurally valid: {0}")]
    CatalogFormat(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown node id {0} referenced by constraint")]
    UnknownNode(u32),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
