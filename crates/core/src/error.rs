//! Domain error taxonomy.
//!
//! One variant per failure class. Mutation operations validate against a
//! loaded snapshot before any save, so an `Err` always means nothing was
//! persisted.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced node (entity, concept, or relationship) does not exist.
    #[error("{node} with id '{id}' not found")]
    NotFound { node: &'static str, id: String },

    /// A payload or merged record violates a structural invariant.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced node exists but has the wrong kind for its role.
    #[error("Invalid reference: {0}")]
    Reference(String),

    /// A sheet-scoped definition was used on a different sheet.
    #[error("Scope violation: {0}")]
    Scope(String),

    /// Duplicate relationship, or a delete blocked by existing references.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Repository I/O failure, passed through uninterpreted.
    #[error("Storage error: {0}")]
    Storage(String),
}
