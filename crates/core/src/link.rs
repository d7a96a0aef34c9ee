//! Relationships (edges) and their validation rules.
//!
//! A relationship is a directed, typed connection between two graph nodes
//! (entities or concepts). The allowed endpoint kinds per relationship type
//! are a static data table so new types stay additive.

use serde::{Deserialize, Serialize};

use crate::entity::NodeKind;
use crate::error::CoreError;
use crate::types::{NodeId, Timestamp};

// ---------------------------------------------------------------------------
// Relationship model
// ---------------------------------------------------------------------------

/// Supported relationship types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelType {
    JustifiedBy,
    LocatedIn,
    Depicts,
}

impl RelType {
    /// Return the relationship type as its wire-format string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JustifiedBy => "JUSTIFIED_BY",
            Self::LocatedIn => "LOCATED_IN",
            Self::Depicts => "DEPICTS",
        }
    }
}

impl std::fmt::Display for RelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship (edge) in the annotation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: NodeId,
    pub rel_type: RelType,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub created_at: Timestamp,
}

/// Creation payload for a relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationship {
    pub rel_type: RelType,
    pub source_id: NodeId,
    pub target_id: NodeId,
}

// ---------------------------------------------------------------------------
// Allowed-relationship table
// ---------------------------------------------------------------------------

/// Allowed (source kinds, target kinds) per relationship type.
///
/// Published so clients can pre-validate forms; kept as data so adding a
/// relationship type is an additive table change.
pub const ALLOWED_RELATIONSHIPS: &[(RelType, &[NodeKind], &[NodeKind])] = &[
    (
        RelType::JustifiedBy,
        &[NodeKind::Scope],
        &[NodeKind::Note, NodeKind::SymbolInstance, NodeKind::ComponentInstance],
    ),
    (
        RelType::LocatedIn,
        &[NodeKind::SymbolInstance, NodeKind::ComponentInstance],
        &[NodeKind::Space],
    ),
    (RelType::Depicts, &[NodeKind::Drawing], &[NodeKind::Space]),
];

/// Look up the allowed endpoint kinds for a relationship type.
pub fn allowed_endpoints(rel_type: RelType) -> (&'static [NodeKind], &'static [NodeKind]) {
    ALLOWED_RELATIONSHIPS
        .iter()
        .find(|(rt, _, _)| *rt == rel_type)
        .map(|(_, sources, targets)| (*sources, *targets))
        .unwrap_or((&[], &[]))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a relationship of `rel_type` may connect the given kinds.
///
/// Direction matters: a kind allowed as target is still rejected in source
/// position, and vice versa.
pub fn validate_relationship(
    rel_type: RelType,
    source_kind: NodeKind,
    target_kind: NodeKind,
) -> Result<(), CoreError> {
    let (sources, targets) = allowed_endpoints(rel_type);
    if !sources.contains(&source_kind) {
        return Err(CoreError::Validation(format!(
            "Invalid source kind '{source_kind}' for {rel_type}. Allowed: {}",
            kind_list(sources)
        )));
    }
    if !targets.contains(&target_kind) {
        return Err(CoreError::Validation(format!(
            "Invalid target kind '{target_kind}' for {rel_type}. Allowed: {}",
            kind_list(targets)
        )));
    }
    Ok(())
}

/// Reject an exact duplicate of an existing (type, source, target) triple.
///
/// The same endpoint pair under a different relationship type is not a
/// duplicate.
pub fn check_duplicate(
    rel_type: RelType,
    source_id: &str,
    target_id: &str,
    existing: &[Relationship],
) -> Result<(), CoreError> {
    let duplicate = existing.iter().any(|link| {
        link.rel_type == rel_type && link.source_id == source_id && link.target_id == target_id
    });
    if duplicate {
        return Err(CoreError::Conflict(format!(
            "Duplicate link: {rel_type} from '{source_id}' to '{target_id}' already exists"
        )));
    }
    Ok(())
}

fn kind_list(kinds: &[NodeKind]) -> String {
    kinds.iter().map(NodeKind::as_str).collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
