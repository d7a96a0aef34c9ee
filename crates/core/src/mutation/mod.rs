//! Mutation orchestration for entities, links, and concepts.
//!
//! Each operation is one synchronous unit of work over a project snapshot:
//! load the whole set, validate against it, mutate in memory, save the whole
//! set. Validation always completes before the first save, so a failed
//! operation persists nothing. Callers are responsible for serializing
//! concurrent mutations per project (see `repository` module docs).

mod concept;
mod entity;
mod link;

pub use concept::{create_concept, delete_concept, update_concept};
pub use entity::{create_entity, delete_entity, update_entity, CreateEntity, EntityPatch};
pub use link::{create_link, delete_link};

use crate::entity::{Entity, NodeKind};
use crate::error::CoreError;

/// Find an entity by id.
pub(crate) fn find_entity<'a>(entities: &'a [Entity], id: &str) -> Option<&'a Entity> {
    entities.iter().find(|e| e.id() == id)
}

/// Resolve a required reference, checking both existence and kind.
pub(crate) fn ensure_kind<'a>(
    entities: &'a [Entity],
    id: &str,
    expected: NodeKind,
) -> Result<&'a Entity, CoreError> {
    let found = find_entity(entities, id).ok_or_else(|| CoreError::NotFound {
        node: expected.as_str(),
        id: id.to_string(),
    })?;
    if found.kind() != expected {
        return Err(CoreError::Reference(format!(
            "Expected {expected}, got {} for id '{id}'",
            found.kind()
        )));
    }
    Ok(found)
}

/// Candidates for spatial auto-linking: the project's entities on one sheet,
/// ordered by creation time then id.
///
/// The auto-linker returns the first match, so this ordering is the
/// tie-break contract: the oldest matching container or drawing wins,
/// independent of repository iteration order.
pub(crate) fn linking_candidates(entities: &[Entity], sheet: u32) -> Vec<Entity> {
    let mut candidates: Vec<Entity> = entities
        .iter()
        .filter(|e| e.source_sheet_number() == Some(sheet))
        .cloned()
        .collect();
    candidates.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    candidates
}
