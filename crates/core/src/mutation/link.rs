//! Relationship create / delete workflows.

use crate::concept::Concept;
use crate::entity::NodeKind;
use crate::error::CoreError;
use crate::link::{check_duplicate, validate_relationship, CreateRelationship, Relationship};
use crate::mutation::find_entity;
use crate::repository::{ConceptRepository, EntityRepository, LinkRepository};
use crate::types::new_node_id;

/// Create a relationship between two graph nodes.
///
/// Both endpoints must exist (in either node family), the relationship type
/// must allow their kinds in the given direction, and the exact
/// (type, source, target) triple must not already exist.
pub async fn create_link(
    link_repo: &dyn LinkRepository,
    entity_repo: &dyn EntityRepository,
    concept_repo: &dyn ConceptRepository,
    project_id: &str,
    payload: CreateRelationship,
) -> Result<Relationship, CoreError> {
    let entities = entity_repo.load_entities(project_id).await?;
    let concepts = concept_repo.load_concepts(project_id).await?;

    let source_kind = node_kind(&entities, &concepts, &payload.source_id)
        .ok_or_else(|| CoreError::NotFound {
            node: "source node",
            id: payload.source_id.clone(),
        })?;
    let target_kind = node_kind(&entities, &concepts, &payload.target_id)
        .ok_or_else(|| CoreError::NotFound {
            node: "target node",
            id: payload.target_id.clone(),
        })?;

    validate_relationship(payload.rel_type, source_kind, target_kind)?;

    let mut links = link_repo.load_links(project_id).await?;
    check_duplicate(payload.rel_type, &payload.source_id, &payload.target_id, &links)?;

    let link = Relationship {
        id: new_node_id(),
        rel_type: payload.rel_type,
        source_id: payload.source_id,
        target_id: payload.target_id,
        created_at: chrono::Utc::now(),
    };
    links.push(link.clone());
    link_repo.save_links(project_id, &links).await?;
    Ok(link)
}

/// Delete a relationship by id. Removes only the single edge; relationships
/// have no cascade of their own.
pub async fn delete_link(
    link_repo: &dyn LinkRepository,
    project_id: &str,
    link_id: &str,
) -> Result<bool, CoreError> {
    let mut links = link_repo.load_links(project_id).await?;
    let before = links.len();
    links.retain(|link| link.id != link_id);
    if links.len() == before {
        return Ok(false);
    }
    link_repo.save_links(project_id, &links).await?;
    Ok(true)
}

/// Resolve a node id to its kind across both node families.
fn node_kind(
    entities: &[crate::entity::Entity],
    concepts: &[Concept],
    id: &str,
) -> Option<NodeKind> {
    if let Some(entity) = find_entity(entities, id) {
        return Some(entity.kind());
    }
    concepts.iter().find(|c| c.id() == id).map(Concept::kind)
}
