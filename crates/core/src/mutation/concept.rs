//! Concept create / update / delete workflows.
//!
//! Concepts have no spatial or container semantics, so deletion carries the
//! relationship cascade of entity deletion but none of its guards.

use crate::concept::{Concept, ConceptPatch, CreateConcept, Space};
use crate::error::CoreError;
use crate::repository::{ConceptRepository, LinkRepository};
use crate::types::new_node_id;

/// Create a new concept.
pub async fn create_concept(
    repo: &dyn ConceptRepository,
    project_id: &str,
    payload: CreateConcept,
) -> Result<Concept, CoreError> {
    let concept = match payload {
        CreateConcept::Space { name } => Concept::Space(Space {
            id: new_node_id(),
            name,
            created_at: chrono::Utc::now(),
        }),
    };
    concept.validate()?;

    let mut concepts = repo.load_concepts(project_id).await?;
    concepts.push(concept.clone());
    repo.save_concepts(project_id, &concepts).await?;
    Ok(concept)
}

/// Apply a partial update to a concept.
pub async fn update_concept(
    repo: &dyn ConceptRepository,
    project_id: &str,
    concept_id: &str,
    patch: ConceptPatch,
) -> Result<Concept, CoreError> {
    let mut concepts = repo.load_concepts(project_id).await?;
    let index = concepts
        .iter()
        .position(|c| c.id() == concept_id)
        .ok_or_else(|| CoreError::NotFound {
            node: "concept",
            id: concept_id.to_string(),
        })?;

    let mut merged = concepts[index].clone();
    match &mut merged {
        Concept::Space(space) => {
            if let Some(name) = patch.name.clone().resolve(Some(space.name.clone())) {
                space.name = name;
            } else {
                return Err(CoreError::Validation(
                    "space: name is required and cannot be cleared".to_string(),
                ));
            }
        }
    }
    merged.validate()?;

    concepts[index] = merged.clone();
    repo.save_concepts(project_id, &concepts).await?;
    Ok(merged)
}

/// Delete a concept, cascading every relationship that touches it.
pub async fn delete_concept(
    concept_repo: &dyn ConceptRepository,
    link_repo: &dyn LinkRepository,
    project_id: &str,
    concept_id: &str,
) -> Result<bool, CoreError> {
    let mut concepts = concept_repo.load_concepts(project_id).await?;
    let Some(index) = concepts.iter().position(|c| c.id() == concept_id) else {
        return Ok(false);
    };

    let mut links = link_repo.load_links(project_id).await?;
    let link_count = links.len();
    links.retain(|link| link.source_id != concept_id && link.target_id != concept_id);

    concepts.remove(index);

    if links.len() != link_count {
        link_repo.save_links(project_id, &links).await?;
    }
    concept_repo.save_concepts(project_id, &concepts).await?;
    Ok(true)
}
