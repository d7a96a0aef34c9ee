//! Workflow tests for relationship and concept mutations.

mod common;

use assert_matches::assert_matches;
use serde_json::json;

use common::{create_payload, MemoryStore};
use planograph_core::concept::{Concept, ConceptPatch, CreateConcept};
use planograph_core::entity::Entity;
use planograph_core::error::CoreError;
use planograph_core::link::{CreateRelationship, RelType};
use planograph_core::mutation::{
    create_concept, create_entity, create_link, delete_concept, delete_link, update_concept,
};
use planograph_core::repository::LinkRepository;

const PROJECT: &str = "proj";

async fn drawing(store: &MemoryStore) -> Entity {
    create_entity(
        store,
        PROJECT,
        create_payload(json!({
            "entity_type": "drawing",
            "source_sheet_number": 1,
            "bounding_box": [0.0, 0.0, 100.0, 100.0],
        })),
    )
    .await
    .unwrap()
}

async fn space(store: &MemoryStore, name: &str) -> Concept {
    create_concept(store, PROJECT, CreateConcept::Space { name: name.to_string() })
        .await
        .unwrap()
}

fn payload(rel_type: RelType, source: &str, target: &str) -> CreateRelationship {
    CreateRelationship {
        rel_type,
        source_id: source.to_string(),
        target_id: target.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

#[tokio::test]
async fn depicts_drawing_to_space_succeeds() {
    let store = MemoryStore::new();
    let drawing = drawing(&store).await;
    let space = space(&store, "Room 101").await;

    let link = create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), space.id()),
    )
    .await
    .unwrap();

    assert_eq!(link.rel_type, RelType::Depicts);
    assert_eq!(link.source_id, drawing.id());
    assert_eq!(link.target_id, space.id());
}

#[tokio::test]
async fn depicts_reversed_direction_is_rejected() {
    let store = MemoryStore::new();
    let drawing = drawing(&store).await;
    let space = space(&store, "Room 101").await;

    let err = create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, space.id(), drawing.id()),
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    assert!(store.load_links(PROJECT).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_triple_is_a_conflict_and_changes_nothing() {
    let store = MemoryStore::new();
    let drawing = drawing(&store).await;
    let space = space(&store, "Room 101").await;

    create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), space.id()),
    )
    .await
    .unwrap();

    let err = create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), space.id()),
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    assert_eq!(store.load_links(PROJECT).await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_endpoint_is_not_found() {
    let store = MemoryStore::new();
    let drawing = drawing(&store).await;

    let err = create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), "ghost"),
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

#[tokio::test]
async fn delete_link_removes_only_that_edge() {
    let store = MemoryStore::new();
    let drawing = drawing(&store).await;
    let kitchen = space(&store, "Kitchen").await;
    let lobby = space(&store, "Lobby").await;

    let first = create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), kitchen.id()),
    )
    .await
    .unwrap();
    create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), lobby.id()),
    )
    .await
    .unwrap();

    assert!(delete_link(&store, PROJECT, &first.id).await.unwrap());
    let remaining = store.load_links(PROJECT).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].target_id, lobby.id());

    assert!(!delete_link(&store, PROJECT, &first.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Concepts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concept_name_can_be_updated_but_not_cleared() {
    let store = MemoryStore::new();
    let space = space(&store, "Room 101").await;

    let renamed = update_concept(
        &store,
        PROJECT,
        space.id(),
        serde_json::from_value::<ConceptPatch>(json!({"name": "Room 102"})).unwrap(),
    )
    .await
    .unwrap();
    let Concept::Space(renamed) = renamed;
    assert_eq!(renamed.name, "Room 102");

    let err = update_concept(
        &store,
        PROJECT,
        space.id(),
        serde_json::from_value::<ConceptPatch>(json!({"name": null})).unwrap(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[tokio::test]
async fn deleting_a_concept_cascades_its_relationships() {
    let store = MemoryStore::new();
    let drawing = drawing(&store).await;
    let space = space(&store, "Room 101").await;

    create_link(
        &store,
        &store,
        &store,
        PROJECT,
        payload(RelType::Depicts, drawing.id(), space.id()),
    )
    .await
    .unwrap();

    assert!(delete_concept(&store, &store, PROJECT, space.id()).await.unwrap());
    assert!(store.load_links(PROJECT).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_concept_returns_false() {
    let store = MemoryStore::new();
    assert!(!delete_concept(&store, &store, PROJECT, "ghost").await.unwrap());
}
