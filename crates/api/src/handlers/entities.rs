//! Handlers for entity CRUD.
//!
//! The unified mutation path for both UI and AI-driven editing; validation,
//! referential checks, and spatial auto-linking all happen in
//! `planograph_core::mutation`. Each mutation holds the project lock for its
//! whole load→mutate→save cycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use planograph_core::error::CoreError;
use planograph_core::mutation::{self, CreateEntity, EntityPatch};
use planograph_core::repository::EntityRepository;

use crate::error::AppResult;
use crate::handlers::projects::ensure_project;
use crate::response::DataResponse;
use crate::state::AppState;

/// Optional query filters for listing entities.
#[derive(Debug, Deserialize)]
pub struct EntityListFilters {
    pub sheet_number: Option<u32>,
    pub entity_type: Option<String>,
    pub parent_id: Option<String>,
}

/// GET /projects/{project_id}/entities
///
/// List entities with optional sheet / type / parent filters.
pub async fn list_entities(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(filters): Query<EntityListFilters>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let mut entities = state.store.load_entities(&project_id).await?;
    if let Some(sheet) = filters.sheet_number {
        entities.retain(|e| e.source_sheet_number() == Some(sheet));
    }
    if let Some(entity_type) = &filters.entity_type {
        entities.retain(|e| e.kind().as_str() == entity_type);
    }
    if let Some(parent_id) = &filters.parent_id {
        entities.retain(|e| e.parent_container_id() == Some(parent_id.as_str()));
    }
    Ok(Json(DataResponse { data: entities }))
}

/// POST /projects/{project_id}/entities
pub async fn create_entity(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateEntity>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let entity = mutation::create_entity(state.store.as_ref(), &project_id, payload).await?;

    tracing::info!(
        project_id = %project_id,
        entity_id = %entity.id(),
        entity_type = %entity.kind(),
        "Entity created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: entity })))
}

/// PATCH /projects/{project_id}/entities/{entity_id}
///
/// Partial update: only keys present in the body are applied; a present
/// `null` clears the field.
pub async fn update_entity(
    State(state): State<AppState>,
    Path((project_id, entity_id)): Path<(String, String)>,
    Json(patch): Json<EntityPatch>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let entity =
        mutation::update_entity(state.store.as_ref(), &project_id, &entity_id, patch).await?;

    tracing::info!(project_id = %project_id, entity_id = %entity_id, "Entity updated");
    Ok(Json(DataResponse { data: entity }))
}

/// DELETE /projects/{project_id}/entities/{entity_id}
///
/// Cascades the entity's relationships; refuses while the entity is still
/// referenced (definition with instances, container with items, bound item).
pub async fn delete_entity(
    State(state): State<AppState>,
    Path((project_id, entity_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let deleted = mutation::delete_entity(
        state.store.as_ref(),
        state.store.as_ref(),
        &project_id,
        &entity_id,
    )
    .await?;

    if !deleted {
        return Err(CoreError::NotFound {
            node: "entity",
            id: entity_id,
        }
        .into());
    }
    tracing::info!(project_id = %project_id, entity_id = %entity_id, "Entity deleted");
    Ok(Json(DataResponse {
        data: serde_json::json!({"deleted": true}),
    }))
}
