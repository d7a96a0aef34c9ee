//! Handlers for concept CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use planograph_core::concept::{ConceptPatch, CreateConcept};
use planograph_core::error::CoreError;
use planograph_core::mutation;
use planograph_core::repository::ConceptRepository;

use crate::error::AppResult;
use crate::handlers::projects::ensure_project;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /projects/{project_id}/concepts
pub async fn list_concepts(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;
    let concepts = state.store.load_concepts(&project_id).await?;
    Ok(Json(DataResponse { data: concepts }))
}

/// POST /projects/{project_id}/concepts
pub async fn create_concept(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateConcept>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let concept = mutation::create_concept(state.store.as_ref(), &project_id, payload).await?;

    tracing::info!(project_id = %project_id, concept_id = %concept.id(), "Concept created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: concept })))
}

/// PATCH /projects/{project_id}/concepts/{concept_id}
pub async fn update_concept(
    State(state): State<AppState>,
    Path((project_id, concept_id)): Path<(String, String)>,
    Json(patch): Json<ConceptPatch>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let concept =
        mutation::update_concept(state.store.as_ref(), &project_id, &concept_id, patch).await?;
    Ok(Json(DataResponse { data: concept }))
}

/// DELETE /projects/{project_id}/concepts/{concept_id}
///
/// Cascades every relationship touching the concept.
pub async fn delete_concept(
    State(state): State<AppState>,
    Path((project_id, concept_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let deleted = mutation::delete_concept(
        state.store.as_ref(),
        state.store.as_ref(),
        &project_id,
        &concept_id,
    )
    .await?;

    if !deleted {
        return Err(CoreError::NotFound {
            node: "concept",
            id: concept_id,
        }
        .into());
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({"deleted": true}),
    }))
}
