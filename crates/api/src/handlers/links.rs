//! Handlers for relationship (link) CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use planograph_core::error::CoreError;
use planograph_core::link::CreateRelationship;
use planograph_core::mutation;
use planograph_core::repository::LinkRepository;

use crate::error::AppResult;
use crate::handlers::projects::ensure_project;
use crate::response::DataResponse;
use crate::state::AppState;

/// Optional query filters for listing links.
#[derive(Debug, Deserialize)]
pub struct LinkListFilters {
    pub source_id: Option<String>,
    pub target_id: Option<String>,
    pub rel_type: Option<String>,
}

/// GET /projects/{project_id}/links
pub async fn list_links(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(filters): Query<LinkListFilters>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let mut links = state.store.load_links(&project_id).await?;
    if let Some(source_id) = &filters.source_id {
        links.retain(|l| &l.source_id == source_id);
    }
    if let Some(target_id) = &filters.target_id {
        links.retain(|l| &l.target_id == target_id);
    }
    if let Some(rel_type) = &filters.rel_type {
        links.retain(|l| l.rel_type.as_str() == rel_type);
    }
    Ok(Json(DataResponse { data: links }))
}

/// POST /projects/{project_id}/links
///
/// Both endpoints must exist, the relationship type must allow their kinds
/// in the given direction, and the exact triple must not already exist.
pub async fn create_link(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateRelationship>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let link = mutation::create_link(
        state.store.as_ref(),
        state.store.as_ref(),
        state.store.as_ref(),
        &project_id,
        payload,
    )
    .await?;

    tracing::info!(
        project_id = %project_id,
        link_id = %link.id,
        rel_type = %link.rel_type,
        "Link created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /projects/{project_id}/links/{link_id}
pub async fn delete_link(
    State(state): State<AppState>,
    Path((project_id, link_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;

    let _guard = state.locks.acquire(&project_id).await;
    let deleted = mutation::delete_link(state.store.as_ref(), &project_id, &link_id).await?;

    if !deleted {
        return Err(CoreError::NotFound {
            node: "link",
            id: link_id,
        }
        .into());
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({"deleted": true}),
    }))
}
