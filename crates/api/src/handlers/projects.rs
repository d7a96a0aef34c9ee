//! Handlers for project creation, status, and page titles.
//!
//! PDF rasterization and OCR happen in an external ingestion pipeline; these
//! handlers only manage the manifest document it reports into.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use planograph_core::error::CoreError;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Creation payload for a project.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Page title update request (0-based page index).
#[derive(Debug, Deserialize)]
pub struct PageTitleUpdate {
    pub page_index: u32,
    pub text: String,
}

/// Guard: 404 unless the project has a manifest on disk.
pub async fn ensure_project(state: &AppState, project_id: &str) -> AppResult<()> {
    if state.projects.exists(project_id).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            node: "project",
            id: project_id.to_string(),
        }
        .into())
    }
}

/// POST /projects
///
/// Create a new project with an empty manifest. The ingestion pipeline
/// fills in page counts and stage progress as it runs.
pub async fn create_project(
    State(state): State<AppState>,
    body: Option<Json<CreateProjectRequest>>,
) -> AppResult<impl IntoResponse> {
    let name = body.and_then(|Json(body)| body.name);
    let manifest = state.projects.create(name).await?;

    tracing::info!(project_id = %manifest.project_id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: manifest })))
}

/// GET /projects/{project_id}/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let manifest = state
        .projects
        .find(&project_id)
        .await?
        .ok_or(CoreError::NotFound {
            node: "project",
            id: project_id,
        })?;
    Ok(Json(DataResponse { data: manifest }))
}

/// PATCH /projects/{project_id}/page-titles
pub async fn update_page_title(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<PageTitleUpdate>,
) -> AppResult<impl IntoResponse> {
    let manifest = state
        .projects
        .set_page_title(&project_id, body.page_index, body.text)
        .await?;
    Ok(Json(DataResponse { data: manifest }))
}
