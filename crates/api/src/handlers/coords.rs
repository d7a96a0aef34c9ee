//! Handlers for canvas ⇄ document coordinate conversion.
//!
//! Pure transforms over the sheet's render metadata (page size, raster size,
//! rotation) produced by the ingestion pipeline. Out-of-bounds boxes clamp
//! to the page window rather than erroring.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use planograph_core::coords::{canvas_to_document, document_to_canvas};
use planograph_core::repository::RenderMetaProvider;

use crate::error::AppResult;
use crate::handlers::projects::ensure_project;
use crate::response::DataResponse;
use crate::state::AppState;

/// A raw `[x1, y1, x2, y2]` box to convert.
#[derive(Debug, Deserialize)]
pub struct ConvertBoxRequest {
    pub bounding_box: [f64; 4],
}

/// The converted box.
#[derive(Debug, Serialize)]
pub struct ConvertBoxResponse {
    pub bounding_box: [f64; 4],
}

/// POST /projects/{project_id}/sheets/{sheet}/coords/to-document
pub async fn to_document(
    State(state): State<AppState>,
    Path((project_id, sheet)): Path<(String, u32)>,
    Json(body): Json<ConvertBoxRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;
    let meta = state.store.render_meta(&project_id, sheet).await?;
    let bounding_box = canvas_to_document(body.bounding_box, &meta)?;
    Ok(Json(DataResponse {
        data: ConvertBoxResponse { bounding_box },
    }))
}

/// POST /projects/{project_id}/sheets/{sheet}/coords/to-canvas
pub async fn to_canvas(
    State(state): State<AppState>,
    Path((project_id, sheet)): Path<(String, u32)>,
    Json(body): Json<ConvertBoxRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_project(&state, &project_id).await?;
    let meta = state.store.render_meta(&project_id, sheet).await?;
    let bounding_box = document_to_canvas(body.bounding_box, &meta)?;
    Ok(Json(DataResponse {
        data: ConvertBoxResponse { bounding_box },
    }))
}
