//! Route definitions for coordinate conversion, merged into `/projects`.

use axum::routing::post;
use axum::Router;

use crate::handlers::coords;
use crate::state::AppState;

/// Coordinate conversion routes, nested under `/projects`.
///
/// ```text
/// POST /{project_id}/sheets/{sheet}/coords/to-document   canvas -> document pts
/// POST /{project_id}/sheets/{sheet}/coords/to-canvas     document pts -> canvas
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{project_id}/sheets/{sheet}/coords/to-document",
            post(coords::to_document),
        )
        .route(
            "/{project_id}/sheets/{sheet}/coords/to-canvas",
            post(coords::to_canvas),
        )
}
