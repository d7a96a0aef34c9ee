//! Route definitions for project lifecycle endpoints.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Project routes, nested under `/projects`.
///
/// ```text
/// POST  /                        create_project
/// GET   /{project_id}/status     get_status
/// PATCH /{project_id}/page-titles update_page_title
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(projects::create_project))
        .route("/{project_id}/status", get(projects::get_status))
        .route("/{project_id}/page-titles", patch(projects::update_page_title))
}
