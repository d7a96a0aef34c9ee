//! Route definitions for concept CRUD, merged into the `/projects` group.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::concepts;
use crate::state::AppState;

/// Concept routes, nested under `/projects`.
///
/// ```text
/// GET    /{project_id}/concepts                 list_concepts
/// POST   /{project_id}/concepts                 create_concept
/// PATCH  /{project_id}/concepts/{concept_id}    update_concept
/// DELETE /{project_id}/concepts/{concept_id}    delete_concept
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{project_id}/concepts",
            get(concepts::list_concepts).post(concepts::create_concept),
        )
        .route(
            "/{project_id}/concepts/{concept_id}",
            patch(concepts::update_concept).delete(concepts::delete_concept),
        )
}
