//! Route definitions for entity CRUD, merged into the `/projects` group.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::entities;
use crate::state::AppState;

/// Entity routes, nested under `/projects`.
///
/// ```text
/// GET    /{project_id}/entities               list_entities
/// POST   /{project_id}/entities               create_entity
/// PATCH  /{project_id}/entities/{entity_id}   update_entity
/// DELETE /{project_id}/entities/{entity_id}   delete_entity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{project_id}/entities",
            get(entities::list_entities).post(entities::create_entity),
        )
        .route(
            "/{project_id}/entities/{entity_id}",
            patch(entities::update_entity).delete(entities::delete_entity),
        )
}
