//! Route definitions for link CRUD, merged into the `/projects` group.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::links;
use crate::state::AppState;

/// Link routes, nested under `/projects`.
///
/// ```text
/// GET    /{project_id}/links             list_links
/// POST   /{project_id}/links             create_link
/// DELETE /{project_id}/links/{link_id}   delete_link
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{project_id}/links",
            get(links::list_links).post(links::create_link),
        )
        .route("/{project_id}/links/{link_id}", delete(links::delete_link))
}
