//! Route definitions, grouped by resource.

pub mod concepts;
pub mod coords;
pub mod entities;
pub mod health;
pub mod links;
pub mod projects;
pub mod schema;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /projects                                          create
/// /projects/{id}/status                              ingestion status
/// /projects/{id}/page-titles                         patch page title
/// /projects/{id}/entities[...]                       entity CRUD
/// /projects/{id}/links[...]                          link CRUD
/// /projects/{id}/concepts[...]                       concept CRUD
/// /projects/{id}/sheets/{n}/coords/[...]             coordinate conversion
/// /schema/relationships                              allowed-relationship table
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest(
            "/projects",
            projects::router()
                .merge(entities::router())
                .merge(links::router())
                .merge(concepts::router())
                .merge(coords::router()),
        )
        .nest("/schema", schema::router())
}
