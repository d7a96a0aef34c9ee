//! Route definitions for the published schema endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::schema;
use crate::state::AppState;

/// Schema routes, nested under `/schema`.
///
/// ```text
/// GET /relationships   relationship_schema
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/relationships", get(schema::relationship_schema))
}
