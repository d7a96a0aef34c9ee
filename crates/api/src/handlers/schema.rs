//! Handlers exposing the published relationship schema.

use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use planograph_core::entity::NodeKind;
use planograph_core::link::ALLOWED_RELATIONSHIPS;

use crate::response::DataResponse;

/// One row of the allowed-relationship table.
#[derive(Debug, Serialize)]
pub struct RelationshipRule {
    pub rel_type: &'static str,
    pub source_kinds: Vec<&'static str>,
    pub target_kinds: Vec<&'static str>,
}

/// GET /schema/relationships
///
/// The allowed-relationship table, published so clients can pre-validate
/// link forms without a round trip.
pub async fn relationship_schema() -> impl IntoResponse {
    let rules: Vec<RelationshipRule> = ALLOWED_RELATIONSHIPS
        .iter()
        .map(|(rel_type, sources, targets)| RelationshipRule {
            rel_type: rel_type.as_str(),
            source_kinds: sources.iter().map(NodeKind::as_str).collect(),
            target_kinds: targets.iter().map(NodeKind::as_str).collect(),
        })
        .collect();
    Json(DataResponse { data: rules })
}
