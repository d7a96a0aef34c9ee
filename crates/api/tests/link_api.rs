//! HTTP-level integration tests for link, concept, and schema endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, create_project, delete, get, patch_json, post_json};

async fn create_drawing(app: &axum::Router, project: &str) -> String {
    let body = body_json(
        post_json(
            app,
            &format!("/api/projects/{project}/entities"),
            json!({
                "entity_type": "drawing",
                "source_sheet_number": 1,
                "bounding_box": [0, 0, 100, 100],
            }),
        )
        .await,
    )
    .await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_space(app: &axum::Router, project: &str, name: &str) -> String {
    let body = body_json(
        post_json(
            app,
            &format!("/api/projects/{project}/concepts"),
            json!({"kind": "space", "name": name}),
        )
        .await,
    )
    .await;
    body["data"]["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

#[tokio::test]
async fn depicts_link_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;
    let space = create_space(&app, &project, "Room 101").await;

    let response = post_json(
        &app,
        &format!("/api/projects/{project}/links"),
        json!({"rel_type": "DEPICTS", "source_id": drawing, "target_id": space}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["rel_type"], "DEPICTS");
}

#[tokio::test]
async fn reversed_depicts_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;
    let space = create_space(&app, &project, "Room 101").await;

    let response = post_json(
        &app,
        &format!("/api/projects/{project}/links"),
        json!({"rel_type": "DEPICTS", "source_id": space, "target_id": drawing}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_link_is_409_and_count_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;
    let space = create_space(&app, &project, "Room 101").await;

    let payload = json!({"rel_type": "DEPICTS", "source_id": drawing, "target_id": space});
    let first = post_json(&app, &format!("/api/projects/{project}/links"), payload.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(&app, &format!("/api/projects/{project}/links"), payload).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let links = body_json(get(&app, &format!("/api/projects/{project}/links")).await).await;
    assert_eq!(links["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn link_with_missing_endpoint_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;

    let response = post_json(
        &app,
        &format!("/api/projects/{project}/links"),
        json!({"rel_type": "DEPICTS", "source_id": drawing, "target_id": "ghost"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn links_filter_by_rel_type() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;
    let space = create_space(&app, &project, "Room 101").await;

    post_json(
        &app,
        &format!("/api/projects/{project}/links"),
        json!({"rel_type": "DEPICTS", "source_id": drawing, "target_id": space}),
    )
    .await;

    let depicts = body_json(
        get(&app, &format!("/api/projects/{project}/links?rel_type=DEPICTS")).await,
    )
    .await;
    assert_eq!(depicts["data"].as_array().unwrap().len(), 1);

    let located = body_json(
        get(&app, &format!("/api/projects/{project}/links?rel_type=LOCATED_IN")).await,
    )
    .await;
    assert!(located["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_link_then_again_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;
    let space = create_space(&app, &project, "Room 101").await;

    let link = body_json(
        post_json(
            &app,
            &format!("/api/projects/{project}/links"),
            json!({"rel_type": "DEPICTS", "source_id": drawing, "target_id": space}),
        )
        .await,
    )
    .await;
    let link_id = link["data"]["id"].as_str().unwrap();

    let response = delete(&app, &format!("/api/projects/{project}/links/{link_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let again = delete(&app, &format!("/api/projects/{project}/links/{link_id}")).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Concepts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concept_create_list_update() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let space = create_space(&app, &project, "Room 101").await;

    let listed = body_json(get(&app, &format!("/api/projects/{project}/concepts")).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let renamed = body_json(
        patch_json(
            &app,
            &format!("/api/projects/{project}/concepts/{space}"),
            json!({"name": "Room 102"}),
        )
        .await,
    )
    .await;
    assert_eq!(renamed["data"]["name"], "Room 102");
}

#[tokio::test]
async fn deleting_concept_cascades_links() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    let drawing = create_drawing(&app, &project).await;
    let space = create_space(&app, &project, "Room 101").await;

    post_json(
        &app,
        &format!("/api/projects/{project}/links"),
        json!({"rel_type": "DEPICTS", "source_id": drawing, "target_id": space}),
    )
    .await;

    let response = delete(&app, &format!("/api/projects/{project}/concepts/{space}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let links = body_json(get(&app, &format!("/api/projects/{project}/links")).await).await;
    assert!(links["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relationship_schema_is_published() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());

    let response = get(&app, "/api/schema/relationships").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rules = body["data"].as_array().unwrap();
    assert_eq!(rules.len(), 3);

    let depicts = rules.iter().find(|r| r["rel_type"] == "DEPICTS").unwrap();
    assert_eq!(depicts["source_kinds"], json!(["drawing"]));
    assert_eq!(depicts["target_kinds"], json!(["space"]));
}
