//! HTTP-level integration tests for the coordinate conversion endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, create_project, post_json};
use planograph_core::coords::{RenderMeta, Rotation};
use planograph_store::store::write_render_meta;
use planograph_store::FileStore;

async fn seed_render_meta(data_dir: &std::path::Path, project: &str, sheet: u32, meta: RenderMeta) {
    let store = FileStore::new(data_dir);
    write_render_meta(&store, project, sheet, &meta).await.unwrap();
}

fn square_meta() -> RenderMeta {
    RenderMeta {
        page_width_pts: 100.0,
        page_height_pts: 100.0,
        raster_width_px: 200,
        raster_height_px: 200,
        rotation: Rotation::R0,
    }
}

#[tokio::test]
async fn canvas_to_document_scales_by_raster_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    seed_render_meta(dir.path(), &project, 1, square_meta()).await;

    let response = post_json(
        &app,
        &format!("/api/projects/{project}/sheets/1/coords/to-document"),
        json!({"bounding_box": [20.0, 40.0, 80.0, 100.0]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["bounding_box"], json!([10.0, 20.0, 40.0, 50.0]));
}

#[tokio::test]
async fn round_trip_through_both_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    seed_render_meta(
        dir.path(),
        &project,
        1,
        RenderMeta {
            rotation: Rotation::R90,
            ..square_meta()
        },
    )
    .await;

    let canvas = json!([40.0, 30.0, 120.0, 90.0]);
    let doc = body_json(
        post_json(
            &app,
            &format!("/api/projects/{project}/sheets/1/coords/to-document"),
            json!({"bounding_box": canvas}),
        )
        .await,
    )
    .await;

    let back = body_json(
        post_json(
            &app,
            &format!("/api/projects/{project}/sheets/1/coords/to-canvas"),
            json!({"bounding_box": doc["data"]["bounding_box"]}),
        )
        .await,
    )
    .await;

    let original: Vec<f64> = serde_json::from_value(canvas).unwrap();
    let returned: Vec<f64> =
        serde_json::from_value(back["data"]["bounding_box"].clone()).unwrap();
    for (a, b) in original.iter().zip(returned.iter()) {
        assert!((a - b).abs() < 1e-6, "{original:?} != {returned:?}");
    }
}

#[tokio::test]
async fn out_of_bounds_box_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    seed_render_meta(dir.path(), &project, 1, square_meta()).await;

    let body = body_json(
        post_json(
            &app,
            &format!("/api/projects/{project}/sheets/1/coords/to-document"),
            json!({"bounding_box": [-500.0, -500.0, 900.0, 900.0]}),
        )
        .await,
    )
    .await;

    let coords: Vec<f64> =
        serde_json::from_value(body["data"]["bounding_box"].clone()).unwrap();
    for v in coords {
        assert!((-0.5..=100.5).contains(&v), "{v}");
    }
}

#[tokio::test]
async fn unreasonable_magnitude_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;
    seed_render_meta(dir.path(), &project, 1, square_meta()).await;

    let response = post_json(
        &app,
        &format!("/api/projects/{project}/sheets/1/coords/to-document"),
        json!({"bounding_box": [0.0, 0.0, 1e9, 10.0]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_sheet_meta_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let project = create_project(&app).await;

    let response = post_json(
        &app,
        &format!("/api/projects/{project}/sheets/9/coords/to-document"),
        json!({"bounding_box": [0.0, 0.0, 10.0, 10.0]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
