//! HTTP-level integration tests for the panorama endpoints.
//!
//! Uses tower's `ServiceExt::oneshot` to send requests directly to the
//! router, backed by the in-memory store and a scratch directory.

mod common;

use axum::http::{header, StatusCode};
use common::{body_bytes, body_json, build_test_app, jpeg};
use serde_json::json;

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_without_metadata_returns_warnings() {
    let app = build_test_app().await;
    let token = app.token("7", false);

    let response = app.upload(Some(&token), &jpeg()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["warnings"].as_array().unwrap().len(), 2);
    assert!(app.files.locate(id, false).exists());

    let json = body_json(app.get(&format!("/api/v1/panoramas/{id}"), None).await).await;
    assert_eq!(json["data"]["authorized"], false);
    assert_eq!(json["data"]["owner_id"], "7");
    assert!(json["data"]["geometry"].is_null());
}

#[tokio::test]
async fn anonymous_upload_is_unauthorized() {
    let app = build_test_app().await;

    let response = app.upload(None, &jpeg()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn upload_of_non_jpeg_is_rejected() {
    let app = build_test_app().await;
    let token = app.token("7", false);

    let response = app.upload(Some(&token), b"not an image").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = build_test_app().await;
    let token = app.token("7", false);
    let huge = vec![0xFF; app.config.max_upload_bytes() + 1];

    let response = app.upload(Some(&token), &huge).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Authorize / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authorize_then_repeat_returns_404() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let admin = app.token("1", true);
    let uri = format!("/api/v1/panoramas/{id}/authorize");

    let response = app.post_json(&uri, Some(&admin), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["authorized"], 1);
    assert!(app.files.locate(id, true).exists());

    let response = app.post_json(&uri, Some(&admin), json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["data"]["authorized"], 0);
}

#[tokio::test]
async fn authorize_requires_admin() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);

    let response = app
        .post_json(&format!("/api/v1/panoramas/{id}/authorize"), Some(&owner), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.files.locate(id, false).exists());
}

#[tokio::test]
async fn owner_deletes_then_second_delete_is_404() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);
    let uri = format!("/api/v1/panoramas/{id}");

    let response = app.delete(&uri, Some(&owner)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 1);
    assert!(!app.files.locate(id, false).exists());

    assert_eq!(app.delete(&uri, Some(&owner)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get(&uri, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stranger_cannot_delete() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let stranger = app.token("8", false);

    let response = app
        .delete(&format!("/api/v1/panoramas/{id}"), Some(&stranger))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.files.locate(id, false).exists());
}

// ---------------------------------------------------------------------------
// Move / rotate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn move_then_bbox_lists_published_panorama() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);
    let admin = app.token("1", true);

    let response = app
        .post_json(
            &format!("/api/v1/panoramas/{id}/move"),
            Some(&owner),
            json!({ "lon": -1.4, "lat": 50.9 }),
        )
        .await;
    assert_eq!(body_json(response).await["data"]["moved"], 1);

    // Pending: not listed yet.
    let json = body_json(app.get("/api/v1/panoramas?bbox=-2,50,-1,51", None).await).await;
    assert_eq!(json["type"], "FeatureCollection");
    assert!(json["features"].as_array().unwrap().is_empty());

    app.post_json(&format!("/api/v1/panoramas/{id}/authorize"), Some(&admin), json!({}))
        .await;

    let json = body_json(app.get("/api/v1/panoramas?bbox=-2,50,-1,51", None).await).await;
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["id"], id);
    assert_eq!(features[0]["geometry"]["coordinates"], json!([-1.4, 50.9]));
}

#[tokio::test]
async fn move_with_invalid_latitude_is_400() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);

    let response = app
        .post_json(
            &format!("/api/v1/panoramas/{id}/move"),
            Some(&owner),
            json!({ "lon": 0.0, "lat": 95.0 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rotate_updates_only_supplied_angles() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);
    let uri = format!("/api/v1/panoramas/{id}/rotate");

    app.post_json(&uri, Some(&owner), json!({ "pan": 1.0, "tilt": 2.0, "roll": 3.0 }))
        .await;
    let response = app.post_json(&uri, Some(&owner), json!({ "pan": 90.0 })).await;
    assert_eq!(body_json(response).await["data"]["rotated"], 1);

    let json = body_json(app.get(&format!("/api/v1/panoramas/{id}"), None).await).await;
    assert_eq!(json["data"]["pan"], 90.0);
    assert_eq!(json["data"]["tilt"], 2.0);
    assert_eq!(json["data"]["roll"], 3.0);
}

#[tokio::test]
async fn move_multi_reports_moved_and_unmoved() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let admin = app.token("1", true);

    let response = app
        .post_json(
            "/api/v1/panoramas/move-multi",
            Some(&admin),
            json!({ "panos": [
                { "id": id, "lon": 1.0, "lat": 2.0 },
                { "id": 999, "lon": 1.0, "lat": 2.0 }
            ]}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["moved"], json!([id]));
    assert_eq!(json["data"]["unmoved"], json!([999]));
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_bbox_is_400() {
    let app = build_test_app().await;

    for uri in [
        "/api/v1/panoramas",
        "/api/v1/panoramas?bbox=-10,-100,10,5",
        "/api/v1/panoramas?bbox=10,-5,-10,5",
    ] {
        assert_eq!(app.get(uri, None).await.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    assert_eq!(
        app.get("/api/v1/panoramas?bbox=-170,-5,170,5", None).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn nearest_on_empty_store_is_404() {
    let app = build_test_app().await;

    let response = app.get("/api/v1/panoramas/nearest/-1.4/50.9", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No nearest pano found");

    let response = app.get("/api/v1/panoramas/nearest/abc/50.9", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nearby_rejects_out_of_range_limit() {
    let app = build_test_app().await;

    let response = app.get("/api/v1/panoramas/nearby/0/0/0", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/v1/panoramas/nearby/0/0/5", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn owner_listings_require_login() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);

    let json = body_json(app.get("/api/v1/panoramas/mine", Some(&owner)).await).await;
    assert_eq!(json["data"][0]["id"], id);

    let json = body_json(app.get("/api/v1/panoramas/unpositioned", Some(&owner)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    assert_eq!(
        app.get("/api/v1/panoramas/mine", None).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.get("/api/v1/panoramas/unauthorized", Some(&owner)).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_image_hidden_from_anonymous() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let owner = app.token("7", false);
    let uri = format!("/api/v1/panoramas/{id}/image");

    assert_eq!(app.get(&uri, None).await.status(), StatusCode::UNAUTHORIZED);

    let response = app.get(&uri, Some(&owner)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(body_bytes(response).await, jpeg());
}

#[tokio::test]
async fn resized_image_of_published_panorama() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;
    let admin = app.token("1", true);
    app.post_json(&format!("/api/v1/panoramas/{id}/authorize"), Some(&admin), json!({}))
        .await;

    let response = app
        .get(&format!("/api/v1/panoramas/{id}/image/32"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let decoded = image::load_from_memory(&body_bytes(response).await).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 16));

    let response = app
        .get(&format!("/api/v1/panoramas/{id}/image/0"), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_token_is_401_even_on_public_routes() {
    let app = build_test_app().await;
    let id = app.upload_as("7").await;

    let response = app
        .get(&format!("/api/v1/panoramas/{id}/image"), Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired token");
}
