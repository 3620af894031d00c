//! Shared helpers for HTTP-level tests.
//!
//! The app runs against the in-memory panorama store and scratch image
//! directories, through the same router and middleware as production.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use tempfile::TempDir;
use tower::ServiceExt;
use trailview_api::auth::jwt::{generate_access_token, JwtConfig};
use trailview_api::config::ServerConfig;
use trailview_api::router::build_app_router;
use trailview_api::state::AppState;
use trailview_core::files::PanoramaFiles;
use trailview_core::lifecycle::PanoramaLifecycle;
use trailview_core::metadata::ExifMetadataExtractor;
use trailview_core::sequence::SequenceAssembler;
use trailview_core::store::{MemoryPanoramaStore, PanoramaStore};
use trailview_core::transcode::JpegTranscoder;

pub const BOUNDARY: &str = "trailview-test-boundary";

/// Build a test `ServerConfig` rooted in `dir`.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_mb: 1,
        raw_uploads_dir: dir.path().join("raw_uploads"),
        pano_dir: dir.path().join("panoramas"),
        resize_timeout_secs: 10,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub files: Arc<PanoramaFiles>,
    _dir: TempDir,
}

impl TestApp {
    pub fn token(&self, user_id: &str, admin: bool) -> String {
        generate_access_token(user_id, admin, &self.config.jwt).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request(Method::GET, uri, token, Body::empty(), None))
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request(Method::DELETE, uri, token, Body::empty(), None))
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(request(
            Method::POST,
            uri,
            token,
            Body::from(body.to_string()),
            Some("application/json".to_string()),
        ))
        .await
    }

    pub async fn upload(&self, token: Option<&str>, bytes: &[u8]) -> Response<Body> {
        self.send(request(
            Method::POST,
            "/api/v1/panoramas/upload",
            token,
            Body::from(multipart_body("file", bytes)),
            Some(format!("multipart/form-data; boundary={BOUNDARY}")),
        ))
        .await
    }

    /// Upload as `user_id` and return the new panorama id.
    pub async fn upload_as(&self, user_id: &str) -> i64 {
        let token = self.token(user_id, false);
        let json = body_json(self.upload(Some(&token), &jpeg()).await).await;
        json["data"]["id"].as_i64().unwrap()
    }
}

pub async fn build_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let files = Arc::new(PanoramaFiles::new(
        &config.raw_uploads_dir,
        &config.pano_dir,
        Arc::new(JpegTranscoder::default()),
    ));
    files.ensure_dirs().await.unwrap();

    let store: Arc<dyn PanoramaStore> = Arc::new(MemoryPanoramaStore::new());
    let state = AppState {
        lifecycle: Arc::new(PanoramaLifecycle::new(
            Arc::clone(&store),
            Arc::clone(&files),
            Arc::new(ExifMetadataExtractor),
        )),
        sequences: Arc::new(SequenceAssembler::new(store)),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        config,
        files,
        _dir: dir,
    }
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap()
}

pub fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"pano.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A small JPEG with no EXIF or XMP metadata.
pub fn jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 32, |x, y| image::Rgb([(x * 4) as u8, (y * 8) as u8, 90]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}
