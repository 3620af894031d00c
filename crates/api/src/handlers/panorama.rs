//! Handlers for the `/panoramas` resource.
//!
//! Access rules live in the lifecycle; handlers only resolve the caller,
//! parse the request and shape the response.

use std::collections::BTreeMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use trailview_core::geometry::{parse_bounding_box, parse_lon_lat};
use trailview_core::panorama::{
    FeatureCollection, MoveOutcome, MoveRequest, Orientation, Panorama, UploadOutcome,
};
use trailview_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Caller;
use crate::response::{row_count, DataResponse};
use crate::state::AppState;

type RowCount = (StatusCode, Json<DataResponse<BTreeMap<&'static str, u64>>>);

/// Query parameters for the bounding-box listing.
#[derive(Debug, Deserialize)]
pub struct BboxParams {
    /// `"minLon,minLat,maxLon,maxLat"`.
    pub bbox: Option<String>,
}

/// Body for `POST /panoramas/{id}/move`.
#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub lon: f64,
    pub lat: f64,
}

/// Body for `POST /panoramas/move-multi`.
#[derive(Debug, Deserialize)]
pub struct MoveMultiBody {
    pub panos: Vec<MoveRequest>,
}

// ── Reads ────────────────────────────────────────────────────────────

/// GET /api/v1/panoramas/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Panorama>>> {
    let pano = state.lifecycle.get(id).await?;
    Ok(Json(DataResponse { data: pano }))
}

/// GET /api/v1/panoramas/{id}/image
pub async fn get_image(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let bytes = state.lifecycle.image(&identity, id).await?;
    Ok(jpeg_response(bytes))
}

/// GET /api/v1/panoramas/{id}/image/{width}
pub async fn get_resized_image(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path((id, width)): Path<(DbId, u32)>,
) -> AppResult<Response> {
    let bytes = state.lifecycle.resized_image(&identity, id, width).await?;
    Ok(jpeg_response(bytes))
}

fn jpeg_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()
}

// ── Spatial queries ──────────────────────────────────────────────────

/// GET /api/v1/panoramas?bbox=minLon,minLat,maxLon,maxLat
///
/// Returns a bare GeoJSON `FeatureCollection` so map clients can load it
/// directly.
pub async fn list_in_bbox(
    State(state): State<AppState>,
    Query(params): Query<BboxParams>,
) -> AppResult<Json<FeatureCollection>> {
    let raw = params
        .bbox
        .ok_or_else(|| AppError::BadRequest("Valid bounding box not provided".into()))?;
    let bbox = parse_bounding_box(&raw)?;
    let features = state.lifecycle.in_bounding_box(&bbox).await?;
    Ok(Json(features))
}

/// GET /api/v1/panoramas/nearest/{lon}/{lat}
pub async fn nearest(
    State(state): State<AppState>,
    Path((lon, lat)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Panorama>>> {
    let point = parse_lon_lat(&lon, &lat)?;
    let pano = state
        .lifecycle
        .nearest(&point)
        .await?
        .ok_or_else(|| AppError::NotFound("No nearest pano found".into()))?;
    Ok(Json(DataResponse { data: pano }))
}

/// GET /api/v1/panoramas/nearby/{lon}/{lat}/{limit}
pub async fn nearby(
    State(state): State<AppState>,
    Path((lon, lat, limit)): Path<(String, String, u32)>,
) -> AppResult<Json<DataResponse<Vec<Panorama>>>> {
    let point = parse_lon_lat(&lon, &lat)?;
    let panos = state.lifecycle.nearby(&point, limit).await?;
    Ok(Json(DataResponse { data: panos }))
}

// ── Listings ─────────────────────────────────────────────────────────

/// GET /api/v1/panoramas/unauthorized (admin)
pub async fn list_unauthorized(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> AppResult<Json<DataResponse<Vec<Panorama>>>> {
    let panos = state.lifecycle.unauthorized(&identity).await?;
    Ok(Json(DataResponse { data: panos }))
}

/// GET /api/v1/panoramas/unpositioned
pub async fn list_unpositioned(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> AppResult<Json<DataResponse<Vec<Panorama>>>> {
    let panos = state.lifecycle.unpositioned(&identity).await?;
    Ok(Json(DataResponse { data: panos }))
}

/// GET /api/v1/panoramas/mine
pub async fn list_mine(
    State(state): State<AppState>,
    Caller(identity): Caller,
) -> AppResult<Json<DataResponse<Vec<Panorama>>>> {
    let panos = state.lifecycle.mine(&identity).await?;
    Ok(Json(DataResponse { data: panos }))
}

// ── Transitions ──────────────────────────────────────────────────────

/// POST /api/v1/panoramas/upload
///
/// Accepts a multipart form with a required `file` field holding a JPEG.
pub async fn upload(
    State(state): State<AppState>,
    Caller(identity): Caller,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadOutcome>>)> {
    let size_hint = || {
        AppError::BadRequest(format!(
            "File not uploaded successfully - ensure it is no larger than {} MB.",
            state.config.max_upload_mb
        ))
    };

    let mut file_data: Option<Vec<u8>> = None;
    while let Some(field) = multipart.next_field().await.map_err(|_| size_hint())? {
        if field.name() == Some("file") {
            let data = field.bytes().await.map_err(|_| size_hint())?;
            file_data = Some(data.to_vec());
        }
    }
    let data = file_data.ok_or_else(size_hint)?;

    let outcome = state.lifecycle.upload(&identity, &data).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// POST /api/v1/panoramas/{id}/authorize (admin)
pub async fn authorize(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<DbId>,
) -> AppResult<RowCount> {
    let rows = state.lifecycle.authorize(&identity, id).await?;
    Ok(row_count("authorized", rows))
}

/// DELETE /api/v1/panoramas/{id}
pub async fn delete(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<DbId>,
) -> AppResult<RowCount> {
    let rows = state.lifecycle.delete(&identity, id).await?;
    Ok(row_count("deleted", rows))
}

/// POST /api/v1/panoramas/{id}/move
pub async fn move_to(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<DbId>,
    Json(body): Json<MoveBody>,
) -> AppResult<RowCount> {
    let rows = state
        .lifecycle
        .move_to(&identity, id, body.lon, body.lat)
        .await?;
    Ok(row_count("moved", rows))
}

/// POST /api/v1/panoramas/{id}/rotate
pub async fn rotate(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<DbId>,
    Json(body): Json<Orientation>,
) -> AppResult<RowCount> {
    let rows = state.lifecycle.rotate(&identity, id, &body).await?;
    Ok(row_count("rotated", rows))
}

/// POST /api/v1/panoramas/move-multi (admin)
pub async fn move_multi(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(body): Json<MoveMultiBody>,
) -> AppResult<Json<DataResponse<MoveOutcome>>> {
    let outcome = state.lifecycle.move_multi(&identity, &body.panos).await?;
    Ok(Json(DataResponse { data: outcome }))
}
