//! Shared response envelope types for API handlers.
//!
//! JSON responses use a `{ "data": ... }` envelope, except GeoJSON and image
//! bodies which are returned as-is.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": { "<verb>": rows } }`, with 404 when nothing was affected.
pub fn row_count(
    verb: &'static str,
    rows: u64,
) -> (StatusCode, Json<DataResponse<BTreeMap<&'static str, u64>>>) {
    let status = if rows > 0 {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (
        status,
        Json(DataResponse {
            data: BTreeMap::from([(verb, rows)]),
        }),
    )
}
