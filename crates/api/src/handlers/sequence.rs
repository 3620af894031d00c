//! Handlers for the `/sequences` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use trailview_core::sequence::Sequence;
use trailview_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::Caller;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedSequence {
    pub id: DbId,
}

/// POST /api/v1/sequences
///
/// Body is a JSON array of panorama ids in route order. Unknown ids are
/// dropped; 404 when none resolve.
pub async fn create(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(ids): Json<Vec<DbId>>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedSequence>>)> {
    let id = state.sequences.create(&identity, &ids).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedSequence { id },
        }),
    ))
}

/// GET /api/v1/sequences/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Sequence>>> {
    let sequence = state.sequences.get(id).await?;
    Ok(Json(DataResponse { data: sequence }))
}
