//! Route definitions for sequences, mounted at `/sequences`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sequence;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sequence::create))
        .route("/{id}", get(sequence::get_by_id))
}
