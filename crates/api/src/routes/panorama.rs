//! Route definitions for panoramas.
//!
//! Mounted at `/panoramas`. Static segments take priority over `{id}`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::panorama;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(panorama::list_in_bbox))
        .route("/upload", post(panorama::upload))
        .route("/nearest/{lon}/{lat}", get(panorama::nearest))
        .route("/nearby/{lon}/{lat}/{limit}", get(panorama::nearby))
        .route("/unauthorized", get(panorama::list_unauthorized))
        .route("/unpositioned", get(panorama::list_unpositioned))
        .route("/mine", get(panorama::list_mine))
        .route("/move-multi", post(panorama::move_multi))
        .route(
            "/{id}",
            get(panorama::get_by_id).delete(panorama::delete),
        )
        .route("/{id}/image", get(panorama::get_image))
        .route("/{id}/image/{width}", get(panorama::get_resized_image))
        .route("/{id}/authorize", post(panorama::authorize))
        .route("/{id}/move", post(panorama::move_to))
        .route("/{id}/rotate", post(panorama::rotate))
}
