pub mod health;
pub mod panorama;
pub mod sequence;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /panoramas                                  bbox listing (GeoJSON)
/// /panoramas/upload                           upload (POST, multipart)
/// /panoramas/nearest/{lon}/{lat}              nearest published
/// /panoramas/nearby/{lon}/{lat}/{limit}       nearby published
/// /panoramas/unauthorized                     pending review (admin)
/// /panoramas/unpositioned                     caller's unpositioned
/// /panoramas/mine                             caller's panoramas
/// /panoramas/move-multi                       batch move (POST, admin)
/// /panoramas/{id}                             get, delete
/// /panoramas/{id}/image                       full image
/// /panoramas/{id}/image/{width}               resized image
/// /panoramas/{id}/authorize                   publish (POST, admin)
/// /panoramas/{id}/move                        reposition (POST)
/// /panoramas/{id}/rotate                      reorient (POST)
///
/// /sequences                                  create (POST)
/// /sequences/{id}                             get
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/panoramas", panorama::router())
        .nest("/sequences", sequence::router())
}
