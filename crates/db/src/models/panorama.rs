//! Panorama row model.

use sqlx::FromRow;
use trailview_core::geometry::Point;
use trailview_core::panorama::Panorama;
use trailview_core::types::{DbId, Timestamp};

/// A row from the `panoramas` table with `geom` split into `lon` / `lat`.
#[derive(Debug, Clone, FromRow)]
pub struct PanoramaRow {
    pub id: DbId,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub heading: f64,
    pub pan: f64,
    pub tilt: f64,
    pub roll: f64,
    pub owner_id: Option<String>,
    pub authorized: bool,
    pub sequence_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl From<PanoramaRow> for Panorama {
    fn from(row: PanoramaRow) -> Self {
        let geometry = match (row.lon, row.lat) {
            (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
            _ => None,
        };
        Self {
            id: row.id,
            geometry,
            heading: row.heading,
            pan: row.pan,
            tilt: row.tilt,
            roll: row.roll,
            owner_id: row.owner_id,
            authorized: row.authorized,
            sequence_id: row.sequence_id,
            created_at: row.created_at,
        }
    }
}
