//! Panorama entity, mutation inputs, and operation outcomes.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::types::{DbId, Timestamp, UserId};

/// One uploaded panoramic image and its metadata.
///
/// `authorized == false` means the image lives in the pending store and is
/// visible only to its owner and administrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panorama {
    pub id: DbId,
    /// `None` until the panorama has been positioned.
    pub geometry: Option<Point>,
    pub heading: f64,
    pub pan: f64,
    pub tilt: f64,
    pub roll: f64,
    pub owner_id: Option<UserId>,
    pub authorized: bool,
    pub sequence_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Input for creating a panorama record. New records always start pending.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPanorama {
    pub owner_id: Option<UserId>,
    pub geometry: Option<Point>,
    pub heading: f64,
}

/// Partial orientation update. `None` leaves the stored angle unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Orientation {
    pub pan: Option<f64>,
    pub tilt: Option<f64>,
    pub roll: Option<f64>,
}

impl Orientation {
    pub fn is_empty(&self) -> bool {
        self.pan.is_none() && self.tilt.is_none() && self.roll.is_none()
    }
}

/// One entry of a batch move.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MoveRequest {
    pub id: DbId,
    pub lon: f64,
    pub lat: f64,
}

/// Result of a batch move: every requested id lands in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub moved: Vec<DbId>,
    pub unmoved: Vec<DbId>,
}

/// Result of an upload. Warnings flag missing capture metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub id: DbId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

/// GeoJSON `FeatureCollection` of panorama points.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

/// GeoJSON `Feature`: a point plus every other panorama field as properties.
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: PointGeometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[lon, lat]`, GeoJSON axis order.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureProperties {
    pub id: DbId,
    pub heading: f64,
    pub pan: f64,
    pub tilt: f64,
    pub roll: f64,
    pub owner_id: Option<UserId>,
    pub authorized: bool,
    pub sequence_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl Feature {
    /// Build a feature from a positioned panorama; `None` when unpositioned.
    pub fn from_panorama(pano: Panorama) -> Option<Self> {
        let point = pano.geometry?;
        Some(Self {
            kind: "Feature",
            geometry: PointGeometry {
                kind: "Point",
                coordinates: [point.lon, point.lat],
            },
            properties: FeatureProperties {
                id: pano.id,
                heading: pano.heading,
                pan: pano.pan,
                tilt: pano.tilt,
                roll: pano.roll,
                owner_id: pano.owner_id,
                authorized: pano.authorized,
                sequence_id: pano.sequence_id,
                created_at: pano.created_at,
            },
        })
    }
}

impl FromIterator<Panorama> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Panorama>>(iter: I) -> Self {
        Self {
            kind: "FeatureCollection",
            features: iter.into_iter().filter_map(Feature::from_panorama).collect(),
        }
    }
}
