//! Longitude/latitude points, bounding boxes, and great-circle ordering.
//!
//! Coordinates are WGS84 degrees (SRID 4326). Validation errors are reported
//! as [`CoreError::Validation`] before any store is touched.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Mean Earth radius in metres (IUGG), matching PostGIS `ST_DistanceSphere`.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned rectangle in longitude/latitude space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Whether `point` lies inside the box. Edges are inclusive.
    pub fn contains(&self, point: &Point) -> bool {
        point.lon >= self.min_lon
            && point.lon <= self.max_lon
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a longitude/latitude pair and build a [`Point`].
pub fn validate_lon_lat(lon: f64, lat: f64) -> Result<Point, CoreError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(CoreError::Validation(
            "Longitude and latitude must be finite numbers".into(),
        ));
    }
    if !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat) {
        return Err(CoreError::Validation(format!(
            "Latitude {lat} out of range [-90, 90]"
        )));
    }
    if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
        return Err(CoreError::Validation(format!(
            "Longitude {lon} out of range [-180, 180]"
        )));
    }
    Ok(Point { lon, lat })
}

/// Parse a longitude/latitude pair from raw path tokens.
pub fn parse_lon_lat(lon: &str, lat: &str) -> Result<Point, CoreError> {
    let lon = parse_coordinate(lon)
        .ok_or_else(|| CoreError::Validation("Valid lat/lon not provided".into()))?;
    let lat = parse_coordinate(lat)
        .ok_or_else(|| CoreError::Validation("Valid lat/lon not provided".into()))?;
    validate_lon_lat(lon, lat)
}

/// Validate `[min_lon, min_lat, max_lon, max_lat]`.
///
/// A value passes when it lies within the latitude range, or when it sits at
/// an even index and lies within the longitude range. The range check is by
/// position, not by semantic axis.
pub fn validate_bounding_box(values: &[f64]) -> Result<BoundingBox, CoreError> {
    let invalid = || CoreError::Validation("Valid bounding box not provided".into());

    let [min_lon, min_lat, max_lon, max_lat] = values else {
        return Err(invalid());
    };

    let in_range = values.iter().enumerate().all(|(i, v)| {
        v.is_finite()
            && ((-MAX_LATITUDE..=MAX_LATITUDE).contains(v)
                || (i % 2 == 0 && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(v)))
    });

    if !in_range || min_lon >= max_lon || min_lat >= max_lat {
        return Err(invalid());
    }

    Ok(BoundingBox {
        min_lon: *min_lon,
        min_lat: *min_lat,
        max_lon: *max_lon,
        max_lat: *max_lat,
    })
}

/// Parse a comma-separated `minLon,minLat,maxLon,maxLat` query value.
pub fn parse_bounding_box(raw: &str) -> Result<BoundingBox, CoreError> {
    let values = raw
        .split(',')
        .map(parse_coordinate)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| CoreError::Validation("Valid bounding box not provided".into()))?;
    validate_bounding_box(&values)
}

/// Accept only tokens made of digits, `.` and `-`, then parse as `f64`.
///
/// Rejects forms `f64::from_str` would otherwise take (`inf`, `NaN`, `1e5`).
fn parse_coordinate(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty()
        || !token
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        return None;
    }
    token.parse().ok()
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Great-circle distance between two points in metres (haversine).
pub fn haversine_distance_m(a: &Point, b: &Point) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Order `items` by distance from `origin`, nearest first, ties by ascending id.
///
/// `locate` yields each item's id and position; items without a position are
/// dropped.
pub fn order_by_distance<T, F>(origin: &Point, items: Vec<T>, locate: F) -> Vec<T>
where
    F: Fn(&T) -> Option<(DbId, Point)>,
{
    let mut ranked: Vec<(f64, DbId, T)> = items
        .into_iter()
        .filter_map(|item| {
            let (id, point) = locate(&item)?;
            Some((haversine_distance_m(origin, &point), id, item))
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    ranked.into_iter().map(|(_, _, item)| item).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
