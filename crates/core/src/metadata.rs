//! Capture metadata extraction from uploaded panoramas.
//!
//! Location comes from the EXIF GPS tags; heading comes from the XMP
//! `GPano:PoseHeadingDegrees` property written by 360° cameras. Unreadable or
//! missing metadata yields `None` fields rather than an error.

use std::io::Cursor;
use std::sync::LazyLock;

use exif::{In, Rational, Tag, Value};
use regex::bytes::Regex;

use crate::geometry::{validate_lon_lat, Point};

/// Matches both the attribute (`GPano:PoseHeadingDegrees="90.0"`) and the
/// element (`<GPano:PoseHeadingDegrees>90.0<`) XMP forms.
static POSE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"PoseHeadingDegrees(?:\s*=\s*["']|>)\s*(-?\d+(?:\.\d+)?)"#).expect("valid regex")
});

/// Location and orientation recovered from an image.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageMetadata {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub heading_degrees: Option<f64>,
}

impl ImageMetadata {
    /// The capture position, when both coordinates are present and in range.
    pub fn location(&self) -> Option<Point> {
        let (lon, lat) = (self.longitude?, self.latitude?);
        validate_lon_lat(lon, lat).ok()
    }
}

/// Reads capture metadata from raw image bytes.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> ImageMetadata;
}

/// Default extractor: EXIF GPS plus XMP pose heading.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifMetadataExtractor;

impl MetadataExtractor for ExifMetadataExtractor {
    fn extract(&self, bytes: &[u8]) -> ImageMetadata {
        let (longitude, latitude) = match read_gps(bytes) {
            Some((lon, lat)) => (Some(lon), Some(lat)),
            None => (None, None),
        };
        ImageMetadata {
            longitude,
            latitude,
            heading_degrees: read_pose_heading(bytes),
        }
    }
}

/// EXIF GPS position as `(lon, lat)` in signed decimal degrees.
fn read_gps(bytes: &[u8]) -> Option<(f64, f64)> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;

    let coordinate = |value_tag: Tag, ref_tag: Tag, negative: u8| {
        let field = exif.get_field(value_tag, In::PRIMARY)?;
        let Value::Rational(ref parts) = field.value else {
            return None;
        };
        let reference = exif.get_field(ref_tag, In::PRIMARY).map(|f| &f.value);
        dms_to_degrees(parts, reference, negative)
    };

    let lat = coordinate(Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let lon = coordinate(Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
    Some((lon, lat))
}

/// Convert degrees/minutes/seconds rationals to signed decimal degrees.
///
/// The sign is negative when the reference tag starts with `negative`
/// (`S` for latitude, `W` for longitude).
fn dms_to_degrees(parts: &[Rational], reference: Option<&Value>, negative: u8) -> Option<f64> {
    if parts.is_empty() {
        return None;
    }
    let magnitude: f64 = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(r, divisor)| r.to_f64() / divisor)
        .sum();
    if !magnitude.is_finite() {
        return None;
    }

    let is_negative = matches!(
        reference,
        Some(Value::Ascii(values))
            if values.first().and_then(|v| v.first()) == Some(&negative)
    );
    Some(if is_negative { -magnitude } else { magnitude })
}

/// XMP `PoseHeadingDegrees`, if present and finite.
fn read_pose_heading(bytes: &[u8]) -> Option<f64> {
    let captures = POSE_HEADING_RE.captures(bytes)?;
    let raw = std::str::from_utf8(captures.get(1)?.as_bytes()).ok()?;
    raw.parse::<f64>().ok().filter(|h| h.is_finite())
}
