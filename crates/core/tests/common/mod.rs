//! Shared fixtures: a memory-backed lifecycle over scratch directories.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbImage};
use tempfile::TempDir;
use trailview_core::files::PanoramaFiles;
use trailview_core::lifecycle::PanoramaLifecycle;
use trailview_core::metadata::{ImageMetadata, MetadataExtractor};
use trailview_core::store::{MemoryPanoramaStore, PanoramaStore};
use trailview_core::transcode::JpegTranscoder;

/// Extractor that reports the same metadata for every image.
pub struct FixedMetadata(pub ImageMetadata);

impl MetadataExtractor for FixedMetadata {
    fn extract(&self, _bytes: &[u8]) -> ImageMetadata {
        self.0
    }
}

pub struct Harness {
    pub lifecycle: PanoramaLifecycle,
    pub store: Arc<MemoryPanoramaStore>,
    pub files: Arc<PanoramaFiles>,
    _tmp: TempDir,
}

/// Metadata carrying a position and heading.
pub fn located(lon: f64, lat: f64, heading: f64) -> ImageMetadata {
    ImageMetadata {
        longitude: Some(lon),
        latitude: Some(lat),
        heading_degrees: Some(heading),
    }
}

pub async fn harness(metadata: ImageMetadata) -> Harness {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(MemoryPanoramaStore::new());
    let files = Arc::new(PanoramaFiles::new(
        tmp.path().join("raw_uploads"),
        tmp.path().join("panoramas"),
        Arc::new(JpegTranscoder::default()),
    ));
    files.ensure_dirs().await.unwrap();

    let dyn_store: Arc<dyn PanoramaStore> = store.clone();
    let lifecycle = PanoramaLifecycle::new(
        dyn_store,
        Arc::clone(&files),
        Arc::new(FixedMetadata(metadata)),
    );

    Harness {
        lifecycle,
        store,
        files,
        _tmp: tmp,
    }
}

/// A small but valid JPEG.
pub fn jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 32, |x, y| image::Rgb([(x * 4) as u8, (y * 8) as u8, 90]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}
