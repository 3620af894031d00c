//! Width-scaled re-encoding of stored panoramas.
//!
//! Decoding and resampling are CPU-bound, so [`JpegTranscoder`] runs them on
//! the blocking pool under a deadline and reports an overrun as
//! [`CoreError::Transcode`]. Output dimensions are capped on both axes before
//! any pixel buffer is allocated.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::CoreError;

/// Largest width a resized rendition may request.
pub const MAX_RESIZE_WIDTH: u32 = 8192;

/// Largest height a resized rendition may come out at. Tall, narrow sources
/// scale height by `width / source_width`, so this is checked separately.
pub const MAX_RESIZE_HEIGHT: u32 = 8192;

/// Default deadline for one resize.
pub const DEFAULT_RESIZE_TIMEOUT: Duration = Duration::from_secs(10);

/// External image-processing capability: scale `bytes` to `width`, keeping
/// the aspect ratio.
#[async_trait]
pub trait ImageTranscoder: Send + Sync {
    async fn resize(&self, bytes: Vec<u8>, width: u32) -> Result<Vec<u8>, CoreError>;
}

/// Reject widths of zero or above [`MAX_RESIZE_WIDTH`].
pub fn validate_width(width: u32) -> Result<(), CoreError> {
    if width == 0 || width > MAX_RESIZE_WIDTH {
        return Err(CoreError::Validation(format!(
            "Width must be between 1 and {MAX_RESIZE_WIDTH}, got {width}"
        )));
    }
    Ok(())
}

/// Output height for scaling a `src_width` x `src_height` image to `width`.
pub fn scaled_height(src_width: u32, src_height: u32, width: u32) -> Result<u32, CoreError> {
    let height =
        (u64::from(src_height) * u64::from(width) / u64::from(src_width.max(1))).max(1);
    if height > u64::from(MAX_RESIZE_HEIGHT) {
        return Err(CoreError::Validation(format!(
            "Resized height {height} exceeds {MAX_RESIZE_HEIGHT}; request a smaller width"
        )));
    }
    // Bounded above, so the conversion cannot fail.
    Ok(height as u32)
}

/// [`ImageTranscoder`] backed by the `image` crate, producing JPEG output.
///
/// On timeout the caller gets an error straight away, but the blocking task
/// is not cancelled and runs to completion in the background.
#[derive(Debug, Clone)]
pub struct JpegTranscoder {
    timeout: Duration,
}

impl JpegTranscoder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for JpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_TIMEOUT)
    }
}

#[async_trait]
impl ImageTranscoder for JpegTranscoder {
    async fn resize(&self, bytes: Vec<u8>, width: u32) -> Result<Vec<u8>, CoreError> {
        validate_width(width)?;
        let task = tokio::task::spawn_blocking(move || resize_to_jpeg(&bytes, width));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(CoreError::Transcode(format!(
                "Resize task failed: {join_err}"
            ))),
            Err(_) => {
                tracing::warn!(width, timeout_secs = self.timeout.as_secs_f64(), "Resize timed out");
                Err(CoreError::Transcode(format!(
                    "Resize exceeded {:.1}s",
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}

/// Decode, scale to `width` with Lanczos3 resampling, and encode as JPEG.
fn resize_to_jpeg(bytes: &[u8], width: u32) -> Result<Vec<u8>, CoreError> {
    let decode_err = |e: image::ImageError| CoreError::Transcode(format!("Cannot decode image: {e}"));

    let (src_width, src_height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(decode_err)?;
    let height = scaled_height(src_width, src_height, width)?;

    let img = image::load_from_memory(bytes).map_err(decode_err)?;
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    // The JPEG encoder rejects alpha channels.
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| CoreError::Transcode(format!("Cannot encode JPEG: {e}")))?;

    Ok(out.into_inner())
}
