//! File-state coordinator for panorama images.
//!
//! Each panorama owns exactly one `{id}.jpg`, in the pending directory while
//! unauthorized and in the published directory once authorized. This is the
//! only module that touches either directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CoreError;
use crate::transcode::ImageTranscoder;
use crate::types::DbId;

/// File extension for stored panoramas.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Suffix for in-flight writes; never matched by [`PanoramaFiles::locate`].
const PARTIAL_SUFFIX: &str = "part";

/// Two-directory image store keyed by panorama id.
pub struct PanoramaFiles {
    pending_dir: PathBuf,
    published_dir: PathBuf,
    transcoder: Arc<dyn ImageTranscoder>,
}

impl PanoramaFiles {
    pub fn new(
        pending_dir: impl Into<PathBuf>,
        published_dir: impl Into<PathBuf>,
        transcoder: Arc<dyn ImageTranscoder>,
    ) -> Self {
        Self {
            pending_dir: pending_dir.into(),
            published_dir: published_dir.into(),
            transcoder,
        }
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure_dirs(&self) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(&self.pending_dir).await?;
        tokio::fs::create_dir_all(&self.published_dir).await?;
        Ok(())
    }

    /// Expected path for `id` given its authorization flag. Does not touch disk.
    pub fn locate(&self, id: DbId, authorized: bool) -> PathBuf {
        let dir = if authorized {
            &self.published_dir
        } else {
            &self.pending_dir
        };
        dir.join(format!("{id}.{IMAGE_EXTENSION}"))
    }

    /// Write a freshly uploaded image into the pending directory.
    pub async fn store(&self, id: DbId, bytes: &[u8]) -> Result<(), CoreError> {
        let target = self.locate(id, false);
        let partial = target.with_extension(format!("{IMAGE_EXTENSION}.{PARTIAL_SUFFIX}"));

        if let Err(e) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        tracing::debug!(id, path = %target.display(), bytes = bytes.len(), "Stored pending image");
        Ok(())
    }

    /// Move the pending image to the published directory.
    pub async fn publish(&self, id: DbId) -> Result<(), CoreError> {
        let from = self.locate(id, false);
        let to = self.locate(id, true);

        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| not_found_or_io(e, id))?;

        tracing::debug!(id, path = %to.display(), "Published image");
        Ok(())
    }

    /// Find where the image currently lives, checking published first.
    ///
    /// Returns the authorization flag matching the directory the file was
    /// found in, or `None` when neither directory holds it.
    pub async fn resolve(&self, id: DbId) -> Result<Option<bool>, CoreError> {
        for authorized in [true, false] {
            if tokio::fs::try_exists(self.locate(id, authorized)).await? {
                return Ok(Some(authorized));
            }
        }
        Ok(None)
    }

    /// Delete the image at the location implied by `authorized`, falling back
    /// to the other directory.
    pub async fn remove(&self, id: DbId, authorized: bool) -> Result<(), CoreError> {
        for location in [authorized, !authorized] {
            let path = self.locate(id, location);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::debug!(id, path = %path.display(), "Removed image");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(CoreError::panorama_not_found(id))
    }

    /// Read the stored image bytes.
    pub async fn read(&self, id: DbId, authorized: bool) -> Result<Vec<u8>, CoreError> {
        tokio::fs::read(self.locate(id, authorized))
            .await
            .map_err(|e| not_found_or_io(e, id))
    }

    /// Width-scaled rendition of the stored image. Pure read.
    pub async fn resize(&self, id: DbId, authorized: bool, width: u32) -> Result<Vec<u8>, CoreError> {
        let bytes = self.read(id, authorized).await?;
        self.transcoder.resize(bytes, width).await
    }

    pub fn pending_dir(&self) -> &Path {
        &self.pending_dir
    }

    pub fn published_dir(&self) -> &Path {
        &self.published_dir
    }
}

fn not_found_or_io(err: std::io::Error, id: DbId) -> CoreError {
    if err.kind() == ErrorKind::NotFound {
        CoreError::panorama_not_found(id)
    } else {
        CoreError::Io(err)
    }
}
