//! Panorama lifecycle orchestration.
//!
//! Drives upload → pending → published → deleted, plus move/rotate, while
//! keeping the database record and the image file consistent. Every
//! transition writes the store first and the filesystem second, so a failure
//! part-way leaves a record without a file (detectable from the store),
//! never a file without a record.
//!
//! Access checks run inside each operation against a freshly fetched record.

use std::sync::Arc;

use image::ImageFormat;

use crate::access;
use crate::error::CoreError;
use crate::files::PanoramaFiles;
use crate::geometry::{validate_lon_lat, BoundingBox, Point};
use crate::identity::CallerIdentity;
use crate::metadata::MetadataExtractor;
use crate::panorama::{
    FeatureCollection, MoveOutcome, MoveRequest, NewPanorama, Orientation, Panorama, UploadOutcome,
};
use crate::store::PanoramaStore;
use crate::transcode::validate_width;
use crate::types::DbId;

/// Largest `limit` accepted by [`PanoramaLifecycle::nearby`].
pub const MAX_NEARBY_LIMIT: u32 = 100;

pub const NO_LOCATION_WARNING: &str =
    "No latitude and longitude in panorama; you'll have to later position manually";
pub const NO_ORIENTATION_WARNING: &str =
    "No orientation information; you'll have to later rotate manually";

pub struct PanoramaLifecycle {
    store: Arc<dyn PanoramaStore>,
    files: Arc<PanoramaFiles>,
    extractor: Arc<dyn MetadataExtractor>,
}

impl PanoramaLifecycle {
    pub fn new(
        store: Arc<dyn PanoramaStore>,
        files: Arc<PanoramaFiles>,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> Self {
        Self {
            store,
            files,
            extractor,
        }
    }

    pub fn store(&self) -> &Arc<dyn PanoramaStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn get(&self, id: DbId) -> Result<Panorama, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::panorama_not_found(id))
    }

    /// Full-size image. Pending images are visible to owner and admins only.
    pub async fn image(&self, identity: &CallerIdentity, id: DbId) -> Result<Vec<u8>, CoreError> {
        let pano = self.viewable(identity, id).await?;
        self.files.read(id, pano.authorized).await
    }

    /// Width-scaled image, same visibility rule as [`Self::image`].
    pub async fn resized_image(
        &self,
        identity: &CallerIdentity,
        id: DbId,
        width: u32,
    ) -> Result<Vec<u8>, CoreError> {
        validate_width(width)?;
        let pano = self.viewable(identity, id).await?;
        self.files.resize(id, pano.authorized, width).await
    }

    async fn viewable(&self, identity: &CallerIdentity, id: DbId) -> Result<Panorama, CoreError> {
        let pano = self.get(id).await?;
        access::require_authorized_or_owner_or_admin(identity, &pano)?;
        Ok(pano)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Create a pending panorama from an uploaded JPEG.
    ///
    /// The record is created first so its id can name the file. If the file
    /// write then fails, the error is returned and the record is left in
    /// place as a detectable orphan.
    pub async fn upload(
        &self,
        identity: &CallerIdentity,
        bytes: &[u8],
    ) -> Result<UploadOutcome, CoreError> {
        let user_id = access::require_authenticated(identity)?;

        if bytes.is_empty() {
            return Err(CoreError::Validation("Uploaded file is empty".into()));
        }
        if image::guess_format(bytes).ok() != Some(ImageFormat::Jpeg) {
            return Err(CoreError::Validation(
                "Uploaded file must be a JPEG image".into(),
            ));
        }

        let metadata = self.extractor.extract(bytes);
        let mut warnings = Vec::new();

        let geometry = metadata.location();
        if geometry.is_none() {
            warnings.push(NO_LOCATION_WARNING.to_string());
        }
        if metadata.heading_degrees.is_none() {
            warnings.push(NO_ORIENTATION_WARNING.to_string());
        }

        let id = self
            .store
            .create(&NewPanorama {
                owner_id: Some(user_id.to_string()),
                geometry,
                heading: metadata.heading_degrees.unwrap_or(0.0),
            })
            .await?;

        if let Err(e) = self.files.store(id, bytes).await {
            tracing::error!(id, error = %e, "Image write failed; record left without file");
            return Err(e);
        }

        tracing::info!(
            id,
            user_id,
            positioned = geometry.is_some(),
            bytes = bytes.len(),
            "Panorama uploaded"
        );
        Ok(UploadOutcome { id, warnings })
    }

    /// Publish a pending panorama. Admin only.
    ///
    /// The file moves only when the store reports that this call flipped the
    /// flag, so a repeated or racing call returns 0 and leaves files alone.
    pub async fn authorize(&self, identity: &CallerIdentity, id: DbId) -> Result<u64, CoreError> {
        access::require_admin(identity)?;

        let rows = self.store.set_authorized(id).await?;
        if rows == 1 {
            if let Err(e) = self.files.publish(id).await {
                tracing::error!(id, error = %e, "Record authorized but image not moved");
                return Err(e);
            }
            tracing::info!(id, "Panorama authorized");
        }
        Ok(rows)
    }

    /// Reposition a panorama. Owner or admin.
    pub async fn move_to(
        &self,
        identity: &CallerIdentity,
        id: DbId,
        lon: f64,
        lat: f64,
    ) -> Result<u64, CoreError> {
        let point = validate_lon_lat(lon, lat)?;
        if self.fetch_for_mutation(identity, id).await?.is_none() {
            return Ok(0);
        }

        let rows = self.store.update_geometry(id, &point).await?;
        tracing::info!(id, lon, lat, rows, "Panorama moved");
        Ok(rows)
    }

    /// Update any of pan/tilt/roll. Owner or admin.
    pub async fn rotate(
        &self,
        identity: &CallerIdentity,
        id: DbId,
        orientation: &Orientation,
    ) -> Result<u64, CoreError> {
        if orientation.is_empty() {
            return Err(CoreError::Validation(
                "At least one of pan, tilt or roll is required".into(),
            ));
        }
        if [orientation.pan, orientation.tilt, orientation.roll]
            .into_iter()
            .flatten()
            .any(|angle| !angle.is_finite())
        {
            return Err(CoreError::Validation("Angles must be finite numbers".into()));
        }
        if self.fetch_for_mutation(identity, id).await?.is_none() {
            return Ok(0);
        }

        let rows = self.store.update_orientation(id, orientation).await?;
        tracing::info!(id, rows, "Panorama rotated");
        Ok(rows)
    }

    /// Batch reposition. Admin only.
    ///
    /// Each item is attempted independently: bad coordinates, a missing id or
    /// a store failure for one item put it in `unmoved` and the batch carries
    /// on.
    pub async fn move_multi(
        &self,
        identity: &CallerIdentity,
        items: &[MoveRequest],
    ) -> Result<MoveOutcome, CoreError> {
        access::require_admin(identity)?;

        let mut outcome = MoveOutcome::default();
        for item in items {
            let moved = match validate_lon_lat(item.lon, item.lat) {
                Ok(point) => match self.store.update_geometry(item.id, &point).await {
                    Ok(rows) => rows == 1,
                    Err(e) => {
                        tracing::warn!(id = item.id, error = %e, "Batch move item failed");
                        false
                    }
                },
                Err(_) => false,
            };
            if moved {
                outcome.moved.push(item.id);
            } else {
                outcome.unmoved.push(item.id);
            }
        }

        tracing::info!(
            moved = outcome.moved.len(),
            unmoved = outcome.unmoved.len(),
            "Batch move complete"
        );
        Ok(outcome)
    }

    /// Remove a panorama record and its image. Owner or admin.
    ///
    /// The file location is resolved up front (published first), and the
    /// file is removed only after the store confirms the record is gone.
    pub async fn delete(&self, identity: &CallerIdentity, id: DbId) -> Result<u64, CoreError> {
        if self.fetch_for_mutation(identity, id).await?.is_none() {
            return Ok(0);
        }

        let location = self.files.resolve(id).await?;
        let rows = self.store.delete(id).await?;
        if rows == 0 {
            return Ok(0);
        }

        match location {
            Some(authorized) => match self.files.remove(id, authorized).await {
                Ok(()) => {}
                Err(CoreError::NotFound { .. }) => {
                    tracing::warn!(id, "Image vanished before removal");
                }
                Err(e) => {
                    tracing::error!(id, error = %e, "Record deleted but image not removed");
                    return Err(e);
                }
            },
            None => tracing::warn!(id, "Deleted record had no image file"),
        }

        tracing::info!(id, "Panorama deleted");
        Ok(rows)
    }

    /// Fetch the target fresh and check owner-or-admin. `None` when missing.
    async fn fetch_for_mutation(
        &self,
        identity: &CallerIdentity,
        id: DbId,
    ) -> Result<Option<Panorama>, CoreError> {
        access::require_authenticated(identity)?;
        let Some(pano) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        access::require_owner_or_admin(identity, &pano)?;
        Ok(Some(pano))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn nearest(&self, point: &Point) -> Result<Option<Panorama>, CoreError> {
        self.store.find_nearest(point).await
    }

    pub async fn nearby(&self, point: &Point, limit: u32) -> Result<Vec<Panorama>, CoreError> {
        if limit == 0 || limit > MAX_NEARBY_LIMIT {
            return Err(CoreError::Validation(format!(
                "Limit must be between 1 and {MAX_NEARBY_LIMIT}, got {limit}"
            )));
        }
        self.store.find_nearby(point, limit).await
    }

    pub async fn in_bounding_box(&self, bbox: &BoundingBox) -> Result<FeatureCollection, CoreError> {
        let panos = self.store.find_by_bounding_box(bbox).await?;
        Ok(panos.into_iter().collect())
    }

    /// Pending panoramas awaiting review. Admin only.
    pub async fn unauthorized(&self, identity: &CallerIdentity) -> Result<Vec<Panorama>, CoreError> {
        access::require_admin(identity)?;
        self.store.find_unauthorized().await
    }

    /// The caller's panoramas that still need positioning.
    pub async fn unpositioned(&self, identity: &CallerIdentity) -> Result<Vec<Panorama>, CoreError> {
        let user_id = access::require_authenticated(identity)?;
        self.store.find_unpositioned(user_id).await
    }

    /// All of the caller's panoramas.
    pub async fn mine(&self, identity: &CallerIdentity) -> Result<Vec<Panorama>, CoreError> {
        let user_id = access::require_authenticated(identity)?;
        self.store.find_by_owner(user_id).await
    }
}
