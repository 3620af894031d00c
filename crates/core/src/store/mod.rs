//! Panorama store port.
//!
//! The lifecycle orchestrator and sequence assembler depend on this trait
//! only; the PostGIS implementation lives in `trailview-db` and an in-memory
//! implementation lives in [`memory`].
//!
//! Mutations report an affected-row count instead of failing when the target
//! is missing, so callers can tell "not found" (0) from a store failure.

pub mod memory;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::geometry::{BoundingBox, Point};
use crate::panorama::{NewPanorama, Orientation, Panorama};
use crate::sequence::Sequence;
use crate::types::DbId;

pub use memory::MemoryPanoramaStore;

#[async_trait]
pub trait PanoramaStore: Send + Sync {
    /// Insert a pending panorama and return its id.
    async fn create(&self, input: &NewPanorama) -> Result<DbId, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Panorama>, CoreError>;

    /// Closest authorized, positioned panorama. Ties go to the lower id.
    async fn find_nearest(&self, point: &Point) -> Result<Option<Panorama>, CoreError>;

    /// Authorized, positioned panoramas by ascending distance, at most `limit`.
    async fn find_nearby(&self, point: &Point, limit: u32) -> Result<Vec<Panorama>, CoreError>;

    /// Authorized, positioned panoramas inside `bbox` (edges inclusive), by id.
    async fn find_by_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<Panorama>, CoreError>;

    async fn find_unauthorized(&self) -> Result<Vec<Panorama>, CoreError>;

    /// Panoramas owned by `owner_id` that have no geometry yet.
    async fn find_unpositioned(&self, owner_id: &str) -> Result<Vec<Panorama>, CoreError>;

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Panorama>, CoreError>;

    /// Flip `authorized` to true. Returns 0 when already authorized or missing.
    async fn set_authorized(&self, id: DbId) -> Result<u64, CoreError>;

    async fn update_geometry(&self, id: DbId, point: &Point) -> Result<u64, CoreError>;

    /// Apply the present angles of `orientation`, leaving absent ones unchanged.
    async fn update_orientation(&self, id: DbId, orientation: &Orientation)
        -> Result<u64, CoreError>;

    async fn delete(&self, id: DbId) -> Result<u64, CoreError>;

    /// Persist a sequence and attach `member_ids` in order, atomically.
    ///
    /// Callers are expected to pass only existing, distinct ids.
    async fn create_sequence(&self, member_ids: &[DbId]) -> Result<DbId, CoreError>;

    async fn find_sequence(&self, id: DbId) -> Result<Option<Sequence>, CoreError>;

    /// Cheap reachability probe for health reporting.
    async fn health_check(&self) -> Result<(), CoreError>;
}
