//! [`PanoramaStore`] backed by PostgreSQL/PostGIS.
//!
//! Thin adapter over the repositories: rows become domain types and every
//! `sqlx::Error` becomes [`CoreError::Store`] at this boundary.

use async_trait::async_trait;
use trailview_core::error::CoreError;
use trailview_core::geometry::{BoundingBox, Point};
use trailview_core::panorama::{NewPanorama, Orientation, Panorama};
use trailview_core::sequence::Sequence;
use trailview_core::store::PanoramaStore;
use trailview_core::types::DbId;

use crate::models::panorama::PanoramaRow;
use crate::repositories::{PanoramaRepo, SequenceRepo};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgPanoramaStore {
    pool: DbPool,
}

impl PgPanoramaStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn store_err(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database query failed");
    CoreError::Store(err.to_string())
}

fn into_panoramas(rows: Vec<PanoramaRow>) -> Vec<Panorama> {
    rows.into_iter().map(Panorama::from).collect()
}

#[async_trait]
impl PanoramaStore for PgPanoramaStore {
    async fn create(&self, input: &NewPanorama) -> Result<DbId, CoreError> {
        PanoramaRepo::create(&self.pool, input).await.map_err(store_err)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Panorama>, CoreError> {
        let row = PanoramaRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?;
        Ok(row.map(Panorama::from))
    }

    async fn find_nearest(&self, point: &Point) -> Result<Option<Panorama>, CoreError> {
        let rows = PanoramaRepo::find_nearby(&self.pool, point, 1)
            .await
            .map_err(store_err)?;
        Ok(rows.into_iter().next().map(Panorama::from))
    }

    async fn find_nearby(&self, point: &Point, limit: u32) -> Result<Vec<Panorama>, CoreError> {
        PanoramaRepo::find_nearby(&self.pool, point, i64::from(limit))
            .await
            .map(into_panoramas)
            .map_err(store_err)
    }

    async fn find_by_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<Panorama>, CoreError> {
        PanoramaRepo::find_by_bounding_box(&self.pool, bbox)
            .await
            .map(into_panoramas)
            .map_err(store_err)
    }

    async fn find_unauthorized(&self) -> Result<Vec<Panorama>, CoreError> {
        PanoramaRepo::find_unauthorized(&self.pool)
            .await
            .map(into_panoramas)
            .map_err(store_err)
    }

    async fn find_unpositioned(&self, owner_id: &str) -> Result<Vec<Panorama>, CoreError> {
        PanoramaRepo::find_unpositioned(&self.pool, owner_id)
            .await
            .map(into_panoramas)
            .map_err(store_err)
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Panorama>, CoreError> {
        PanoramaRepo::find_by_owner(&self.pool, owner_id)
            .await
            .map(into_panoramas)
            .map_err(store_err)
    }

    async fn set_authorized(&self, id: DbId) -> Result<u64, CoreError> {
        PanoramaRepo::set_authorized(&self.pool, id)
            .await
            .map_err(store_err)
    }

    async fn update_geometry(&self, id: DbId, point: &Point) -> Result<u64, CoreError> {
        PanoramaRepo::update_geometry(&self.pool, id, point)
            .await
            .map_err(store_err)
    }

    async fn update_orientation(
        &self,
        id: DbId,
        orientation: &Orientation,
    ) -> Result<u64, CoreError> {
        PanoramaRepo::update_orientation(&self.pool, id, orientation)
            .await
            .map_err(store_err)
    }

    async fn delete(&self, id: DbId) -> Result<u64, CoreError> {
        PanoramaRepo::delete(&self.pool, id).await.map_err(store_err)
    }

    async fn create_sequence(&self, member_ids: &[DbId]) -> Result<DbId, CoreError> {
        SequenceRepo::create_with_members(&self.pool, member_ids)
            .await
            .map_err(store_err)
    }

    async fn find_sequence(&self, id: DbId) -> Result<Option<Sequence>, CoreError> {
        let Some(row) = SequenceRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_err)?
        else {
            return Ok(None);
        };
        let member_ids = PanoramaRepo::list_sequence_members(&self.pool, id)
            .await
            .map_err(store_err)?;
        Ok(Some(Sequence {
            id: row.id,
            member_ids,
            created_at: row.created_at,
        }))
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(store_err)
    }
}
