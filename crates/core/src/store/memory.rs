//! In-process [`PanoramaStore`] backed by ordered maps.
//!
//! Spatial queries are linear scans ranked with
//! [`geometry::order_by_distance`](crate::geometry::order_by_distance). Used
//! by tests and by local runs without PostgreSQL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PanoramaStore;
use crate::error::CoreError;
use crate::geometry::{order_by_distance, BoundingBox, Point};
use crate::panorama::{NewPanorama, Orientation, Panorama};
use crate::sequence::Sequence;
use crate::types::{DbId, Timestamp};

#[derive(Debug)]
struct Row {
    panorama: Panorama,
    sequence_position: Option<usize>,
}

#[derive(Debug, Default)]
struct Inner {
    panoramas: BTreeMap<DbId, Row>,
    sequences: BTreeMap<DbId, Timestamp>,
    last_panorama_id: DbId,
    last_sequence_id: DbId,
}

impl Inner {
    fn published(&self) -> impl Iterator<Item = &Panorama> {
        self.panoramas
            .values()
            .map(|row| &row.panorama)
            .filter(|p| p.authorized && p.geometry.is_some())
    }

    fn attach_sequence(&mut self, ids: &[DbId], sequence_id: DbId) {
        for (position, id) in ids.iter().enumerate() {
            if let Some(row) = self.panoramas.get_mut(id) {
                row.panorama.sequence_id = Some(sequence_id);
                row.sequence_position = Some(position);
            }
        }
    }
}

/// Memory-resident panorama store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryPanoramaStore {
    inner: RwLock<Inner>,
}

impl MemoryPanoramaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `sequence_id` on each existing panorama in `ids`, recording its
    /// position in the slice. Unknown ids are skipped.
    pub async fn attach_sequence(&self, ids: &[DbId], sequence_id: DbId) {
        self.inner.write().await.attach_sequence(ids, sequence_id);
    }
}

fn locate(p: &Panorama) -> Option<(DbId, Point)> {
    p.geometry.map(|point| (p.id, point))
}

#[async_trait]
impl PanoramaStore for MemoryPanoramaStore {
    async fn create(&self, input: &NewPanorama) -> Result<DbId, CoreError> {
        let mut inner = self.inner.write().await;
        inner.last_panorama_id += 1;
        let id = inner.last_panorama_id;
        inner.panoramas.insert(
            id,
            Row {
                panorama: Panorama {
                    id,
                    geometry: input.geometry,
                    heading: input.heading,
                    pan: 0.0,
                    tilt: 0.0,
                    roll: 0.0,
                    owner_id: input.owner_id.clone(),
                    authorized: false,
                    sequence_id: None,
                    created_at: chrono::Utc::now(),
                },
                sequence_position: None,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Panorama>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner.panoramas.get(&id).map(|row| row.panorama.clone()))
    }

    async fn find_nearest(&self, point: &Point) -> Result<Option<Panorama>, CoreError> {
        Ok(self.find_nearby(point, 1).await?.into_iter().next())
    }

    async fn find_nearby(&self, point: &Point, limit: u32) -> Result<Vec<Panorama>, CoreError> {
        let inner = self.inner.read().await;
        let candidates: Vec<Panorama> = inner.published().cloned().collect();
        let mut ranked = order_by_distance(point, candidates, locate);
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn find_by_bounding_box(&self, bbox: &BoundingBox) -> Result<Vec<Panorama>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .published()
            .filter(|p| p.geometry.is_some_and(|g| bbox.contains(&g)))
            .cloned()
            .collect())
    }

    async fn find_unauthorized(&self) -> Result<Vec<Panorama>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .panoramas
            .values()
            .map(|row| &row.panorama)
            .filter(|p| !p.authorized)
            .cloned()
            .collect())
    }

    async fn find_unpositioned(&self, owner_id: &str) -> Result<Vec<Panorama>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .panoramas
            .values()
            .map(|row| &row.panorama)
            .filter(|p| p.geometry.is_none() && p.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Panorama>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .panoramas
            .values()
            .map(|row| &row.panorama)
            .filter(|p| p.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn set_authorized(&self, id: DbId) -> Result<u64, CoreError> {
        let mut inner = self.inner.write().await;
        match inner.panoramas.get_mut(&id) {
            Some(row) if !row.panorama.authorized => {
                row.panorama.authorized = true;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn update_geometry(&self, id: DbId, point: &Point) -> Result<u64, CoreError> {
        let mut inner = self.inner.write().await;
        Ok(match inner.panoramas.get_mut(&id) {
            Some(row) => {
                row.panorama.geometry = Some(*point);
                1
            }
            None => 0,
        })
    }

    async fn update_orientation(
        &self,
        id: DbId,
        orientation: &Orientation,
    ) -> Result<u64, CoreError> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner.panoramas.get_mut(&id) else {
            return Ok(0);
        };
        let pano = &mut row.panorama;
        pano.pan = orientation.pan.unwrap_or(pano.pan);
        pano.tilt = orientation.tilt.unwrap_or(pano.tilt);
        pano.roll = orientation.roll.unwrap_or(pano.roll);
        Ok(1)
    }

    async fn delete(&self, id: DbId) -> Result<u64, CoreError> {
        let mut inner = self.inner.write().await;
        Ok(u64::from(inner.panoramas.remove(&id).is_some()))
    }

    async fn create_sequence(&self, member_ids: &[DbId]) -> Result<DbId, CoreError> {
        let mut inner = self.inner.write().await;
        inner.last_sequence_id += 1;
        let id = inner.last_sequence_id;
        inner.sequences.insert(id, chrono::Utc::now());
        inner.attach_sequence(member_ids, id);
        Ok(id)
    }

    async fn find_sequence(&self, id: DbId) -> Result<Option<Sequence>, CoreError> {
        let inner = self.inner.read().await;
        let Some(created_at) = inner.sequences.get(&id).copied() else {
            return Ok(None);
        };

        let mut members: Vec<(usize, DbId)> = inner
            .panoramas
            .values()
            .filter(|row| row.panorama.sequence_id == Some(id))
            .map(|row| (row.sequence_position.unwrap_or(usize::MAX), row.panorama.id))
            .collect();
        members.sort_unstable();

        Ok(Some(Sequence {
            id,
            member_ids: members.into_iter().map(|(_, id)| id).collect(),
            created_at,
        }))
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
