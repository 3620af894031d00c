//! Sequences: ordered groupings of existing panoramas (walking or driving
//! routes).

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::access;
use crate::error::CoreError;
use crate::identity::CallerIdentity;
use crate::store::PanoramaStore;
use crate::types::{DbId, Timestamp};

/// A persisted sequence with its members in route order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    pub id: DbId,
    pub member_ids: Vec<DbId>,
    pub created_at: Timestamp,
}

/// Builds sequences from caller-supplied panorama ids.
pub struct SequenceAssembler {
    store: Arc<dyn PanoramaStore>,
}

impl SequenceAssembler {
    pub fn new(store: Arc<dyn PanoramaStore>) -> Self {
        Self { store }
    }

    /// Create a sequence from `ids`, in order.
    ///
    /// Ids that do not resolve to a panorama are dropped; repeated ids keep
    /// their first position. Fails with [`CoreError::EmptySequence`] when
    /// nothing resolves.
    pub async fn create(&self, identity: &CallerIdentity, ids: &[DbId]) -> Result<DbId, CoreError> {
        let user_id = access::require_authenticated(identity)?;

        let mut seen = HashSet::with_capacity(ids.len());
        let mut members = Vec::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            if self.store.find_by_id(id).await?.is_some() {
                members.push(id);
            }
        }

        if members.is_empty() {
            return Err(CoreError::EmptySequence);
        }

        let sequence_id = self.store.create_sequence(&members).await?;
        tracing::info!(
            sequence_id,
            user_id,
            requested = ids.len(),
            members = members.len(),
            "Sequence created"
        );
        Ok(sequence_id)
    }

    pub async fn get(&self, id: DbId) -> Result<Sequence, CoreError> {
        self.store
            .find_sequence(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Sequence",
                id,
            })
    }
}
