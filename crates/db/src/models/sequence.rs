//! Sequence row model.

use sqlx::FromRow;
use trailview_core::types::{DbId, Timestamp};

/// A row from the `sequences` table. Members are loaded separately.
#[derive(Debug, Clone, FromRow)]
pub struct SequenceRow {
    pub id: DbId,
    pub created_at: Timestamp,
}
