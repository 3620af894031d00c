//! Repository for the `sequences` table.

use sqlx::PgPool;
use trailview_core::types::DbId;

use super::PanoramaRepo;
use crate::models::sequence::SequenceRow;

const COLUMNS: &str = "id, created_at";

pub struct SequenceRepo;

impl SequenceRepo {
    /// Insert a sequence and attach `member_ids` in one transaction.
    pub async fn create_with_members(pool: &PgPool, member_ids: &[DbId]) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as("INSERT INTO sequences DEFAULT VALUES RETURNING id")
            .fetch_one(&mut *tx)
            .await?;
        let attached = PanoramaRepo::attach_sequence(&mut *tx, member_ids, id).await?;

        tx.commit().await?;
        tracing::debug!(sequence_id = id, attached, "Inserted sequence");
        Ok(id)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SequenceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sequences WHERE id = $1");
        sqlx::query_as::<_, SequenceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
