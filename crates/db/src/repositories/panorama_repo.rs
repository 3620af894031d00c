//! Repository for the `panoramas` table.
//!
//! Geometry is stored as `geometry(Point, 4326)` and read back through
//! `ST_X` / `ST_Y` so rows decode without PostGIS client types.

use sqlx::{PgConnection, PgPool};
use trailview_core::geometry::{BoundingBox, Point};
use trailview_core::panorama::{NewPanorama, Orientation};
use trailview_core::types::DbId;

use crate::models::panorama::PanoramaRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ST_X(geom) AS lon, ST_Y(geom) AS lat, heading, pan, tilt, roll, \
    owner_id, authorized, sequence_id, created_at";

/// Filter for panoramas visible to spatial queries.
const PUBLISHED: &str = "authorized = TRUE AND geom IS NOT NULL";

/// Provides CRUD and spatial queries for panoramas.
pub struct PanoramaRepo;

impl PanoramaRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a pending panorama, returning its new id. A missing position
    /// stores a NULL `geom` since `ST_MakePoint` is strict.
    pub async fn create(
        pool: &PgPool,
        input: &NewPanorama,
    ) -> Result<DbId, sqlx::Error> {
        let (lon, lat) = split(input.geometry);
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO panoramas (geom, heading, owner_id, authorized)
             VALUES (
                ST_SetSRID(ST_MakePoint($1, $2), 4326),
                $3, $4, FALSE
             )
             RETURNING id",
        )
        .bind(lon)
        .bind(lat)
        .bind(input.heading)
        .bind(&input.owner_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PanoramaRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM panoramas WHERE id = $1");
        sqlx::query_as::<_, PanoramaRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a panorama. Returns the number of rows removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM panoramas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ── State transitions ────────────────────────────────────────────

    /// Flip a pending panorama to authorized. Already-authorized rows are
    /// not matched, so a repeat returns 0.
    pub async fn set_authorized(
        pool: &PgPool,
        id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE panoramas SET authorized = TRUE WHERE id = $1 AND authorized = FALSE")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_geometry(
        pool: &PgPool,
        id: DbId,
        point: &Point,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE panoramas SET geom = ST_SetSRID(ST_MakePoint($2, $3), 4326) WHERE id = $1",
        )
        .bind(id)
        .bind(point.lon)
        .bind(point.lat)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Update any supplied angles. Only non-`None` fields are applied.
    pub async fn update_orientation(
        pool: &PgPool,
        id: DbId,
        orientation: &Orientation,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE panoramas SET
                pan = COALESCE($2, pan),
                tilt = COALESCE($3, tilt),
                roll = COALESCE($4, roll)
             WHERE id = $1",
        )
        .bind(id)
        .bind(orientation.pan)
        .bind(orientation.tilt)
        .bind(orientation.roll)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    // ── Spatial queries ──────────────────────────────────────────────

    /// Published panoramas by ascending great-circle distance, ties by id.
    pub async fn find_nearby(
        pool: &PgPool,
        point: &Point,
        limit: i64,
    ) -> Result<Vec<PanoramaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM panoramas
             WHERE {PUBLISHED}
             ORDER BY ST_DistanceSphere(geom, ST_SetSRID(ST_MakePoint($1, $2), 4326)), id
             LIMIT $3"
        );
        sqlx::query_as::<_, PanoramaRow>(&query)
            .bind(point.lon)
            .bind(point.lat)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Published panoramas inside the envelope. `&&` on a point is
    /// edge-inclusive.
    pub async fn find_by_bounding_box(
        pool: &PgPool,
        bbox: &BoundingBox,
    ) -> Result<Vec<PanoramaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM panoramas
             WHERE {PUBLISHED} AND geom && ST_MakeEnvelope($1, $2, $3, $4, 4326)
             ORDER BY id"
        );
        sqlx::query_as::<_, PanoramaRow>(&query)
            .bind(bbox.min_lon)
            .bind(bbox.min_lat)
            .bind(bbox.max_lon)
            .bind(bbox.max_lat)
            .fetch_all(pool)
            .await
    }

    // ── Listings ─────────────────────────────────────────────────────

    pub async fn find_unauthorized(
        pool: &PgPool,
    ) -> Result<Vec<PanoramaRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM panoramas WHERE authorized = FALSE ORDER BY id");
        sqlx::query_as::<_, PanoramaRow>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_unpositioned(
        pool: &PgPool,
        owner_id: &str,
    ) -> Result<Vec<PanoramaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM panoramas WHERE owner_id = $1 AND geom IS NULL ORDER BY id"
        );
        sqlx::query_as::<_, PanoramaRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: &str,
    ) -> Result<Vec<PanoramaRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM panoramas WHERE owner_id = $1 ORDER BY id");
        sqlx::query_as::<_, PanoramaRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    // ── Sequences ────────────────────────────────────────────────────

    /// Attach `ids` to `sequence_id`, recording each one's index in the
    /// slice as `sequence_position`. Unknown ids are ignored.
    pub async fn attach_sequence(
        conn: &mut PgConnection,
        ids: &[DbId],
        sequence_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE panoramas p
             SET sequence_id = $2, sequence_position = (m.ord - 1)::int
             FROM unnest($1::bigint[]) WITH ORDINALITY AS m(id, ord)
             WHERE p.id = m.id",
        )
        .bind(ids)
        .bind(sequence_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Member ids of a sequence in route order.
    pub async fn list_sequence_members(
        pool: &PgPool,
        sequence_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM panoramas WHERE sequence_id = $1
             ORDER BY sequence_position NULLS LAST, id",
        )
        .bind(sequence_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

fn split(point: Option<Point>) -> (Option<f64>, Option<f64>) {
    match point {
        Some(p) => (Some(p.lon), Some(p.lat)),
        None => (None, None),
    }
}
