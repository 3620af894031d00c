/// Panorama and sequence primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Opaque user identifier issued by the identity provider. Local accounts and
/// OpenStreetMap accounts (`o<osm-id>`) share this space.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
