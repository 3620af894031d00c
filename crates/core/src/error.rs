use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("No panorama IDs could be found")]
    EmptySequence,

    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transcode error: {0}")]
    Transcode(String),
}

impl CoreError {
    /// Shorthand for a missing panorama record or file.
    pub fn panorama_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Panorama",
            id,
        }
    }
}
