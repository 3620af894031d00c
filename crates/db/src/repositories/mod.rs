//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument. Steps that must join a
//! caller's transaction take `&mut PgConnection` instead.

pub mod panorama_repo;
pub mod sequence_repo;

pub use panorama_repo::PanoramaRepo;
pub use sequence_repo::SequenceRepo;
