//! Panorama lifecycle and spatial query domain.
//!
//! Store-agnostic: persistence is reached through [`store::PanoramaStore`],
//! images through [`files::PanoramaFiles`].

pub mod access;
pub mod error;
pub mod files;
pub mod geometry;
pub mod identity;
pub mod lifecycle;
pub mod metadata;
pub mod panorama;
pub mod sequence;
pub mod store;
pub mod transcode;
pub mod types;
