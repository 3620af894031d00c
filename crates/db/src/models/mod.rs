//! Row structs decoded straight from query results.
//!
//! Each row converts into the matching `trailview_core` domain type.

pub mod panorama;
pub mod sequence;
