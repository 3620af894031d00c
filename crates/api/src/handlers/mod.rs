pub mod panorama;
pub mod sequence;
