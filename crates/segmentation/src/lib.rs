#![forbid(unsafe_code)]

pub mod error;
pub mod euclidean_cluster;
pub mod ransac_plane;

pub use error::SegmentationError;
pub use euclidean_cluster::extract_clusters;
pub use ransac_plane::{segment_plane, segment_plane_seeded, PlaneModel};
