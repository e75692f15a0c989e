#![forbid(unsafe_code)]

//! Plane removal and euclidean object clustering for 3D point-cloud frames.
//!
//! Each incoming frame is processed independently: the dominant planar
//! surface (floor or wall) is detected with RANSAC and removed, the
//! remaining points are grouped into spatially coherent clusters by
//! flood-fill over a k-d tree, and the result is emitted as a labeled
//! cloud plus one centroid per accepted cluster.

pub use cloudseg_core::{Aabb, Colors, PointCloud, PointXYZ, PointXYZRGB};
pub use cloudseg_pipeline::{
    ClusterSummary, FrameOutput, Pipeline, PipelineConfig, PipelineError,
};
pub use cloudseg_segmentation::{
    extract_clusters, segment_plane, segment_plane_seeded, PlaneModel, SegmentationError,
};
pub use cloudseg_spatial::KdTree;
