use cloudseg_core::{PointCloud, PointXYZ};

/// Coordinate-wise arithmetic mean of the cluster's member points.
///
/// Accumulates in f64 so large clusters far from the origin do not lose
/// precision. The result lies within the convex hull of the members.
///
/// The extractor enforces `min_size >= 1`, so `members` is never empty in
/// pipeline use; an empty slice is a caller bug.
pub fn cluster_centroid(cloud: &PointCloud, members: &[usize]) -> PointXYZ {
    debug_assert!(!members.is_empty(), "centroid of an empty cluster");

    let count = members.len() as f64;
    let mut sx = 0.0f64;
    let mut sy = 0.0f64;
    let mut sz = 0.0f64;
    for &idx in members {
        sx += cloud.x[idx] as f64;
        sy += cloud.y[idx] as f64;
        sz += cloud.z[idx] as f64;
    }

    PointXYZ {
        x: (sx / count) as f32,
        y: (sy / count) as f32,
        z: (sz / count) as f32,
    }
}
