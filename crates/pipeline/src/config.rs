//! Configuration for the per-frame segmentation pipeline.

/// Pipeline parameters.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Maximum perpendicular distance for a point to count as a plane
    /// inlier during RANSAC.
    /// Default: 0.04m (4cm)
    pub plane_distance_threshold: f32,

    /// Sampling budget for the RANSAC plane search.
    /// Default: 100
    pub ransac_max_iterations: usize,

    /// Refit the plane coefficients by least squares over the final inlier
    /// set. Membership is not recomputed after the refit.
    /// Default: true
    pub optimize_plane_coefficients: bool,

    /// Maximum neighbor distance for the flood-fill cluster merge.
    /// Default: 0.30m (30cm)
    pub cluster_tolerance: f32,

    /// Smallest accepted cluster, in points. Rejects sensor noise blobs.
    /// Default: 100
    pub min_cluster_size: usize,

    /// Largest accepted cluster, in points. Rejects oversized merges such
    /// as residual wall fragments.
    /// Default: 25000
    pub max_cluster_size: usize,

    /// Seed for the RANSAC RNG. `Some` pins plane segmentation to a
    /// reproducible sequence; `None` draws a fresh seed per frame.
    /// Default: None
    pub ransac_seed: Option<u64>,

    /// Frame-of-reference tag stamped on both output clouds.
    /// Default: "world"
    pub frame_id: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            plane_distance_threshold: 0.04,
            ransac_max_iterations: 100,
            optimize_plane_coefficients: true,
            cluster_tolerance: 0.30,
            min_cluster_size: 100,
            max_cluster_size: 25000,
            ransac_seed: None,
            frame_id: "world".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the plane inlier distance threshold.
    pub fn with_plane_distance_threshold(mut self, value: f32) -> Self {
        self.plane_distance_threshold = value;
        self
    }

    /// Builder-style setter for the RANSAC iteration budget.
    pub fn with_ransac_max_iterations(mut self, value: usize) -> Self {
        self.ransac_max_iterations = value;
        self
    }

    /// Builder-style setter for coefficient refinement.
    pub fn with_optimize_plane_coefficients(mut self, value: bool) -> Self {
        self.optimize_plane_coefficients = value;
        self
    }

    /// Builder-style setter for the cluster merge tolerance.
    pub fn with_cluster_tolerance(mut self, value: f32) -> Self {
        self.cluster_tolerance = value;
        self
    }

    /// Builder-style setter for the minimum cluster size.
    pub fn with_min_cluster_size(mut self, value: usize) -> Self {
        self.min_cluster_size = value;
        self
    }

    /// Builder-style setter for the maximum cluster size.
    pub fn with_max_cluster_size(mut self, value: usize) -> Self {
        self.max_cluster_size = value;
        self
    }

    /// Builder-style setter for a pinned RANSAC seed.
    pub fn with_ransac_seed(mut self, seed: u64) -> Self {
        self.ransac_seed = Some(seed);
        self
    }

    /// Builder-style setter for the output frame tag.
    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = frame_id.into();
        self
    }
}
