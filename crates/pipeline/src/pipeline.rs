use crate::centroid::cluster_centroid;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::label::{label_color, label_for, UNCLUSTERED_COLOR};
use cloudseg_core::{Colors, PointCloud, PointXYZ};
use cloudseg_segmentation::{extract_clusters, segment_plane, segment_plane_seeded};
use cloudseg_spatial::KdTree;
use tracing::debug;

/// One accepted cluster: its label, size and centroid, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub label: u32,
    pub size: usize,
    pub centroid: PointXYZ,
    pub color: [u8; 3],
}

/// The two output clouds of one frame plus per-cluster summaries.
///
/// Both clouds share the same frame-of-reference tag.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Every outlier (non-plane) point, colored by its cluster's display
    /// color; unclustered points carry the neutral default color.
    pub labeled_cloud: PointCloud,
    /// Exactly one point per accepted cluster, in emission order.
    pub centroid_cloud: PointCloud,
    /// Per-cluster label, size and centroid, in emission order.
    pub clusters: Vec<ClusterSummary>,
    /// Frame-of-reference tag for both clouds.
    pub frame_id: String,
}

/// Per-frame segmentation pipeline.
///
/// Each call to [`process`](Pipeline::process) is self-contained: every
/// intermediate structure (plane model, spatial index, visited flags) is
/// built fresh for the frame and dropped with it, so no state leaks across
/// frames. The pipeline holds only its configuration and takes `&self`;
/// frames are expected to arrive strictly sequentially, and any queuing or
/// dropping of frames is the transport layer's concern.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one frame.
    ///
    /// Runs plane removal, clustering and labeling, and assembles the
    /// labeled cloud and centroid cloud.
    ///
    /// # Errors
    ///
    /// Returns an error for clouds with fewer than 3 points; the frame is
    /// skipped and no outputs are produced. Zero plane inliers and zero
    /// clusters are both valid outcomes, not errors.
    pub fn process(&self, cloud: &PointCloud) -> Result<FrameOutput> {
        let cfg = &self.config;

        let (_, inliers) = match cfg.ransac_seed {
            Some(seed) => segment_plane_seeded(
                cloud,
                cfg.plane_distance_threshold,
                cfg.ransac_max_iterations,
                cfg.optimize_plane_coefficients,
                seed,
            )?,
            None => segment_plane(
                cloud,
                cfg.plane_distance_threshold,
                cfg.ransac_max_iterations,
                cfg.optimize_plane_coefficients,
            )?,
        };

        // Everything that is not on the plane, in input order.
        let outliers = cloud.select_inverse(&inliers);

        let tree = KdTree::build(&outliers);
        let clusters = extract_clusters(
            &outliers,
            &tree,
            cfg.cluster_tolerance,
            cfg.min_cluster_size,
            cfg.max_cluster_size,
        );

        let summaries: Vec<ClusterSummary> = clusters
            .iter()
            .enumerate()
            .map(|(position, members)| {
                let label = label_for(position);
                ClusterSummary {
                    label,
                    size: members.len(),
                    centroid: cluster_centroid(&outliers, members),
                    color: label_color(label),
                }
            })
            .collect();

        debug!(
            frame_points = cloud.len(),
            plane_inliers = inliers.len(),
            outliers = outliers.len(),
            clusters = summaries.len(),
            "frame processed"
        );

        let labeled_cloud = paint_clusters(&outliers, &clusters, &summaries);
        let centroid_cloud = centroid_cloud(&summaries);

        Ok(FrameOutput {
            labeled_cloud,
            centroid_cloud,
            clusters: summaries,
            frame_id: cfg.frame_id.clone(),
        })
    }
}

/// The outlier cloud with every point colored by its cluster, neutral where
/// unclustered. Point order is the outlier cloud's order.
fn paint_clusters(
    outliers: &PointCloud,
    clusters: &[Vec<usize>],
    summaries: &[ClusterSummary],
) -> PointCloud {
    let mut labeled = outliers.clone();
    let mut colors = Colors::uniform(outliers.len(), UNCLUSTERED_COLOR);

    for (members, summary) in clusters.iter().zip(summaries) {
        for &idx in members {
            colors.r[idx] = summary.color[0];
            colors.g[idx] = summary.color[1];
            colors.b[idx] = summary.color[2];
        }
    }

    labeled.colors = Some(colors);
    labeled
}

/// One point per cluster centroid, in emission order.
fn centroid_cloud(summaries: &[ClusterSummary]) -> PointCloud {
    let mut x = Vec::with_capacity(summaries.len());
    let mut y = Vec::with_capacity(summaries.len());
    let mut z = Vec::with_capacity(summaries.len());
    for summary in summaries {
        x.push(summary.centroid.x);
        y.push(summary.centroid.y);
        z.push(summary.centroid.z);
    }
    PointCloud::from_xyz(x, y, z)
}
