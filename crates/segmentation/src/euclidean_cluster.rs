use cloudseg_core::PointCloud;
use cloudseg_spatial::KdTree;
use std::collections::VecDeque;
use tracing::trace;

/// Extracts clusters from a point cloud using Euclidean distance-based
/// connected-component analysis over a caller-supplied spatial index.
///
/// `tree` must have been built over `cloud`; the pipeline builds it once per
/// frame and hands it in. Points transitively connected through neighbor
/// links of length `<= tolerance` form a candidate cluster. A candidate is
/// accepted only if its size falls within `[min_size, max_size]`; the points
/// of a rejected candidate stay excluded from every other cluster in the
/// frame (never re-merged or retried).
///
/// Clusters are emitted in the order their seed point occurs in the cloud,
/// so output is deterministic and reproducible for identical input and
/// parameters. Indices within each cluster are sorted ascending.
pub fn extract_clusters(
    cloud: &PointCloud,
    tree: &KdTree,
    tolerance: f32,
    min_size: usize,
    max_size: usize,
) -> Vec<Vec<usize>> {
    if cloud.is_empty() || tolerance <= 0.0 || min_size == 0 || min_size > max_size {
        return Vec::new();
    }
    debug_assert_eq!(
        tree.len(),
        cloud.len(),
        "tree must be built over the input cloud"
    );

    let n = cloud.len();
    let mut visited = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }

        let mut candidate = Vec::new();
        let mut frontier = VecDeque::new();
        frontier.push_back(seed);
        visited[seed] = true;

        // The fill always runs to completion; the size check is applied to
        // the finished candidate so rejection drops the whole component.
        while let Some(current) = frontier.pop_front() {
            candidate.push(current);

            let neighbors = tree.radius_search(&cloud.point(current), tolerance);
            for neighbor in neighbors {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    frontier.push_back(neighbor);
                }
            }
        }

        if candidate.len() >= min_size && candidate.len() <= max_size {
            candidate.sort_unstable();
            clusters.push(candidate);
        } else {
            trace!(
                seed,
                size = candidate.len(),
                "candidate outside size bounds, dropped"
            );
        }
    }

    clusters
}
