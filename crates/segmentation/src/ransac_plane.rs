use crate::SegmentationError;
use cloudseg_core::PointCloud;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::debug;

/// A 3D plane model in the form `n . x + d = 0`, where `n` is a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneModel {
    pub normal: [f32; 3],
    pub d: f32,
}

impl PlaneModel {
    /// Computes the absolute distance from a point to this plane.
    /// Assumes `normal` is a unit vector.
    #[inline]
    pub fn distance_to_point(&self, point: &[f32; 3]) -> f32 {
        (self.normal[0] * point[0] + self.normal[1] * point[1] + self.normal[2] * point[2] + self.d)
            .abs()
    }
}

impl Default for PlaneModel {
    fn default() -> Self {
        Self {
            normal: [0.0, 0.0, 1.0],
            d: 0.0,
        }
    }
}

/// Cloud size above which inlier counting uses rayon. Counting is
/// order-independent, so the parallel path returns the same result.
const PARALLEL_COUNT_MIN: usize = 10_000;

/// Fits a plane to the point cloud using RANSAC with an entropy seed.
///
/// For reproducible results, use [`segment_plane_seeded`] instead.
pub fn segment_plane(
    cloud: &PointCloud,
    distance_threshold: f32,
    max_iterations: usize,
    optimize_coefficients: bool,
) -> Result<(PlaneModel, Vec<usize>), SegmentationError> {
    let seed = rand::thread_rng().next_u64();
    segment_plane_seeded(
        cloud,
        distance_threshold,
        max_iterations,
        optimize_coefficients,
        seed,
    )
}

/// Fits a plane to the point cloud using RANSAC with a deterministic seed:
/// identical cloud, parameters and seed give bit-identical output.
///
/// # Algorithm
///
/// 1. Pre-generate the full sample budget of index triples upfront.
/// 2. For each triple, fit the through-plane and score it by inlier count;
///    a collinear triple is discarded but still consumes its slot.
/// 3. Keep the highest-scoring model, ties broken by first-found. The whole
///    budget is always consumed so the winning inlier count is monotone in
///    `distance_threshold` for a fixed seed.
/// 4. Collect the winner's inliers over the whole cloud in index order.
/// 5. If `optimize_coefficients` is set, refit the plane by least squares
///    over the inlier set. Inlier membership is NOT recomputed afterwards.
///
/// # Errors
///
/// Returns [`SegmentationError::InsufficientData`] for clouds with fewer
/// than 3 points. A budget with no valid sample (e.g. an all-collinear
/// cloud) is not an error: the result is an empty inlier set and a default,
/// unused model.
pub fn segment_plane_seeded(
    cloud: &PointCloud,
    distance_threshold: f32,
    max_iterations: usize,
    optimize_coefficients: bool,
    seed: u64,
) -> Result<(PlaneModel, Vec<usize>), SegmentationError> {
    let n = cloud.len();
    if n < 3 {
        return Err(SegmentationError::InsufficientData { points: n });
    }

    // Pre-extract points into contiguous array for cache-friendly access
    let points: Vec<[f32; 3]> = (0..n).map(|i| cloud.point(i)).collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let samples: Vec<(usize, usize, usize)> = (0..max_iterations)
        .filter_map(|_| sample_three_distinct(n, &mut rng))
        .collect();

    let mut best: Option<(PlaneModel, usize)> = None;

    for &(i0, i1, i2) in &samples {
        let model = match fit_plane_from_three_points(&points[i0], &points[i1], &points[i2]) {
            Some(m) => m,
            None => continue,
        };

        let count = count_inliers(&points, &model, distance_threshold);
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((model, count));
        }
    }

    let Some((mut model, score)) = best else {
        debug!(points = n, "no valid plane sample in budget, cloud passes through");
        return Ok((PlaneModel::default(), Vec::new()));
    };

    // Collect inlier indices for the best model, in cloud order.
    let inliers: Vec<usize> = if n >= PARALLEL_COUNT_MIN {
        (0..n)
            .into_par_iter()
            .filter(|&j| model.distance_to_point(&points[j]) <= distance_threshold)
            .collect()
    } else {
        (0..n)
            .filter(|&j| model.distance_to_point(&points[j]) <= distance_threshold)
            .collect()
    };

    if optimize_coefficients {
        if let Some(refined) = least_squares_refit(&points, &inliers, &model) {
            model = refined;
        }
    }

    debug!(
        points = n,
        inliers = inliers.len(),
        score,
        "plane segmentation complete"
    );

    Ok((model, inliers))
}

#[inline]
fn count_inliers(points: &[[f32; 3]], model: &PlaneModel, threshold: f32) -> usize {
    if points.len() >= PARALLEL_COUNT_MIN {
        points
            .par_iter()
            .filter(|p| model.distance_to_point(p) <= threshold)
            .count()
    } else {
        points
            .iter()
            .filter(|p| model.distance_to_point(p) <= threshold)
            .count()
    }
}

/// Samples 3 distinct indices in [0, n).
fn sample_three_distinct(n: usize, rng: &mut StdRng) -> Option<(usize, usize, usize)> {
    if n < 3 {
        return None;
    }
    let i0 = rng.gen_range(0..n);
    let mut i1 = rng.gen_range(0..n);
    let mut attempts = 0;
    while i1 == i0 {
        if attempts > 100 {
            return None;
        }
        i1 = rng.gen_range(0..n);
        attempts += 1;
    }
    let mut i2 = rng.gen_range(0..n);
    attempts = 0;
    while i2 == i0 || i2 == i1 {
        if attempts > 100 {
            return None;
        }
        i2 = rng.gen_range(0..n);
        attempts += 1;
    }
    Some((i0, i1, i2))
}

/// Fits a plane through 3 points, returning `None` if they are collinear.
fn fit_plane_from_three_points(p0: &[f32; 3], p1: &[f32; 3], p2: &[f32; 3]) -> Option<PlaneModel> {
    let v1 = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let v2 = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];

    // Cross product: v1 x v2
    let nx = v1[1] * v2[2] - v1[2] * v2[1];
    let ny = v1[2] * v2[0] - v1[0] * v2[2];
    let nz = v1[0] * v2[1] - v1[1] * v2[0];

    let len = (nx * nx + ny * ny + nz * nz).sqrt();

    if len < 1e-10 {
        // Points are collinear (or coincident)
        return None;
    }

    let normal = [nx / len, ny / len, nz / len];
    let d = -(normal[0] * p0[0] + normal[1] * p0[1] + normal[2] * p0[2]);

    Some(PlaneModel { normal, d })
}

/// Least-squares plane fit over the inlier set.
///
/// The refined normal is the eigenvector of the smallest eigenvalue of the
/// inlier covariance matrix, oriented to agree with the sampled normal, and
/// `d` passes the plane through the inlier centroid. Returns `None` when
/// the fit is degenerate (fewer than 3 inliers or a rank-deficient
/// covariance), in which case the sampled coefficients stand.
fn least_squares_refit(
    points: &[[f32; 3]],
    inliers: &[usize],
    sampled: &PlaneModel,
) -> Option<PlaneModel> {
    if inliers.len() < 3 {
        return None;
    }

    let count = inliers.len() as f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    let mut cz = 0.0f64;
    for &idx in inliers {
        cx += points[idx][0] as f64;
        cy += points[idx][1] as f64;
        cz += points[idx][2] as f64;
    }
    cx /= count;
    cy /= count;
    cz /= count;

    // Upper triangle of the 3x3 covariance matrix (symmetric)
    let mut c00 = 0.0f64;
    let mut c01 = 0.0f64;
    let mut c02 = 0.0f64;
    let mut c11 = 0.0f64;
    let mut c12 = 0.0f64;
    let mut c22 = 0.0f64;
    for &idx in inliers {
        let dx = points[idx][0] as f64 - cx;
        let dy = points[idx][1] as f64 - cy;
        let dz = points[idx][2] as f64 - cz;
        c00 += dx * dx;
        c01 += dx * dy;
        c02 += dx * dz;
        c11 += dy * dy;
        c12 += dy * dz;
        c22 += dz * dz;
    }

    let (mut nx, mut ny, mut nz) = smallest_eigenvector_3x3(c00, c01, c02, c11, c12, c22)?;

    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len < 1e-12 {
        return None;
    }
    nx /= len;
    ny /= len;
    nz /= len;

    // Keep the orientation the sampling stage chose
    let dot = nx * sampled.normal[0] as f64
        + ny * sampled.normal[1] as f64
        + nz * sampled.normal[2] as f64;
    if dot < 0.0 {
        nx = -nx;
        ny = -ny;
        nz = -nz;
    }

    let d = -(nx * cx + ny * cy + nz * cz);

    Some(PlaneModel {
        normal: [nx as f32, ny as f32, nz as f32],
        d: d as f32,
    })
}

/// Eigenvector of the smallest eigenvalue of a 3x3 symmetric matrix, via
/// Cardano's analytical formula for the eigenvalues and a cross-product of
/// rows of `A - λI` for the eigenvector. Returns `None` for a (near) zero
/// or isotropic matrix, where every direction is an eigenvector.
///
/// The matrix is:
///   | a00  a01  a02 |
///   | a01  a11  a12 |
///   | a02  a12  a22 |
fn smallest_eigenvector_3x3(
    a00: f64,
    a01: f64,
    a02: f64,
    a11: f64,
    a12: f64,
    a22: f64,
) -> Option<(f64, f64, f64)> {
    let m = (a00 + a11 + a22) / 3.0;

    // Shift: B = A - mI
    let b00 = a00 - m;
    let b11 = a11 - m;
    let b22 = a22 - m;

    // q = det(B) / 2
    let q = (b00 * (b11 * b22 - a12 * a12) - a01 * (a01 * b22 - a12 * a02)
        + a02 * (a01 * a12 - b11 * a02))
        / 2.0;

    // p = sum of squares of B entries / 6
    let p = (b00 * b00 + b11 * b11 + b22 * b22 + 2.0 * (a01 * a01 + a02 * a02 + a12 * a12)) / 6.0;

    let pp = p.max(0.0);
    if pp < 1e-30 {
        // Zero or scalar multiple of identity
        return None;
    }

    let det_ratio = (q / (pp * pp.sqrt())).clamp(-1.0, 1.0);
    let phi = det_ratio.acos() / 3.0;

    // Eigenvalues sorted eig0 <= eig1 <= eig2
    let sqrt_p = pp.sqrt();
    let eig0 = m + 2.0 * sqrt_p * (phi + 2.0 * std::f64::consts::FRAC_PI_3).cos();
    let lambda = eig0;

    // (A - λI) has rank <= 2, so a cross product of two of its rows spans
    // the null space (the eigenvector). Try row pairs until one is stable.
    let r00 = a00 - lambda;
    let r11 = a11 - lambda;
    let r22 = a22 - lambda;

    let candidates = [
        (
            a01 * a12 - r11 * a02,
            a02 * a01 - a12 * r00,
            r00 * r11 - a01 * a01,
        ),
        (
            a01 * r22 - a12 * a02,
            a02 * a02 - r22 * r00,
            r00 * a12 - a01 * a02,
        ),
        (
            r11 * r22 - a12 * a12,
            a12 * a02 - r22 * a01,
            a01 * a12 - r11 * a02,
        ),
    ];

    for (ex, ey, ez) in candidates {
        let len2 = ex * ex + ey * ey + ez * ez;
        if len2 >= 1e-30 {
            let inv = 1.0 / len2.sqrt();
            return Some((ex * inv, ey * inv, ez * inv));
        }
    }

    None
}
