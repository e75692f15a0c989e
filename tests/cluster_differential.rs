//! Differential correctness tests for flood-fill cluster extraction.
//!
//! Compares `extract_clusters` against a brute-force union-find reference
//! implementation to catch any silent regressions in the k-d tree or the
//! fill itself.

use cloudseg_core::PointCloud;
use cloudseg_segmentation::extract_clusters;
use cloudseg_spatial::KdTree;
use rand::prelude::*;

// ────────────────── Brute-force reference ──────────────────

/// O(n^2) brute-force connected-components clustering for correctness
/// reference. Output is normalized to extraction order: indices ascending
/// within a cluster, clusters ordered by their smallest index (the seed of
/// a component is always its lowest index).
fn brute_force_cluster(
    cloud: &PointCloud,
    distance_threshold: f32,
    min_size: usize,
    max_size: usize,
) -> Vec<Vec<usize>> {
    let n = cloud.len();
    if n == 0 || distance_threshold <= 0.0 || min_size == 0 {
        return Vec::new();
    }

    let r2 = distance_threshold * distance_threshold;

    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    fn union(parent: &mut [usize], a: usize, b: usize) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent[rb] = ra;
        }
    }

    for i in 0..n {
        let (xi, yi, zi) = (cloud.x[i], cloud.y[i], cloud.z[i]);
        for j in (i + 1)..n {
            let dx = xi - cloud.x[j];
            let dy = yi - cloud.y[j];
            let dz = zi - cloud.z[j];
            if dx * dx + dy * dy + dz * dz <= r2 {
                union(&mut parent, i, j);
            }
        }
    }

    let mut components: std::collections::HashMap<usize, Vec<usize>> =
        std::collections::HashMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        components.entry(root).or_default().push(i);
    }

    let mut clusters: Vec<Vec<usize>> = components
        .into_values()
        .filter(|c| c.len() >= min_size && c.len() <= max_size)
        .collect();

    for c in &mut clusters {
        c.sort_unstable();
    }
    clusters.sort_by_key(|c| c[0]);
    clusters
}

fn cluster(
    cloud: &PointCloud,
    distance_threshold: f32,
    min_size: usize,
    max_size: usize,
) -> Vec<Vec<usize>> {
    let tree = KdTree::build(cloud);
    extract_clusters(cloud, &tree, distance_threshold, min_size, max_size)
}

// ────────────────── 1. Differential correctness ──────────────────

#[test]
fn differential_random_small_clouds() {
    let mut rng = StdRng::seed_from_u64(42);

    for trial in 0..200 {
        let n = rng.gen_range(2..80);
        let threshold = rng.gen_range(0.5f32..5.0);

        let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-20.0..20.0)).collect();
        let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-20.0..20.0)).collect();
        let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-20.0..20.0)).collect();
        let cloud = PointCloud::from_xyz(x, y, z);

        let got = cluster(&cloud, threshold, 1, n);
        let expected = brute_force_cluster(&cloud, threshold, 1, n);

        assert_eq!(
            got, expected,
            "trial {}: n={}, threshold={:.2} — clusters differ",
            trial, n, threshold
        );
    }
}

#[test]
fn differential_medium_clouds() {
    let mut rng = StdRng::seed_from_u64(99);

    for trial in 0..20 {
        let n = rng.gen_range(500..2000);
        let threshold = rng.gen_range(1.0f32..8.0);

        let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-50.0..50.0)).collect();
        let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-50.0..50.0)).collect();
        let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-50.0..50.0)).collect();
        let cloud = PointCloud::from_xyz(x, y, z);

        let got = cluster(&cloud, threshold, 1, n);
        let expected = brute_force_cluster(&cloud, threshold, 1, n);

        assert_eq!(
            got, expected,
            "trial {}: n={}, threshold={:.2} — clusters differ",
            trial, n, threshold
        );
    }
}

#[test]
fn differential_with_size_bounds() {
    let mut rng = StdRng::seed_from_u64(7);

    for trial in 0..50 {
        let n = rng.gen_range(10..200);
        let threshold = rng.gen_range(0.5f32..4.0);
        let min_size = rng.gen_range(1..6);
        let max_size = rng.gen_range(min_size..n);

        let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-15.0..15.0)).collect();
        let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-15.0..15.0)).collect();
        let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-15.0..15.0)).collect();
        let cloud = PointCloud::from_xyz(x, y, z);

        let got = cluster(&cloud, threshold, min_size, max_size);
        let expected = brute_force_cluster(&cloud, threshold, min_size, max_size);

        assert_eq!(
            got, expected,
            "trial {}: n={}, threshold={:.2}, bounds=[{},{}]",
            trial, n, threshold, min_size, max_size
        );
    }
}

// ────────────────── 2. Boundary / precision tests ──────────────────

#[test]
fn points_exactly_at_threshold() {
    // Two points exactly distance_threshold apart should be connected (<=)
    let cloud = PointCloud::from_xyz(vec![0.0, 1.0], vec![0.0, 0.0], vec![0.0, 0.0]);
    let clusters = cluster(&cloud, 1.0, 1, 100);
    assert_eq!(clusters.len(), 1, "points at exact threshold should be connected");
    assert_eq!(clusters[0], vec![0, 1]);
}

#[test]
fn points_just_beyond_threshold() {
    let d = 1.0f32 + 1e-4;
    let cloud = PointCloud::from_xyz(vec![0.0, d], vec![0.0, 0.0], vec![0.0, 0.0]);
    let clusters = cluster(&cloud, 1.0, 1, 100);
    assert_eq!(clusters.len(), 2, "points beyond threshold should be separate");
}

#[test]
fn very_large_coordinates() {
    let base = 1e6_f32;
    let cloud = PointCloud::from_xyz(
        vec![base, base + 0.1, base + 0.2, base + 100.0],
        vec![base, base, base, base],
        vec![0.0, 0.0, 0.0, 0.0],
    );
    let clusters = cluster(&cloud, 0.5, 1, 100);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0], vec![0, 1, 2]);
    assert_eq!(clusters[1], vec![3]);
}

#[test]
fn very_small_threshold() {
    // With tiny threshold, each point is its own cluster
    let cloud = PointCloud::from_xyz(
        vec![0.0, 1.0, 2.0],
        vec![0.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0],
    );
    let clusters = cluster(&cloud, 1e-6, 1, 100);
    assert_eq!(clusters.len(), 3);
    for c in &clusters {
        assert_eq!(c.len(), 1);
    }
}

// ────────────────── 3. Metamorphic invariants ──────────────────

#[test]
fn shuffled_cloud_same_membership() {
    let mut rng = StdRng::seed_from_u64(55);
    let n = 200;
    let threshold = 2.0;

    let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
    let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
    let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
    let cloud = PointCloud::from_xyz(x.clone(), y.clone(), z.clone());

    let original_clusters = cluster(&cloud, threshold, 1, n);

    let mut membership_orig = vec![usize::MAX; n];
    for (cid, members) in original_clusters.iter().enumerate() {
        for &idx in members {
            membership_orig[idx] = cid;
        }
    }

    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(&mut rng);
    let sx: Vec<f32> = perm.iter().map(|&i| x[i]).collect();
    let sy: Vec<f32> = perm.iter().map(|&i| y[i]).collect();
    let sz: Vec<f32> = perm.iter().map(|&i| z[i]).collect();
    let shuffled = PointCloud::from_xyz(sx, sy, sz);

    let shuffled_clusters = cluster(&shuffled, threshold, 1, n);

    let mut membership_shuffled = vec![usize::MAX; n];
    for (cid, members) in shuffled_clusters.iter().enumerate() {
        for &new_idx in members {
            membership_shuffled[perm[new_idx]] = cid;
        }
    }

    assert_eq!(original_clusters.len(), shuffled_clusters.len());

    // Co-membership is invariant under permutation of the input order
    for i in 0..n {
        for j in (i + 1)..n {
            let same_orig = membership_orig[i] == membership_orig[j];
            let same_shuf = membership_shuffled[i] == membership_shuffled[j];
            assert_eq!(
                same_orig, same_shuf,
                "points {} and {} have different co-membership after shuffle",
                i, j
            );
        }
    }
}

#[test]
fn translated_cloud_same_membership() {
    let mut rng = StdRng::seed_from_u64(66);
    let n = 150;
    let threshold = 3.0;

    // Lattice coordinates: multiples of 0.25 stay exactly representable
    // after the translation below, so distances are preserved bit-for-bit.
    let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-40i32..40) as f32 * 0.25).collect();
    let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-40i32..40) as f32 * 0.25).collect();
    let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-40i32..40) as f32 * 0.25).collect();
    let cloud = PointCloud::from_xyz(x.clone(), y.clone(), z.clone());

    let original = cluster(&cloud, threshold, 1, n);

    let offset = 1024.0_f32;
    let tx: Vec<f32> = x.iter().map(|v| v + offset).collect();
    let ty: Vec<f32> = y.iter().map(|v| v + offset).collect();
    let tz: Vec<f32> = z.iter().map(|v| v + offset).collect();
    let translated = PointCloud::from_xyz(tx, ty, tz);

    let translated_result = cluster(&translated, threshold, 1, n);

    assert_eq!(
        original, translated_result,
        "translation should not change cluster membership"
    );
}

#[test]
fn duplicate_points_stable() {
    let cloud = PointCloud::from_xyz(
        vec![0.0, 0.0, 0.0, 10.0, 10.0],
        vec![0.0, 0.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 0.0],
    );
    let clusters = cluster(&cloud, 1.0, 1, 100);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0], vec![0, 1, 2]);
    assert_eq!(clusters[1], vec![3, 4]);
}

// ────────────────── 4. Determinism / soak test ──────────────────

#[test]
fn determinism_repeated_runs() {
    let mut rng = StdRng::seed_from_u64(77);
    let n = 500;
    let threshold = 2.0;

    let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-20.0..20.0)).collect();
    let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-20.0..20.0)).collect();
    let z: Vec<f32> = (0..n).map(|_| rng.gen_range(-20.0..20.0)).collect();
    let cloud = PointCloud::from_xyz(x, y, z);

    let reference = cluster(&cloud, threshold, 1, n);

    for run in 0..500 {
        let result = cluster(&cloud, threshold, 1, n);
        assert_eq!(result, reference, "non-deterministic output on run {}", run);
    }
}
