use cloudseg_core::{Aabb, PointCloud};

/// Leaf capacity. Subsets at or below this size are scanned linearly.
const LEAF_SIZE: usize = 16;

#[derive(Debug, Clone)]
enum Node {
    /// A contiguous range `[start, start + len)` of the permuted index array.
    Leaf { start: u32, len: u32 },
    /// Binary split at `value` on `axis`; left subtree holds coordinates
    /// `<= value`, right subtree holds coordinates `>= value`.
    Split {
        axis: u8,
        value: f32,
        left: u32,
        right: u32,
    },
}

/// A static k-d tree for radius queries on 3D point clouds.
///
/// Built once per frame over a point set and never modified afterwards.
/// Nodes live in a flat arena and leaves reference contiguous ranges of a
/// single permuted index array, so the whole structure is three allocations
/// regardless of point count.
///
/// Each internal node splits on the axis of greatest coordinate spread at
/// the median element, which keeps queries at expected O(log n) on
/// well-distributed data. Pathological distributions degrade toward O(n)
/// per query; that is tolerated, not optimized.
///
/// Indices returned by queries map back to the original `PointCloud`.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<[f32; 3]>,
    order: Vec<u32>,
    nodes: Vec<Node>,
    root: u32,
}

impl KdTree {
    /// Build a tree from a PointCloud.
    ///
    /// The build reads the cloud once and never mutates it. An empty cloud
    /// produces an empty tree whose queries return empty sets.
    pub fn build(cloud: &PointCloud) -> Self {
        let n = cloud.len();
        let points: Vec<[f32; 3]> = (0..n).map(|i| cloud.point(i)).collect();
        let mut order: Vec<u32> = (0..n as u32).collect();
        let mut nodes = Vec::new();

        let root = if n == 0 {
            0
        } else {
            build_node(&points, &mut order, 0, n, &mut nodes)
        };

        Self {
            points,
            order,
            nodes,
            root,
        }
    }

    /// Returns the number of points in the tree.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Find all points within `radius` (Euclidean distance) of `query`.
    ///
    /// The boundary is inclusive: points at exactly `radius` are returned.
    /// Indices are sorted ascending for deterministic downstream iteration.
    ///
    /// Edge cases:
    /// - Returns empty if the tree is empty, radius is non-positive or
    ///   non-finite, or the query contains a non-finite coordinate.
    pub fn radius_search(&self, query: &[f32; 3], radius: f32) -> Vec<usize> {
        if self.is_empty()
            || radius <= 0.0
            || !radius.is_finite()
            || !query.iter().all(|v| v.is_finite())
        {
            return Vec::new();
        }

        let radius_sq = radius * radius;
        let mut out = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            match &self.nodes[id as usize] {
                Node::Leaf { start, len } => {
                    let range = *start as usize..(*start + *len) as usize;
                    for &idx in &self.order[range] {
                        let p = self.points[idx as usize];
                        let dx = p[0] - query[0];
                        let dy = p[1] - query[1];
                        let dz = p[2] - query[2];
                        if dx * dx + dy * dy + dz * dz <= radius_sq {
                            out.push(idx as usize);
                        }
                    }
                }
                Node::Split {
                    axis,
                    value,
                    left,
                    right,
                } => {
                    let delta = query[*axis as usize] - value;
                    if delta <= radius {
                        stack.push(*left);
                    }
                    if delta >= -radius {
                        stack.push(*right);
                    }
                }
            }
        }

        out.sort_unstable();
        out
    }
}

/// Recursively build the subtree over `order[start..end]`, returning the
/// arena id of its root node.
fn build_node(
    points: &[[f32; 3]],
    order: &mut [u32],
    start: usize,
    end: usize,
    nodes: &mut Vec<Node>,
) -> u32 {
    let len = end - start;

    if len <= LEAF_SIZE {
        nodes.push(Node::Leaf {
            start: start as u32,
            len: len as u32,
        });
        return (nodes.len() - 1) as u32;
    }

    let bounds = Aabb::from_indexed(points, &order[start..end]);
    let axis = bounds.widest_axis();

    // Zero spread means every (finite) coordinate is identical; splitting
    // would recurse forever, so the subset becomes an oversized leaf.
    if bounds.extent()[axis] <= 0.0 {
        nodes.push(Node::Leaf {
            start: start as u32,
            len: len as u32,
        });
        return (nodes.len() - 1) as u32;
    }

    let mid = len / 2;
    order[start..end].select_nth_unstable_by(mid, |&a, &b| {
        points[a as usize][axis].total_cmp(&points[b as usize][axis])
    });
    let value = points[order[start + mid] as usize][axis];

    // Reserve this node's slot before recursing so child ids are stable.
    let id = nodes.len() as u32;
    nodes.push(Node::Leaf { start: 0, len: 0 });

    let left = build_node(points, order, start, start + mid, nodes);
    let right = build_node(points, order, start + mid, end, nodes);

    nodes[id as usize] = Node::Split {
        axis: axis as u8,
        value,
        left,
        right,
    };
    id
}
