use crate::{Aabb, PointXYZRGB};

/// A 3D point cloud in struct-of-arrays layout.
///
/// Point order is the input order and is preserved through every filtering
/// operation, so downstream consumers see a deterministic sequence for a
/// given input frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Option<Colors>,
}

/// Per-point RGB color channels, parallel to the coordinate arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Colors {
    /// A uniform color repeated for `n` points.
    pub fn uniform(n: usize, rgb: [u8; 3]) -> Self {
        Self {
            r: vec![rgb[0]; n],
            g: vec![rgb[1]; n],
            b: vec![rgb[2]; n],
        }
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    /// Build from interleaved `[x0, y0, z0, x1, y1, z1, ...]` data, as
    /// handed over by a transport layer.
    pub fn from_array(data: &[f32], num_points: usize) -> Self {
        assert_eq!(
            data.len(),
            num_points * 3,
            "interleaved xyz input must have num_points * 3 floats"
        );

        let mut x = Vec::with_capacity(num_points);
        let mut y = Vec::with_capacity(num_points);
        let mut z = Vec::with_capacity(num_points);

        for chunk in data.chunks_exact(3).take(num_points) {
            x.push(chunk[0]);
            y.push(chunk[1]);
            z.push(chunk[2]);
        }

        Self::from_xyz(x, y, z)
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Point `i` together with its color channel, if the cloud carries one.
    pub fn rgb_point(&self, i: usize) -> Option<PointXYZRGB> {
        let c = self.colors.as_ref()?;
        Some(PointXYZRGB {
            x: self.x[i],
            y: self.y[i],
            z: self.z[i],
            r: c.r[i],
            g: c.g[i],
            b: c.b[i],
        })
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self { x, y, z, colors }
    }

    /// Select all points NOT in the given index set.
    ///
    /// This is the complement of [`select`]: if `select` returns points at
    /// the given indices, `select_inverse` returns all the rest.
    ///
    /// The returned cloud preserves the relative order of the retained points.
    ///
    /// # Panics
    ///
    /// Panics if any index in `indices` is out of bounds.
    pub fn select_inverse(&self, indices: &[usize]) -> Self {
        let n = self.len();
        let mut exclude = vec![false; n];
        for &idx in indices {
            assert!(idx < n, "index out of bounds in select_inverse");
            exclude[idx] = true;
        }

        let kept: Vec<usize> = (0..n).filter(|&i| !exclude[i]).collect();
        self.select(&kept)
    }

    pub fn to_array(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 3);
        for i in 0..self.len() {
            out.push(self.x[i]);
            out.push(self.y[i]);
            out.push(self.z[i]);
        }
        out
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
