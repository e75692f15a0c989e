//! Per-cluster labels and display colors.
//!
//! Labels count up from [`LABEL_BASE`] in cluster emission order and are
//! stable only within one frame. The display color walks the hue circle by
//! the golden angle per label, which keeps any realistic number of clusters
//! per frame (tens) visually and numerically distinct.

/// First label assigned in each frame.
pub const LABEL_BASE: u32 = 1;

/// Color for outlier points that ended up in no accepted cluster.
pub const UNCLUSTERED_COLOR: [u8; 3] = [128, 128, 128];

/// Hue step between consecutive labels, in degrees (the golden angle).
const HUE_STEP_DEG: f32 = 137.508;

const SATURATION: f32 = 0.85;
const VALUE: f32 = 0.95;

/// Label for the cluster at `position` in emission order.
pub fn label_for(position: usize) -> u32 {
    LABEL_BASE + position as u32
}

/// Deterministic display color for a label.
pub fn label_color(label: u32) -> [u8; 3] {
    let hue = (label as f32 * HUE_STEP_DEG) % 360.0;
    hsv_to_rgb(hue, SATURATION, VALUE)
}

/// Standard HSV to RGB conversion; `h` in degrees, `s` and `v` in [0, 1].
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let c = v * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());

    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let m = v - c;
    [
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn labels_count_up_from_base() {
        assert_eq!(label_for(0), LABEL_BASE);
        assert_eq!(label_for(1), LABEL_BASE + 1);
        assert_eq!(label_for(41), LABEL_BASE + 41);
    }

    #[test]
    fn colors_are_deterministic() {
        for label in 0..100 {
            assert_eq!(label_color(label), label_color(label));
        }
    }

    #[test]
    fn colors_distinct_for_a_frame_of_clusters() {
        // Injective over the practical tens-of-clusters range.
        let colors: HashSet<[u8; 3]> = (0..64).map(label_color).collect();
        assert_eq!(colors.len(), 64);
    }

    #[test]
    fn no_label_color_collides_with_unclustered_gray() {
        for label in 0..256 {
            assert_ne!(label_color(label), UNCLUSTERED_COLOR);
        }
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(0.0, 0.0, 0.0), [0, 0, 0]);
    }
}
