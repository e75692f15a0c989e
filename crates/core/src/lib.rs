#![forbid(unsafe_code)]

pub mod bbox;
pub mod cloud;
pub mod point;

pub use bbox::Aabb;
pub use cloud::{Colors, PointCloud};
pub use point::{PointXYZ, PointXYZRGB};
