#![forbid(unsafe_code)]

pub mod centroid;
pub mod config;
pub mod error;
pub mod label;
pub mod pipeline;

pub use centroid::cluster_centroid;
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use label::{label_color, LABEL_BASE, UNCLUSTERED_COLOR};
pub use pipeline::{ClusterSummary, FrameOutput, Pipeline};
