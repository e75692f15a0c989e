use cloudseg_segmentation::SegmentationError;
use thiserror::Error;

/// Pipeline error type. Every failure is local to the frame that raised it;
/// the next frame starts from a clean slate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
