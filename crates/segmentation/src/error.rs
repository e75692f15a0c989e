use thiserror::Error;

/// Errors from the segmentation stage.
///
/// Zero plane inliers is NOT an error: a frame where no plane fits within
/// tolerance passes through clustering unmodified.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationError {
    /// The cloud cannot define a plane; the frame is skipped.
    #[error("plane segmentation needs at least 3 points, got {points}")]
    InsufficientData { points: usize },
}
