//! Error types for maskcorr.

use thiserror::Error;

/// Result alias for maskcorr operations.
pub type MaskCorrResult<T> = std::result::Result<T, MaskCorrError>;

/// Errors that can occur when running maskcorr algorithms.
///
/// All variants are raised during input validation, before any transform
/// work starts; no partial results are ever produced.
#[derive(Debug, Error)]
pub enum MaskCorrError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A correlation mode string that is neither `full` nor `same`.
    #[error("correlation mode `{0}` is not valid")]
    UnknownMode(String),
    /// The two images have different rank.
    #[error("rank mismatch: fixed image has {fixed} dimensions, moving image has {moving}")]
    RankMismatch { fixed: usize, moving: usize },
    /// Image extents differ along an axis that is not being transformed.
    #[error("shape mismatch along non-transform axis {axis}: {fixed} vs {moving}")]
    ShapeMismatch {
        axis: usize,
        fixed: usize,
        moving: usize,
    },
    /// A mask does not have the same shape as its image.
    #[error("mask shape {mask:?} does not match image shape {image:?}")]
    MaskShapeMismatch { mask: Vec<usize>, image: Vec<usize> },
    /// A transform axis index is outside the array rank.
    #[error("axis {axis} is out of bounds for an array of rank {ndim}")]
    AxisOutOfBounds { axis: usize, ndim: usize },
}
