//! Translation registration on top of the correlation surface.
//!
//! The peak of a full-mode masked cross-correlation surface is the offset
//! that best aligns the moving image with the fixed image. This module runs
//! the kernel over every axis, locates that peak deterministically, and
//! converts the peak index into a signed per-axis displacement.

use std::cmp::Ordering;

use ndarray::{ArrayViewD, Axis, Dimension};

use crate::util::{MaskCorrError, MaskCorrResult};
use crate::xcorr::{masked_cross_correlation, CorrelationMode, MnxcParams};

/// Estimated displacement of the moving image relative to the fixed image.
#[derive(Clone, Debug, PartialEq)]
pub struct Shift {
    /// Signed offset per axis; applying it to the moving image aligns it
    /// with the fixed image.
    pub offsets: Vec<isize>,
    /// Correlation value at the peak, in `[-1, 1]`.
    pub score: f64,
}

/// Estimates the translation between two masked images.
///
/// Runs a full-mode masked cross-correlation over every axis and returns
/// the displacement at the surface maximum. Ties are broken toward the
/// lexicographically smallest index so results are deterministic.
///
/// # Errors
///
/// Propagates kernel validation failures (rank/shape/mask mismatches, bad
/// `overlap_ratio`).
pub fn register_translation(
    fixed: ArrayViewD<'_, f64>,
    moving: ArrayViewD<'_, f64>,
    fixed_mask: ArrayViewD<'_, bool>,
    moving_mask: ArrayViewD<'_, bool>,
    overlap_ratio: f64,
) -> MaskCorrResult<Shift> {
    let axes: Vec<usize> = (0..fixed.ndim()).collect();
    let params = MnxcParams {
        mode: CorrelationMode::Full,
        axes: Some(axes.clone()),
        overlap_ratio,
    };
    let surface = masked_cross_correlation(fixed, moving.view(), fixed_mask, moving_mask, &params)?;

    let mut best: Option<(Vec<usize>, f64)> = None;
    for (idx, &value) in surface.indexed_iter() {
        let better = match &best {
            Some((_, score)) => value.total_cmp(score) == Ordering::Greater,
            None => true,
        };
        if better {
            best = Some((idx.slice().to_vec(), value));
        }
    }
    let (peak, score) = best.ok_or(MaskCorrError::InvalidInput(
        "correlation surface is empty",
    ))?;

    // Peak index p on axis a corresponds to displacement p - (moving - 1).
    let offsets = axes
        .iter()
        .map(|&ax| peak[ax] as isize - (moving.len_of(Axis(ax)) as isize - 1))
        .collect();

    Ok(Shift { offsets, score })
}
