//! Masked normalized cross-correlation of N-dimensional arrays.

use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayD, ArrayViewD};

use crate::util::{MaskCorrError, MaskCorrResult};

mod mnxc;

/// Output extent of the correlation surface along the transform axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrelationMode {
    /// Every offset where the two signals overlap at all:
    /// `fixed + moving - 1` along each transform axis.
    Full,
    /// Same extent as the fixed image, centered with respect to the full
    /// output. Boundary effects are less prominent.
    Same,
}

impl CorrelationMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CorrelationMode::Full => "full",
            CorrelationMode::Same => "same",
        }
    }
}

impl fmt::Display for CorrelationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationMode {
    type Err = MaskCorrError;

    fn from_str(s: &str) -> MaskCorrResult<Self> {
        match s {
            "full" => Ok(CorrelationMode::Full),
            "same" => Ok(CorrelationMode::Same),
            other => Err(MaskCorrError::UnknownMode(other.to_string())),
        }
    }
}

/// Parameters for [`masked_cross_correlation`].
///
/// Constructed fresh per call; there is no shared state between
/// invocations.
#[derive(Clone, Debug)]
pub struct MnxcParams {
    /// Output extent along the transform axes.
    pub mode: CorrelationMode,
    /// Axes along which correlation is computed; `None` selects the last
    /// two. All other axes are independent batch dimensions and must match
    /// in size between the two images.
    pub axes: Option<Vec<usize>>,
    /// Minimum fraction of the maximum mask-overlap count required for a
    /// correlation value to be trusted, in `(0, 1]`. Offsets below it are
    /// zeroed.
    pub overlap_ratio: f64,
}

impl Default for MnxcParams {
    fn default() -> Self {
        Self {
            mode: CorrelationMode::Full,
            axes: None,
            overlap_ratio: 0.3,
        }
    }
}

impl MnxcParams {
    /// Resolves the configured axis set against an array rank.
    pub(crate) fn resolve_axes(&self, ndim: usize) -> MaskCorrResult<Vec<usize>> {
        match &self.axes {
            Some(axes) => {
                if axes.is_empty() {
                    return Err(MaskCorrError::InvalidInput("axis set must not be empty"));
                }
                for &ax in axes {
                    if ax >= ndim {
                        return Err(MaskCorrError::AxisOutOfBounds { axis: ax, ndim });
                    }
                }
                let mut sorted = axes.clone();
                sorted.sort_unstable();
                if sorted.windows(2).any(|w| w[0] == w[1]) {
                    return Err(MaskCorrError::InvalidInput(
                        "axis set must not contain duplicates",
                    ));
                }
                Ok(axes.clone())
            }
            None => {
                if ndim < 2 {
                    return Err(MaskCorrError::InvalidInput(
                        "default axis set requires arrays of rank 2 or higher",
                    ));
                }
                Ok(vec![ndim - 2, ndim - 1])
            }
        }
    }
}

/// Computes the masked normalized cross-correlation between two arrays.
///
/// Every sample whose mask entry is `false` contributes nothing to any sum,
/// and the correlation at each offset is corrected for the amount of valid,
/// mutually overlapping data there. Values lie in `[-1, 1]`; offsets whose
/// denominator is numerically unstable or whose mask overlap falls below
/// `overlap_ratio` times the maximum observed overlap are exactly 0.
///
/// The extent along each transform axis follows the mode (`full`:
/// `fixed + moving - 1`, `same`: the fixed extent, centered); extents along
/// all other axes are unchanged and must agree between the two images.
///
/// # Errors
///
/// Fails before any transform work if the images differ in rank or in
/// extent along a non-transform axis, if a mask does not match its image's
/// shape, if the axis set is empty, duplicated, or out of bounds, or if
/// `overlap_ratio` is outside `(0, 1]`.
pub fn masked_cross_correlation(
    fixed: ArrayViewD<'_, f64>,
    moving: ArrayViewD<'_, f64>,
    fixed_mask: ArrayViewD<'_, bool>,
    moving_mask: ArrayViewD<'_, bool>,
    params: &MnxcParams,
) -> MaskCorrResult<ArrayD<f64>> {
    mnxc::mnxc(fixed, moving, fixed_mask, moving_mask, params)
}

#[cfg(test)]
mod tests {
    use super::{CorrelationMode, MnxcParams};
    use crate::util::MaskCorrError;

    #[test]
    fn mode_parses_known_strings() {
        assert_eq!("full".parse::<CorrelationMode>().unwrap(), CorrelationMode::Full);
        assert_eq!("same".parse::<CorrelationMode>().unwrap(), CorrelationMode::Same);
    }

    #[test]
    fn mode_rejects_unknown_strings() {
        let err = "invalid".parse::<CorrelationMode>().unwrap_err();
        assert!(matches!(err, MaskCorrError::UnknownMode(ref s) if s == "invalid"));
    }

    #[test]
    fn default_axes_are_last_two() {
        let params = MnxcParams::default();
        assert_eq!(params.resolve_axes(3).unwrap(), vec![1, 2]);
        assert_eq!(params.resolve_axes(2).unwrap(), vec![0, 1]);
        assert!(params.resolve_axes(1).is_err());
    }

    #[test]
    fn explicit_axes_are_validated() {
        let mut params = MnxcParams {
            axes: Some(vec![0, 2]),
            ..MnxcParams::default()
        };
        assert_eq!(params.resolve_axes(3).unwrap(), vec![0, 2]);

        params.axes = Some(vec![3]);
        assert!(matches!(
            params.resolve_axes(3),
            Err(MaskCorrError::AxisOutOfBounds { axis: 3, ndim: 3 })
        ));

        params.axes = Some(vec![1, 1]);
        assert!(params.resolve_axes(3).is_err());

        params.axes = Some(vec![]);
        assert!(params.resolve_axes(3).is_err());
    }
}
