//! Geometric helpers for N-dimensional arrays.
//!
//! `flip_axes` is the N-dimensional analog of rotating an image by 180
//! degrees: frequency-domain multiplication computes a convolution, and
//! correlation is a convolution with one operand mirrored. `centered`
//! extracts the center portion of a larger array, which is how `same`-mode
//! output is produced from a full-length convolution.

use ndarray::{ArrayD, ArrayViewD, Axis, SliceInfoElem};

/// Reverses an array along the given axes, or along every axis when `axes`
/// is `None`.
///
/// The output has the same shape as the input; axes not listed keep their
/// original ordering.
pub fn flip_axes<T: Clone>(arr: ArrayViewD<'_, T>, axes: Option<&[usize]>) -> ArrayD<T> {
    let mut out = arr.to_owned();
    match axes {
        Some(axes) => {
            for &ax in axes {
                out.invert_axis(Axis(ax));
            }
        }
        None => {
            for ax in 0..out.ndim() {
                out.invert_axis(Axis(ax));
            }
        }
    }
    out
}

/// Returns the center `target`-shaped portion of `arr` along the given axes.
///
/// For an axis size difference `d = current - target` the crop starts at
/// `d / 2` with integer floor division, so an odd difference leaves one more
/// element trailing than leading. Axes not listed are left un-sliced.
pub fn centered<T: Clone>(arr: ArrayViewD<'_, T>, target: &[usize], axes: &[usize]) -> ArrayD<T> {
    let mut info: Vec<SliceInfoElem> = vec![
        SliceInfoElem::Slice {
            start: 0,
            end: None,
            step: 1,
        };
        arr.ndim()
    ];
    for &ax in axes {
        let start = (arr.len_of(Axis(ax)) - target[ax]) / 2;
        info[ax] = SliceInfoElem::Slice {
            start: start as isize,
            end: Some((start + target[ax]) as isize),
            step: 1,
        };
    }
    arr.slice(info.as_slice()).to_owned()
}

/// Crops an array to `shape` starting at the origin of every axis.
///
/// Used to discard fast-length transform padding.
pub(crate) fn slice_to<T: Clone>(arr: &ArrayD<T>, shape: &[usize]) -> ArrayD<T> {
    let info: Vec<SliceInfoElem> = shape
        .iter()
        .map(|&end| SliceInfoElem::Slice {
            start: 0,
            end: Some(end as isize),
            step: 1,
        })
        .collect();
    arr.slice(info.as_slice()).to_owned()
}
