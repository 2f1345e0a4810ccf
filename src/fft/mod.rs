//! N-dimensional Fourier transforms over an axis subset.
//!
//! Built on `rustfft`: each requested axis is transformed in turn by
//! gathering lanes into a contiguous buffer, running the planned FFT, and
//! scattering the result back. Axes not listed pass through unchanged, so a
//! `(2, 3, 7)` array transformed along axes `(0, 1)` with lengths `(4, 4)`
//! yields a `(4, 4, 7)` spectrum. Inputs are zero-padded (or truncated) to
//! the requested per-axis lengths before transforming; the inverse divides
//! by the product of the transformed-axis lengths.

use std::sync::Arc;

use ndarray::{ArrayD, Axis, IxDyn, SliceInfoElem};
use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftDirection, FftPlanner};

#[cfg(feature = "rayon")]
use ndarray::Zip;

/// Returns the smallest 5-smooth length greater than or equal to `n`.
///
/// Lengths whose only prime factors are 2, 3, and 5 admit efficient
/// mixed-radix transforms. Padding to such a length is purely a performance
/// choice: zero-padding semantics keep the cropped result exact.
pub fn next_fast_len(mut n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    loop {
        let mut m = n;
        for p in [2, 3, 5] {
            while m % p == 0 {
                m /= p;
            }
        }
        if m == 1 {
            return n;
        }
        n += 1;
    }
}

/// Zero-pads or truncates `arr` to `lengths` along `axes`.
pub(crate) fn pad_to<T: Clone + Zero>(arr: &ArrayD<T>, axes: &[usize], lengths: &[usize]) -> ArrayD<T> {
    let mut target = arr.shape().to_vec();
    for (&ax, &len) in axes.iter().zip(lengths) {
        target[ax] = len;
    }
    if target == arr.shape() {
        return arr.clone();
    }

    let mut out = ArrayD::zeros(IxDyn(&target));
    let keep: Vec<SliceInfoElem> = arr
        .shape()
        .iter()
        .zip(&target)
        .map(|(&have, &want)| SliceInfoElem::Slice {
            start: 0,
            end: Some(have.min(want) as isize),
            step: 1,
        })
        .collect();
    out.slice_mut(keep.as_slice()).assign(&arr.slice(keep.as_slice()));
    out
}

/// Forward transform along `axes`, padded/truncated to `lengths`.
pub fn fftn(input: &ArrayD<Complex64>, axes: &[usize], lengths: &[usize]) -> ArrayD<Complex64> {
    transform(input, axes, lengths, FftDirection::Forward)
}

/// Inverse transform along `axes`, padded/truncated to `lengths`.
///
/// Applies the `1/N` normalization over the transformed axes only, matching
/// the forward/inverse round-trip convention of `numpy.fft`.
pub fn ifftn(input: &ArrayD<Complex64>, axes: &[usize], lengths: &[usize]) -> ArrayD<Complex64> {
    let mut out = transform(input, axes, lengths, FftDirection::Inverse);
    let scale: usize = axes.iter().map(|&ax| out.len_of(Axis(ax))).product();
    let scale = 1.0 / scale as f64;
    out.mapv_inplace(|v| v * scale);
    out
}

fn transform(
    input: &ArrayD<Complex64>,
    axes: &[usize],
    lengths: &[usize],
    direction: FftDirection,
) -> ArrayD<Complex64> {
    debug_assert_eq!(axes.len(), lengths.len());
    let mut work = pad_to(input, axes, lengths);
    let mut planner = FftPlanner::new();
    for &ax in axes {
        let n = work.len_of(Axis(ax));
        if n < 2 {
            // A length-1 transform is the identity.
            continue;
        }
        let plan = planner.plan_fft(n, direction);
        apply_along_axis(&mut work, ax, &plan);
    }
    work
}

/// Runs a planned 1-D FFT over every lane of `work` along axis `ax`.
///
/// Lanes are copied through a contiguous buffer because they are not
/// contiguous in memory for most axes.
fn apply_along_axis(work: &mut ArrayD<Complex64>, ax: usize, plan: &Arc<dyn Fft<f64>>) {
    #[cfg(feature = "rayon")]
    {
        Zip::from(work.lanes_mut(Axis(ax))).par_for_each(|mut lane| {
            let mut buf: Vec<Complex64> = lane.iter().copied().collect();
            plan.process(&mut buf);
            for (dst, src) in lane.iter_mut().zip(&buf) {
                *dst = *src;
            }
        });
    }
    #[cfg(not(feature = "rayon"))]
    {
        let n = work.len_of(Axis(ax));
        let mut buf = vec![Complex64::new(0.0, 0.0); n];
        let mut scratch = vec![Complex64::new(0.0, 0.0); plan.get_inplace_scratch_len()];
        for mut lane in work.lanes_mut(Axis(ax)) {
            for (dst, src) in buf.iter_mut().zip(lane.iter()) {
                *dst = *src;
            }
            plan.process_with_scratch(&mut buf, &mut scratch);
            for (dst, src) in lane.iter_mut().zip(&buf) {
                *dst = *src;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fftn, ifftn, next_fast_len, pad_to};
    use ndarray::ArrayD;
    use num_complex::Complex64;

    fn ramp(shape: &[usize]) -> ArrayD<Complex64> {
        let len: usize = shape.iter().product();
        ArrayD::from_shape_vec(
            shape.to_vec(),
            (0..len)
                .map(|i| Complex64::new(i as f64 * 0.25 + 1.0, 0.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn next_fast_len_is_identity_on_smooth_lengths() {
        for n in [1, 2, 3, 4, 5, 6, 8, 9, 10, 12, 15, 16, 60, 120, 128] {
            assert_eq!(next_fast_len(n), n);
        }
    }

    #[test]
    fn next_fast_len_rounds_up_rough_lengths() {
        assert_eq!(next_fast_len(7), 8);
        assert_eq!(next_fast_len(11), 12);
        assert_eq!(next_fast_len(13), 15);
        assert_eq!(next_fast_len(17), 18);
        assert_eq!(next_fast_len(97), 100);
    }

    #[test]
    fn roundtrip_over_axis_subset() {
        let arr = ramp(&[3, 4, 5]);
        let axes = [0, 2];
        let lengths = [3, 5];
        let spectrum = fftn(&arr, &axes, &lengths);
        let back = ifftn(&spectrum, &axes, &lengths);
        for (orig, got) in arr.iter().zip(back.iter()) {
            assert!((orig.re - got.re).abs() < 1e-10);
            assert!(got.im.abs() < 1e-10);
        }
    }

    #[test]
    fn padding_matches_manual_zero_pad() {
        let arr = ramp(&[4, 3]);
        let padded = pad_to(&arr, &[0, 1], &[6, 5]);
        let direct = fftn(&arr, &[0, 1], &[6, 5]);
        let via_pad = fftn(&padded, &[0, 1], &[6, 5]);
        for (a, b) in direct.iter().zip(via_pad.iter()) {
            assert!((a - b).norm() < 1e-10);
        }
    }

    #[test]
    fn untransformed_axes_pass_through() {
        // Transform along axis 1 only; axis-0 slices must stay independent.
        let arr = ramp(&[2, 4]);
        let spectrum = fftn(&arr, &[1], &[4]);
        assert_eq!(spectrum.shape(), &[2, 4]);
        for row in 0..2 {
            // DC bin equals the row sum.
            let sum: Complex64 = (0..4).map(|c| arr[[row, c]]).sum();
            assert!((spectrum[[row, 0]] - sum).norm() < 1e-10);
        }
    }

    #[test]
    fn pad_to_zero_fills_new_region() {
        let arr = ramp(&[2, 2]);
        let padded = pad_to(&arr, &[0, 1], &[3, 4]);
        assert_eq!(padded.shape(), &[3, 4]);
        assert_eq!(padded[[0, 0]], arr[[0, 0]]);
        assert_eq!(padded[[2, 3]], Complex64::new(0.0, 0.0));
    }
}
