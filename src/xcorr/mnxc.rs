//! Fourier-domain masked cross-correlation kernel.
//!
//! Correlating only over the valid overlap region biases both the raw
//! cross-correlation and the per-offset variances. The kernel removes that
//! bias with overlap statistics computed from the two masks: the number of
//! co-valid samples at each offset, and the sum of each image over the
//! region the *other* mask covers. All transforms run at fast (5-smooth)
//! lengths and the padding is discarded before thresholds are applied.

use ndarray::{ArrayD, ArrayViewD, Axis, Zip};
use num_complex::Complex64;

use crate::fft::{fftn, ifftn, next_fast_len};
use crate::ndim::{centered, flip_axes, slice_to};
use crate::trace::{trace_event, trace_span};
use crate::util::reduce::fold_max;
use crate::util::{MaskCorrError, MaskCorrResult};
use crate::xcorr::{CorrelationMode, MnxcParams};

fn to_complex(arr: &ArrayD<f64>) -> ArrayD<Complex64> {
    arr.mapv(|v| Complex64::new(v, 0.0))
}

fn real_part(arr: &ArrayD<Complex64>) -> ArrayD<f64> {
    arr.mapv(|v| v.re)
}

fn validate(
    fixed: &ArrayViewD<'_, f64>,
    moving: &ArrayViewD<'_, f64>,
    fixed_mask: &ArrayViewD<'_, bool>,
    moving_mask: &ArrayViewD<'_, bool>,
    axes: &[usize],
    overlap_ratio: f64,
) -> MaskCorrResult<()> {
    if !(overlap_ratio > 0.0 && overlap_ratio <= 1.0) {
        return Err(MaskCorrError::InvalidInput(
            "overlap_ratio must lie in (0, 1]",
        ));
    }
    if fixed.ndim() != moving.ndim() {
        return Err(MaskCorrError::RankMismatch {
            fixed: fixed.ndim(),
            moving: moving.ndim(),
        });
    }
    if fixed_mask.shape() != fixed.shape() {
        return Err(MaskCorrError::MaskShapeMismatch {
            mask: fixed_mask.shape().to_vec(),
            image: fixed.shape().to_vec(),
        });
    }
    if moving_mask.shape() != moving.shape() {
        return Err(MaskCorrError::MaskShapeMismatch {
            mask: moving_mask.shape().to_vec(),
            image: moving.shape().to_vec(),
        });
    }
    if fixed.shape().iter().any(|&n| n == 0) || moving.shape().iter().any(|&n| n == 0) {
        return Err(MaskCorrError::InvalidInput("images must be non-empty"));
    }
    for axis in 0..fixed.ndim() {
        if axes.contains(&axis) {
            continue;
        }
        let (f, m) = (fixed.len_of(Axis(axis)), moving.len_of(Axis(axis)));
        if f != m {
            return Err(MaskCorrError::ShapeMismatch {
                axis,
                fixed: f,
                moving: m,
            });
        }
    }
    Ok(())
}

pub(super) fn mnxc(
    fixed: ArrayViewD<'_, f64>,
    moving: ArrayViewD<'_, f64>,
    fixed_mask: ArrayViewD<'_, bool>,
    moving_mask: ArrayViewD<'_, bool>,
    params: &MnxcParams,
) -> MaskCorrResult<ArrayD<f64>> {
    let axes = params.resolve_axes(fixed.ndim())?;
    validate(
        &fixed,
        &moving,
        &fixed_mask,
        &moving_mask,
        &axes,
        params.overlap_ratio,
    )?;

    let _span = trace_span!(
        "mnxc",
        ndim = fixed.ndim(),
        transform_axes = axes.len(),
        mode = params.mode.as_str()
    )
    .entered();

    let eps = f64::EPSILON;

    // Masked-out samples contribute nothing to any sum.
    let mut fixed_image = fixed.to_owned();
    Zip::from(&mut fixed_image)
        .and(&fixed_mask)
        .for_each(|v, &ok| {
            if !ok {
                *v = 0.0;
            }
        });
    let mut moving_image = moving.to_owned();
    Zip::from(&mut moving_image)
        .and(&moving_mask)
        .for_each(|v, &ok| {
            if !ok {
                *v = 0.0;
            }
        });

    // Full-convolution extent: every offset where the signals overlap.
    let mut final_shape = fixed.shape().to_vec();
    for &ax in &axes {
        final_shape[ax] = fixed.len_of(Axis(ax)) + moving.len_of(Axis(ax)) - 1;
    }
    let fast_lengths: Vec<usize> = axes.iter().map(|&ax| next_fast_len(final_shape[ax])).collect();

    let fixed_mask_f = fixed_mask.mapv(|m| if m { 1.0 } else { 0.0 });
    let moving_mask_f = moving_mask.mapv(|m| if m { 1.0 } else { 0.0 });

    // Mirror the moving operands over the transform axes so that frequency-
    // domain multiplication computes correlation instead of convolution.
    let rotated_moving = flip_axes(moving_image.view(), Some(&axes));
    let rotated_moving_mask = flip_axes(moving_mask_f.view(), Some(&axes));

    let fixed_fft = fftn(&to_complex(&fixed_image), &axes, &fast_lengths);
    let rotated_moving_fft = fftn(&to_complex(&rotated_moving), &axes, &fast_lengths);
    let fixed_mask_fft = fftn(&to_complex(&fixed_mask_f), &axes, &fast_lengths);
    let rotated_moving_mask_fft = fftn(&to_complex(&rotated_moving_mask), &axes, &fast_lengths);

    // Number of positions where both masks are simultaneously valid, per
    // offset. The true count is integral; only transform round-trip noise
    // perturbs it, so round to nearest and floor at eps to keep divisions
    // finite.
    let mut overlap = real_part(&ifftn(
        &(&rotated_moving_mask_fft * &fixed_mask_fft),
        &axes,
        &fast_lengths,
    ));
    overlap.mapv_inplace(|v| v.round().max(eps));

    // Sum of each image over the region the opposite mask covers.
    let masked_fixed = real_part(&ifftn(
        &(&rotated_moving_mask_fft * &fixed_fft),
        &axes,
        &fast_lengths,
    ));
    let masked_moving = real_part(&ifftn(
        &(&fixed_mask_fft * &rotated_moving_fft),
        &axes,
        &fast_lengths,
    ));

    // Raw cross-correlation minus the product of local means scaled by the
    // overlap count.
    let mut numerator = real_part(&ifftn(
        &(&rotated_moving_fft * &fixed_fft),
        &axes,
        &fast_lengths,
    ));
    Zip::from(&mut numerator)
        .and(&masked_fixed)
        .and(&masked_moving)
        .and(&overlap)
        .for_each(|n, &f, &m, &c| *n -= f * m / c);

    // Variance-like terms; round-off can push them slightly negative, which
    // must be clamped rather than propagated into the square root.
    let fixed_sq_fft = fftn(&to_complex(&fixed_image.mapv(|v| v * v)), &axes, &fast_lengths);
    let mut fixed_denom = real_part(&ifftn(
        &(&rotated_moving_mask_fft * &fixed_sq_fft),
        &axes,
        &fast_lengths,
    ));
    Zip::from(&mut fixed_denom)
        .and(&masked_fixed)
        .and(&overlap)
        .for_each(|d, &f, &c| *d = (*d - f * f / c).max(0.0));

    let rotated_moving_sq_fft = fftn(
        &to_complex(&rotated_moving.mapv(|v| v * v)),
        &axes,
        &fast_lengths,
    );
    let mut moving_denom = real_part(&ifftn(
        &(&fixed_mask_fft * &rotated_moving_sq_fft),
        &axes,
        &fast_lengths,
    ));
    Zip::from(&mut moving_denom)
        .and(&masked_moving)
        .and(&overlap)
        .for_each(|d, &m, &c| *d = (*d - m * m / c).max(0.0));

    let mut denom = fixed_denom;
    Zip::from(&mut denom)
        .and(&moving_denom)
        .for_each(|d, &m| *d = (*d * m).sqrt());

    // Discard the fast-length padding.
    let mut numerator = slice_to(&numerator, &final_shape);
    let mut denom = slice_to(&denom, &final_shape);
    let mut overlap = slice_to(&overlap, &final_shape);

    if params.mode == CorrelationMode::Same {
        numerator = centered(numerator.view(), fixed.shape(), &axes);
        denom = centered(denom.view(), fixed.shape(), &axes);
        overlap = centered(overlap.view(), fixed.shape(), &axes);
    }

    // Near-zero denominators would amplify noise; suppress those offsets to
    // exactly 0 instead of dividing.
    let tol = fold_max(&denom.mapv(f64::abs), &axes).mapv(|m| 1e3 * eps * m);
    let tol = tol
        .broadcast(denom.raw_dim())
        .expect("kept-axes reduction broadcasts against its source");

    let mut out = ArrayD::zeros(denom.raw_dim());
    Zip::from(&mut out)
        .and(&numerator)
        .and(&denom)
        .and(&tol)
        .for_each(|o, &n, &d, &t| {
            if d > t {
                *o = (n / d).clamp(-1.0, 1.0);
            }
        });

    // Offsets with too little mutual valid coverage are not trustworthy and
    // are forced to zero rather than left as spurious near-unit peaks.
    let threshold = fold_max(&overlap, &axes).mapv(|m| params.overlap_ratio * m);
    let threshold = threshold
        .broadcast(out.raw_dim())
        .expect("kept-axes reduction broadcasts against its source");
    Zip::from(&mut out)
        .and(&overlap)
        .and(&threshold)
        .for_each(|o, &c, &t| {
            if c < t {
                *o = 0.0;
            }
        });

    trace_event!("mnxc_surface", elements = out.len());
    Ok(out)
}
