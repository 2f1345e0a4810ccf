//! Axis reductions for per-batch thresholds.

use ndarray::{ArrayD, Axis};

/// Maximum over the given axes, keeping each reduced axis as length 1.
///
/// The result broadcasts back against the input shape, which is how the
/// per-batch stability and overlap thresholds are applied: every slice along
/// the non-reduced axes gets its own maximum.
pub(crate) fn fold_max(arr: &ArrayD<f64>, axes: &[usize]) -> ArrayD<f64> {
    let mut sorted = axes.to_vec();
    sorted.sort_unstable();

    let mut reduced = arr.clone();
    for &ax in sorted.iter().rev() {
        reduced = reduced.map_axis(Axis(ax), |lane| {
            lane.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v))
        });
    }
    for &ax in sorted.iter() {
        reduced = reduced.insert_axis(Axis(ax));
    }
    reduced
}

#[cfg(test)]
mod tests {
    use super::fold_max;
    use ndarray::ArrayD;

    #[test]
    fn fold_max_keeps_reduced_axes() {
        let arr = ArrayD::from_shape_vec(vec![2, 3], vec![1.0, 5.0, 2.0, 4.0, 0.0, 3.0]).unwrap();
        let out = fold_max(&arr, &[1]);
        assert_eq!(out.shape(), &[2, 1]);
        assert_eq!(out[[0, 0]], 5.0);
        assert_eq!(out[[1, 0]], 4.0);
    }

    #[test]
    fn fold_max_over_all_axes() {
        let arr = ArrayD::from_shape_vec(vec![2, 2], vec![-3.0, -1.0, -2.0, -4.0]).unwrap();
        let out = fold_max(&arr, &[0, 1]);
        assert_eq!(out.shape(), &[1, 1]);
        assert_eq!(out[[0, 0]], -1.0);
    }

    #[test]
    fn fold_max_broadcasts_against_input() {
        let arr = ArrayD::from_shape_vec(vec![2, 2, 2], (0..8).map(f64::from).collect()).unwrap();
        let out = fold_max(&arr, &[1, 2]);
        assert_eq!(out.shape(), &[2, 1, 1]);
        assert!(out.broadcast(arr.raw_dim()).is_some());
        assert_eq!(out[[0, 0, 0]], 3.0);
        assert_eq!(out[[1, 0, 0]], 7.0);
    }
}
