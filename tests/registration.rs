use maskcorr::{register_translation, MaskCorrError};
use ndarray::{s, Array1, Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn recovers_known_shift_with_partial_masks() {
    let mut rng = StdRng::seed_from_u64(17);
    let scene = Array2::from_shape_fn((20, 20), |_| rng.random::<f64>());

    // The moving image is a patch of the scene at offset (5, 7).
    let moving = scene.slice(s![5..13, 7..16]).to_owned();

    let mut fixed_mask = Array2::from_elem((20, 20), true);
    let mut moving_mask = Array2::from_elem((8, 9), true);
    // Punch a few holes in both masks; the peak must survive them.
    for (y, x) in [(6, 8), (9, 12), (11, 10)] {
        fixed_mask[[y, x]] = false;
    }
    for (y, x) in [(0, 0), (3, 4)] {
        moving_mask[[y, x]] = false;
    }

    let shift = register_translation(
        scene.view().into_dyn(),
        moving.view().into_dyn(),
        fixed_mask.view().into_dyn(),
        moving_mask.view().into_dyn(),
        0.3,
    )
    .unwrap();

    assert_eq!(shift.offsets, vec![5, 7]);
    assert!(shift.score > 0.99);
}

#[test]
fn recovers_negative_shift() {
    let mut rng = StdRng::seed_from_u64(31);
    let scene = Array2::from_shape_fn((20, 20), |_| rng.random::<f64>());

    // Fixed is a crop of the scene, so the scene itself sits at a negative
    // offset relative to it.
    let fixed = scene.slice(s![5.., 7..]).to_owned();
    let fixed_mask = Array2::from_elem(fixed.dim(), true);
    let moving_mask = Array2::from_elem((20, 20), true);

    let shift = register_translation(
        fixed.view().into_dyn(),
        scene.view().into_dyn(),
        fixed_mask.view().into_dyn(),
        moving_mask.view().into_dyn(),
        0.3,
    )
    .unwrap();

    assert_eq!(shift.offsets, vec![-5, -7]);
    assert!(shift.score > 0.99);
}

#[test]
fn works_on_one_dimensional_signals() {
    let mut rng = StdRng::seed_from_u64(45);
    let signal = Array1::from_shape_fn(32, |_| rng.random::<f64>());
    let moving = signal.slice(s![4..24]).to_owned();

    let mask_f = Array1::from_elem(32, true);
    let mask_m = Array1::from_elem(20, true);

    let shift = register_translation(
        signal.view().into_dyn(),
        moving.view().into_dyn(),
        mask_f.view().into_dyn(),
        mask_m.view().into_dyn(),
        0.3,
    )
    .unwrap();

    assert_eq!(shift.offsets, vec![4]);
    assert!(shift.score > 0.99);
}

#[test]
fn propagates_validation_errors() {
    let fixed = Array2::<f64>::zeros((8, 8));
    let moving = Array3::<f64>::zeros((8, 8, 2));
    let mask_f = Array2::from_elem((8, 8), true);
    let mask_m = Array3::from_elem((8, 8, 2), true);

    let err = register_translation(
        fixed.view().into_dyn(),
        moving.view().into_dyn(),
        mask_f.view().into_dyn(),
        mask_m.view().into_dyn(),
        0.3,
    )
    .unwrap_err();
    assert!(matches!(err, MaskCorrError::RankMismatch { .. }));
}
