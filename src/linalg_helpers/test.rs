use super::*;
use approx::assert_relative_eq;
use nalgebra::DVector;

#[test]
fn inner_product_and_norm_produce_correct_results() {
    let a = DVector::<f64>::from(vec![1., 2., 3.]);
    let b = DVector::from(vec![-4., 0.5, 2.]);
    assert_relative_eq!(inner(&a, &b), -4. + 1. + 6.);
    assert_relative_eq!(inner(&a, &a), norm(&a).powi(2), epsilon = 1e-14);
    assert_relative_eq!(norm(&DVector::from(vec![3., 4.])), 5.);
}

#[test]
#[should_panic]
fn inner_product_must_panic_for_vectors_of_different_length() {
    let a = DVector::from(vec![1., 2., 3.]);
    let b = DVector::from(vec![1., 2.]);
    let _ = inner(&a, &b);
}

#[test]
fn finiteness_check_detects_nan_and_infinity() {
    assert!(all_finite(&DVector::from(vec![1., -2., 0.])));
    assert!(!all_finite(&DVector::from(vec![1., f64::NAN, 0.])));
    assert!(!all_finite(&DVector::from(vec![f64::NEG_INFINITY, 1.])));
    assert!(all_finite(&DVector::<f64>::zeros(0)));
}

#[test]
fn condition_number_is_ratio_of_largest_and_smallest_singular_value() {
    assert_relative_eq!(condition_number(&DVector::from(vec![10., 5., 0.5])), 20.);
    // ordering must not matter
    assert_relative_eq!(condition_number(&DVector::from(vec![0.5, 10., 5.])), 20.);
    assert_relative_eq!(condition_number(&DVector::from(vec![3.])), 1.);
}

#[test]
fn condition_number_is_infinite_for_singular_matrices() {
    assert!(condition_number(&DVector::from(vec![2f64, 0.])).is_infinite());
    assert!(condition_number(&DVector::from(vec![0f64, 0.])).is_infinite());
    assert!(condition_number(&DVector::<f64>::zeros(0)).is_infinite());
}

#[test]
fn condition_number_of_svd_of_matrix_with_identical_columns_is_huge() {
    let jacobian = nalgebra::DMatrix::from_row_slice(3, 2, &[1., 1., 2., 2., 3., 3.]);
    let svd = jacobian.svd(false, false);
    let cond = condition_number(&svd.singular_values);
    assert!(cond > 1e12, "condition number {cond} must be very large");
}

#[test]
fn scalar_checks_reject_nan_and_out_of_range_values() {
    assert!(is_finite_non_negative(0f64));
    assert!(is_finite_non_negative(3f32));
    assert!(!is_finite_non_negative(-1e-300f64));
    assert!(!is_finite_non_negative(f64::INFINITY));
    assert!(!is_finite_non_negative(f64::NAN));

    assert!(is_in_open_unit_interval(0.5f64));
    assert!(is_in_open_unit_interval(1e-4f32));
    for value in [0f64, 1., -0.5, 2., f64::NAN] {
        assert!(
            !is_in_open_unit_interval(value),
            "{} must not lie in (0,1)",
            value
        );
    }
}

#[test]
fn conversion_to_f64_keeps_the_value() {
    assert_eq!(as_f64(0.25f32), 0.25);
    assert_eq!(as_f64(-3f64), -3.);
    assert!(as_f64(f32::NAN).is_nan());
}
