#![warn(missing_docs)]
//! a helper crate which carries common code used by the benchtests and the
//! integration tests.
use approx::{AbsDiffEq, RelativeEq};
use nalgebra::{DVector, Scalar};
use num_traits::Float;
use rand::{Rng, SeedableRng};

/// adapters that make the problems of this crate usable with the
/// levenberg_marquardt crate, which serves as a reference solver
pub mod levmar;
/// least squares problems with known solutions
pub mod problems;

/// create holding `count` the elements from range [first,last] with linear spacing. (equivalent to matlabs linspace)
pub fn linspace<ScalarType: Float + Scalar>(
    first: ScalarType,
    last: ScalarType,
    count: usize,
) -> DVector<ScalarType> {
    if count == 1 {
        return DVector::from_element(1, first);
    }
    let n_minus_one = ScalarType::from(count - 1).expect("Could not convert usize to Float");
    let lin: Vec<ScalarType> = (0..count)
        .map(|n| {
            first
                + (last - first) / (n_minus_one)
                    * ScalarType::from(n).expect("Could not convert usize to Float")
        })
        .collect();
    DVector::from(lin)
}

/// add uniformly distributed noise in `[-amplitude,amplitude]` to the given data. The
/// noise is reproducible for the same seed.
pub fn add_uniform_noise(data: &DVector<f64>, amplitude: f64, seed: u64) -> DVector<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    data.map(|value| value + rng.gen_range(-amplitude..=amplitude))
}

/// panics with a readable message if the two parameter vectors do not agree
/// elementwise within the given relative tolerance.
pub fn assert_params_relative_eq<T>(
    left: &DVector<T>,
    right: &DVector<T>,
    max_relative: <T as AbsDiffEq>::Epsilon,
)
where
    T: Scalar + RelativeEq,
    <T as AbsDiffEq>::Epsilon: Copy,
{
    if left.len() != right.len() {
        panic!(
            "Parameter vectors have different lengths: left is {} and right is {}",
            left.len(),
            right.len()
        );
    }

    let equal = left
        .iter()
        .zip(right.iter())
        .all(|(l, r)| l.relative_eq(r, T::default_epsilon(), max_relative));
    if !equal {
        panic!(
            "Parameters are not equal:\nLeft is: {:?}\nRight is: {:?}",
            left.as_slice(),
            right.as_slice()
        );
    }
}
