#[cfg(test)]
mod test;

use nalgebra::{DVector, RealField};

/// The euclidean inner product `$\langle \vec{a},\vec{b} \rangle$` of two vectors.
/// # Panics
/// Panics if the vectors do not have the same length
pub fn inner<ScalarType>(a: &DVector<ScalarType>, b: &DVector<ScalarType>) -> ScalarType
where
    ScalarType: RealField + Copy,
{
    assert_eq!(
        a.len(),
        b.len(),
        "Vector dimensions incorrect for inner product."
    );
    a.dot(b)
}

/// The euclidean norm `$\Vert \vec{v} \Vert_2$` of a vector.
pub fn norm<ScalarType>(v: &DVector<ScalarType>) -> ScalarType
where
    ScalarType: RealField + Copy,
{
    v.norm()
}

/// true iff every element of the vector is neither NaN nor infinite
pub fn all_finite<ScalarType>(v: &DVector<ScalarType>) -> bool
where
    ScalarType: RealField + Copy,
{
    v.iter().all(|x| x.is_finite())
}

/// Condition number `$\sigma_{max}/\sigma_{min}$` of a matrix, given its singular values.
///
/// The singular values are not required to be ordered. If the smallest singular value
/// is zero (which includes the case of a zero matrix and the case of an empty list of
/// singular values), the matrix is treated as singular and the result is infinite.
pub fn condition_number<ScalarType>(singular_values: &DVector<ScalarType>) -> ScalarType
where
    ScalarType: RealField + Copy,
{
    let largest = singular_values.iter().copied().reduce(ScalarType::max);
    let smallest = singular_values.iter().copied().reduce(ScalarType::min);
    match (largest, smallest) {
        (Some(largest), Some(smallest)) if smallest > ScalarType::zero() => largest / smallest,
        _ => infinity(),
    }
}

/// positive infinity for a real field. This relies on IEEE semantics of the
/// underlying floating point type.
pub(crate) fn infinity<ScalarType>() -> ScalarType
where
    ScalarType: RealField + Copy,
{
    ScalarType::one() / ScalarType::zero()
}

/// lossy conversion for error messages and diagnostics. Values that have no
/// `f64` representation become NaN.
pub(crate) fn as_f64<ScalarType>(value: ScalarType) -> f64
where
    ScalarType: RealField + Copy,
{
    nalgebra::try_convert::<ScalarType, f64>(value).unwrap_or(f64::NAN)
}

pub(crate) fn is_finite_non_negative<ScalarType>(value: ScalarType) -> bool
where
    ScalarType: RealField + Copy,
{
    value.is_finite() && value >= ScalarType::zero()
}

/// true iff `$0 < x < 1$`, which is false for NaN
pub(crate) fn is_in_open_unit_interval<ScalarType>(value: ScalarType) -> bool
where
    ScalarType: RealField + Copy,
{
    value > ScalarType::zero() && value < ScalarType::one()
}
