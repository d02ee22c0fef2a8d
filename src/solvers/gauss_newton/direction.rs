use super::GaussNewtonBuilderError;
use crate::linalg_helpers::{all_finite, as_f64, is_finite_non_negative};
use nalgebra::{DMatrix, DVector, RealField};

/// The solution `$\Delta\vec{x}$` of the linearized least squares subproblem
/// together with the singular values of the Jacobian.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSolution<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the Gauss-Newton step `$\Delta\vec{x}$`
    pub direction: DVector<ScalarType>,
    /// the singular values of the Jacobian in descending order. These are
    /// only used for diagnostics.
    pub singular_values: DVector<ScalarType>,
}

/// Solves the linear least squares problem
///
/// ```math
/// \min_{\Delta\vec{x}} \Vert \boldsymbol{F}\,\Delta\vec{x} + \vec{f} \Vert_2
/// ```
///
/// for the Gauss-Newton step `$\Delta\vec{x}$`, where `$\boldsymbol{F}$` is the Jacobian
/// and `$\vec{f}$` is the residual at the current iterate.
///
/// Implementations must be free of side effects. Return `None` if the
/// system could not be solved at all.
pub trait DirectionSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// solve the subproblem for the given Jacobian and residual
    fn solve(
        &self,
        jacobian: &DMatrix<ScalarType>,
        residual: &DVector<ScalarType>,
    ) -> Option<LinearSolution<ScalarType>>;
}

/// Solve the linear subproblem using the singular value decomposition of the
/// Jacobian, which gives the minimum norm solution for rank deficient Jacobians.
///
/// Singular values below a truncation epsilon are treated as zero. If no epsilon is
/// given explicitly, it is calculated as `$\sigma_{max} \cdot \max(m,n) \cdot \epsilon_{mach}$`,
/// the same heuristic that Octave uses for its
/// [rank](https://octave.sourceforge.io/octave/function/rank.html) function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvdDirectionSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    epsilon: Option<ScalarType>,
}

impl<ScalarType> Default for SvdDirectionSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<ScalarType> SvdDirectionSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// solver using the rank heuristic for the truncation epsilon
    pub fn new() -> Self {
        Self { epsilon: None }
    }

    /// Solver with a fixed truncation epsilon: singular values smaller than or
    /// equal to this value are considered zero.
    ///
    /// # Returns
    /// The solver, or an error if the epsilon is negative or not finite.
    pub fn with_epsilon(epsilon: ScalarType) -> Result<Self, GaussNewtonBuilderError> {
        if !is_finite_non_negative(epsilon) {
            return Err(GaussNewtonBuilderError::InvalidTruncationEpsilon {
                value: as_f64(epsilon),
            });
        }
        Ok(Self {
            epsilon: Some(epsilon),
        })
    }

    /// the fixed truncation epsilon, if one was given
    pub fn epsilon(&self) -> Option<ScalarType> {
        self.epsilon
    }
}

impl<ScalarType> DirectionSolver<ScalarType> for SvdDirectionSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    fn solve(
        &self,
        jacobian: &DMatrix<ScalarType>,
        residual: &DVector<ScalarType>,
    ) -> Option<LinearSolution<ScalarType>> {
        // the decomposition does not necessarily terminate for non-finite input
        if !jacobian.iter().all(|v| v.is_finite()) || !all_finite(residual) {
            return None;
        }

        let max_dim = jacobian.nrows().max(jacobian.ncols());
        let svd = jacobian.clone().svd(true, true);

        let epsilon = self.epsilon.unwrap_or_else(|| {
            svd.singular_values.max()
                * nalgebra::convert::<f64, ScalarType>(max_dim as f64)
                * ScalarType::default_epsilon()
        });

        let direction = svd.solve(&(-residual), epsilon).ok()?;
        Some(LinearSolution {
            direction,
            singular_values: svd.singular_values,
        })
    }
}
