use nalgebra::{DMatrix, DVector, RealField};

/// A nonlinear least squares problem `$\min_{\vec{x}} \Vert \vec{f}(\vec{x}) \Vert_2$`,
/// described by its residual `$\vec{f}:\mathbb{R}^n \rightarrow \mathbb{R}^m$` and the
/// Jacobian `$\boldsymbol{F}(\vec{x}) = \partial \vec{f}/\partial \vec{x}$`.
///
/// Implementations must be reentrant: the solver evaluates the residual many
/// times per iteration (inside the line search) and never mutates the problem.
pub trait LeastSquaresProblem<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the residual vector `$\vec{f}(\vec{x})$` of length `$m$`
    fn residual(&self, x: &DVector<ScalarType>) -> DVector<ScalarType>;

    /// the Jacobian matrix `$\boldsymbol{F}(\vec{x})$` of the residual with
    /// `$m$` rows and `$n$` columns, where column `$j$` contains the partial
    /// derivative with respect to `$x_j$`.
    fn jacobian(&self, x: &DVector<ScalarType>) -> DMatrix<ScalarType>;
}

/// Adapter that turns a pair of closures for the residual and the Jacobian
/// into a [LeastSquaresProblem].
/// ```rust
/// # use nalgebra::{DMatrix, DVector};
/// # use gnls::problem::{FnProblem, LeastSquaresProblem};
/// let problem = FnProblem::new(
///     |x: &DVector<f64>| x.map(|xi| xi - 5.),
///     |x: &DVector<f64>| DMatrix::identity(x.len(), x.len()),
/// );
/// let r = problem.residual(&DVector::from(vec![1.]));
/// assert_eq!(r[0], -4.);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnProblem<Residual, Jacobian> {
    residual: Residual,
    jacobian: Jacobian,
}

impl<Residual, Jacobian> FnProblem<Residual, Jacobian> {
    /// create a problem from the residual function and its Jacobian
    pub fn new(residual: Residual, jacobian: Jacobian) -> Self {
        Self { residual, jacobian }
    }
}

impl<ScalarType, Residual, Jacobian> LeastSquaresProblem<ScalarType>
    for FnProblem<Residual, Jacobian>
where
    ScalarType: RealField + Copy,
    Residual: Fn(&DVector<ScalarType>) -> DVector<ScalarType>,
    Jacobian: Fn(&DVector<ScalarType>) -> DMatrix<ScalarType>,
{
    #[inline]
    fn residual(&self, x: &DVector<ScalarType>) -> DVector<ScalarType> {
        (self.residual)(x)
    }

    #[inline]
    fn jacobian(&self, x: &DVector<ScalarType>) -> DMatrix<ScalarType> {
        (self.jacobian)(x)
    }
}

impl<ScalarType, Problem> LeastSquaresProblem<ScalarType> for &Problem
where
    ScalarType: RealField + Copy,
    Problem: LeastSquaresProblem<ScalarType> + ?Sized,
{
    fn residual(&self, x: &DVector<ScalarType>) -> DVector<ScalarType> {
        (**self).residual(x)
    }

    fn jacobian(&self, x: &DVector<ScalarType>) -> DMatrix<ScalarType> {
        (**self).jacobian(x)
    }
}
