use gnls::problem::LeastSquaresProblem as GaussNewtonProblem;
use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

/// wraps a problem of this crate so that it can be minimized with the
/// levenberg_marquardt crate, which keeps the current parameters inside the problem
#[derive(Debug, Clone)]
pub struct LevMarAdapter<Problem> {
    problem: Problem,
    params: DVector<f64>,
}

impl<Problem> LevMarAdapter<Problem>
where
    Problem: GaussNewtonProblem<f64>,
{
    /// create the adapter with the initial guess for the parameters
    pub fn new(problem: Problem, initial_params: DVector<f64>) -> Self {
        Self {
            problem,
            params: initial_params,
        }
    }

    /// the wrapped problem
    pub fn problem(&self) -> &Problem {
        &self.problem
    }
}

impl<Problem> LeastSquaresProblem<f64, Dyn, Dyn> for LevMarAdapter<Problem>
where
    Problem: GaussNewtonProblem<f64>,
{
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, params: &DVector<f64>) {
        self.params.copy_from(params);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        Some(self.problem.residual(&self.params))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        Some(self.problem.jacobian(&self.params))
    }
}
