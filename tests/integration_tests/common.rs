use gnls::prelude::*;
use gnls::problem::LeastSquaresProblem as GaussNewtonProblem;
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::DVector;
use shared_test_code::levmar::LevMarAdapter;

/// install a logger that prints the iteration tables of failing tests
pub fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

/// a solver with a tight gradient tolerance so that the result can be
/// compared with the reference solution
pub fn precise_solver() -> GaussNewtonSolver<f64> {
    GaussNewtonSolverBuilder::new()
        .gradient_tolerance(1e-10)
        .build()
        .expect("valid settings must produce a solver")
}

/// minimize the problem with the levenberg_marquardt crate
pub fn levenberg_marquardt_solution<Problem>(
    problem: Problem,
    initial_params: DVector<f64>,
) -> DVector<f64>
where
    Problem: GaussNewtonProblem<f64>,
{
    let (solved, report) =
        LevenbergMarquardt::new().minimize(LevMarAdapter::new(problem, initial_params));
    assert!(
        report.termination.was_successful(),
        "Levenberg Marquardt did not converge: {:?}",
        report.termination
    );
    solved.params()
}
