/// A damped Gauss-Newton solver with a backtracking line search.
///
/// Numerical non-convergence is reported through the [Termination](gauss_newton::Termination)
/// of the [GaussNewtonReport](gauss_newton::GaussNewtonReport), while malformed problems
/// and unsolvable linear subproblems are reported as a [GaussNewtonError](gauss_newton::GaussNewtonError).
pub mod gauss_newton;
