pub use crate::linesearch::{ArmijoBacktracking, LineSearch, StraightLine, Trajectory, TrialPoint};
pub use crate::problem::{FnProblem, LeastSquaresProblem};
pub use crate::solvers::gauss_newton::{
    GaussNewtonError, GaussNewtonReport, GaussNewtonSolver, GaussNewtonSolverBuilder, Termination,
};
