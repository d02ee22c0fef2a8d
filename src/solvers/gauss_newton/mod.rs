use crate::linalg_helpers::{all_finite, condition_number, inner, norm};
use crate::linesearch::{
    ArmijoBacktracking, LineSearch, LineSearchError, LineSearchResult, StraightLine, Trajectory,
};
use crate::problem::{FnProblem, LeastSquaresProblem};
use nalgebra::{DMatrix, DVector, RealField};
use thiserror::Error as ThisError;

/// helper structure for constructing validated solvers
pub mod builder;
/// linear subproblem solvers that produce the Gauss-Newton step
pub mod direction;
/// diagnostics collected while iterating
pub mod report;


pub use builder::{GaussNewtonBuilderError, GaussNewtonSolverBuilder};
pub use direction::{DirectionSolver, LinearSolution, SvdDirectionSolver};
pub use report::{GaussNewtonReport, IterationRecord};

/// Why the Gauss-Newton iteration stopped. Numerical non-convergence is
/// reported here rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// the gradient norm fell below the (relative) gradient tolerance
    Converged,
    /// the gradient is not small, but the norm of the search direction fell
    /// below the step tolerance. This happens for flat optima or when the
    /// iteration stagnates.
    ConvergedOnStepSize,
    /// the maximum number of iterations was reached
    MaxIterationsExceeded,
    /// the line search could not decrease the residual norm
    NoProgress,
    /// the solver was configured with zero iterations and returned the
    /// initial point without evaluating anything
    NoIterations,
}

impl Termination {
    /// true for [Termination::Converged] and [Termination::ConvergedOnStepSize]
    pub fn was_successful(&self) -> bool {
        matches!(
            self,
            Termination::Converged | Termination::ConvergedOnStepSize
        )
    }
}

/// The state of the last completed iteration, which decides the [Termination].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationState<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// zero based index of the iteration
    pub iteration: usize,
    /// the gradient norm at the current iterate
    pub gradient_norm: ScalarType,
    /// the norm of the last search direction
    pub step_norm: ScalarType,
    /// whether the last line search failed to decrease the residual norm
    pub no_progress: bool,
}

impl<ScalarType> IterationState<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// Classify the termination. The criteria are checked in order of
    /// priority: gradient tolerance, step tolerance, iteration count and
    /// finally the progress of the line search. A state that matches none of
    /// them cannot be produced by the solver loop and is reported as an error.
    pub fn termination(
        &self,
        gradient_tolerance: ScalarType,
        step_tolerance: ScalarType,
        max_iterations: usize,
    ) -> Result<Termination, GaussNewtonError<ScalarType>> {
        if self.gradient_norm <= gradient_tolerance {
            Ok(Termination::Converged)
        } else if self.step_norm <= step_tolerance {
            Ok(Termination::ConvergedOnStepSize)
        } else if self.iteration + 1 == max_iterations {
            Ok(Termination::MaxIterationsExceeded)
        } else if self.no_progress {
            Ok(Termination::NoProgress)
        } else {
            log::error!(
                "Gauss-Newton stopped without matching a termination criterion: {:?}",
                self
            );
            Err(GaussNewtonError::UnreachableTermination(*self))
        }
    }
}

/// Snapshot of the linear subproblem that could not be solved to a finite
/// search direction. It is handed to the caller, who decides whether to
/// persist it for offline inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct IllConditionedSystem<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// zero based index of the failing iteration
    pub iteration: usize,
    /// the iterate at which the system was assembled
    pub point: DVector<ScalarType>,
    /// the Jacobian `$\boldsymbol{F}$`
    pub jacobian: DMatrix<ScalarType>,
    /// the residual `$\vec{f}$`
    pub residual: DVector<ScalarType>,
    /// the (non-finite) direction, if the direction solver produced one at all
    pub direction: Option<DVector<ScalarType>>,
    /// the singular values, if the direction solver produced them
    pub singular_values: Option<DVector<ScalarType>>,
}

/// Errors that prevent the solver from running to a defined termination.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum GaussNewtonError<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the initial parameter vector must have at least one element
    #[error("Initial parameter vector must not be empty.")]
    EmptyParameters,

    /// the residual must have at least one element
    #[error("Residual vector must not be empty.")]
    EmptyResidual,

    /// the Jacobian does not have as many rows as the residual and as many
    /// columns as the parameter vector
    #[error(
        "Jacobian has shape {}x{}, but residual and parameters require shape {}x{}.",
        actual_rows,
        actual_cols,
        expected_rows,
        expected_cols
    )]
    JacobianDimensionMismatch {
        /// length of the residual
        expected_rows: usize,
        /// length of the parameter vector
        expected_cols: usize,
        /// rows of the Jacobian
        actual_rows: usize,
        /// columns of the Jacobian
        actual_cols: usize,
    },

    /// the residual changed its length between iterates
    #[error(
        "Residual length changed from {} to {} between iterations.",
        expected,
        actual
    )]
    ResidualDimensionChanged {
        /// the length of the residual at the initial point
        expected: usize,
        /// the length of the residual at the current point
        actual: usize,
    },

    /// the direction solver returned a direction of the wrong length
    #[error(
        "Direction solver returned a direction of length {}, expected length {}.",
        actual,
        expected
    )]
    DirectionDimensionMismatch {
        /// the number of parameters
        expected: usize,
        /// the length of the returned direction
        actual: usize,
    },

    /// the linear subproblem produced a non-finite direction or could not be
    /// solved at all
    #[error(
        "Linear subproblem in iteration {} could not be solved to a finite direction.",
        .0.iteration
    )]
    IllConditionedSystem(Box<IllConditionedSystem<ScalarType>>),

    /// a (user provided) line search failed
    #[error("Line search failed: {0}")]
    LineSearch(LineSearchError<ScalarType>),

    /// the iteration stopped in a state that matches no termination criterion.
    /// This indicates a bug in the solver.
    #[error("Solver stopped in a state that matches no termination criterion: {0:?}")]
    UnreachableTermination(IterationState<ScalarType>),
}

/// A damped Gauss-Newton solver for nonlinear least squares problems
///
/// ```math
/// \min_{\vec{x}} \Vert \vec{f}(\vec{x}) \Vert_2.
/// ```
///
/// Every iteration solves the linearized problem
/// `$\min_{\Delta\vec{x}} \Vert \boldsymbol{F}(\vec{x})\Delta\vec{x} + \vec{f}(\vec{x}) \Vert_2$`
/// with the [DirectionSolver] and hands the step to the [LineSearch], which
/// guarantees that the residual norm decreases monotonically. If the
/// Gauss-Newton step is not a descent direction for the gradient
/// `$\vec{g} = \boldsymbol{F}^T \vec{f}$`, the steepest descent direction `$-\vec{g}$`
/// is used instead.
///
/// The gradient tolerance is relative: it is multiplied with the gradient
/// norm at the initial point (and bounded below by `1e-14`).
///
/// # Example
/// ```rust
/// # use nalgebra::{DMatrix, DVector};
/// # use gnls::solvers::gauss_newton::{GaussNewtonSolver, Termination};
/// let solver = GaussNewtonSolver::<f64>::new();
/// let report = solver
///     .solve_fn(
///         |x: &DVector<f64>| x.map(|xi| xi - 5.),
///         |x: &DVector<f64>| DMatrix::identity(x.len(), x.len()),
///         DVector::from(vec![0.]),
///     )
///     .unwrap();
/// assert_eq!(report.termination, Termination::Converged);
/// assert!((report.params[0] - 5.).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaussNewtonSolver<
    ScalarType,
    Search = ArmijoBacktracking<ScalarType>,
    Traj = StraightLine,
    Direction = SvdDirectionSolver<ScalarType>,
> where
    ScalarType: RealField + Copy,
{
    pub(crate) gradient_tolerance: ScalarType,
    pub(crate) step_tolerance: ScalarType,
    pub(crate) max_iterations: usize,
    pub(crate) line_search: Search,
    pub(crate) trajectory: Traj,
    pub(crate) direction_solver: Direction,
}

impl<ScalarType> Default for GaussNewtonSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    fn default() -> Self {
        Self {
            gradient_tolerance: nalgebra::convert::<f64, ScalarType>(1e-5),
            step_tolerance: nalgebra::convert::<f64, ScalarType>(1e-12),
            max_iterations: 100,
            line_search: ArmijoBacktracking::default(),
            trajectory: StraightLine,
            direction_solver: SvdDirectionSolver::default(),
        }
    }
}

impl<ScalarType> GaussNewtonSolver<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// Solver with the default settings: gradient tolerance `1e-5`, step
    /// tolerance `1e-12`, at most `100` iterations, an Armijo backtracking line
    /// search along straight lines and an SVD based direction solver.
    /// Use the [GaussNewtonSolverBuilder] to change the settings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<ScalarType, Search, Traj, Direction> GaussNewtonSolver<ScalarType, Search, Traj, Direction>
where
    ScalarType: RealField + Copy,
{
    /// the relative gradient tolerance before rescaling
    pub fn gradient_tolerance(&self) -> ScalarType {
        self.gradient_tolerance
    }

    /// the tolerance for the norm of the search direction
    pub fn step_tolerance(&self) -> ScalarType {
        self.step_tolerance
    }

    /// the maximum number of outer iterations
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// the line search used in every iteration
    pub fn line_search(&self) -> &Search {
        &self.line_search
    }

    /// the trajectory that produces the line search candidates
    pub fn trajectory(&self) -> &Traj {
        &self.trajectory
    }

    /// the solver for the linear subproblem
    pub fn direction_solver(&self) -> &Direction {
        &self.direction_solver
    }
}

impl<ScalarType, Search, Traj, Direction> GaussNewtonSolver<ScalarType, Search, Traj, Direction>
where
    ScalarType: RealField + Copy,
    Search: LineSearch<ScalarType>,
    Traj: Trajectory<ScalarType>,
    Direction: DirectionSolver<ScalarType>,
{
    /// Convenience wrapper around [GaussNewtonSolver::solve] for a residual
    /// and its Jacobian given as closures.
    pub fn solve_fn<Residual, Jacobian>(
        &self,
        residual: Residual,
        jacobian: Jacobian,
        initial_point: DVector<ScalarType>,
    ) -> Result<GaussNewtonReport<ScalarType>, GaussNewtonError<ScalarType>>
    where
        Residual: Fn(&DVector<ScalarType>) -> DVector<ScalarType>,
        Jacobian: Fn(&DVector<ScalarType>) -> DMatrix<ScalarType>,
    {
        self.solve(&FnProblem::new(residual, jacobian), initial_point)
    }

    /// Minimize the residual norm of the problem, starting at `initial_point`.
    ///
    /// # Returns
    /// A report containing the final iterate and the [Termination] on success.
    /// Not converging is not an error. Errors are returned for malformed
    /// dimensions, for linear subproblems that do not produce a finite
    /// direction, and for failing user provided line searches.
    pub fn solve<Problem>(
        &self,
        problem: &Problem,
        initial_point: DVector<ScalarType>,
    ) -> Result<GaussNewtonReport<ScalarType>, GaussNewtonError<ScalarType>>
    where
        Problem: LeastSquaresProblem<ScalarType> + ?Sized,
    {
        if self.max_iterations == 0 {
            log::debug!("Gauss-Newton called with zero iterations");
            report::log_termination(Termination::NoIterations);
            return Ok(GaussNewtonReport {
                params: initial_point,
                termination: Termination::NoIterations,
                iterations: 0,
                gradient_tolerance: self.gradient_tolerance,
                history: Vec::new(),
            });
        }

        let parameter_count = initial_point.len();
        if parameter_count == 0 {
            return Err(GaussNewtonError::EmptyParameters);
        }

        let mut x = initial_point;
        let mut residual = problem.residual(&x);
        let residual_count = residual.len();
        if residual_count == 0 {
            return Err(GaussNewtonError::EmptyResidual);
        }
        let mut jacobian = problem.jacobian(&x);
        check_jacobian_shape(&jacobian, residual_count, parameter_count)?;

        let mut gradient = jacobian.tr_mul(&residual);
        let mut gradient_norm = norm(&gradient);
        let gradient_tolerance = (self.gradient_tolerance * gradient_norm)
            .max(nalgebra::convert::<f64, ScalarType>(1e-14));

        let mut history = Vec::with_capacity(self.max_iterations.min(128));
        let mut state = IterationState {
            iteration: 0,
            gradient_norm,
            step_norm: ScalarType::one(),
            no_progress: false,
        };

        report::log_header();
        for iteration in 0..self.max_iterations {
            let residual_norm = norm(&residual);

            let (direction, singular_values) =
                match self.direction_solver.solve(&jacobian, &residual) {
                    Some(solution) if solution.direction.len() != parameter_count => {
                        return Err(GaussNewtonError::DirectionDimensionMismatch {
                            expected: parameter_count,
                            actual: solution.direction.len(),
                        });
                    }
                    Some(solution) if all_finite(&solution.direction) => {
                        (solution.direction, solution.singular_values)
                    }
                    solution => {
                        log::error!(
                            "Gauss-Newton: linear subproblem in iteration {} has no finite solution",
                            iteration
                        );
                        let (direction, singular_values) = match solution {
                            Some(solution) => {
                                (Some(solution.direction), Some(solution.singular_values))
                            }
                            None => (None, None),
                        };
                        return Err(GaussNewtonError::IllConditionedSystem(Box::new(
                            IllConditionedSystem {
                                iteration,
                                point: x,
                                jacobian,
                                residual,
                                direction,
                                singular_values,
                            },
                        )));
                    }
                };

            let condition = condition_number(&singular_values);

            // comparison is negated so that a NaN inner product also falls back
            let (direction, steepest_descent) =
                if !(inner(&gradient, &direction) < ScalarType::zero()) {
                    (-&gradient, true)
                } else {
                    (direction, false)
                };
            let step_norm = norm(&direction);

            let line_search_result = if inner(&gradient, &direction) < ScalarType::zero() {
                self.line_search
                    .search(
                        |point: &DVector<ScalarType>| norm(&problem.residual(point)),
                        &gradient,
                        &direction,
                        &x,
                        &self.trajectory,
                    )
                    .map_err(GaussNewtonError::LineSearch)?
            } else {
                // vanishing gradient: no direction decreases the objective to first order
                LineSearchResult {
                    point: x.clone(),
                    alpha: ScalarType::zero(),
                    objective: residual_norm,
                    trials: 0,
                }
            };

            let no_progress = !(line_search_result.objective < residual_norm);
            if !no_progress {
                x = line_search_result.point;
                residual = problem.residual(&x);
                if residual.len() != residual_count {
                    return Err(GaussNewtonError::ResidualDimensionChanged {
                        expected: residual_count,
                        actual: residual.len(),
                    });
                }
                jacobian = problem.jacobian(&x);
                check_jacobian_shape(&jacobian, residual_count, parameter_count)?;
                gradient = jacobian.tr_mul(&residual);
                gradient_norm = norm(&gradient);
            }

            state = IterationState {
                iteration,
                gradient_norm,
                step_norm,
                no_progress,
            };

            let record = IterationRecord {
                iteration,
                residual_norm: line_search_result.objective,
                step_norm,
                condition_number: condition,
                alpha: line_search_result.alpha,
                gradient_norm,
                steepest_descent,
            };
            report::log_record(&record);
            history.push(record);

            if gradient_norm < gradient_tolerance {
                log::debug!(
                    "norm gradient {} less than tolerance {}",
                    gradient_norm,
                    gradient_tolerance
                );
                break;
            }
            if step_norm < self.step_tolerance {
                log::debug!(
                    "norm dx {} less than tolerance {}",
                    step_norm,
                    self.step_tolerance
                );
                break;
            }
            if no_progress {
                log::debug!(
                    "residual did not decrease during line search: {} >= {}",
                    line_search_result.objective,
                    residual_norm
                );
                break;
            }
        }

        let termination =
            state.termination(gradient_tolerance, self.step_tolerance, self.max_iterations)?;
        report::log_termination(termination);

        Ok(GaussNewtonReport {
            params: x,
            termination,
            iterations: state.iteration + 1,
            gradient_tolerance,
            history,
        })
    }
}

fn check_jacobian_shape<ScalarType>(
    jacobian: &DMatrix<ScalarType>,
    residual_count: usize,
    parameter_count: usize,
) -> Result<(), GaussNewtonError<ScalarType>>
where
    ScalarType: RealField + Copy,
{
    if jacobian.shape() != (residual_count, parameter_count) {
        return Err(GaussNewtonError::JacobianDimensionMismatch {
            expected_rows: residual_count,
            expected_cols: parameter_count,
            actual_rows: jacobian.nrows(),
            actual_cols: jacobian.ncols(),
        });
    }
    Ok(())
}
