use super::{DirectionSolver, GaussNewtonSolver, SvdDirectionSolver};
use crate::linalg_helpers::{as_f64, is_finite_non_negative};
use crate::linesearch::{ArmijoBacktracking, ArmijoSettingsError, LineSearch, StraightLine, Trajectory};
use nalgebra::RealField;
use thiserror::Error as ThisError;


/// Errors pertaining to invalid settings given to the [GaussNewtonSolverBuilder].
/// The offending values are reported as `f64` regardless of the scalar type.
#[derive(Debug, Clone, ThisError, PartialEq)]
pub enum GaussNewtonBuilderError {
    /// the gradient tolerance must be finite and non-negative
    #[error("Gradient tolerance must be finite and non-negative, but is {}", value)]
    InvalidGradientTolerance {
        /// the rejected tolerance
        value: f64,
    },

    /// the step tolerance must be finite and non-negative
    #[error("Step tolerance must be finite and non-negative, but is {}", value)]
    InvalidStepTolerance {
        /// the rejected tolerance
        value: f64,
    },

    /// the truncation epsilon of the [SvdDirectionSolver] must be finite and non-negative
    #[error(
        "Truncation epsilon for singular values must be finite and non-negative, but is {}",
        value
    )]
    InvalidTruncationEpsilon {
        /// the rejected epsilon
        value: f64,
    },

    /// the settings of the default Armijo line search are invalid
    #[error("Invalid line search settings: {0}")]
    InvalidLineSearch(ArmijoSettingsError),
}

/// A builder for a [GaussNewtonSolver] that validates the settings.
///
/// # Example
/// ```rust
/// # use gnls::solvers::gauss_newton::GaussNewtonSolverBuilder;
/// let solver = GaussNewtonSolverBuilder::<f64>::new()
///     .gradient_tolerance(1e-8)
///     .max_iterations(50)
///     .backtrack_factor(0.25)
///     .build()
///     .expect("valid settings must produce a solver");
/// assert_eq!(solver.max_iterations(), 50);
/// ```
///
/// The line search, the trajectory and the direction solver can be replaced
/// by custom implementations using [line_search](GaussNewtonSolverBuilder::line_search),
/// [trajectory](GaussNewtonSolverBuilder::trajectory) and
/// [direction_solver](GaussNewtonSolverBuilder::direction_solver). The settings
/// of the default Armijo line search are only available before it is replaced.
#[derive(Debug, Clone)]
pub struct GaussNewtonSolverBuilder<
    ScalarType,
    Search = ArmijoBacktracking<ScalarType>,
    Traj = StraightLine,
    Direction = SvdDirectionSolver<ScalarType>,
> where
    ScalarType: RealField + Copy,
{
    solver: GaussNewtonSolver<ScalarType, Search, Traj, Direction>,
    /// first invalid setting of the default line search. This is discarded when
    /// the line search is replaced.
    line_search_error: Option<GaussNewtonBuilderError>,
}

impl<ScalarType> Default for GaussNewtonSolverBuilder<ScalarType>
where
    ScalarType: RealField + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<ScalarType> GaussNewtonSolverBuilder<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// create a builder which is initialized with the default settings of the
    /// [GaussNewtonSolver]
    pub fn new() -> Self {
        Self {
            solver: GaussNewtonSolver::default(),
            line_search_error: None,
        }
    }
}

impl<ScalarType, Search, Traj, Direction>
    GaussNewtonSolverBuilder<ScalarType, Search, Traj, Direction>
where
    ScalarType: RealField + Copy,
{
    /// **Optional** The gradient tolerance, relative to the gradient norm
    /// at the initial point. Default is `1e-5`.
    pub fn gradient_tolerance(mut self, tolerance: ScalarType) -> Self {
        self.solver.gradient_tolerance = tolerance;
        self
    }

    /// **Optional** The tolerance for the norm of the search direction. Default is `1e-12`.
    pub fn step_tolerance(mut self, tolerance: ScalarType) -> Self {
        self.solver.step_tolerance = tolerance;
        self
    }

    /// **Optional** The maximum number of outer iterations. Default is `100`.
    /// Zero is allowed and makes the solver return the initial point unchanged.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.solver.max_iterations = max_iterations;
        self
    }

    /// **Optional** Replace the line search.
    pub fn line_search<NewSearch>(
        self,
        line_search: NewSearch,
    ) -> GaussNewtonSolverBuilder<ScalarType, NewSearch, Traj, Direction>
    where
        NewSearch: LineSearch<ScalarType>,
    {
        let GaussNewtonSolver {
            gradient_tolerance,
            step_tolerance,
            max_iterations,
            line_search: _,
            trajectory,
            direction_solver,
        } = self.solver;
        GaussNewtonSolverBuilder {
            solver: GaussNewtonSolver {
                gradient_tolerance,
                step_tolerance,
                max_iterations,
                line_search,
                trajectory,
                direction_solver,
            },
            line_search_error: None,
        }
    }

    /// **Optional** Replace the trajectory along which the line search
    /// produces its candidates. The default is a straight line.
    pub fn trajectory<NewTraj>(
        self,
        trajectory: NewTraj,
    ) -> GaussNewtonSolverBuilder<ScalarType, Search, NewTraj, Direction>
    where
        NewTraj: Trajectory<ScalarType>,
    {
        let GaussNewtonSolver {
            gradient_tolerance,
            step_tolerance,
            max_iterations,
            line_search,
            trajectory: _,
            direction_solver,
        } = self.solver;
        GaussNewtonSolverBuilder {
            solver: GaussNewtonSolver {
                gradient_tolerance,
                step_tolerance,
                max_iterations,
                line_search,
                trajectory,
                direction_solver,
            },
            line_search_error: self.line_search_error,
        }
    }

    /// **Optional** Replace the solver for the linear subproblem. The default
    /// is the [SvdDirectionSolver].
    pub fn direction_solver<NewDirection>(
        self,
        direction_solver: NewDirection,
    ) -> GaussNewtonSolverBuilder<ScalarType, Search, Traj, NewDirection>
    where
        NewDirection: DirectionSolver<ScalarType>,
    {
        let GaussNewtonSolver {
            gradient_tolerance,
            step_tolerance,
            max_iterations,
            line_search,
            trajectory,
            direction_solver: _,
        } = self.solver;
        GaussNewtonSolverBuilder {
            solver: GaussNewtonSolver {
                gradient_tolerance,
                step_tolerance,
                max_iterations,
                line_search,
                trajectory,
                direction_solver,
            },
            line_search_error: self.line_search_error,
        }
    }

    /// Build the solver.
    /// # Returns
    /// The solver if all settings are valid or the first invalid setting as an error.
    pub fn build(
        self,
    ) -> Result<GaussNewtonSolver<ScalarType, Search, Traj, Direction>, GaussNewtonBuilderError>
    {
        if let Some(error) = self.line_search_error {
            return Err(error);
        }

        let gradient_tolerance = self.solver.gradient_tolerance;
        if !is_finite_non_negative(gradient_tolerance) {
            return Err(GaussNewtonBuilderError::InvalidGradientTolerance {
                value: as_f64(gradient_tolerance),
            });
        }

        let step_tolerance = self.solver.step_tolerance;
        if !is_finite_non_negative(step_tolerance) {
            return Err(GaussNewtonBuilderError::InvalidStepTolerance {
                value: as_f64(step_tolerance),
            });
        }

        Ok(self.solver)
    }
}

impl<ScalarType, Traj, Direction>
    GaussNewtonSolverBuilder<ScalarType, ArmijoBacktracking<ScalarType>, Traj, Direction>
where
    ScalarType: RealField + Copy,
{
    /// **Optional** Factor in `$(0,1)$` by which the line search shrinks the
    /// step length after each failed trial. Default is `0.5`.
    pub fn backtrack_factor(self, factor: ScalarType) -> Self {
        let current = self.solver.line_search;
        self.update_line_search(ArmijoBacktracking::with_settings(
            factor,
            current.sufficient_decrease(),
            current.max_iterations(),
        ))
    }

    /// **Optional** Coefficient in `$(0,1)$` of the Armijo sufficient decrease
    /// condition. Default is `1e-4`.
    pub fn sufficient_decrease(self, coefficient: ScalarType) -> Self {
        let current = self.solver.line_search;
        self.update_line_search(ArmijoBacktracking::with_settings(
            current.backtrack_factor(),
            coefficient,
            current.max_iterations(),
        ))
    }

    /// **Optional** Maximum number of step lengths that the line search tries.
    /// Default is `40`.
    pub fn line_search_iterations(self, iterations: usize) -> Self {
        let current = self.solver.line_search;
        self.update_line_search(ArmijoBacktracking::with_settings(
            current.backtrack_factor(),
            current.sufficient_decrease(),
            iterations,
        ))
    }

    /// keeps the current line search and remembers the error if the new settings are invalid
    fn update_line_search(
        mut self,
        line_search: Result<ArmijoBacktracking<ScalarType>, ArmijoSettingsError>,
    ) -> Self {
        match line_search {
            Ok(line_search) => self.solver.line_search = line_search,
            Err(error) => {
                self.line_search_error
                    .get_or_insert(GaussNewtonBuilderError::InvalidLineSearch(error));
            }
        }
        self
    }
}
