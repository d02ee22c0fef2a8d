use crate::linalg_helpers::{as_f64, inner, is_in_open_unit_interval};
use nalgebra::{DVector, RealField};
use thiserror::Error as ThisError;


/// The outcome of evaluating a [Trajectory] at a trial step length.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialPoint<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the candidate point along the trajectory
    Accepted(DVector<ScalarType>),
    /// the trajectory considers the step infeasible. A line search treats
    /// this exactly like a trial that violates the sufficient decrease
    /// condition and keeps backtracking.
    Rejected,
}

/// A trajectory maps the current point `$\vec{x}$`, a search direction `$\vec{p}$` and a
/// step length `$\alpha$` to the next candidate point.
///
/// There is a blanket implementation for closures with the signature
/// `Fn(&DVector<T>, &DVector<T>, T) -> TrialPoint<T>`, which can be used to
/// e.g. reject candidates outside of a feasible region.
pub trait Trajectory<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the candidate point for the step length `alpha`
    fn step(
        &self,
        point: &DVector<ScalarType>,
        direction: &DVector<ScalarType>,
        alpha: ScalarType,
    ) -> TrialPoint<ScalarType>;
}

/// The default trajectory `$\vec{x} + \alpha \vec{p}$`, which never rejects a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StraightLine;

impl<ScalarType> Trajectory<ScalarType> for StraightLine
where
    ScalarType: RealField + Copy,
{
    #[inline]
    fn step(
        &self,
        point: &DVector<ScalarType>,
        direction: &DVector<ScalarType>,
        alpha: ScalarType,
    ) -> TrialPoint<ScalarType> {
        TrialPoint::Accepted(point + direction * alpha)
    }
}

impl<ScalarType, Func> Trajectory<ScalarType> for Func
where
    ScalarType: RealField + Copy,
    Func: Fn(&DVector<ScalarType>, &DVector<ScalarType>, ScalarType) -> TrialPoint<ScalarType>,
{
    #[inline]
    fn step(
        &self,
        point: &DVector<ScalarType>,
        direction: &DVector<ScalarType>,
        alpha: ScalarType,
    ) -> TrialPoint<ScalarType> {
        (self)(point, direction, alpha)
    }
}

/// Errors that make a line search impossible to perform at all. Not finding
/// an acceptable step is not an error, see [LineSearchResult].
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum LineSearchError<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the search direction `$\vec{p}$` is not a descent direction for the
    /// gradient `$\vec{g}$`, i.e. `$\langle \vec{g},\vec{p} \rangle \geq 0$`
    /// (or the inner product is not a number).
    #[error(
        "Search direction is not a descent direction: <gradient, direction> = {} >= 0",
        directional_derivative
    )]
    InvalidDirection {
        /// the inner product of gradient and search direction
        directional_derivative: ScalarType,
    },

    /// point, gradient and direction must all have the same length
    #[error(
        "Dimension mismatch: point has length {}, gradient has length {} and direction has length {}",
        point_len,
        gradient_len,
        direction_len
    )]
    DimensionMismatch {
        /// length of the current point
        point_len: usize,
        /// length of the gradient
        gradient_len: usize,
        /// length of the search direction
        direction_len: usize,
    },
}

/// The result of a line search.
///
/// If no acceptable step length was found, the search reports a step length
/// `alpha` of zero, the original point and the objective value at the
/// original point.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchResult<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the accepted point, or the original point if the search failed
    pub point: DVector<ScalarType>,
    /// the accepted step length in `$(0,1]$`, or zero if the search failed
    pub alpha: ScalarType,
    /// the objective value at `point`
    pub objective: ScalarType,
    /// how many step lengths were tried
    pub trials: usize,
}

impl<ScalarType> LineSearchResult<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// whether the line search found a step length that satisfied its
    /// acceptance criterion
    pub fn was_successful(&self) -> bool {
        self.alpha > ScalarType::zero()
    }
}

/// A strategy for choosing the step length along a descent direction.
pub trait LineSearch<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// Search for a step length along `direction`, starting from `point`.
    ///
    /// # Arguments
    /// * `objective`: the scalar objective `$\phi(\vec{x})$` to decrease
    /// * `gradient`: the gradient `$\vec{g}$` at `point`
    /// * `direction`: the search direction `$\vec{p}$`, which must satisfy `$\langle \vec{g},\vec{p} \rangle < 0$`
    /// * `point`: the current point `$\vec{x}$`
    /// * `trajectory`: produces the candidate point for each trial step length
    fn search<Objective, Traj>(
        &self,
        objective: Objective,
        gradient: &DVector<ScalarType>,
        direction: &DVector<ScalarType>,
        point: &DVector<ScalarType>,
        trajectory: &Traj,
    ) -> Result<LineSearchResult<ScalarType>, LineSearchError<ScalarType>>
    where
        Objective: Fn(&DVector<ScalarType>) -> ScalarType,
        Traj: Trajectory<ScalarType> + ?Sized;
}

/// Invalid settings for an [ArmijoBacktracking] line search.
/// The offending values are reported as `f64` regardless of the scalar type.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum ArmijoSettingsError {
    /// the backtrack factor must lie in the open interval (0,1)
    #[error("Backtrack factor must lie in the open interval (0,1), but is {}", value)]
    InvalidBacktrackFactor {
        /// the rejected backtrack factor
        value: f64,
    },

    /// the sufficient decrease coefficient must lie in the open interval (0,1)
    #[error(
        "Sufficient decrease coefficient must lie in the open interval (0,1), but is {}",
        value
    )]
    InvalidSufficientDecrease {
        /// the rejected coefficient
        value: f64,
    },

    /// the line search must try at least one step length
    #[error("Line search must be allowed at least one iteration.")]
    ZeroIterations,
}

/// Backtracking line search that accepts the first step length `$\alpha$` of
/// the sequence `$1, \beta, \beta^2, \dots$` satisfying the Armijo condition
///
/// ```math
/// \phi(\vec{x}(\alpha)) < \phi(\vec{x}) + \alpha \, c \, \langle \vec{g}, \vec{p} \rangle,
/// ```
///
/// where `$\beta$` is the backtrack factor, `$c$` is the sufficient decrease
/// coefficient and `$\vec{x}(\alpha)$` is the candidate of the trajectory.
/// See Nocedal & Wright, *Numerical Optimization*, Algorithm 3.1.
///
/// Both `$\beta$` and `$c$` lie in `$(0,1)$`, which [ArmijoBacktracking::with_settings]
/// enforces. Accepted step lengths are therefore in `$(0,1]$` and strictly
/// decrease the objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmijoBacktracking<ScalarType>
where
    ScalarType: RealField + Copy,
{
    backtrack_factor: ScalarType,
    sufficient_decrease: ScalarType,
    max_iterations: usize,
}

impl<ScalarType> Default for ArmijoBacktracking<ScalarType>
where
    ScalarType: RealField + Copy,
{
    fn default() -> Self {
        Self {
            backtrack_factor: nalgebra::convert::<f64, ScalarType>(0.5),
            sufficient_decrease: nalgebra::convert::<f64, ScalarType>(1e-4),
            max_iterations: 40,
        }
    }
}

impl<ScalarType> ArmijoBacktracking<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// create a line search with the default parameters
    /// `backtrack_factor = 0.5`, `sufficient_decrease = 1e-4` and `max_iterations = 40`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line search with custom parameters.
    ///
    /// # Arguments
    /// * `backtrack_factor`: factor `$\beta \in (0,1)$` by which the step length shrinks after a failed trial
    /// * `sufficient_decrease`: coefficient `$c \in (0,1)$` of the sufficient decrease condition
    /// * `max_iterations`: maximum number of trial step lengths, at least one
    ///
    /// # Returns
    /// The line search or the first invalid parameter as an error.
    pub fn with_settings(
        backtrack_factor: ScalarType,
        sufficient_decrease: ScalarType,
        max_iterations: usize,
    ) -> Result<Self, ArmijoSettingsError> {
        if !is_in_open_unit_interval(backtrack_factor) {
            return Err(ArmijoSettingsError::InvalidBacktrackFactor {
                value: as_f64(backtrack_factor),
            });
        }
        if !is_in_open_unit_interval(sufficient_decrease) {
            return Err(ArmijoSettingsError::InvalidSufficientDecrease {
                value: as_f64(sufficient_decrease),
            });
        }
        if max_iterations == 0 {
            return Err(ArmijoSettingsError::ZeroIterations);
        }
        Ok(Self {
            backtrack_factor,
            sufficient_decrease,
            max_iterations,
        })
    }

    /// factor by which the step length shrinks after a failed trial
    pub fn backtrack_factor(&self) -> ScalarType {
        self.backtrack_factor
    }

    /// coefficient of the sufficient decrease condition
    pub fn sufficient_decrease(&self) -> ScalarType {
        self.sufficient_decrease
    }

    /// maximum number of trial step lengths
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl<ScalarType> LineSearch<ScalarType> for ArmijoBacktracking<ScalarType>
where
    ScalarType: RealField + Copy,
{
    fn search<Objective, Traj>(
        &self,
        objective: Objective,
        gradient: &DVector<ScalarType>,
        direction: &DVector<ScalarType>,
        point: &DVector<ScalarType>,
        trajectory: &Traj,
    ) -> Result<LineSearchResult<ScalarType>, LineSearchError<ScalarType>>
    where
        Objective: Fn(&DVector<ScalarType>) -> ScalarType,
        Traj: Trajectory<ScalarType> + ?Sized,
    {
        if point.len() != gradient.len() || point.len() != direction.len() {
            return Err(LineSearchError::DimensionMismatch {
                point_len: point.len(),
                gradient_len: gradient.len(),
                direction_len: direction.len(),
            });
        }

        let directional_derivative = inner(gradient, direction);
        // written as a negation so that NaN is rejected as well
        if !(directional_derivative < ScalarType::zero()) {
            return Err(LineSearchError::InvalidDirection {
                directional_derivative,
            });
        }

        let objective_at_point = objective(point);
        let mut alpha = ScalarType::one();

        for trial in 0..self.max_iterations {
            match trajectory.step(point, direction, alpha) {
                TrialPoint::Accepted(candidate) => {
                    let value = objective(&candidate);
                    let bound = objective_at_point
                        + alpha * self.sufficient_decrease * directional_derivative;
                    if value < bound {
                        log::trace!(
                            "line search accepted alpha = {} after {} trials",
                            alpha,
                            trial + 1
                        );
                        return Ok(LineSearchResult {
                            point: candidate,
                            alpha,
                            objective: value,
                            trials: trial + 1,
                        });
                    }
                    log::trace!(
                        "line search trial {}: alpha = {}, objective {} >= {}",
                        trial,
                        alpha,
                        value,
                        bound
                    );
                }
                TrialPoint::Rejected => {
                    log::trace!("line search trial {}: alpha = {} rejected", trial, alpha);
                }
            }
            alpha = alpha * self.backtrack_factor;
        }

        log::trace!(
            "line search exhausted after {} trials",
            self.max_iterations
        );
        Ok(LineSearchResult {
            point: point.clone(),
            alpha: ScalarType::zero(),
            objective: objective_at_point,
            trials: self.max_iterations,
        })
    }
}
