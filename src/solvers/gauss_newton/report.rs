use super::Termination;
use crate::linalg_helpers::as_f64;
use nalgebra::{DVector, RealField};

/// Diagnostics for a single completed iteration of the Gauss-Newton solver.
/// These are purely observational and never influence the iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// zero based index of the iteration
    pub iteration: usize,
    /// the residual norm `$\Vert \vec{f}(\vec{x}) \Vert_2$` reported by the line search
    pub residual_norm: ScalarType,
    /// the norm of the search direction `$\Vert \Delta\vec{x} \Vert_2$`
    pub step_norm: ScalarType,
    /// the condition number `$\sigma_{max}/\sigma_{min}$` of the Jacobian
    pub condition_number: ScalarType,
    /// the step length chosen by the line search. Zero means the line search
    /// did not find an acceptable step.
    pub alpha: ScalarType,
    /// the norm of the gradient at the iterate after this iteration
    pub gradient_norm: ScalarType,
    /// whether the Gauss-Newton step was replaced by the steepest descent
    /// direction because it was not a descent direction
    pub steepest_descent: bool,
}

/// The result of a run of the Gauss-Newton solver.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussNewtonReport<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the final iterate. This is the initial point if no step was ever accepted.
    pub params: DVector<ScalarType>,
    /// why the solver stopped
    pub termination: Termination,
    /// number of completed iterations
    pub iterations: usize,
    /// the relative gradient tolerance after rescaling with the initial
    /// gradient norm
    pub gradient_tolerance: ScalarType,
    /// per iteration diagnostics, one entry per completed iteration
    pub history: Vec<IterationRecord<ScalarType>>,
}

impl<ScalarType> GaussNewtonReport<ScalarType>
where
    ScalarType: RealField + Copy,
{
    /// the residual norm after the last iteration, if any iteration was performed
    pub fn residual_norm(&self) -> Option<ScalarType> {
        self.history.last().map(|record| record.residual_norm)
    }
}

pub(crate) fn log_header() {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("Gauss-Newton Solver Iteration History");
    log::debug!("  iter   |   ||f(x)||   |   ||dx||   | cond(F(x)) |    alpha   |  ||grad||  ");
    log::debug!("---------|--------------|------------|------------|------------|------------");
}

pub(crate) fn log_record<ScalarType>(record: &IterationRecord<ScalarType>)
where
    ScalarType: RealField + Copy,
{
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!(
        "    {:3}  |  {:1.4e}  |  {:1.2e}  |  {:1.2e}  |  {:1.2e}  |  {:1.2e}{}",
        record.iteration,
        as_f64(record.residual_norm),
        as_f64(record.step_norm),
        as_f64(record.condition_number),
        as_f64(record.alpha),
        as_f64(record.gradient_norm),
        if record.steepest_descent { "  (sd)" } else { "" },
    );
}

pub(crate) fn log_termination(termination: Termination) {
    match termination {
        Termination::Converged => log::debug!("Gauss-Newton converged successfully!"),
        Termination::ConvergedOnStepSize => {
            log::debug!("Gauss-Newton did not converge: ||dx|| < tol")
        }
        Termination::MaxIterationsExceeded => {
            log::debug!("Gauss-Newton did not converge: max iterations reached")
        }
        Termination::NoProgress => log::debug!("No progress made during line search"),
        Termination::NoIterations => log::debug!("Gauss-Newton performed no iterations"),
    }
}
