//! This module includes helper functionality that is useful for testing across all modules

use crate::problem::LeastSquaresProblem;
use nalgebra::{DMatrix, DVector};
use std::cell::Cell;

/// wraps a problem and counts how often the residual and the Jacobian were evaluated
pub struct CountingProblem<Problem> {
    problem: Problem,
    residual_evaluations: Cell<usize>,
    jacobian_evaluations: Cell<usize>,
}

impl<Problem> CountingProblem<Problem> {
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            residual_evaluations: Cell::new(0),
            jacobian_evaluations: Cell::new(0),
        }
    }

    pub fn residual_evaluations(&self) -> usize {
        self.residual_evaluations.get()
    }

    pub fn jacobian_evaluations(&self) -> usize {
        self.jacobian_evaluations.get()
    }
}

impl<Problem> LeastSquaresProblem<f64> for CountingProblem<Problem>
where
    Problem: LeastSquaresProblem<f64>,
{
    fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        self.residual_evaluations
            .set(self.residual_evaluations.get() + 1);
        self.problem.residual(x)
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        self.jacobian_evaluations
            .set(self.jacobian_evaluations.get() + 1);
        self.problem.jacobian(x)
    }
}

/// f(x) = x - target, elementwise
#[derive(Debug, Clone)]
pub struct ShiftedIdentity {
    pub target: DVector<f64>,
}

impl LeastSquaresProblem<f64> for ShiftedIdentity {
    fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        x - &self.target
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::identity(x.len(), x.len())
    }
}

/// f(x) = x^2 in one dimension, which has a zero residual and a singular
/// Jacobian at the minimum
#[derive(Debug, Clone, Copy)]
pub struct Square;

impl LeastSquaresProblem<f64> for Square {
    fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        x.map(|xi| xi * xi)
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_element(1, 1, 2. * x[0])
    }
}

/// The Rosenbrock function written as a least squares problem
/// f(x) = (10(x1-x0^2), 1-x0) with the minimum at (1,1)
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock;

impl LeastSquaresProblem<f64> for Rosenbrock {
    fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from(vec![10. * (x[1] - x[0] * x[0]), 1. - x[0]])
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[-20. * x[0], 10., -1., 0.])
    }
}

/// f(x) = scale * (x0^2 - 4, x1^3 - 8) with the root at (2,2)
#[derive(Debug, Clone, Copy)]
pub struct ScaledPolynomials {
    pub scale: f64,
}

impl LeastSquaresProblem<f64> for ScaledPolynomials {
    fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from(vec![
            self.scale * (x[0] * x[0] - 4.),
            self.scale * (x[1] * x[1] * x[1] - 8.),
        ])
    }

    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            2,
            2,
            &[
                self.scale * 2. * x[0],
                0.,
                0.,
                self.scale * 3. * x[1] * x[1],
            ],
        )
    }
}

/// f(x) = (x0+x1-2, x0+x1-2), whose Jacobian has two identical columns
#[derive(Debug, Clone, Copy)]
pub struct IdenticalColumns;

impl LeastSquaresProblem<f64> for IdenticalColumns {
    fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        let value = x[0] + x[1] - 2.;
        DVector::from(vec![value, value])
    }

    fn jacobian(&self, _x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_element(2, 2, 1.)
    }
}
