#![warn(missing_docs)]
//!
//! # Introduction
//!
//! This crate solves nonlinear least squares problems using a damped Gauss-Newton
//! method. Given a residual function `$\vec{f}:\mathbb{R}^n \rightarrow \mathbb{R}^m$`
//! and its Jacobian `$\boldsymbol{F}(\vec{x}) = \partial \vec{f}/\partial \vec{x}$`,
//! it finds
//!
//! ```math
//! \arg\min_{\vec{x}} \Vert \vec{f}(\vec{x}) \Vert_2.
//! ```
//!
//! A typical application is fitting a model `$\vec{g}(\vec{x})$` to observations `$\vec{y}$`,
//! where the residual is `$\vec{f}(\vec{x}) = \vec{g}(\vec{x})-\vec{y}$`.
//!
//! ## The Algorithm
//!
//! Starting from an initial guess `$\vec{x}_0$`, every iteration solves the linearized problem
//!
//! ```math
//! \Delta\vec{x}_k = \arg\min_{\Delta\vec{x}} \Vert \boldsymbol{F}(\vec{x}_k)\Delta\vec{x} + \vec{f}(\vec{x}_k) \Vert_2
//! ```
//!
//! for the Gauss-Newton step. The linear subproblem is solved with a singular value
//! decomposition, so rank deficient Jacobians produce the minimum norm step rather
//! than a failure. If the step is not a descent direction for the gradient
//! `$\vec{g}_k = \boldsymbol{F}^T(\vec{x}_k)\vec{f}(\vec{x}_k)$`, the steepest descent
//! direction `$-\vec{g}_k$` is used instead.
//!
//! The step is then damped by a backtracking line search, which tries the step lengths
//! `$\alpha = 1, \beta, \beta^2, \dots$` until the Armijo sufficient decrease condition
//!
//! ```math
//! \Vert \vec{f}(\vec{x}_k + \alpha \Delta\vec{x}_k) \Vert_2 < \Vert \vec{f}(\vec{x}_k) \Vert_2 + \alpha\, c\, \langle \vec{g}_k, \Delta\vec{x}_k\rangle
//! ```
//!
//! holds. This guarantees that the residual norm decreases monotonically. The
//! iteration stops once the gradient becomes small relative to its initial value,
//! once the step becomes negligible, or once the line search cannot make progress.
//! Not converging is reported as a [Termination](crate::solvers::gauss_newton::Termination)
//! and not as an error.
//!
//! # Usage
//!
//! Describe the problem by implementing [LeastSquaresProblem](crate::problem::LeastSquaresProblem)
//! or by passing closures for the residual and the Jacobian directly. The following fits the
//! Michaelis–Menten rate law `$r(s) = V_{max}\,s/(K_M + s)$` to measured reaction rates.
//!
//! ```rust
//! use gnls::prelude::*;
//! use nalgebra::{DMatrix, DVector};
//!
//! let s = DVector::from(vec![0.038, 0.194, 0.425, 0.626, 1.253, 2.500, 3.740]);
//! let r = DVector::from(vec![0.050, 0.127, 0.094, 0.2122, 0.2729, 0.2665, 0.3317]);
//!
//! let residual = |p: &DVector<f64>| s.map(|si| p[0] * si / (p[1] + si)) - &r;
//! let jacobian = |p: &DVector<f64>| {
//!     let mut jac = DMatrix::zeros(s.len(), 2);
//!     for (i, &si) in s.iter().enumerate() {
//!         jac[(i, 0)] = si / (p[1] + si);
//!         jac[(i, 1)] = -p[0] * si / (p[1] + si).powi(2);
//!     }
//!     jac
//! };
//!
//! let solver = GaussNewtonSolverBuilder::new()
//!     .gradient_tolerance(1e-8)
//!     .build()
//!     .expect("valid settings");
//! let report = solver
//!     .solve_fn(residual, jacobian, DVector::from(vec![0.9, 0.2]))
//!     .expect("solving must not fail");
//! assert!(report.termination.was_successful());
//! assert!((report.params[0] - 0.362).abs() < 1e-3);
//! assert!((report.params[1] - 0.556).abs() < 1e-3);
//! ```
//!
//! The line search, the trajectory along which it produces candidates and the solver for
//! the linear subproblem are all exchangeable, see the
//! [GaussNewtonSolverBuilder](crate::solvers::gauss_newton::GaussNewtonSolverBuilder).
//!
//! # Logging
//!
//! The solver reports its progress through the [log](https://crates.io/crates/log) facade.
//! An iteration table is emitted at `debug` level and the individual line search trials
//! at `trace` level. The crate never installs a logger itself.
//!
//! # References and Further Reading
//! (Nocedal2006) Nocedal, J., Wright, S. *Numerical Optimization*, 2nd ed. Springer (2006).
//! Chapter 3 (line search methods) and chapter 10 (nonlinear least squares).

/// numerical helpers shared by the solvers
pub mod linalg_helpers;
/// line searches that choose the step length along a descent direction
pub mod linesearch;
/// commonly useful imports
pub mod prelude;
/// the description of a nonlinear least squares problem
pub mod problem;
/// solvers for the nonlinear minimization problem
pub mod solvers;

#[cfg(test)]
pub mod test_helpers;
