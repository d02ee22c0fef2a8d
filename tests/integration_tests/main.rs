use approx::assert_relative_eq;
use common::{init_logger, levenberg_marquardt_solution, precise_solver};
use gnls::prelude::*;
use gnls::solvers::gauss_newton::SvdDirectionSolver;
use levenberg_marquardt::LeastSquaresProblem as _;
use nalgebra::DVector;
use shared_test_code::levmar::LevMarAdapter;
use shared_test_code::problems::{ExponentialDecay, MichaelisMenten, RedundantSlope};
use shared_test_code::{add_uniform_noise, assert_params_relative_eq, linspace};

mod common;

#[test]
// sanity check the hand written jacobians of the test problems
fn sanity_check_jacobians_of_test_problems_are_correct() {
    let mut michaelis_menten =
        LevMarAdapter::new(MichaelisMenten::example(), DVector::from(vec![0.4, 0.7]));
    let jacobian_numerical =
        levenberg_marquardt::differentiate_numerically(&mut michaelis_menten).unwrap();
    let jacobian_trait = michaelis_menten.jacobian().unwrap();
    assert_relative_eq!(jacobian_numerical, jacobian_trait, epsilon = 1e-6);

    let t = linspace(0., 10., 64);
    let mut decay = LevMarAdapter::new(
        ExponentialDecay::without_noise(t, &[4., 2.5, 1.]),
        DVector::from(vec![2., 5., 0.5]),
    );
    let jacobian_numerical = levenberg_marquardt::differentiate_numerically(&mut decay).unwrap();
    let jacobian_trait = decay.jacobian().unwrap();
    assert_relative_eq!(jacobian_numerical, jacobian_trait, epsilon = 1e-6);
}

#[test]
fn michaelis_menten_example_converges_to_the_least_squares_solution() {
    init_logger();
    let problem = MichaelisMenten::example();
    let initial_guess = DVector::from(vec![0.9, 0.2]);
    let report = GaussNewtonSolver::new()
        .solve(&problem, initial_guess.clone())
        .expect("fitting must not fail");

    assert_eq!(report.termination, Termination::Converged);
    assert!(report.iterations <= 10);
    // the values given in the Wikipedia example
    assert_relative_eq!(report.params[0], 0.362, epsilon = 1e-3);
    assert_relative_eq!(report.params[1], 0.556, epsilon = 1e-3);

    let reference = levenberg_marquardt_solution(problem.clone(), initial_guess.clone());
    let precise = precise_solver().solve(&problem, initial_guess).unwrap();
    assert_eq!(precise.termination, Termination::Converged);
    assert_params_relative_eq(&precise.params, &reference, 1e-6);
}

#[test]
fn michaelis_menten_example_converges_from_zero_initial_guess() {
    init_logger();
    let problem = MichaelisMenten::example();
    // the jacobian at zero has a vanishing second column
    let report = precise_solver()
        .solve(&problem, DVector::zeros(2))
        .expect("rank deficient jacobian must not produce an error");
    assert_eq!(report.termination, Termination::Converged);
    assert!(report.history[0].condition_number > 1e12);

    let reference = levenberg_marquardt_solution(problem, DVector::from(vec![0.9, 0.2]));
    assert_params_relative_eq(&report.params, &reference, 1e-6);
}

#[test]
fn exponential_decay_without_noise_recovers_true_parameters() {
    init_logger();
    let true_params = [4., 2.5, 1.];
    let problem = ExponentialDecay::without_noise(linspace(0., 10., 64), &true_params);

    for initial_guess in [vec![1., 1., 0.], vec![2., 5., 0.]] {
        let report = precise_solver()
            .solve(&problem, DVector::from(initial_guess))
            .unwrap();
        assert_eq!(report.termination, Termination::Converged);
        assert_relative_eq!(
            report.params,
            DVector::from(true_params.to_vec()),
            epsilon = 1e-8
        );
        assert_relative_eq!(report.residual_norm().unwrap(), 0., epsilon = 1e-8);
    }
}

#[test]
fn exponential_decay_with_noise_agrees_with_levenberg_marquardt() {
    init_logger();
    let t = linspace(0., 10., 64);
    let clean = ExponentialDecay::without_noise(t.clone(), &[4., 2.5, 1.]);
    let problem = ExponentialDecay {
        t,
        y: add_uniform_noise(&clean.y, 0.05, 0xdeadbeef),
    };
    let initial_guess = DVector::from(vec![2., 5., 0.]);

    let report = precise_solver()
        .solve(&problem, initial_guess.clone())
        .unwrap();
    assert!(report.termination.was_successful());

    let reference = levenberg_marquardt_solution(problem.clone(), initial_guess);
    assert_params_relative_eq(&report.params, &reference, 1e-6);

    // the noise leaves a residual, which is at most the residual of the true parameters
    let residual_norm = report.residual_norm().unwrap();
    assert!(residual_norm > 0.);
    assert!(residual_norm <= problem.residual(&DVector::from(vec![4., 2.5, 1.])).norm());
}

#[test]
fn residual_norms_in_history_never_increase() {
    let t = linspace(0., 10., 64);
    let problem = ExponentialDecay::without_noise(t, &[4., 2.5, 1.]);
    let initial_guess = DVector::from(vec![1., 1., 0.]);
    let report = GaussNewtonSolver::new()
        .solve(&problem, initial_guess.clone())
        .unwrap();

    let mut previous = problem.residual(&initial_guess).norm();
    for record in report.history {
        assert!(record.residual_norm <= previous);
        previous = record.residual_norm;
    }
}

#[test]
fn redundant_parameters_produce_minimum_norm_solution() {
    init_logger();
    let t = linspace(0., 1., 10);
    let problem = RedundantSlope {
        y: 3. * &t,
        t,
    };
    let report = GaussNewtonSolver::new()
        .solve(&problem, DVector::zeros(2))
        .unwrap();
    assert_eq!(report.termination, Termination::Converged);
    assert!(report.history[0].condition_number > 1e12);
    // only the sum is determined and the minimum norm step splits it evenly
    assert_relative_eq!(report.params, DVector::from(vec![1.5, 1.5]), epsilon = 1e-10);
}

#[test]
fn explicit_truncation_epsilon_is_respected() {
    let t = linspace(0., 1., 10);
    let problem = RedundantSlope {
        y: 3. * &t,
        t,
    };
    // truncating every singular value leaves no direction at all
    let solver = GaussNewtonSolverBuilder::new()
        .direction_solver(SvdDirectionSolver::with_epsilon(1e6).unwrap())
        .build()
        .unwrap();
    let report = solver.solve(&problem, DVector::zeros(2)).unwrap();
    assert!(report.history.iter().all(|record| record.steepest_descent));
    // the steepest descent direction still makes progress
    assert!(report.history[0].alpha > 0.);
    assert!(report.termination.was_successful());
    assert_relative_eq!(report.params[0] + report.params[1], 3., epsilon = 1e-4);
}

#[test]
fn feasible_trajectory_is_honored_by_the_solver() {
    init_logger();
    let nonnegative = |x: &DVector<f64>, p: &DVector<f64>, alpha: f64| {
        let candidate = x + p * alpha;
        if candidate.iter().all(|&xi| xi >= 0.) {
            TrialPoint::Accepted(candidate)
        } else {
            TrialPoint::Rejected
        }
    };
    let problem = MichaelisMenten::example();
    let report = GaussNewtonSolverBuilder::new()
        .gradient_tolerance(1e-10)
        .trajectory(nonnegative)
        .build()
        .unwrap()
        .solve(&problem, DVector::zeros(2))
        .unwrap();
    assert_eq!(report.termination, Termination::Converged);
    assert!(report.params.iter().all(|&p| p >= 0.));

    let unconstrained = precise_solver().solve(&problem, DVector::zeros(2)).unwrap();
    assert_params_relative_eq(&report.params, &unconstrained.params, 1e-10);
}

#[test]
fn solver_and_line_search_can_be_used_through_the_prelude() {
    let line_search = ArmijoBacktracking::new();
    let result = line_search
        .search(
            |x: &DVector<f64>| x.norm_squared(),
            &DVector::from(vec![2.]),
            &DVector::from(vec![-1.]),
            &DVector::from(vec![1.]),
            &StraightLine,
        )
        .unwrap();
    assert_eq!(result.alpha, 1.);
    assert_eq!(result.point[0], 0.);

    let problem = FnProblem::new(
        |x: &DVector<f64>| x.map(|xi| xi * xi - 2.),
        |x: &DVector<f64>| nalgebra::DMatrix::from_diagonal(&x.map(|xi| 2. * xi)),
    );
    let report = GaussNewtonSolver::new()
        .solve(&problem, DVector::from(vec![1., -1.]))
        .unwrap();
    assert!(report.termination.was_successful());
    assert_relative_eq!(report.params[0], 2f64.sqrt(), epsilon = 1e-5);
    assert_relative_eq!(report.params[1], -(2f64.sqrt()), epsilon = 1e-5);
}
