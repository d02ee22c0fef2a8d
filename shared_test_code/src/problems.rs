use gnls::problem::LeastSquaresProblem;
use nalgebra::{DMatrix, DVector};

/// The Michaelis–Menten rate law `r = vmax * s / (km + s)` fitted to measured
/// reaction rates `r` at substrate concentrations `s`.
/// Parameters are `[vmax, km]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MichaelisMenten {
    /// substrate concentrations
    pub substrate: DVector<f64>,
    /// measured reaction rates
    pub rate: DVector<f64>,
}

impl MichaelisMenten {
    /// the measurements of the Gauss-Newton example on Wikipedia, which
    /// stem from a biology experiment on the enzyme mediated reaction
    /// rate of NADPH
    pub fn example() -> Self {
        Self {
            substrate: DVector::from(vec![0.038, 0.194, 0.425, 0.626, 1.253, 2.500, 3.740]),
            rate: DVector::from(vec![0.050, 0.127, 0.094, 0.2122, 0.2729, 0.2665, 0.3317]),
        }
    }

    /// the model rates for the given parameters
    pub fn model(&self, params: &DVector<f64>) -> DVector<f64> {
        let (vmax, km) = (params[0], params[1]);
        self.substrate.map(|s| vmax * s / (km + s))
    }
}

impl LeastSquaresProblem<f64> for MichaelisMenten {
    fn residual(&self, params: &DVector<f64>) -> DVector<f64> {
        self.model(params) - &self.rate
    }

    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64> {
        let (vmax, km) = (params[0], params[1]);
        let mut jacobian = DMatrix::zeros(self.substrate.len(), 2);
        for (row, &s) in self.substrate.iter().enumerate() {
            jacobian[(row, 0)] = s / (km + s);
            jacobian[(row, 1)] = -vmax * s / (km + s).powi(2);
        }
        jacobian
    }
}

/// exponential decay with constant offset `y = a * exp(-t/tau) + c`
/// fitted to observations `y` at times `t`. Parameters are `[a, tau, c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialDecay {
    /// the sample times
    pub t: DVector<f64>,
    /// the observations
    pub y: DVector<f64>,
}

impl ExponentialDecay {
    /// create a problem whose observations are the model evaluated at
    /// the given (true) parameters
    pub fn without_noise(t: DVector<f64>, true_params: &[f64; 3]) -> Self {
        let y = exponential_decay(&t, &DVector::from(true_params.to_vec()));
        Self { t, y }
    }
}

/// evaluate `a * exp(-t/tau) + c` for the parameters `[a, tau, c]`
pub fn exponential_decay(t: &DVector<f64>, params: &DVector<f64>) -> DVector<f64> {
    let (a, tau, c) = (params[0], params[1], params[2]);
    t.map(|t| a * (-t / tau).exp() + c)
}

impl LeastSquaresProblem<f64> for ExponentialDecay {
    fn residual(&self, params: &DVector<f64>) -> DVector<f64> {
        exponential_decay(&self.t, params) - &self.y
    }

    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64> {
        let (a, tau) = (params[0], params[1]);
        let mut jacobian = DMatrix::zeros(self.t.len(), 3);
        for (row, &t) in self.t.iter().enumerate() {
            let decay = (-t / tau).exp();
            jacobian[(row, 0)] = decay;
            jacobian[(row, 1)] = a * decay * t / (tau * tau);
            jacobian[(row, 2)] = 1.;
        }
        jacobian
    }
}

/// the line `y = (p0 + p1) * t`, where only the sum of the two parameters
/// can be determined. The Jacobian has two identical columns everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RedundantSlope {
    /// the sample positions
    pub t: DVector<f64>,
    /// the observations
    pub y: DVector<f64>,
}

impl LeastSquaresProblem<f64> for RedundantSlope {
    fn residual(&self, params: &DVector<f64>) -> DVector<f64> {
        (params[0] + params[1]) * &self.t - &self.y
    }

    fn jacobian(&self, _params: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_columns(&[self.t.clone(), self.t.clone()])
    }
}
