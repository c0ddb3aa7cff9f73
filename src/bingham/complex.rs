//! Rejection samplers for the complex Bingham distribution.
//!
//! Based on Kent, Constable and Er, "Simulation for the complex Bingham
//! distribution", Statistics and Computing 2004. Method 3 of that paper only
//! pays off when every λ is close to 0.5 and is not implemented.
//!
//! The moduli `|z_j|²` of a complex Bingham variate are distributed on the
//! simplex with density `∝ exp(−Σ λ_j s_j)`. The sampler returns the real
//! vector `√[s, 1 − Σs]`, rotated by the eigenvector basis when one is known;
//! it does not attach phases.

use rand::Rng;
use tracing::debug;

use super::{dual_lambdas, reverse_columns, shifted_eigen, simplex_to_sphere};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::math;
use crate::types::{Matrix, Vector};

/// Rejection strategy used by a [`ComplexBinghamSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMethod {
    /// Method 1: independent truncated exponentials, rejected unless they
    /// land inside the simplex.
    Truncation,
    /// Method 2: uniform points on the simplex accepted with probability
    /// `exp(−Σ λ_j s_j)`.
    AcceptReject,
}

impl SamplingMethod {
    /// Pick the method with the smaller expected number of proposals
    /// (Table 1 of Kent et al., common factor dropped):
    ///
    /// ```text
    /// m1 = log(k−1) + Σ log(1 − e^{−λ_j})
    /// m2 = log k + Σ log λ_j − log Γ(k)
    /// ```
    ///
    /// Method 1 is undefined when some λ_j = 0, so Method 2 is used then.
    pub fn select(lambdas: &[f64]) -> Self {
        if lambdas.iter().any(|&l| l == 0.0) {
            return SamplingMethod::AcceptReject;
        }
        let k = (lambdas.len() + 1) as f64;

        let m1 = (k - 1.0).ln()
            + lambdas
                .iter()
                .map(|&l| math::ln_one_minus_exp_neg(l))
                .sum::<f64>();
        let m2 = k.ln() + lambdas.iter().map(|&l| l.ln()).sum::<f64>() - math::ln_gamma(k);

        if m1 < m2 {
            SamplingMethod::Truncation
        } else {
            SamplingMethod::AcceptReject
        }
    }
}

/// Complex Bingham sampler.
///
/// Holds no chain state: every draw is independent.
#[derive(Debug, Clone)]
pub struct ComplexBinghamSampler {
    lambdas: Vec<f64>,
    eigvecs: Option<Matrix>,
    method: SamplingMethod,
    max_attempts: Option<usize>,
}

impl ComplexBinghamSampler {
    /// Create a sampler from the parameter matrix A.
    pub fn from_matrix(a: &Matrix) -> Result<Self> {
        let (lambdas, eigvecs, _) = shifted_eigen(a)?;
        Self::from_lambdas(lambdas, Some(eigvecs))
    }

    /// Create a sampler from shifted eigenvalues of −A (descending, smallest
    /// omitted) and an optional k×k basis.
    ///
    /// Without a basis, draws are returned in the eigen-coordinates.
    pub fn from_lambdas(lambdas: Vec<f64>, eigvecs: Option<Matrix>) -> Result<Self> {
        if let Some(&bad) = lambdas.iter().find(|l| !(**l >= 0.0 && l.is_finite())) {
            return Err(Error::invalid(
                "lambdas",
                format!("shifted eigenvalues must be finite and >= 0, got {}", bad),
            ));
        }
        let k = lambdas.len() + 1;
        if let Some(q) = &eigvecs {
            if q.nrows() != k || q.ncols() != k {
                return Err(Error::invalid(
                    "eigvecs",
                    format!("expected {}x{} basis, got {}x{}", k, k, q.nrows(), q.ncols()),
                ));
            }
        }

        let method = SamplingMethod::select(&lambdas);
        debug!(?method, k, "complex Bingham sampler selected rejection method");
        Ok(Self {
            lambdas,
            eigvecs,
            method,
            max_attempts: None,
        })
    }

    /// Override the automatically selected method.
    ///
    /// Forcing [`SamplingMethod::Truncation`] with a zero eigenvalue is
    /// rejected, since the truncated exponential is then undefined.
    pub fn with_method(mut self, method: SamplingMethod) -> Result<Self> {
        if method == SamplingMethod::Truncation && self.lambdas.iter().any(|&l| l == 0.0) {
            return Err(Error::invalid(
                "method",
                "truncation sampling needs every lambda > 0",
            ));
        }
        self.method = method;
        Ok(self)
    }

    /// Give up with [`Error::AttemptsExhausted`] after `attempts` proposals.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Apply the attempt cap from a [`Config`], if it sets one.
    pub fn with_config(mut self, config: &Config) -> Self {
        if config.max_attempts.is_some() {
            self.max_attempts = config.max_attempts;
        }
        self
    }

    /// Sampler for the distribution with parameter −A.
    pub fn dual(&self) -> Self {
        let lambdas = dual_lambdas(&self.lambdas);
        let method = SamplingMethod::select(&lambdas);
        Self {
            lambdas,
            eigvecs: self.eigvecs.as_ref().map(reverse_columns),
            method,
            max_attempts: self.max_attempts,
        }
    }

    /// Draw one unit vector.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vector> {
        let s = match self.method {
            SamplingMethod::Truncation => self.sample_truncation(rng)?,
            SamplingMethod::AcceptReject => self.sample_accept_reject(rng)?,
        };
        Ok(simplex_to_sphere(&s, self.eigvecs.as_ref()))
    }

    fn check_attempts(&self, attempts: usize) -> Result<()> {
        match self.max_attempts {
            Some(max) if attempts >= max => Err(Error::AttemptsExhausted { attempts }),
            _ => Ok(()),
        }
    }

    /// Method 1: `s_j = −log(1 − u_j(1 − e^{−λ_j}))/λ_j` until `Σs < 1`.
    fn sample_truncation<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        let mut attempts = 0;
        loop {
            self.check_attempts(attempts)?;
            attempts += 1;

            let s: Vec<f64> = self
                .lambdas
                .iter()
                .map(|&l| {
                    let u: f64 = rng.random();
                    -(1.0 - u * math::one_minus_exp_neg(l)).ln() / l
                })
                .collect();
            if s.iter().sum::<f64>() < 1.0 {
                return Ok(s);
            }
        }
    }

    /// Method 2: gaps between sorted uniforms, accepted when
    /// `log U < −Σ λ_j s_j`.
    fn sample_accept_reject<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        let mut attempts = 0;
        loop {
            self.check_attempts(attempts)?;
            attempts += 1;

            let mut uniforms: Vec<f64> = (0..self.lambdas.len()).map(|_| rng.random()).collect();
            uniforms.sort_by(f64::total_cmp);

            let mut last = 0.0;
            let s: Vec<f64> = uniforms
                .iter()
                .map(|&u| {
                    let gap = u - last;
                    last = u;
                    gap
                })
                .collect();

            let log_u = rng.random::<f64>().ln();
            let log_accept: f64 = -self.lambdas.iter().zip(&s).map(|(l, x)| l * x).sum::<f64>();
            if log_u < log_accept {
                return Ok(s);
            }
        }
    }

    /// Rejection strategy in use.
    pub fn method(&self) -> SamplingMethod {
        self.method
    }

    /// Shifted eigenvalues of −A (descending, smallest omitted).
    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }

    /// Eigenvector basis, if the sampler was given one.
    pub fn eigvecs(&self) -> Option<&Matrix> {
        self.eigvecs.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn diag(values: &[f64]) -> Matrix {
        Matrix::from_diagonal(&Vector::from_row_slice(values))
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-10, "{:?} != {:?}", a, b);
        }
    }

    fn method_for(lambdas: &[f64]) -> SamplingMethod {
        ComplexBinghamSampler::from_lambdas(lambdas.to_vec(), None)
            .unwrap()
            .method()
    }

    #[test]
    fn init_from_matrix() {
        let bs = ComplexBinghamSampler::from_matrix(&diag(&[5.0, 3.0, 1.0])).unwrap();
        assert_close(bs.lambdas(), &[4.0, 2.0]);
        let bs = ComplexBinghamSampler::from_matrix(&diag(&[-3.0, 5.0, -1.0])).unwrap();
        assert_close(bs.lambdas(), &[8.0, 6.0]);
    }

    #[test]
    fn dual_matches_negated_matrix() {
        let a = diag(&[5.0, 3.0, 1.0]);
        let dual = ComplexBinghamSampler::from_matrix(&a).unwrap().dual();
        let direct = ComplexBinghamSampler::from_matrix(&(-&a)).unwrap();

        assert_close(direct.lambdas(), dual.lambdas());
        let (p, q) = (direct.eigvecs().unwrap(), dual.eigvecs().unwrap());
        for j in 0..3 {
            assert!((p.column(j).dot(&q.column(j)).abs() - 1.0).abs() < 1e-10);
        }
    }

    // Expected methods from Table 2 of Kent, Constable and Er (2004).

    #[test]
    fn method_table_small_lambdas() {
        assert_eq!(method_for(&[0.01, 0.01]), SamplingMethod::AcceptReject);
        assert_eq!(method_for(&[0.1, 0.01]), SamplingMethod::AcceptReject);
        assert_eq!(method_for(&[0.5, 0.01]), SamplingMethod::AcceptReject);
        assert_eq!(method_for(&[0.1, 0.1]), SamplingMethod::AcceptReject);
    }

    #[test]
    fn method_table_larger_lambdas() {
        assert_eq!(method_for(&[1.0, 0.01]), SamplingMethod::Truncation);
        assert_eq!(method_for(&[1.0, 0.1]), SamplingMethod::Truncation);
        assert_eq!(method_for(&[0.5, 0.5]), SamplingMethod::Truncation);
    }

    #[test]
    fn zero_lambda_forces_accept_reject() {
        assert_eq!(method_for(&[3.0, 0.0]), SamplingMethod::AcceptReject);
        let bs = ComplexBinghamSampler::from_lambdas(vec![3.0, 0.0], None).unwrap();
        assert!(bs.with_method(SamplingMethod::Truncation).is_err());
    }

    #[test]
    fn both_methods_produce_unit_vectors() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(31);
        let a = Matrix::from_row_slice(3, 3, &[1.0, 0.2, 0.0, 0.2, -0.5, 0.1, 0.0, 0.1, -1.5]);
        for method in [SamplingMethod::Truncation, SamplingMethod::AcceptReject] {
            let bs = ComplexBinghamSampler::from_matrix(&a)
                .unwrap()
                .with_method(method)
                .unwrap();
            for _ in 0..200 {
                let z = bs.sample(&mut rng).unwrap();
                assert!((z.norm() - 1.0).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn methods_agree_in_distribution() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(32);
        let base = ComplexBinghamSampler::from_lambdas(vec![1.0, 0.5], None).unwrap();
        let n = 20_000;
        let mean_first = |bs: &ComplexBinghamSampler, rng: &mut Xoshiro256PlusPlus| {
            (0..n).map(|_| bs.sample(rng).unwrap()[0].powi(2)).sum::<f64>() / n as f64
        };
        let m1 = mean_first(&base.clone().with_method(SamplingMethod::Truncation).unwrap(), &mut rng);
        let m2 = mean_first(&base.with_method(SamplingMethod::AcceptReject).unwrap(), &mut rng);
        assert!((m1 - m2).abs() < 0.02, "method 1: {}, method 2: {}", m1, m2);
    }

    #[test]
    fn config_sets_attempt_cap() {
        let bs = ComplexBinghamSampler::from_lambdas(vec![1.0], None)
            .unwrap()
            .with_config(&Config::default().max_attempts(7));
        assert_eq!(bs.max_attempts, Some(7));
        let untouched = bs.with_config(&Config::default());
        assert_eq!(untouched.max_attempts, Some(7));
    }

    #[test]
    fn attempt_cap_surfaces_error() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(33);
        let bs = ComplexBinghamSampler::from_lambdas(vec![500.0, 400.0], None)
            .unwrap()
            .with_method(SamplingMethod::AcceptReject)
            .unwrap()
            .with_max_attempts(5);
        assert_eq!(
            bs.sample(&mut rng).unwrap_err(),
            Error::AttemptsExhausted { attempts: 5 }
        );
    }
}
