//! Gibbs sampler over the eigenvalues and eigenvectors of a matrix drawn from
//! the conjugate prior of the Bingham distribution.
//!
//! The target density for eigenvalues `L` and orthonormal eigenvectors `Q`,
//! given the Cholesky factor `C` of the inverse scale `V = C Cᵀ` and `n`
//! degrees of freedom, is
//!
//! ```text
//! π(L, Q) ∝ c(L)^{−n} · exp(−Σ_i L_i q_iᵀ V q_i) · Π_{i<j} |L_i − L_j|
//! ```
//!
//! The awkward factors are handled with auxiliary variables:
//!
//! ```text
//! log u ~ −Exp(1) − n log c(L)            (u uniform below c(L)^{−n})
//! v_ij  ~ U(0, |L_i − L_j|)                for j < i
//! ```
//!
//! With those fixed, each `L_i` is exponential with rate `q_iᵀ V q_i`,
//! restricted to stay above the root of `log c(L) = −log u / n` and outside
//! every `[L_j − v_ij, L_j + v_ij]`. Eigenvectors then move by Metropolis
//! Givens rotations in each coordinate pair. No burn-in is discarded.

use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::bingham::constant::{inverse_log_bingham_const, log_bingham_const_eigvals};
use crate::config::Config;
use crate::diagnostics::PairAcceptance;
use crate::error::{Error, Result};
use crate::intervals::{complement, sample_exp_intervals};
use crate::linalg::{eigh_sorted, ensure_square, lower_triangular_inverse, EigenOrder};
use crate::types::{Interval, Matrix, Vector};

/// Largest standard deviation allowed for a rotation-angle proposal.
const MAX_PROPOSAL_SD: f64 = core::f64::consts::PI;

/// One state of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenSample {
    /// Eigenvalues; entry `i` pairs with column `i` of `eigvecs`.
    pub eigvals: Vector,
    /// Orthonormal eigenvectors as columns.
    pub eigvecs: Matrix,
}

/// Serializable snapshot of a chain, enough to resume it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EigenChainState {
    /// Cholesky factor of the inverse scale matrix.
    pub inv_scale_l: Matrix,
    /// Degrees of freedom.
    pub dof: f64,
    /// Current eigenvalues.
    pub eigvals: Vector,
    /// Current eigenvectors as columns.
    pub eigvecs: Matrix,
    /// Rotation acceptance tallies so far.
    pub acceptance: PairAcceptance,
}

/// Joint eigenvalue/eigenvector Gibbs sampler.
#[derive(Debug, Clone)]
pub struct EigenGibbsSampler {
    inv_scale_l: Matrix,
    dof: f64,
    v: Matrix,
    v_eigs: Vector,
    proposal_scale: f64,

    eigvals: Vector,
    eigvecs: Matrix,
    aux: Matrix,
    acceptance: PairAcceptance,
    width_capped: bool,
}

impl EigenGibbsSampler {
    /// Start a chain at the ascending eigenpairs of the scale matrix
    /// `(C Cᵀ)^{−1}`.
    ///
    /// # Arguments
    /// * `inv_scale_l` - lower Cholesky factor `C` of the inverse scale
    /// * `dof` - degrees of freedom, must be positive
    /// * `config` - supplies the rotation proposal scale
    pub fn new(inv_scale_l: Matrix, dof: f64, config: &Config) -> Result<Self> {
        let c_inv = lower_triangular_inverse(&inv_scale_l)?;
        let scale = c_inv.transpose() * &c_inv;
        let (eigvals, eigvecs) = eigh_sorted(&symmetrize(scale), EigenOrder::Ascending)?;
        Self::build(inv_scale_l, dof, eigvals, eigvecs, PairAcceptance::new(0), config)
    }

    /// Continue a chain from a checkpoint.
    pub fn resume(state: EigenChainState, config: &Config) -> Result<Self> {
        let EigenChainState {
            inv_scale_l,
            dof,
            eigvals,
            eigvecs,
            acceptance,
        } = state;
        let p = inv_scale_l.nrows();
        if eigvals.len() != p || eigvecs.nrows() != p || eigvecs.ncols() != p {
            return Err(Error::invalid(
                "state",
                format!("checkpoint eigenpairs do not match a {}x{} factor", p, p),
            ));
        }
        if acceptance.dims() != p {
            return Err(Error::invalid("state", "checkpoint tallies have the wrong dimension"));
        }
        Self::build(inv_scale_l, dof, eigvals, eigvecs, acceptance, config)
    }

    fn build(
        inv_scale_l: Matrix,
        dof: f64,
        eigvals: Vector,
        eigvecs: Matrix,
        acceptance: PairAcceptance,
        config: &Config,
    ) -> Result<Self> {
        let p = ensure_square(&inv_scale_l, "inv_scale_l")?;
        if !(dof > 0.0 && dof.is_finite()) {
            return Err(Error::invalid("dof", format!("must be finite and > 0, got {}", dof)));
        }

        let v = symmetrize(&inv_scale_l * inv_scale_l.transpose());
        let (v_eigs, _) = eigh_sorted(&v, EigenOrder::Ascending)?;
        let acceptance = if acceptance.dims() == p {
            acceptance
        } else {
            PairAcceptance::new(p)
        };

        Ok(Self {
            inv_scale_l,
            dof,
            v,
            v_eigs,
            proposal_scale: config.proposal_scale,
            eigvals,
            eigvecs,
            aux: Matrix::zeros(p, p),
            acceptance,
            width_capped: false,
        })
    }

    /// One outer iteration: refresh the auxiliary variables, redraw every
    /// eigenvalue, then propose a rotation for every eigenvector pair.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<EigenSample> {
        let p = self.eigvals.len();

        let e: f64 = Exp1.sample(rng);
        let log_u = -e - self.dof * log_bingham_const_eigvals(self.eigvals.as_slice())?;
        for i in 0..p {
            for j in 0..i {
                let r = (self.eigvals[i] - self.eigvals[j]).abs() * rng.random::<f64>();
                self.aux[(i, j)] = r;
                self.aux[(j, i)] = r;
            }
        }

        self.sample_eigvals(log_u, rng)?;
        self.check_constraints(log_u);
        self.rotate_eigvecs(rng);

        trace!(log_u, eigvals = ?self.eigvals.as_slice(), "eigen Gibbs step");
        Ok(self.current())
    }

    fn sample_eigvals<R: Rng + ?Sized>(&mut self, log_u: f64, rng: &mut R) -> Result<()> {
        let p = self.eigvals.len();
        let target = -log_u / self.dof;

        for i in 0..p {
            let tmp = self.inv_scale_l.tr_mul(&self.eigvecs.column(i));
            let rate = tmp.norm_squared();

            let inv_min = inverse_log_bingham_const(self.eigvals.as_slice(), target, i)?;
            let mut banned: Vec<Interval> = Vec::with_capacity(p);
            banned.push((f64::NEG_INFINITY, inv_min.max(0.0)));
            for j in (0..p).filter(|&j| j != i) {
                let radius = self.aux[(i, j)];
                banned.push((self.eigvals[j] - radius, self.eigvals[j] + radius));
            }

            self.eigvals[i] = sample_exp_intervals(rate, &complement(&banned), rng)?;
        }
        Ok(())
    }

    fn check_constraints(&self, log_u: f64) {
        if cfg!(debug_assertions) {
            let p = self.eigvals.len();
            for i in 0..p {
                for j in 0..i {
                    let gap = (self.eigvals[i] - self.eigvals[j]).abs();
                    debug_assert!(gap + 1e-9 >= self.aux[(i, j)]);
                }
            }
            if let Ok(log_c) = log_bingham_const_eigvals(self.eigvals.as_slice()) {
                // The truncation point is only found to within the root tolerance.
                let slack = crate::constants::INVERSE_TOL * self.dof;
                debug_assert!(log_u < -self.dof * log_c + slack);
            }
        }
    }

    fn rotate_eigvecs<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let p = self.eigvals.len();
        for i in 0..p {
            for j in 0..i {
                let spread = ((self.eigvals[i] - self.eigvals[j]) * (self.v_eigs[i] - self.v_eigs[j])).abs();
                let mut sd = self.proposal_scale * spread.powf(-0.5);
                if !(sd <= MAX_PROPOSAL_SD) {
                    // Equal eigenvalues hit this on every step; report it once.
                    if self.width_capped {
                        debug!(i, j, sd, "rotation proposal width capped");
                    } else {
                        warn!(i, j, sd, "rotation proposal width capped");
                        self.width_capped = true;
                    }
                    sd = MAX_PROPOSAL_SD;
                }
                let z: f64 = StandardNormal.sample(rng);
                let (sin, cos) = (sd * z).sin_cos();

                let q_i = self.eigvecs.column(i).into_owned();
                let q_j = self.eigvecs.column(j).into_owned();
                let cand_i = &q_i * cos + &q_j * sin;
                let cand_j = &q_j * cos - &q_i * sin;

                let log_ratio = self.eigvals[i] * (self.quad(&q_i) - self.quad(&cand_i))
                    - self.eigvals[j] * (self.quad(&q_j) - self.quad(&cand_j));
                let accepted = rng.random::<f64>().ln() < log_ratio;
                if accepted {
                    self.eigvecs.set_column(i, &cand_i);
                    self.eigvecs.set_column(j, &cand_j);
                }
                self.acceptance.record(i, j, accepted);
            }
        }
    }

    /// `qᵀ V q`
    fn quad(&self, q: &Vector) -> f64 {
        q.dot(&(&self.v * q))
    }

    fn current(&self) -> EigenSample {
        EigenSample {
            eigvals: self.eigvals.clone(),
            eigvecs: self.eigvecs.clone(),
        }
    }

    /// Endless iterator over successive steps.
    pub fn iter<'a, R: Rng + ?Sized>(&'a mut self, rng: &'a mut R) -> EigenGibbsIter<'a, R> {
        EigenGibbsIter { sampler: self, rng }
    }

    /// Snapshot of the chain.
    pub fn checkpoint(&self) -> EigenChainState {
        EigenChainState {
            inv_scale_l: self.inv_scale_l.clone(),
            dof: self.dof,
            eigvals: self.eigvals.clone(),
            eigvecs: self.eigvecs.clone(),
            acceptance: self.acceptance.clone(),
        }
    }

    /// Rotation acceptance tallies accumulated so far.
    pub fn diagnostics(&self) -> &PairAcceptance {
        &self.acceptance
    }

    /// Current state without advancing the chain.
    pub fn state(&self) -> EigenSample {
        self.current()
    }
}

/// Iterator adapter returned by [`EigenGibbsSampler::iter`].
pub struct EigenGibbsIter<'a, R: ?Sized> {
    sampler: &'a mut EigenGibbsSampler,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Iterator for EigenGibbsIter<'_, R> {
    type Item = Result<EigenSample>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sampler.step(&mut *self.rng))
    }
}

fn symmetrize(m: Matrix) -> Matrix {
    (&m + m.transpose()) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn factor() -> Matrix {
        Matrix::from_row_slice(3, 3, &[2.0, 0.0, 0.0, 0.3, 1.5, 0.0, -0.2, 0.4, 1.0])
    }

    fn assert_orthonormal(q: &Matrix) {
        let gram = q.transpose() * q;
        let err = (gram - Matrix::identity(q.nrows(), q.ncols())).amax();
        assert!(err < 1e-8, "QᵀQ deviates from I by {:e}", err);
    }

    #[test]
    fn starts_at_scale_eigenpairs() {
        let c = factor();
        let sampler = EigenGibbsSampler::new(c.clone(), 5.0, &Config::default()).unwrap();
        let start = sampler.state();

        let scale = (&c * c.transpose()).try_inverse().unwrap();
        for i in 0..3 {
            let q = start.eigvecs.column(i).into_owned();
            let residual = &scale * &q - &q * start.eigvals[i];
            assert!(residual.amax() < 1e-9);
        }
        assert!(start.eigvals[0] <= start.eigvals[1] && start.eigvals[1] <= start.eigvals[2]);
    }

    #[test]
    fn chain_keeps_invariants() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(61);
        let mut sampler = EigenGibbsSampler::new(factor(), 6.0, &Config::default()).unwrap();
        for sample in sampler.iter(&mut rng).take(100) {
            let sample = sample.unwrap();
            assert!(sample.eigvals.iter().all(|&l| l >= 0.0 && l.is_finite()));
            assert_orthonormal(&sample.eigvecs);
        }

        let acc = sampler.diagnostics();
        assert_eq!(acc.proposed(1, 0), 100);
        assert_eq!(acc.proposed(2, 1), 100);
        assert!(acc.overall_rate().unwrap() > 0.0);
    }

    #[test]
    fn resume_continues_identically() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(62);
        let config = Config::default();
        let mut original = EigenGibbsSampler::new(factor(), 4.0, &config).unwrap();
        for _ in 0..5 {
            original.step(&mut rng).unwrap();
        }

        let mut resumed = EigenGibbsSampler::resume(original.checkpoint(), &config).unwrap();
        let mut rng_copy = rng.clone();
        for _ in 0..5 {
            assert_eq!(original.step(&mut rng).unwrap(), resumed.step(&mut rng_copy).unwrap());
        }
        assert_eq!(original.diagnostics(), resumed.diagnostics());
    }

    #[test]
    fn checkpoint_survives_json() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(63);
        let config = Config::default();
        let mut original = EigenGibbsSampler::new(factor(), 5.0, &config).unwrap();
        for _ in 0..5 {
            original.step(&mut rng).unwrap();
        }

        let json = serde_json::to_string(&original.checkpoint()).expect("serialize");
        let state: EigenChainState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(state, original.checkpoint());

        let mut resumed = EigenGibbsSampler::resume(state, &config).unwrap();
        let mut rng_copy = rng.clone();
        for _ in 0..5 {
            assert_eq!(original.step(&mut rng).unwrap(), resumed.step(&mut rng_copy).unwrap());
        }
        assert_eq!(original.diagnostics(), resumed.diagnostics());
    }

    #[test]
    fn equal_scale_eigenvalues_cap_width_and_keep_running() {
        // V = I has no spread between any pair.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(64);
        let config = Config::default();
        let mut state = EigenGibbsSampler::new(Matrix::identity(3, 3), 6.0, &config).unwrap().checkpoint();
        state.eigvals = Vector::from_row_slice(&[0.5, 1.0, 2.0]);
        let mut sampler = EigenGibbsSampler::resume(state, &config).unwrap();
        assert!(!sampler.width_capped);
        for sample in sampler.iter(&mut rng).take(20) {
            assert_orthonormal(&sample.unwrap().eigvecs);
        }
        assert!(sampler.width_capped);
        assert_eq!(sampler.diagnostics().proposed(2, 0), 20);
    }

    #[test]
    fn rejects_bad_parameters() {
        let config = Config::default();
        assert!(EigenGibbsSampler::new(factor(), 0.0, &config).is_err());
        assert!(EigenGibbsSampler::new(Matrix::zeros(2, 3), 3.0, &config).is_err());
        assert!(EigenGibbsSampler::new(Matrix::zeros(2, 2), 3.0, &config).is_err());

        let mut state = EigenGibbsSampler::new(factor(), 3.0, &config).unwrap().checkpoint();
        state.eigvals = Vector::zeros(2);
        assert!(EigenGibbsSampler::resume(state, &config).is_err());
    }
}
