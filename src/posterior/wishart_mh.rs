//! Independence Metropolis sampler for the Bingham conjugate posterior with
//! Wishart proposals.
//!
//! Candidates come from `W(2Σ, p + 1)`, where `Σ = (C Cᵀ)^{−1}` is the scale
//! matrix, and are accepted with log probability
//! `n · (log c(previous) − log c(candidate))`. Mixing is poor in more than a
//! few dimensions; [`EigenGibbsSampler`](super::EigenGibbsSampler) is the
//! better chain.

use rand::Rng;
use tracing::trace;

use crate::bingham::constant::log_bingham_const_eigvals;
use crate::error::{Error, Result};
use crate::linalg::{eigh_sorted, lower_triangular_inverse, EigenOrder};
use crate::types::Matrix;
use crate::wishart::sample_wishart;

/// Metropolis chain over positive-definite matrices.
#[derive(Debug, Clone)]
pub struct WishartMetropolis {
    proposal_factor: Matrix,
    dof: f64,
    last: Option<(Matrix, f64)>,
    proposed: u64,
    accepted: u64,
}

impl WishartMetropolis {
    /// Chain for inverse-scale factor `inv_scale_l` and `dof` degrees of
    /// freedom.
    pub fn new(inv_scale_l: &Matrix, dof: f64) -> Result<Self> {
        if !(dof >= 0.0 && dof.is_finite()) {
            return Err(Error::invalid("dof", format!("must be finite and >= 0, got {}", dof)));
        }
        // (C Cᵀ)^{−1} = C^{−T} C^{−1}, so √2·C^{−T} factors 2Σ.
        let c_inv = lower_triangular_inverse(inv_scale_l)?;
        Ok(Self {
            proposal_factor: c_inv.transpose() * core::f64::consts::SQRT_2,
            dof,
            last: None,
            proposed: 0,
            accepted: 0,
        })
    }

    /// Advance one step. A rejected candidate repeats the previous matrix.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Matrix> {
        let p = self.proposal_factor.nrows();
        let cand = sample_wishart(&self.proposal_factor, p as f64 + 1.0, rng)?;
        let (eigvals, _) = eigh_sorted(&cand, EigenOrder::Ascending)?;
        let log_c = log_bingham_const_eigvals(eigvals.as_slice())?;

        self.proposed += 1;
        let accept = match &self.last {
            None => true,
            Some((_, last_log_c)) => {
                let log_prob = self.dof * (last_log_c - log_c);
                rng.random::<f64>().ln() < log_prob
            }
        };
        trace!(accept, log_c, "Wishart Metropolis step");

        if accept {
            self.accepted += 1;
            self.last = Some((cand, log_c));
        }
        match &self.last {
            Some((m, _)) => Ok(m.clone()),
            None => Err(Error::diverged("wishart_metropolis", "chain has no state")),
        }
    }

    /// Endless iterator over successive steps.
    pub fn iter<'a, R: Rng + ?Sized>(&'a mut self, rng: &'a mut R) -> impl Iterator<Item = Result<Matrix>> + 'a {
        core::iter::repeat_with(move || self.step(&mut *rng))
    }

    /// Fraction of candidates accepted, `None` before the first step.
    pub fn acceptance_rate(&self) -> Option<f64> {
        (self.proposed > 0).then(|| self.accepted as f64 / self.proposed as f64)
    }
}
