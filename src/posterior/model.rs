//! Conjugate Wishart prior for the Bingham distribution.
//!
//! The Bingham parameter is `−A/2` with `A ~ W(Σ, n)`. Observing a unit
//! vector `x` adds `x xᵀ` to the inverse scale `Σ^{−1}` and one degree of
//! freedom, which on the Cholesky factor is a rank-1 update.
//!
//! Every update returns a new model; nothing is mutated in place.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use super::{EigenGibbsSampler, WishartMetropolis};
use crate::bingham::BinghamSampler;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::linalg::{chol_downdate, chol_update, cholesky_lower, ensure_square, lower_triangular_inverse};
use crate::types::{Matrix, Vector};
use crate::vmf::expected_scatter;
use crate::wishart::{self, sample_wishart};

/// Update applied to a [`BinghamWishartModel`], as reported to an observer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// `n` pseudo-observations of an expected scatter matrix were added.
    Incremented {
        /// Pseudo-observation count.
        n: f64,
        /// Degrees of freedom after the update.
        dof: f64,
    },
    /// A success observation was folded in.
    Success {
        /// The observation.
        x: Vector,
        /// Degrees of freedom after the update.
        dof: f64,
    },
    /// A failure observation was removed.
    Failure {
        /// The observation.
        x: Vector,
        /// Degrees of freedom after the update.
        dof: f64,
    },
}

/// Callback invoked with every [`ModelEvent`].
pub type ModelObserver = Arc<dyn Fn(&ModelEvent) + Send + Sync>;

/// Wishart distribution over the Bingham parameter, held as the lower
/// Cholesky factor of its inverse scale.
#[derive(Clone)]
pub struct BinghamWishartModel {
    inv_scale_l: Matrix,
    dof: f64,
    observer: Option<ModelObserver>,
}

impl fmt::Debug for BinghamWishartModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinghamWishartModel")
            .field("inv_scale_l", &self.inv_scale_l)
            .field("dof", &self.dof)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl BinghamWishartModel {
    /// Model with inverse-scale factor `inv_scale_l` and `dof` degrees of
    /// freedom.
    pub fn new(inv_scale_l: Matrix, dof: f64) -> Result<Self> {
        ensure_square(&inv_scale_l, "inv_scale_l")?;
        if !(dof >= 0.0 && dof.is_finite()) {
            return Err(Error::invalid("dof", format!("must be finite and >= 0, got {}", dof)));
        }
        Ok(Self {
            inv_scale_l,
            dof,
            observer: None,
        })
    }

    /// Model with no information: zero factor and no degrees of freedom.
    ///
    /// It cannot be sampled until [`incremented_dof`](Self::incremented_dof)
    /// gives it a positive-definite inverse scale.
    pub fn empty(dims: usize) -> Self {
        Self {
            inv_scale_l: Matrix::zeros(dims, dims),
            dof: 0.0,
            observer: None,
        }
    }

    /// Informative prior: `dof` pseudo-observations of the expected scatter of
    /// a von Mises-Fisher distribution centred at `e₁` with concentration
    /// `kappa`, estimated with `config.scatter_samples` draws.
    pub fn with_prior<R: Rng + ?Sized>(
        dims: usize,
        kappa: f64,
        dof: f64,
        rng: &mut R,
        config: &Config,
    ) -> Result<Self> {
        if !(dof >= dims as f64) {
            return Err(Error::invalid(
                "dof",
                format!("prior needs at least {} pseudo-observations, got {}", dims, dof),
            ));
        }
        let exp_scatter = expected_scatter(dims, kappa, rng, config.scatter_samples, config.scatter_step)?;
        Self::empty(dims).incremented_dof(&exp_scatter, dof)
    }

    /// Install a callback that sees every later update.
    ///
    /// Models derived from this one keep the observer.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ModelEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    fn derived(&self, inv_scale_l: Matrix, dof: f64, event: ModelEvent) -> Self {
        debug!(?event, "Bingham-Wishart model updated");
        if let Some(observer) = &self.observer {
            observer(&event);
        }
        Self {
            inv_scale_l,
            dof,
            observer: self.observer.clone(),
        }
    }

    /// Scale matrix `(C Cᵀ)^{−1}`.
    pub fn scale(&self) -> Result<Matrix> {
        let c_inv = lower_triangular_inverse(&self.inv_scale_l)?;
        Ok(c_inv.transpose() * c_inv)
    }

    /// Inverse scale matrix `C Cᵀ`.
    pub fn inv_scale(&self) -> Matrix {
        &self.inv_scale_l * self.inv_scale_l.transpose()
    }

    /// Add `n` pseudo-observations whose average scatter is `exp_scatter`.
    pub fn incremented_dof(&self, exp_scatter: &Matrix, n: f64) -> Result<Self> {
        if exp_scatter.shape() != self.inv_scale_l.shape() {
            return Err(Error::invalid(
                "exp_scatter",
                format!(
                    "expected {}x{}, got {}x{}",
                    self.dims(),
                    self.dims(),
                    exp_scatter.nrows(),
                    exp_scatter.ncols()
                ),
            ));
        }
        let dof = self.dof + n;
        let inv_scale = self.inv_scale() + exp_scatter * n;
        let inv_scale = (&inv_scale + inv_scale.transpose()) * 0.5;
        let inv_scale_l = cholesky_lower(&inv_scale, "inv_scale")?;
        Ok(self.derived(inv_scale_l, dof, ModelEvent::Incremented { n, dof }))
    }

    /// Posterior after observing a success `x`.
    pub fn posterior_success(&self, x: &Vector) -> Result<Self> {
        let mut inv_scale_l = self.inv_scale_l.clone();
        chol_update(&mut inv_scale_l, x)?;
        let dof = self.dof + 1.0;
        Ok(self.derived(inv_scale_l, dof, ModelEvent::Success { x: x.clone(), dof }))
    }

    /// Remove the contribution of `x`: the exact inverse of
    /// [`posterior_success`](Self::posterior_success).
    ///
    /// Fails when the inverse scale would no longer be positive definite.
    pub fn posterior_failure(&self, x: &Vector) -> Result<Self> {
        let mut inv_scale_l = self.inv_scale_l.clone();
        chol_downdate(&mut inv_scale_l, x)?;
        let dof = self.dof - 1.0;
        Ok(self.derived(inv_scale_l, dof, ModelEvent::Failure { x: x.clone(), dof }))
    }

    /// Draw `A ~ W(Σ, n)`.
    pub fn sample_wishart<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Matrix> {
        let c_inv = lower_triangular_inverse(&self.inv_scale_l)?;
        sample_wishart(&c_inv.transpose(), self.dof, rng)
    }

    /// Draw a Wishart matrix `A`, then a unit vector from Bingham(−A/2) after
    /// `thin` Gibbs sweeps.
    pub fn sample_success<R: Rng + ?Sized>(&self, rng: &mut R, thin: usize) -> Result<Vector> {
        let a = self.sample_wishart(rng)?;
        self.sample_success_given(&a, rng, thin)
    }

    /// Unit vector from Bingham(−A/2) for a caller-supplied `A`.
    pub fn sample_success_given<R: Rng + ?Sized>(&self, a: &Matrix, rng: &mut R, thin: usize) -> Result<Vector> {
        let mut sampler = BinghamSampler::from_matrix(&(a * -0.5))?;
        Ok(sampler.sample(rng, thin))
    }

    /// Gibbs chain over the eigen-decomposition of a posterior draw.
    pub fn eigen_sampler(&self, config: &Config) -> Result<EigenGibbsSampler> {
        EigenGibbsSampler::new(self.inv_scale_l.clone(), self.dof, config)
    }

    /// Independence Metropolis chain over posterior draws.
    pub fn metropolis_sampler(&self) -> Result<WishartMetropolis> {
        WishartMetropolis::new(&self.inv_scale_l, self.dof)
    }

    /// `n · Σ`
    pub fn wishart_mean(&self) -> Result<Matrix> {
        Ok(wishart::wishart_mean(&self.scale()?, self.dof))
    }

    /// `(n − p − 1) · Σ`, defined for `n ≥ p + 1`.
    pub fn wishart_mode(&self) -> Result<Matrix> {
        wishart::wishart_mode(&self.scale()?, self.dof)
    }

    /// Lower Cholesky factor of the inverse scale.
    pub fn inv_scale_l(&self) -> &Matrix {
        &self.inv_scale_l
    }

    /// Degrees of freedom.
    pub fn dof(&self) -> f64 {
        self.dof
    }

    /// Dimension p of the matrices.
    pub fn dims(&self) -> usize {
        self.inv_scale_l.nrows()
    }
}
