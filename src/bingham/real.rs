//! Gibbs sampler for the real Bingham distribution.
//!
//! Method from Kume and Walker, "Sampling from compositional and directional
//! distributions", Statistics and Computing 2006, with eigenvalues indexed as
//! in Kent: `s_k = 1 − Σs` is the coordinate of the smallest eigenvalue. All
//! eigenvalues are assumed distinct, which keeps every full conditional a
//! single interval.
//!
//! Two auxiliary variables remove the awkward factors of the simplex density
//! `exp(−Σ λ_i s_i) · (1 − Σs)^{−½} · Π s_i^{−½}`:
//!
//! ```text
//! v ~ U(0, exp(−Σ λ_i s_i))        w ~ U(0, (1 − Σs)^{−½})
//! ```
//!
//! after which each `√s_i` is uniform on an interval `[√c, √d]`.
//!
//! Points are mapped back to the sphere without random signs, so draws lie
//! in one orthant of the eigenbasis.

use rand::Rng;

use super::{dual_lambdas, reverse_columns, shifted_eigen, simplex_to_sphere};
use crate::bingham::constant::log_bingham_const;
use crate::distributions::uniform;
use crate::error::{Error, Result};
use crate::types::{Matrix, Vector};

/// Real Bingham sampler holding a persistent Gibbs chain.
///
/// Successive calls to [`sample`](Self::sample) continue the same Markov
/// chain, so draws are correlated; raise `thin` to reduce that.
#[derive(Debug, Clone)]
pub struct BinghamSampler {
    lambdas: Vec<f64>,
    eigvecs: Matrix,
    smallest_eig: f64,
    s: Vec<f64>,
}

impl BinghamSampler {
    /// Create a sampler from shifted eigenvalues of −A.
    ///
    /// # Arguments
    /// * `lambdas` - the k−1 largest eigenvalues of −A minus the smallest, in
    ///   descending order
    /// * `eigvecs` - k×k basis whose columns pair with `[lambdas…, 0]`
    /// * `smallest_eig` - the smallest eigenvalue of −A before the shift
    pub fn new(lambdas: Vec<f64>, eigvecs: Matrix, smallest_eig: f64) -> Result<Self> {
        let k = lambdas.len() + 1;
        if eigvecs.nrows() != k || eigvecs.ncols() != k {
            return Err(Error::invalid(
                "eigvecs",
                format!(
                    "expected {}x{} basis, got {}x{}",
                    k,
                    k,
                    eigvecs.nrows(),
                    eigvecs.ncols()
                ),
            ));
        }
        if let Some(&bad) = lambdas.iter().find(|l| !(**l >= 0.0 && l.is_finite())) {
            return Err(Error::invalid(
                "lambdas",
                format!("shifted eigenvalues must be finite and >= 0, got {}", bad),
            ));
        }
        let s = vec![0.0; lambdas.len()];
        Ok(Self {
            lambdas,
            eigvecs,
            smallest_eig,
            s,
        })
    }

    /// Create the sampler for Bingham(A) from the symmetric parameter matrix.
    pub fn from_matrix(a: &Matrix) -> Result<Self> {
        let (lambdas, eigvecs, smallest) = shifted_eigen(a)?;
        Self::new(lambdas, eigvecs, smallest)
    }

    /// Sampler for Bingham(−A), derived without rebuilding the matrix.
    ///
    /// The chain state is not carried over.
    pub fn dual(&self) -> Self {
        let (lambdas, smallest_eig) = match self.lambdas.first() {
            Some(&biggest) => (dual_lambdas(&self.lambdas), -(biggest + self.smallest_eig)),
            None => (Vec::new(), -self.smallest_eig),
        };
        let s = vec![0.0; lambdas.len()];
        Self {
            lambdas,
            eigvecs: reverse_columns(&self.eigvecs),
            smallest_eig,
            s,
        }
    }

    /// Run `thin` Gibbs sweeps and return the final point on the sphere.
    ///
    /// With `thin == 0` the chain does not move and the current state is
    /// returned again.
    ///
    /// Each coordinate in the eigenbasis is the non-negative root of its
    /// simplex coordinate, so every draw lies in the positive orthant of
    /// [`eigvecs`](Self::eigvecs). The density only depends on `x xᵀ` up to
    /// those signs: diagonal second moments in the eigenbasis are right, but
    /// off-diagonal ones are not the Bingham moments.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R, thin: usize) -> Vector {
        for _ in 0..thin {
            self.sweep(rng);
        }
        simplex_to_sphere(&self.s, Some(&self.eigvecs))
    }

    fn sweep<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let lambdas = &self.lambdas;
        let s = &mut self.s;

        let weighted: f64 = lambdas.iter().zip(s.iter()).map(|(l, x)| l * x).sum();
        let total: f64 = s.iter().sum();
        let v = uniform(rng, 0.0, (-weighted).exp());
        let w = uniform(rng, 0.0, (1.0 - total).max(0.0).powf(-0.5));
        let neg_log_v = -v.ln();
        let w_term = w.powi(-2);

        for i in 0..lambdas.len() {
            let mut sum_of_others = 0.0;
            let mut product_sum = 0.0;
            for (j, (&l_j, &s_j)) in lambdas.iter().zip(s.iter()).enumerate() {
                if j != i {
                    sum_of_others += s_j;
                    product_sum += l_j * s_j;
                }
            }

            let c = (1.0 - w_term - sum_of_others).max(0.0);
            let d_exp = if lambdas[i] == 0.0 {
                f64::INFINITY
            } else {
                (neg_log_v - product_sum) / lambdas[i]
            };
            let d = d_exp.min(1.0 - sum_of_others).max(0.0);

            let u = uniform(rng, c.sqrt(), d.sqrt());
            s[i] = u * u;
        }
    }

    /// Log normalizing constant of Bingham(A).
    pub fn log_const(&self) -> Result<f64> {
        Ok(log_bingham_const(&self.lambdas)? - self.smallest_eig)
    }

    /// Shifted eigenvalues of −A (descending, smallest omitted).
    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }

    /// Eigenvector basis; column `i` pairs with `lambdas[i]`, the last column
    /// with the smallest eigenvalue.
    pub fn eigvecs(&self) -> &Matrix {
        &self.eigvecs
    }

    /// Smallest eigenvalue of −A before the shift.
    pub fn smallest_eig(&self) -> f64 {
        self.smallest_eig
    }

    /// Dimension k of the sphere's ambient space.
    pub fn dims(&self) -> usize {
        self.lambdas.len() + 1
    }
}
