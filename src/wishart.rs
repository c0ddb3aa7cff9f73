//! Wishart sampler via the Bartlett decomposition.
//!
//! For a p×p scale matrix `Σ = F Fᵀ` and `ν` degrees of freedom, draw a lower
//! triangular `A` with
//!
//! ```text
//! A[i,i]² ~ χ²(ν − i) = Gamma((ν − i)/2, scale 2)
//! A[i,j]  ~ N(0, 1)           for i > j
//! ```
//!
//! Then `F A Aᵀ Fᵀ ~ W(Σ, ν)`.

use rand::Rng;
use rand_distr::{Distribution, Gamma, StandardNormal};

use crate::error::{Error, Result};
use crate::linalg::ensure_square;
use crate::types::Matrix;

fn check_dof(dof: f64, p: usize) -> Result<()> {
    if !(dof > p as f64 - 1.0) || !dof.is_finite() {
        return Err(Error::invalid(
            "dof",
            format!("need dof > {} for a {}x{} scale, got {}", p as f64 - 1.0, p, p, dof),
        ));
    }
    Ok(())
}

/// Draw one matrix from `W(F Fᵀ, dof)`.
///
/// `scale_factor` is any square `F` with `F Fᵀ` equal to the scale matrix,
/// typically its Cholesky factor. The result is symmetrized to remove
/// rounding asymmetry.
pub fn sample_wishart<R: Rng + ?Sized>(scale_factor: &Matrix, dof: f64, rng: &mut R) -> Result<Matrix> {
    let p = ensure_square(scale_factor, "scale_factor")?;
    check_dof(dof, p)?;

    let mut a = Matrix::zeros(p, p);
    for i in 0..p {
        let chi2 = Gamma::new((dof - i as f64) / 2.0, 2.0)
            .map_err(|err| Error::invalid("dof", err.to_string()))?;
        a[(i, i)] = chi2.sample(rng).sqrt();
        for j in 0..i {
            a[(i, j)] = StandardNormal.sample(rng);
        }
    }

    let fa = scale_factor * a;
    let w = &fa * fa.transpose();
    Ok((&w + w.transpose()) * 0.5)
}

/// Mean of `W(scale, dof)`: `dof · scale`.
pub fn wishart_mean(scale: &Matrix, dof: f64) -> Matrix {
    scale * dof
}

/// Mode of `W(scale, dof)`: `(dof − p − 1) · scale`, defined for
/// `dof ≥ p + 1`.
pub fn wishart_mode(scale: &Matrix, dof: f64) -> Result<Matrix> {
    let p = ensure_square(scale, "scale")?;
    let floor = p as f64 + 1.0;
    if !(dof >= floor) {
        return Err(Error::invalid(
            "dof",
            format!("mode needs dof >= {}, got {}", floor, dof),
        ));
    }
    Ok(scale * (dof - floor))
}
