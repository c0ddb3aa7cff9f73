//! Von Mises–Fisher draws centred at `e₁ = [1, 0, …, 0]` and their expected
//! scatter matrix.
//!
//! A draw is `[cos θ, sin θ · u]` with `θ ~ VonMises(0, κ)` and `u` uniform on
//! the unit sphere in the remaining `dims − 1` coordinates. To centre the
//! distribution elsewhere, reflect the draw with a Householder transform.

use rand::Rng;
use rand_distr::Distribution;

use crate::distributions::{unit_vector, VonMises};
use crate::error::{Error, Result};
use crate::types::{Matrix, Vector};

/// One unit vector concentrated around `e₁`.
pub fn sample_von_mises_fisher<R: Rng + ?Sized>(dims: usize, kappa: f64, rng: &mut R) -> Result<Vector> {
    if dims < 2 {
        return Err(Error::invalid("dims", format!("need at least 2 dimensions, got {}", dims)));
    }
    let theta = VonMises::new(0.0, kappa)?.sample(rng);
    let tail = unit_vector(dims - 1, rng) * theta.sin();

    let mut x = Vector::zeros(dims);
    x[0] = theta.cos();
    x.rows_mut(1, dims - 1).copy_from(&tail);
    Ok(x)
}

/// Scatter matrix `Σ x xᵀ` of `n` independent draws.
pub fn sample_scatter<R: Rng + ?Sized>(dims: usize, kappa: f64, n: usize, rng: &mut R) -> Result<Matrix> {
    let mut scatter = Matrix::zeros(dims, dims);
    for _ in 0..n {
        let x = sample_von_mises_fisher(dims, kappa, rng)?;
        scatter.ger(1.0, &x, &x, 1.0);
    }
    Ok(scatter)
}

/// Monte-Carlo estimate of `E[x xᵀ]`, drawn in batches of `step`.
///
/// The distribution is symmetric under rotations fixing `e₁`, so entries are
/// pooled into three classes and each is replaced by its mean: the first
/// row/column off the diagonal, the rest of the diagonal, and every other
/// off-diagonal entry. The standard error of a diagonal entry is below
/// `(12·samples)^{−½}`.
pub fn expected_scatter<R: Rng + ?Sized>(
    dims: usize,
    kappa: f64,
    rng: &mut R,
    samples: usize,
    step: usize,
) -> Result<Matrix> {
    if step == 0 || samples % step != 0 {
        return Err(Error::invalid(
            "step",
            format!("samples ({}) must be a positive multiple of step ({})", samples, step),
        ));
    }
    if dims < 2 {
        return Err(Error::invalid("dims", format!("need at least 2 dimensions, got {}", dims)));
    }

    let mut e = Matrix::zeros(dims, dims);
    for _ in 0..samples / step {
        e += sample_scatter(dims, kappa, step, rng)? / samples as f64;
    }
    pool_classes(&mut e);
    Ok(e)
}

fn pool_classes(e: &mut Matrix) {
    let dims = e.nrows();

    let first = e.column(0).rows(1, dims - 1).mean();
    for i in 1..dims {
        e[(i, 0)] = first;
        e[(0, i)] = first;
    }

    let diag = (1..dims).map(|i| e[(i, i)]).sum::<f64>() / (dims - 1) as f64;
    for i in 1..dims {
        e[(i, i)] = diag;
    }

    let rest: Vec<(usize, usize)> = (2..dims).flat_map(|i| (1..i).map(move |j| (i, j))).collect();
    if !rest.is_empty() {
        let off = rest.iter().map(|&ij| e[ij]).sum::<f64>() / rest.len() as f64;
        for (i, j) in rest {
            e[(i, j)] = off;
            e[(j, i)] = off;
        }
    }
}
