//! Bingham distribution on the unit sphere.
//!
//! The density is `f(x) ∝ exp(xᵀ A x)` for a symmetric k×k matrix A. Both
//! samplers work on the eigen-decomposition of −A: the eigenvalues are
//! shifted so the smallest is 0 (it is then omitted), and a point is drawn on
//! the probability simplex `s` before being mapped back to the sphere by
//! `x = Q √[s, 1 − Σs]`.

pub mod complex;
pub mod constant;
pub mod real;

pub use complex::{ComplexBinghamSampler, SamplingMethod};
pub use constant::{inverse_log_bingham_const, log_bingham_const, log_bingham_const_eigvals};
pub use real::BinghamSampler;

use crate::error::Result;
use crate::linalg::{eigh_sorted, EigenOrder};
use crate::types::{Matrix, Vector};

/// Map a point on the simplex to the sphere.
///
/// Appends `1 − Σs` (clamped at 0 against rounding), takes element-wise square
/// roots and rotates by the eigenvector basis when there is one.
pub(crate) fn simplex_to_sphere(s: &[f64], eigvecs: Option<&Matrix>) -> Vector {
    let last = (1.0 - s.iter().sum::<f64>()).max(0.0);
    let z = Vector::from_iterator(
        s.len() + 1,
        s.iter().copied().chain(core::iter::once(last)).map(f64::sqrt),
    );
    match eigvecs {
        Some(q) => q * z,
        None => z,
    }
}

/// Shifted eigen-decomposition of −A.
///
/// Returns `(lambdas, eigvecs, smallest)` where the eigenvalues of −A are
/// sorted in descending order, `smallest` is the last of them, `lambdas` are
/// the others minus `smallest`, and the columns of `eigvecs` follow the same
/// order.
pub(crate) fn shifted_eigen(a: &Matrix) -> Result<(Vec<f64>, Matrix, f64)> {
    if a.nrows() == 0 {
        return Err(crate::Error::invalid("a", "matrix must be at least 1x1"));
    }
    let (eigvals, eigvecs) = eigh_sorted(&(-a), EigenOrder::Descending)?;
    let k = eigvals.len();
    let smallest = eigvals[k - 1];
    let lambdas = eigvals.iter().take(k - 1).map(|&e| e - smallest).collect();
    Ok((lambdas, eigvecs, smallest))
}

/// Shifted eigenvalues of A (the dual, −(−A)) from those of −A.
///
/// With descending `lambdas = [λ₀, …, λ_{k−2}]` the result is
/// `[λ₀, λ₀ − λ_{k−2}, …, λ₀ − λ₁]`.
pub(crate) fn dual_lambdas(lambdas: &[f64]) -> Vec<f64> {
    match lambdas.first() {
        None => Vec::new(),
        Some(&biggest) => core::iter::once(biggest)
            .chain(lambdas[1..].iter().rev().map(|&l| biggest - l))
            .collect(),
    }
}

/// Reverse the column order of an eigenvector basis.
pub(crate) fn reverse_columns(q: &Matrix) -> Matrix {
    let n = q.ncols();
    Matrix::from_fn(q.nrows(), n, |i, j| q[(i, n - 1 - j)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplex_corner_maps_to_axis() {
        let z = simplex_to_sphere(&[0.0, 1.0], None);
        assert_eq!(z.as_slice(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn simplex_point_has_unit_norm() {
        let q = reverse_columns(&Matrix::identity(3, 3));
        let z = simplex_to_sphere(&[0.2, 0.3], Some(&q));
        assert!((z.norm() - 1.0).abs() < 1e-12);
        assert!((z[0] - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn dual_lambdas_reindexes() {
        assert_eq!(dual_lambdas(&[4.0, 2.0]), vec![4.0, 2.0]);
        assert_eq!(dual_lambdas(&[5.0, 3.0, 1.0]), vec![5.0, 4.0, 2.0]);
        assert!(dual_lambdas(&[]).is_empty());
    }
}
