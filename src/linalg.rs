//! Dense linear algebra consumed by the samplers.
//!
//! Eigendecomposition, Cholesky factorization and triangular solves come from
//! nalgebra. The rank-1 Cholesky update/downdate is done here because
//! nalgebra's version cannot report a downdate that loses definiteness.

use nalgebra::Cholesky;

use crate::error::{Error, Result};
use crate::types::{Matrix, Vector};

/// Relative tolerance for the symmetry check on input matrices.
const SYMMETRY_TOL: f64 = 1e-9;

/// Ordering of eigenpairs returned by [`eigh_sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EigenOrder {
    /// Smallest eigenvalue first.
    Ascending,
    /// Largest eigenvalue first.
    Descending,
}

/// Fail unless `m` is square.
pub fn ensure_square(m: &Matrix, name: &'static str) -> Result<usize> {
    if !m.is_square() {
        return Err(Error::invalid(
            name,
            format!("expected a square matrix, got {}x{}", m.nrows(), m.ncols()),
        ));
    }
    Ok(m.nrows())
}

/// Fail unless `m` is square and symmetric up to rounding.
pub fn ensure_symmetric(m: &Matrix, name: &'static str) -> Result<usize> {
    let n = ensure_square(m, name)?;
    let asym = (m - m.transpose()).amax();
    if asym > SYMMETRY_TOL * m.amax().max(1.0) {
        return Err(Error::invalid(
            name,
            format!("matrix is not symmetric (max asymmetry {:.3e})", asym),
        ));
    }
    Ok(n)
}

/// Symmetric eigendecomposition with eigenpairs in the requested order.
///
/// Column `i` of the returned matrix is the unit eigenvector paired with
/// eigenvalue `i`.
pub fn eigh_sorted(m: &Matrix, order: EigenOrder) -> Result<(Vector, Matrix)> {
    let n = ensure_symmetric(m, "matrix")?;
    let eig = m.clone().symmetric_eigen();

    let mut idx: Vec<usize> = (0..n).collect();
    idx.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    if order == EigenOrder::Descending {
        idx.reverse();
    }

    let eigvals = Vector::from_iterator(n, idx.iter().map(|&i| eig.eigenvalues[i]));
    let mut eigvecs = Matrix::zeros(n, n);
    for (dst, &src) in idx.iter().enumerate() {
        eigvecs.set_column(dst, &eig.eigenvectors.column(src));
    }
    Ok((eigvals, eigvecs))
}

/// Lower-triangular Cholesky factor `L` with `L Lᵀ = m`.
pub fn cholesky_lower(m: &Matrix, name: &'static str) -> Result<Matrix> {
    ensure_square(m, name)?;
    Cholesky::new(m.clone())
        .map(|chol| chol.l())
        .ok_or_else(|| Error::invalid(name, "matrix is not positive definite"))
}

/// Inverse of a lower-triangular matrix via forward substitution.
pub fn lower_triangular_inverse(l: &Matrix) -> Result<Matrix> {
    let n = ensure_square(l, "lower")?;
    l.solve_lower_triangular(&Matrix::identity(n, n))
        .ok_or_else(|| Error::invalid("lower", "triangular factor is singular"))
}

/// Replace `l` with the factor of `l lᵀ + x xᵀ`.
pub fn chol_update(l: &mut Matrix, x: &Vector) -> Result<()> {
    rank_one(l, x, 1.0)
}

/// Replace `l` with the factor of `l lᵀ - x xᵀ`.
///
/// Fails if the downdated matrix is not positive definite; `l` is left
/// partially modified in that case, so callers work on a copy.
pub fn chol_downdate(l: &mut Matrix, x: &Vector) -> Result<()> {
    rank_one(l, x, -1.0)
}

/// In-place rank-1 update (`sign = 1`) or downdate (`sign = -1`), O(n²).
///
/// For j = 0..n:
///   r = sqrt(L[j,j]² + sign·v[j]²), c = r / L[j,j], s = v[j] / L[j,j]
///   L[i,j] = (L[i,j] + sign·s·v[i]) / c      for i > j
///   v[i]   = c·v[i] - s·L[i,j]
fn rank_one(l: &mut Matrix, x: &Vector, sign: f64) -> Result<()> {
    let n = ensure_square(l, "factor")?;
    if x.len() != n {
        return Err(Error::invalid(
            "x",
            format!("expected length {}, got {}", n, x.len()),
        ));
    }

    let mut v = x.clone();
    for j in 0..n {
        let ljj = l[(j, j)];
        if ljj == 0.0 {
            return Err(Error::invalid("factor", "Cholesky factor is singular"));
        }
        let vj = v[j];
        let arg = ljj * ljj + sign * vj * vj;
        if arg <= 0.0 {
            return Err(Error::invalid(
                "x",
                "downdate would leave the matrix indefinite",
            ));
        }

        let r = arg.sqrt();
        let c = r / ljj;
        let s = vj / ljj;
        l[(j, j)] = r;

        for i in (j + 1)..n {
            l[(i, j)] = (l[(i, j)] + sign * s * v[i]) / c;
            v[i] = c * v[i] - s * l[(i, j)];
        }
    }
    Ok(())
}
