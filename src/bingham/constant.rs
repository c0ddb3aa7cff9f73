//! Saddlepoint approximation of the Bingham normalizing constant.
//!
//! For shifted eigenvalues λ of −A (the smallest, 0, is implicit) the
//! cumulant generating function of the constant satisfies
//!
//! ```text
//! K'(t)  = −0.5/t + Σ 0.5/(λ_i − t)
//! K''(t) =  0.5/t² + Σ 0.5/(λ_i − t)²
//! ```
//!
//! and the third-order approximation (Kume and Wood, Biometrika 2005) is
//!
//! ```text
//! log c = ½(log 2 + (k−1) log π) − ½ log(−t̂ K₂) + T − t̂ − Σ ½ log(λ_i − t̂)
//! ```
//!
//! where t̂ < 0 solves K'(t̂) = 1 and T corrects for skewness and kurtosis.

use crate::constants::{
    BRENT_MAX_ITER, INVERSE_TOL, LN_PI, MAX_BRACKET_DOUBLINGS, NEWTON_MAX_ITER, NEWTON_TOL,
    SADDLEPOINT_SEED,
};
use crate::error::{Error, Result};
use crate::math;
use crate::roots::{brent, newton};

/// Second derivative of the cumulant generating function.
fn cgf_prime2(lambdas: &[f64], t: f64) -> f64 {
    0.5 / math::sq(t) + lambdas.iter().map(|&l| 0.5 / math::sq(l - t)).sum::<f64>()
}

/// Log of the Bingham normalizing constant for shifted eigenvalues.
///
/// `lambdas` are the k−1 largest eigenvalues of −A minus the smallest; the
/// smallest (0 after the shift) is implicit. Shifting all eigenvalues by `h`
/// scales the constant by `e^{−h}`, so callers with unshifted eigenvalues use
/// [`log_bingham_const_eigvals`].
pub fn log_bingham_const(lambdas: &[f64]) -> Result<f64> {
    if let Some(&bad) = lambdas.iter().find(|l| !(**l >= 0.0 && l.is_finite())) {
        return Err(Error::invalid(
            "lambdas",
            format!("shifted eigenvalues must be finite and >= 0, got {}", bad),
        ));
    }

    let cgf_prime_minus1 =
        |t: f64| -0.5 / t + lambdas.iter().map(|&l| 0.5 / (l - t)).sum::<f64>() - 1.0;
    let t_hat = newton(
        cgf_prime_minus1,
        |t| cgf_prime2(lambdas, t),
        SADDLEPOINT_SEED,
        NEWTON_TOL,
        NEWTON_MAX_ITER,
    )
    .map_err(|err| Error::diverged("saddlepoint", err.to_string()))?;
    if !(t_hat < 0.0) {
        return Err(Error::diverged(
            "saddlepoint",
            format!("saddlepoint must be negative, got {}", t_hat),
        ));
    }

    let k2 = cgf_prime2(lambdas, t_hat);
    let mut k3 = -t_hat.powi(-3);
    let mut k4 = 3.0 / t_hat.powi(4);
    for &l in lambdas {
        k3 += (l - t_hat).powi(-3);
        k4 += 3.0 / (l - t_hat).powi(4);
    }

    let rho3 = k3 / k2.powf(1.5);
    let rho4 = k4 / math::sq(k2);
    let correction = rho4 / 8.0 - (5.0 / 24.0) * math::sq(rho3);

    // The λ₀ = 0 term contributes (−t̂)^−½, folded into the log(−t̂ K₂) term.
    let mut log_c = 0.5 * (core::f64::consts::LN_2 + lambdas.len() as f64 * LN_PI)
        - 0.5 * (-t_hat * k2).ln()
        + correction
        - t_hat;
    for &l in lambdas {
        log_c -= 0.5 * (l - t_hat).ln();
    }
    Ok(log_c)
}

/// Log of the Bingham normalizing constant from k unshifted eigenvalues of −A
/// in any order.
///
/// The minimum is subtracted from every value and its slot dropped (the last
/// value moves into it), then the shift is undone: `c(λ + h) = e^{−h} c(λ)`.
pub fn log_bingham_const_eigvals(eigvals: &[f64]) -> Result<f64> {
    let (argmin, smallest) = eigvals
        .iter()
        .copied()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| Error::invalid("eigvals", "need at least one eigenvalue"))?;

    let k = eigvals.len();
    let mut lambdas: Vec<f64> = eigvals[..k - 1].iter().map(|&e| e - smallest).collect();
    if argmin != k - 1 {
        lambdas[argmin] = eigvals[k - 1] - smallest;
    }
    Ok(log_bingham_const(&lambdas)? - smallest)
}

/// Invert the log constant with respect to one eigenvalue.
///
/// Finds `x ≥ 0` with `log_bingham_const_eigvals(eigvals[index ← x]) = target`,
/// the constant being monotone decreasing in each eigenvalue. Returns 0 when
/// the constant at 0 is already below `target`.
pub fn inverse_log_bingham_const(eigvals: &[f64], target: f64, index: usize) -> Result<f64> {
    if index >= eigvals.len() {
        return Err(Error::invalid(
            "index",
            format!("{} out of range for {} eigenvalues", index, eigvals.len()),
        ));
    }

    let mut work = eigvals.to_vec();
    let mut f = |x: f64| -> Result<f64> {
        work[index] = x;
        Ok(log_bingham_const_eigvals(&work)? - target)
    };

    if f(0.0)? < 0.0 {
        return Ok(0.0);
    }

    let mut lo = 0.0;
    let mut hi = if eigvals[index] > 0.0 { eigvals[index] } else { 1.0 };
    let mut doublings = 0;
    while f(hi)? > 0.0 {
        lo = hi;
        hi *= 2.0;
        doublings += 1;
        if doublings > MAX_BRACKET_DOUBLINGS || !hi.is_finite() {
            return Err(Error::diverged(
                "inverse_log_bingham_const",
                format!("bracket expansion did not cross target {}", target),
            ));
        }
    }

    brent(f, lo, hi, INVERSE_TOL, BRENT_MAX_ITER)
}
