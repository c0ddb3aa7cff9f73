//! Scalar math helpers.
//!
//! `std` has no log-gamma, so the special functions come from libm.

/// Square (x^2).
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Natural log of the gamma function, ln Γ(x).
#[inline]
pub fn ln_gamma(x: f64) -> f64 {
    libm::lgamma(x)
}

/// ln(1 - e^(-x)) for x > 0, accurate for small x.
#[inline]
pub fn ln_one_minus_exp_neg(x: f64) -> f64 {
    if x > core::f64::consts::LN_2 {
        libm::log1p(-libm::exp(-x))
    } else {
        libm::log(-libm::expm1(-x))
    }
}

/// 1 - e^(-x), accurate for small x.
#[inline]
pub fn one_minus_exp_neg(x: f64) -> f64 {
    -libm::expm1(-x)
}
