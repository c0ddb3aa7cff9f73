//! Scalar root finders.

use crate::error::{Error, Result};

/// Relative tolerance floor for Brent's method (4 ulp).
const BRENT_RTOL: f64 = 4.0 * f64::EPSILON;

/// Newton's method with an analytic derivative.
///
/// Stops when the step falls below `tol`. Fails if the derivative vanishes,
/// an iterate is not finite, or `max_iter` steps pass without convergence.
pub fn newton<F, D>(mut f: F, mut fprime: D, x0: f64, tol: f64, max_iter: usize) -> Result<f64>
where
    F: FnMut(f64) -> f64,
    D: FnMut(f64) -> f64,
{
    let mut x = x0;
    for _ in 0..max_iter {
        let fx = f(x);
        if fx == 0.0 {
            return Ok(x);
        }
        let dfx = fprime(x);
        if dfx == 0.0 || !dfx.is_finite() {
            return Err(Error::diverged(
                "newton",
                format!("unusable derivative {} at x = {}", dfx, x),
            ));
        }
        let next = x - fx / dfx;
        if !next.is_finite() {
            return Err(Error::diverged("newton", format!("non-finite iterate from x = {}", x)));
        }
        if (next - x).abs() < tol {
            return Ok(next);
        }
        x = next;
    }
    Err(Error::diverged(
        "newton",
        format!("no convergence after {} iterations (last x = {})", max_iter, x),
    ))
}

/// Brent's method on a sign-changing bracket `[a, b]`.
///
/// Combines bisection, secant and inverse quadratic interpolation; the
/// returned root is within `xtol + 4ε|x|` of a true sign change. `f` may
/// itself fail, in which case the error is propagated.
pub fn brent<F>(mut f: F, a: f64, b: f64, xtol: f64, max_iter: usize) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = f(xpre)?;
    let mut fcur = f(xcur)?;

    if fpre * fcur > 0.0 {
        return Err(Error::diverged(
            "brent",
            format!("no sign change on [{}, {}]: f = ({}, {})", a, b, fpre, fcur),
        ));
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0, 0.0);

    for _ in 0..max_iter {
        if fpre != 0.0 && fcur != 0.0 && (fpre.is_sign_negative() != fcur.is_sign_negative()) {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (xtol + BRENT_RTOL * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic interpolation
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur)?;
    }

    Err(Error::diverged(
        "brent",
        format!("no convergence after {} iterations (last x = {})", max_iter, xcur),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newton_finds_sqrt2() {
        let root = newton(|x| x * x - 2.0, |x| 2.0 * x, 1.0, 1e-12, 50).unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn newton_reports_flat_derivative() {
        let err = newton(|x| x * x + 1.0, |x| 2.0 * x, 0.0, 1e-12, 50).unwrap_err();
        assert!(matches!(err, Error::NumericalDivergence { routine: "newton", .. }));
    }

    #[test]
    fn brent_finds_cubic_root() {
        let root = brent(|x| Ok(x * x * x - x - 2.0), 1.0, 2.0, 1e-10, 100).unwrap();
        assert!((root * root * root - root - 2.0).abs() < 1e-8);
    }

    #[test]
    fn brent_requires_bracket() {
        assert!(brent(|x| Ok(x * x + 1.0), -1.0, 1.0, 1e-10, 100).is_err());
    }

    #[test]
    fn brent_propagates_inner_errors() {
        let err = brent(|_| Err(Error::invalid("x", "boom")), 0.0, 1.0, 1e-10, 100).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn brent_handles_endpoint_roots() {
        assert_eq!(brent(|x| Ok(x), 0.0, 1.0, 1e-10, 100).unwrap(), 0.0);
    }
}
