//! Interval arithmetic and exponential sampling on unions of intervals.
//!
//! Intervals are closed `(lower, upper)` pairs. The joint eigen/eigenvector
//! sampler expresses its auxiliary-variable constraints as a list of banned
//! intervals; the allowed support is the complement, and each eigenvalue is
//! redrawn from an exponential restricted to it.

use rand::Rng;
use rand_distr::{Distribution, Exp1};

use crate::distributions::uniform;
use crate::error::{Error, Result};
use crate::types::Interval;

/// Union of closed intervals as a sorted list of disjoint intervals.
///
/// Intervals that overlap or touch are merged.
pub fn unionate(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.total_cmp(&y.1)));

    let mut union: Vec<Interval> = Vec::with_capacity(sorted.len());
    for (a, b) in sorted {
        match union.last_mut() {
            Some(last) if a <= last.1 => last.1 = last.1.max(b),
            _ => union.push((a, b)),
        }
    }
    union
}

/// Closure of the complement of a union of intervals.
///
/// Returns the gaps between the merged intervals plus rays to ±∞ when the
/// union does not already reach them. An empty input yields `(-∞, ∞)`.
pub fn complement(intervals: &[Interval]) -> Vec<Interval> {
    if intervals.is_empty() {
        return vec![(f64::NEG_INFINITY, f64::INFINITY)];
    }
    let banned = unionate(intervals);

    let mut allowed = Vec::with_capacity(banned.len() + 1);
    let first = banned[0].0;
    if first > f64::NEG_INFINITY {
        allowed.push((f64::NEG_INFINITY, first));
    }
    allowed.extend(banned.windows(2).map(|w| (w[0].1, w[1].0)));
    let last = banned[banned.len() - 1].1;
    if last < f64::INFINITY {
        allowed.push((last, f64::INFINITY));
    }
    allowed
}

/// Exponential(`rate`) truncated to `[a, b]`, by inverting the CDF:
///
/// ```text
/// F⁻¹(y) = a − ln(1 − y(1 − e^{−rate(b−a)})) / rate
/// ```
pub fn sample_truncated_exp<R: Rng + ?Sized>(rate: f64, a: f64, b: f64, rng: &mut R) -> f64 {
    let c = (-rate * (b - a)).exp();
    a - uniform(rng, c, 1.0).ln() / rate
}

/// Exponential(`rate`) restricted and renormalized to a union of disjoint
/// intervals.
///
/// All bounds are shifted by the lowest lower bound before exponentiating so
/// the interval masses do not underflow when the support sits far from 0.
pub fn sample_exp_intervals<R: Rng + ?Sized>(
    rate: f64,
    intervals: &[Interval],
    rng: &mut R,
) -> Result<f64> {
    if !(rate > 0.0 && rate.is_finite()) {
        return Err(Error::invalid("rate", format!("must be finite and > 0, got {}", rate)));
    }
    let lowest = intervals
        .iter()
        .map(|&(a, _)| a)
        .min_by(f64::total_cmp)
        .ok_or_else(|| Error::invalid("intervals", "support is empty"))?;
    if !lowest.is_finite() {
        return Err(Error::invalid(
            "intervals",
            "support must be bounded below for an exponential",
        ));
    }

    let pmf: Vec<(f64, Interval)> = intervals
        .iter()
        .map(|&(a, b)| {
            let (a, b) = (a - lowest, b - lowest);
            ((-rate * a).exp() - (-rate * b).exp(), (a, b))
        })
        .collect();
    let total: f64 = pmf.iter().map(|(mass, _)| mass).sum();
    if !(total > 0.0) {
        return Err(Error::invalid("intervals", "support carries no probability mass"));
    }

    let mut u = uniform(rng, 0.0, total);
    let mut chosen = pmf[pmf.len() - 1].1;
    for &(mass, interval) in &pmf {
        u -= mass;
        if u < 0.0 {
            chosen = interval;
            break;
        }
    }

    let (a, b) = chosen;
    debug_assert!(a >= 0.0);
    if b == f64::INFINITY {
        let e: f64 = Exp1.sample(rng);
        Ok(lowest + a + e / rate)
    } else {
        Ok(lowest + sample_truncated_exp(rate, a, b, rng))
    }
}
