//! Chain diagnostics: per-pair acceptance tallies and autocorrelation.
//!
//! Tallies belong to the sampler that produced them and are handed to the
//! caller on request; nothing here is global.

use serde::{Deserialize, Serialize};

use crate::math;

/// Metropolis proposal and acceptance counts for each eigenvector pair
/// `(i, j)` with `j < i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAcceptance {
    dims: usize,
    proposed: Vec<u64>,
    accepted: Vec<u64>,
}

impl PairAcceptance {
    /// Empty tallies for a `dims`-dimensional basis.
    pub fn new(dims: usize) -> Self {
        let pairs = dims * dims.saturating_sub(1) / 2;
        Self {
            dims,
            proposed: vec![0; pairs],
            accepted: vec![0; pairs],
        }
    }

    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i > j { (i, j) } else { (j, i) };
        debug_assert!(i < self.dims && j < i, "pair ({}, {}) out of range", i, j);
        i * (i - 1) / 2 + j
    }

    /// Record one proposal for pair `(i, j)`.
    pub fn record(&mut self, i: usize, j: usize, accepted: bool) {
        let k = self.index(i, j);
        self.proposed[k] += 1;
        if accepted {
            self.accepted[k] += 1;
        }
    }

    /// Dimension of the basis being tracked.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Proposals made for pair `(i, j)`.
    pub fn proposed(&self, i: usize, j: usize) -> u64 {
        self.proposed[self.index(i, j)]
    }

    /// Proposals accepted for pair `(i, j)`.
    pub fn accepted(&self, i: usize, j: usize) -> u64 {
        self.accepted[self.index(i, j)]
    }

    /// Acceptance rate for pair `(i, j)`, `None` before any proposal.
    pub fn rate(&self, i: usize, j: usize) -> Option<f64> {
        let k = self.index(i, j);
        (self.proposed[k] > 0).then(|| self.accepted[k] as f64 / self.proposed[k] as f64)
    }

    /// Acceptance rate over all pairs.
    pub fn overall_rate(&self) -> Option<f64> {
        let proposed: u64 = self.proposed.iter().sum();
        let accepted: u64 = self.accepted.iter().sum();
        (proposed > 0).then(|| accepted as f64 / proposed as f64)
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.proposed.iter_mut().for_each(|c| *c = 0);
        self.accepted.iter_mut().for_each(|c| *c = 0);
    }
}

/// Normalized autocorrelation of a scalar chain at every lag.
///
/// Entry `k` is `Σ_t c_t c_{t+k} / Σ_t c_t²` with `c` the mean-centred chain,
/// so the result has one entry per sample and starts at 1. The chain is
/// treated as second-order stationary. A constant chain has no variance to
/// normalize by and reports zero at every lag past the first.
pub fn autocorr(chain: &[f64]) -> Vec<f64> {
    let n = chain.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = chain.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = chain.iter().map(|x| x - mean).collect();
    let variance: f64 = centered.iter().map(|&c| math::sq(c)).sum();

    let mut out = vec![0.0; n];
    out[0] = 1.0;
    if variance > 0.0 {
        for (lag, slot) in out.iter_mut().enumerate().skip(1) {
            let cov: f64 = centered.iter().zip(&centered[lag..]).map(|(a, b)| a * b).sum();
            *slot = cov / variance;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_tallies() {
        let mut acc = PairAcceptance::new(3);
        assert_eq!(acc.overall_rate(), None);
        acc.record(1, 0, true);
        acc.record(0, 1, false);
        acc.record(2, 1, true);

        assert_eq!(acc.proposed(1, 0), 2);
        assert_eq!(acc.accepted(0, 1), 1);
        assert_eq!(acc.rate(1, 0), Some(0.5));
        assert_eq!(acc.rate(2, 0), None);
        assert_eq!(acc.overall_rate(), Some(2.0 / 3.0));

        acc.reset();
        assert_eq!(acc.proposed(2, 1), 0);
    }

    #[test]
    fn autocorr_of_short_ramp() {
        // Centred [-1, 0, 1]: lag sums 2, 0, -1.
        let r = autocorr(&[1.0, 2.0, 3.0]);
        assert_eq!(r.len(), 3);
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!(r[1].abs() < 1e-12);
        assert!((r[2] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn autocorr_degenerate_chains() {
        assert!(autocorr(&[]).is_empty());
        assert_eq!(autocorr(&[2.0; 4]), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn alternating_chain_flips_sign() {
        let chain: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = autocorr(&chain);
        assert!(r[1] < -0.9);
        assert!(r[2] > 0.9);
    }
}
