//! Configuration for the samplers and the Bingham-Wishart model.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PROPOSAL_SCALE, DEFAULT_SCATTER_SAMPLES, DEFAULT_SCATTER_STEP, DEFAULT_SEED,
    DEFAULT_THIN,
};

/// Tunable parameters shared by the samplers.
///
/// None of these change what distribution is targeted; they trade accuracy,
/// autocorrelation and run time against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gibbs sweeps per returned real Bingham sample.
    ///
    /// Intermediate states are discarded to reduce autocorrelation between
    /// consecutive draws. Default: 10.
    pub thin: usize,

    /// Number of von Mises-Fisher draws used to estimate an expected scatter
    /// matrix. Default: 100,000.
    pub scatter_samples: usize,

    /// Batch size for the expected scatter estimate.
    ///
    /// Must divide `scatter_samples`. Default: 1,000.
    pub scatter_step: usize,

    /// Multiplier on the eigen-gap based width of the Givens rotation
    /// proposal in the joint eigen/eigenvector sampler. Default: 2.0.
    pub proposal_scale: f64,

    /// Optional cap on rejection-sampler proposals.
    ///
    /// When set, an exhausted loop fails with
    /// [`Error::AttemptsExhausted`](crate::Error::AttemptsExhausted).
    /// Default: None (loop until acceptance).
    pub max_attempts: Option<usize>,

    /// Seed used by [`Config::rng`]. Default: [`DEFAULT_SEED`].
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thin: DEFAULT_THIN,
            scatter_samples: DEFAULT_SCATTER_SAMPLES,
            scatter_step: DEFAULT_SCATTER_STEP,
            proposal_scale: DEFAULT_PROPOSAL_SCALE,
            max_attempts: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl Config {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap settings for tests and interactive use:
    /// - 3 sweeps per sample
    /// - 10,000 scatter draws in batches of 1,000
    pub fn quick() -> Self {
        Self {
            thin: 3,
            scatter_samples: 10_000,
            scatter_step: 1_000,
            ..Default::default()
        }
    }

    /// Accurate settings for offline analysis:
    /// - 50 sweeps per sample
    /// - 1,000,000 scatter draws in batches of 10,000
    pub fn thorough() -> Self {
        Self {
            thin: 50,
            scatter_samples: 1_000_000,
            scatter_step: 10_000,
            ..Default::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the number of Gibbs sweeps per sample.
    pub fn thin(mut self, thin: usize) -> Self {
        assert!(thin > 0, "thin must be positive");
        self.thin = thin;
        self
    }

    /// Set the scatter estimate size and batch size.
    pub fn scatter(mut self, samples: usize, step: usize) -> Self {
        assert!(step > 0, "scatter step must be positive");
        assert!(samples % step == 0, "scatter samples must be divisible by step");
        self.scatter_samples = samples;
        self.scatter_step = step;
        self
    }

    /// Set the Givens proposal width multiplier.
    pub fn proposal_scale(mut self, scale: f64) -> Self {
        assert!(scale > 0.0 && scale.is_finite(), "proposal_scale must be positive");
        self.proposal_scale = scale;
        self
    }

    /// Cap rejection loops at `attempts` proposals.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        assert!(attempts > 0, "max_attempts must be positive");
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Deterministic generator seeded from [`Config::seed`].
    pub fn rng(&self) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_keep_step_dividing_samples() {
        for config in [Config::default(), Config::quick(), Config::thorough()] {
            assert_eq!(config.scatter_samples % config.scatter_step, 0);
            assert!(config.thin > 0);
        }
    }

    #[test]
    fn builder_chains() {
        let config = Config::new().thin(7).max_attempts(100).seed(3);
        assert_eq!(config.thin, 7);
        assert_eq!(config.max_attempts, Some(100));
        assert_eq!(config.seed, 3);
    }

    #[test]
    #[should_panic(expected = "divisible")]
    fn scatter_rejects_ragged_batches() {
        let _ = Config::new().scatter(1_000, 300);
    }
}
