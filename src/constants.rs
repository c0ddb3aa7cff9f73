//! Numeric constants used throughout the crate.

/// Default deterministic seed for RNG operations.
///
/// The value `0x62696E6768616D` is "bingham" encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x62696E6768616D;

/// Natural log of pi.
pub const LN_PI: f64 = 1.1447298858494002;

/// Default number of Gibbs sweeps per returned real Bingham sample.
pub const DEFAULT_THIN: usize = 10;

/// Default number of von Mises-Fisher draws behind an expected scatter matrix.
///
/// With draws bounded in [0, 1] the per-entry variance is below 1/12, so this
/// gives close to four significant digits on the diagonal.
pub const DEFAULT_SCATTER_SAMPLES: usize = 100_000;

/// Default batch size for the expected scatter estimate.
pub const DEFAULT_SCATTER_STEP: usize = 1_000;

/// Multiplier on the eigen-gap based Givens proposal width.
pub const DEFAULT_PROPOSAL_SCALE: f64 = 2.0;

// =============================================================================
// Root finding
// =============================================================================

/// Starting point of the saddlepoint Newton iteration.
pub const SADDLEPOINT_SEED: f64 = -0.5;

/// Step-size tolerance of the saddlepoint Newton iteration.
pub const NEWTON_TOL: f64 = 1.48e-8;

/// Iteration cap of the saddlepoint Newton iteration.
pub const NEWTON_MAX_ITER: usize = 50;

/// Absolute tolerance when inverting the normalizing constant.
pub const INVERSE_TOL: f64 = 1e-6;

/// Iteration cap of Brent's method.
pub const BRENT_MAX_ITER: usize = 100;

/// Cap on bracket doublings when inverting the normalizing constant.
pub const MAX_BRACKET_DOUBLINGS: usize = 1_024;
