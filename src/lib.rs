//! # dirstats
//!
//! Random variates on the unit sphere and on positive-definite matrices.
//!
//! This crate provides:
//! - A Gibbs sampler for the real Bingham distribution and two rejection
//!   samplers for the complex Bingham distribution
//! - A saddlepoint approximation of the Bingham normalizing constant and its
//!   inverse in one eigenvalue
//! - Wishart and von Mises-Fisher samplers
//! - A conjugate Wishart prior for Bingham observations, with posterior
//!   samplers over the eigen-decomposition of the Bingham parameter
//!
//! Every sampler takes the generator by `&mut`; with a seeded generator all
//! results are reproducible.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dirstats::{BinghamSampler, BinghamWishartModel, Config, Matrix};
//!
//! let config = Config::quick();
//! let mut rng = config.rng();
//!
//! // Real Bingham with density ∝ exp(xᵀ A x).
//! let a = Matrix::from_diagonal(&dirstats::Vector::from_row_slice(&[-4.0, -1.0, 0.0]));
//! let mut sampler = BinghamSampler::from_matrix(&a)?;
//! let x = sampler.sample(&mut rng, config.thin);
//!
//! // Conjugate model: prior from 5 pseudo-observations, then one update.
//! let model = BinghamWishartModel::with_prior(3, 2.0, 5.0, &mut rng, &config)?;
//! let posterior = model.posterior_success(&x)?;
//! let draw = posterior.sample_success(&mut rng, config.thin)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod types;
pub mod constants;

// Numerical building blocks
pub mod distributions;
pub mod intervals;
pub mod linalg;
pub mod math;
pub mod roots;

// Samplers
pub mod bingham;
pub mod diagnostics;
pub mod posterior;
pub mod vmf;
pub mod wishart;

// Re-exports for public API
pub use bingham::{
    inverse_log_bingham_const, log_bingham_const, log_bingham_const_eigvals, BinghamSampler,
    ComplexBinghamSampler, SamplingMethod,
};
pub use config::Config;
pub use diagnostics::{autocorr, PairAcceptance};
pub use error::{Error, Result};
pub use posterior::{
    BinghamWishartModel, EigenChainState, EigenGibbsSampler, EigenSample, ModelEvent,
    WishartMetropolis,
};
pub use types::{Interval, Matrix, Vector};
pub use vmf::{expected_scatter, sample_von_mises_fisher};
pub use wishart::sample_wishart;
