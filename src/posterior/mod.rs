//! Conjugate Bayesian inference for Bingham-distributed observations.
//!
//! A Wishart prior on the Bingham parameter is updated by observed unit
//! vectors ([`model`]); the matching posterior over the parameter's
//! eigen-decomposition is explored by a Gibbs chain ([`eigen_gibbs`]) or by an
//! independence Metropolis chain with Wishart proposals ([`wishart_mh`]).

pub mod eigen_gibbs;
pub mod model;
pub mod wishart_mh;

pub use eigen_gibbs::{EigenChainState, EigenGibbsIter, EigenGibbsSampler, EigenSample};
pub use model::{BinghamWishartModel, ModelEvent, ModelObserver};
pub use wishart_mh::WishartMetropolis;
