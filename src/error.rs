//! Error types for the sampling engine.

/// Error returned by samplers, the normalizing-constant routines and the
/// Bingham-Wishart model.
///
/// Every failure is surfaced synchronously; nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An argument violates a documented precondition.
    ///
    /// Raised for non-square or non-positive-definite matrices, degrees of
    /// freedom below the required minimum, `samples` not divisible by `step`,
    /// and empty sampling supports.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending argument.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A root finder failed to converge or produced an out-of-domain value.
    #[error("numerical divergence in {routine}: {reason}")]
    NumericalDivergence {
        /// Routine that diverged.
        routine: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// A rejection sampler hit its configured attempt cap.
    ///
    /// Only produced when the caller opted into a cap; the default loops
    /// run until acceptance.
    #[error("rejection sampler gave up after {attempts} attempts")]
    AttemptsExhausted {
        /// Number of proposals drawn before giving up.
        attempts: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn diverged(routine: &'static str, reason: impl Into<String>) -> Self {
        Error::NumericalDivergence {
            routine,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
