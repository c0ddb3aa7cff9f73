//! Type aliases shared across the crate.

use nalgebra::{DMatrix, DVector};

/// Dense, dynamically sized real matrix.
pub type Matrix = DMatrix<f64>;

/// Dense, dynamically sized real column vector.
pub type Vector = DVector<f64>;

/// Closed real interval `(lower, upper)`; either bound may be infinite.
pub type Interval = (f64, f64);
