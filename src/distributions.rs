//! Random variates not covered by `rand_distr`.
//!
//! Every routine takes the generator by `&mut`; nothing here reads global
//! randomness.

use core::f64::consts::{PI, TAU};

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{Error, Result};
use crate::types::Vector;

/// Below this concentration the von Mises distribution is treated as uniform.
const VON_MISES_UNIFORM_KAPPA: f64 = 1e-6;

/// Uniform draw on `[a, b)`, computed as `a + (b - a)·U`.
///
/// Unlike `Rng::random_range` this accepts `a == b` (returning `a`) and
/// reversed bounds, which the Gibbs updates can produce at the edge of the
/// simplex.
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    a + (b - a) * rng.random::<f64>()
}

/// Uniformly distributed unit vector in `dims` dimensions.
pub fn unit_vector<R: Rng + ?Sized>(dims: usize, rng: &mut R) -> Vector {
    loop {
        let z = Vector::from_iterator(dims, (0..dims).map(|_| -> f64 { StandardNormal.sample(rng) }));
        let norm = z.norm();
        if norm > 0.0 {
            return z / norm;
        }
    }
}

/// Von Mises distribution on the circle with mean `mu` and concentration
/// `kappa`, sampled by the Best-Fisher wrapped-Cauchy envelope.
///
/// Draws lie in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VonMises {
    mu: f64,
    kappa: f64,
}

impl VonMises {
    /// Create a von Mises distribution; `kappa` must be finite and non-negative.
    pub fn new(mu: f64, kappa: f64) -> Result<Self> {
        if !(kappa >= 0.0 && kappa.is_finite()) {
            return Err(Error::invalid("kappa", format!("must be finite and >= 0, got {}", kappa)));
        }
        if !mu.is_finite() {
            return Err(Error::invalid("mu", "must be finite"));
        }
        Ok(Self { mu, kappa })
    }
}

impl Distribution<f64> for VonMises {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.kappa <= VON_MISES_UNIFORM_KAPPA {
            return TAU * rng.random::<f64>();
        }

        let s = 0.5 / self.kappa;
        let r = s + (1.0 + s * s).sqrt();

        let z = loop {
            let z = (PI * rng.random::<f64>()).cos();
            let d = z / (r + z);
            let u: f64 = rng.random();
            if u < 1.0 - d * d || u <= (1.0 - d) * d.exp() {
                break z;
            }
        };

        let q = 1.0 / r;
        let f = (q + z) / (1.0 + q * z);
        let theta = if rng.random::<f64>() > 0.5 {
            self.mu + f.acos()
        } else {
            self.mu - f.acos()
        };
        theta.rem_euclid(TAU)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn uniform_degenerate_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 0.25, 0.25), 0.25);
        for _ in 0..100 {
            let x = uniform(&mut rng, -1.0, 3.0);
            assert!((-1.0..3.0).contains(&x));
        }
    }

    #[test]
    fn unit_vectors_have_unit_norm() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        for dims in 1..6 {
            let v = unit_vector(dims, &mut rng);
            assert_eq!(v.len(), dims);
            assert!((v.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn von_mises_concentrates_near_mean() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let dist = VonMises::new(0.0, 50.0).unwrap();
        let n = 2_000;
        let mean_cos: f64 = (0..n).map(|_| dist.sample(&mut rng).cos()).sum::<f64>() / n as f64;
        // E[cos θ] = I1(50)/I0(50) ≈ 0.990
        assert!(mean_cos > 0.98, "mean cos = {}", mean_cos);
    }

    #[test]
    fn von_mises_uniform_limit() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let dist = VonMises::new(0.0, 0.0).unwrap();
        let n = 5_000;
        let mean_cos: f64 = (0..n).map(|_| dist.sample(&mut rng).cos()).sum::<f64>() / n as f64;
        assert!(mean_cos.abs() < 0.05, "mean cos = {}", mean_cos);
    }

    #[test]
    fn von_mises_rejects_negative_kappa() {
        assert!(VonMises::new(0.0, -1.0).is_err());
        assert!(VonMises::new(0.0, f64::NAN).is_err());
    }
}
