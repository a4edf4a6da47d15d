//! Seedable RNG facade used by the hash families.
//!
//! The base 64-bit bitstream comes from `rand`'s `SmallRng` (same choice the
//! teacher crate makes in `utils::create_rng`), but `gaussian`, `cauchy` and
//! `uniform` are implemented directly against the documented algorithms
//! rather than delegated to `rand_distr`, so the exact sequence of draws is
//! part of this crate's own contract and not an incidental detail of
//! whichever distribution crate happens to be linked in.

use rand::rngs::SmallRng;
use rand::{Rng as _, SeedableRng};

pub struct Rng {
    inner: SmallRng,
}

impl Rng {
    /// Deterministic reset from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Rng {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Process-random seed, for production use outside of tests.
    pub fn from_entropy() -> Self {
        Rng {
            inner: SmallRng::from_entropy(),
        }
    }

    /// Uniform on the full 64-bit range.
    pub fn u64(&mut self) -> u64 {
        self.inner.gen()
    }

    /// Uniform on `[0, bound)`.
    pub fn below(&mut self, bound: u32) -> u32 {
        self.inner.gen_range(0, bound)
    }

    /// Uniform on (0, 1), excluding both endpoints.
    pub fn real_open_unit(&mut self) -> f64 {
        loop {
            let x: f64 = self.inner.gen();
            if x > 0.0 && x < 1.0 {
                return x;
            }
        }
    }

    /// Box-Muller transform of two `real_open_unit` draws.
    pub fn gaussian(&mut self) -> f64 {
        let u1 = loop {
            let u1 = self.real_open_unit();
            if u1 > f64::MIN_POSITIVE {
                break u1;
            }
        };
        let u2 = self.real_open_unit();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Ratio of two independent Gaussians, clamping the denominator's
    /// magnitude away from zero.
    pub fn cauchy(&mut self) -> f64 {
        let a = self.gaussian();
        let mut b = self.gaussian();
        if b.abs() < 1e-7 {
            b = if b < 0.0 { -1e-7 } else { 1e-7 };
        }
        a / b
    }

    /// `a + (b - a) * real_open_unit()`.
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.real_open_unit()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut r1 = Rng::seeded(42);
        let mut r2 = Rng::seeded(42);
        for _ in 0..10 {
            assert_eq!(r1.u64(), r2.u64());
        }
    }

    #[test]
    fn test_real_open_unit_bounds() {
        let mut r = Rng::seeded(7);
        for _ in 0..1000 {
            let x = r.real_open_unit();
            assert!(x > 0.0 && x < 1.0);
        }
    }

    #[test]
    fn test_gaussian_finite() {
        let mut r = Rng::seeded(7);
        for _ in 0..1000 {
            assert!(r.gaussian().is_finite());
        }
    }

    #[test]
    fn test_cauchy_finite() {
        let mut r = Rng::seeded(7);
        for _ in 0..1000 {
            assert!(r.cauchy().is_finite());
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut r = Rng::seeded(7);
        for _ in 0..1000 {
            let x = r.uniform(2.0, 5.0);
            assert!(x >= 2.0 && x <= 5.0);
        }
    }
}
