//! Lp-LSH: p-stable random projections over sparse real vectors,
//! approximating L2 distance (Gaussian projections) or L1 distance (Cauchy
//! projections).

use crate::data::SparseVector;
use crate::error::{Error, Result};
use crate::rng::Rng;
use ndarray::Array2;

use super::HashFamily;

/// The largest prime below 2^61, used as the Lp universal-hash modulus.
/// Chosen so a `u128` accumulator of up to `T * u32::MAX * u64::MAX` never
/// wraps before the reduction.
pub const LARGEST_PRIME64: u128 = (1u128 << 61) - 1;

/// Which p-stable distribution projections are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StableDistribution {
    /// Gaussian projections, approximating L2 distance.
    Gaussian,
    /// Cauchy projections, approximating L1 distance.
    Cauchy,
}

/// Lp hash family parameters for one repetition: a dense `T x D` projection
/// matrix, one offset per projection row, the quantization width, and the
/// universal-hash coefficients.
pub struct LpFamily {
    dim: u32,
    tuple_size: u32,
    width: f64,
    stable: StableDistribution,
    proj: Array2<f64>,
    offset: Vec<f64>,
    a: Vec<u64>,
    b: Vec<u64>,
}

impl LpFamily {
    pub fn new(dim: u32, tuple_size: u32, width: f64, stable: StableDistribution) -> Result<Self> {
        if width <= 0.0 {
            return Err(Error::Configuration(format!(
                "width must be positive, got {}",
                width
            )));
        }
        Ok(LpFamily {
            dim,
            tuple_size,
            width,
            stable,
            proj: Array2::zeros((tuple_size as usize, dim as usize)),
            offset: vec![0.0; tuple_size as usize],
            a: vec![0; tuple_size as usize],
            b: vec![0; tuple_size as usize],
        })
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    pub fn tuple_size(&self) -> u32 {
        self.tuple_size
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn draw_stable(&self, rng: &mut Rng) -> f64 {
        match self.stable {
            StableDistribution::Gaussian => rng.gaussian(),
            StableDistribution::Cauchy => rng.cauchy(),
        }
    }

    fn project_row(&self, row: usize, v: &SparseVector) -> f64 {
        let mut dotp = 0.0;
        for &(dim, value) in v.iter() {
            dotp += value * self.proj[[row, dim as usize]];
        }
        dotp += self.offset[row];
        (dotp / self.width).floor()
    }

    /// `h_i(v)` for every projection row `i`, as a signed bucket id
    /// reinterpreted as unsigned 64-bit (matching the `(ullong) hash_value`
    /// cast in the original source).
    pub fn sketch(&self, v: &SparseVector) -> Vec<u64> {
        (0..self.tuple_size as usize)
            .map(|i| self.project_row(i, v) as i64 as u64)
            .collect()
    }
}

impl HashFamily for LpFamily {
    type Record = SparseVector;

    fn regenerate(&mut self, rng: &mut Rng) {
        for i in 0..self.tuple_size as usize {
            for j in 0..self.dim as usize {
                self.proj[[i, j]] = self.draw_stable(rng);
            }
            self.offset[i] = rng.uniform(0.0, self.width);
            self.a[i] = rng.u64() & 0xFFFF_FFFF;
            self.b[i] = rng.u64() & 0xFFFF_FFFF;
        }
    }

    fn hash(&self, record: &SparseVector, capacity: u32) -> (u64, u32) {
        let mut temp_index: u128 = 0;
        let mut temp_hv: u128 = 0;
        for i in 0..self.tuple_size as usize {
            let hv = self.project_row(i, record) as i64 as u64;
            temp_index += self.a[i] as u128 * hv as u128;
            temp_hv += self.b[i] as u128 * hv as u128;
        }
        let fingerprint = (temp_hv % LARGEST_PRIME64) as u64;
        let index = ((temp_index % LARGEST_PRIME64) % capacity as u128) as u32;
        (fingerprint, index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vector(entries: &[(u32, f64)]) -> SparseVector {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_rejects_nonpositive_width() {
        assert!(LpFamily::new(3, 4, 0.0, StableDistribution::Gaussian).is_err());
        assert!(LpFamily::new(3, 4, -1.0, StableDistribution::Gaussian).is_err());
    }

    #[test]
    fn test_translation_invariance_under_same_offset_shift() {
        let mut f1 = LpFamily::new(2, 4, 2.0, StableDistribution::Gaussian).unwrap();
        let mut rng = Rng::seeded(11);
        f1.regenerate(&mut rng);

        // Build a second family sharing the same projections but with
        // every offset shifted by a multiple of width.
        let mut f2 = LpFamily::new(2, 4, 2.0, StableDistribution::Gaussian).unwrap();
        f2.proj = f1.proj.clone();
        f2.offset = f1
            .offset
            .iter()
            .map(|o| o + 3.0 * f1.width)
            .collect();
        f2.a = f1.a.clone();
        f2.b = f1.b.clone();

        let v = vector(&[(0, 1.5), (1, -2.0)]);
        assert_eq!(f1.hash(&v, 64), f2.hash(&v, 64));
    }

    #[test]
    fn test_sketch_len() {
        let mut f = LpFamily::new(3, 5, 1.0, StableDistribution::Cauchy).unwrap();
        let mut rng = Rng::seeded(2);
        f.regenerate(&mut rng);
        let v = vector(&[(0, 1.0)]);
        assert_eq!(f.sketch(&v).len(), 5);
    }
}
