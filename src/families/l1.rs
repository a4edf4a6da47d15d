//! L1-LSH: bit-sampling over the unary/thermometer encoding of a
//! nonnegative integer vector, approximating L1 / Hamming similarity.

use crate::data::SparseList;
use crate::error::{Error, Result};
use crate::rng::Rng;

use super::HashFamily;

/// The largest prime below 2^32, used as the L1 universal-hash modulus.
pub const LARGEST_PRIME: u64 = (1u64 << 32) - 5;

/// One sampled bit of the thermometer encoding: bit `loc` of dimension `dim`
/// is 1 iff `x_dim > loc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleBit {
    pub dim: u32,
    pub loc: u32,
}

/// L1 hash family parameters for one repetition: which bits are sampled,
/// how many samples fall in each dimension, and the universal-hash
/// coefficients (indexed by dimension, see `DESIGN.md`).
pub struct L1Family {
    dim: u32,
    max_value: u32,
    tuple_size: u32,
    sample_bits: Vec<SampleBit>,
    samples_per_dim: Vec<u32>,
    a: Vec<u32>,
    b: Vec<u32>,
}

impl L1Family {
    /// Allocates an (initially empty) family; call `regenerate` before use.
    pub fn new(dim: u32, max_value: u32, tuple_size: u32) -> Result<Self> {
        if (tuple_size as u64) > (dim as u64) * (max_value as u64) {
            return Err(Error::Configuration(format!(
                "tuple_size {} exceeds the available bit space {} * {}",
                tuple_size, dim, max_value
            )));
        }
        Ok(L1Family {
            dim,
            max_value,
            tuple_size,
            sample_bits: Vec::new(),
            samples_per_dim: vec![0; dim as usize],
            a: vec![0; dim as usize],
            b: vec![0; dim as usize],
        })
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    pub fn tuple_size(&self) -> u32 {
        self.tuple_size
    }

    pub fn sample_bits(&self) -> &[SampleBit] {
        &self.sample_bits
    }

    pub fn samples_per_dim(&self) -> &[u32] {
        &self.samples_per_dim
    }

    /// Draws `tuple_size` distinct `(dim, loc)` pairs uniformly without
    /// replacement from the `dim * max_value` grid, using a presence
    /// bitmap to reject repeats, then sorts by `(dim, loc)`.
    fn generate_sample_bits(&mut self, rng: &mut Rng) {
        let mut used = vec![false; self.dim as usize * self.max_value as usize];
        self.samples_per_dim.iter_mut().for_each(|c| *c = 0);
        self.sample_bits.clear();
        self.sample_bits.reserve(self.tuple_size as usize);

        for _ in 0..self.tuple_size {
            loop {
                let d = rng.below(self.dim);
                let loc = rng.below(self.max_value);
                let bitnum = (d as usize) * (self.max_value as usize) + loc as usize;
                if !used[bitnum] {
                    used[bitnum] = true;
                    self.samples_per_dim[d as usize] += 1;
                    self.sample_bits.push(SampleBit { dim: d, loc });
                    break;
                }
            }
        }
        self.sample_bits.sort_by_key(|sb| (sb.dim, sb.loc));
    }

    fn generate_coefficients(&mut self, rng: &mut Rng) {
        for i in 0..self.dim as usize {
            self.a[i] = (rng.u64() & 0xFFFF_FFFF) as u32;
            self.b[i] = (rng.u64() & 0xFFFF_FFFF) as u32;
        }
    }

    /// Offset into `sample_bits` where dimension `d`'s run starts.
    fn run_start(&self, d: usize) -> usize {
        self.samples_per_dim[..d].iter().map(|&c| c as usize).sum()
    }

    /// `k_d`: the count of sampled bits in dimension `d`'s run whose
    /// threshold is `<= x_d`, found by binary search over the run.
    fn sketch_count(&self, d: usize, x_d: u32) -> u32 {
        let count = self.samples_per_dim[d] as usize;
        if count == 0 {
            return 0;
        }
        let low0 = self.run_start(d);
        let high0 = low0 + count - 1;

        if self.sample_bits[low0].loc > x_d {
            return 0;
        }
        if self.sample_bits[high0].loc <= x_d {
            return count as u32;
        }

        let (mut low, mut high) = (low0, high0);
        while low + 1 < high {
            let mid = (low + high) / 2;
            if self.sample_bits[mid].loc <= x_d {
                low = mid;
            } else {
                high = mid;
            }
        }
        (low + 1 - low0) as u32
    }

    /// The per-dimension sketch `(k_0, .., k_{D-1})` for a record.
    pub fn sketch(&self, record: &SparseList) -> Vec<u32> {
        (0..self.dim as usize)
            .map(|d| self.sketch_count(d, record.freq(d as u32)))
            .collect()
    }
}

impl HashFamily for L1Family {
    type Record = SparseList;

    fn regenerate(&mut self, rng: &mut Rng) {
        self.generate_sample_bits(rng);
        self.generate_coefficients(rng);
    }

    fn hash(&self, record: &SparseList, capacity: u32) -> (u64, u32) {
        let mut temp_index: u64 = 0;
        let mut temp_hv: u64 = 0;
        for d in 0..self.dim as usize {
            let k_d = self.sketch_count(d, record.freq(d as u32)) as u64;
            temp_index += self.a[d] as u64 * k_d;
            temp_hv += self.b[d] as u64 * k_d;
        }
        let fingerprint = temp_hv % LARGEST_PRIME;
        let index = ((temp_index % LARGEST_PRIME) % capacity as u64) as u32;
        (fingerprint, index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(entries: &[(u32, u32)]) -> SparseList {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_sample_bits_unique_and_sorted() {
        let mut f = L1Family::new(4, 8, 10).unwrap();
        let mut rng = Rng::seeded(1);
        f.regenerate(&mut rng);
        assert_eq!(f.sample_bits().len(), 10);

        let mut seen = std::collections::HashSet::new();
        for sb in f.sample_bits() {
            assert!(seen.insert((sb.dim, sb.loc)), "duplicate sample bit");
        }
        let sum: u32 = f.samples_per_dim().iter().sum();
        assert_eq!(sum, 10);

        let mut sorted = f.sample_bits().to_vec();
        sorted.sort_by_key(|sb| (sb.dim, sb.loc));
        assert_eq!(sorted.iter().map(|sb| (sb.dim, sb.loc)).collect::<Vec<_>>(),
                   f.sample_bits().iter().map(|sb| (sb.dim, sb.loc)).collect::<Vec<_>>());
    }

    #[test]
    fn test_rejects_oversized_tuple() {
        assert!(L1Family::new(2, 2, 5).is_err());
    }

    #[test]
    fn test_monotone_sketch() {
        let mut f = L1Family::new(3, 16, 12).unwrap();
        let mut rng = Rng::seeded(3);
        f.regenerate(&mut rng);

        let u = record(&[(0, 2), (1, 3), (2, 1)]);
        let v = record(&[(0, 5), (1, 3), (2, 9)]);
        let ku = f.sketch(&u);
        let kv = f.sketch(&v);
        for (a, b) in ku.iter().zip(kv.iter()) {
            assert!(a <= b);
        }
    }

    #[test]
    fn test_identical_records_collide() {
        let mut f = L1Family::new(2, 8, 4).unwrap();
        let mut rng = Rng::seeded(9);
        f.regenerate(&mut rng);

        let r0 = record(&[(0, 5), (1, 3)]);
        let r1 = record(&[(0, 5), (1, 3)]);
        assert_eq!(f.hash(&r0, 16), f.hash(&r1, 16));
    }
}
