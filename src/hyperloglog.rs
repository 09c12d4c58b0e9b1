//! ## HyperLogLog sketch
//! Estimates cardinality of a token stream using `M = 2^P` registers, one byte each.
//!
//! [Original HyperLogLog paper](https://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)
//!
//! Every token is hashed into a `u32` by the sketch's `MultiplicativeHash`:
//! - top `P` bits  - select register index (bucket)
//! - low `32 - P` bits - rank is the position of the first 1-bit from the top, starting at 1
//!
//! Each register keeps maximal rank observed in its bucket. Number of zero registers and
//! harmonic sum of registers are updated as ranks grow, so `estimate` doesn't scan registers.
//! Every harmonic sum term is a power of two within `[2^-33, 1]` and the sum never exceeds
//! `2^18`, so the `f64` sum is exact and never drifts from a full recomputation.

use std::fmt::{Debug, Formatter};
use std::mem::{size_of, size_of_val};

use tracing::debug;

use crate::counter::DistinctCounter;
use crate::error::Error;
use crate::hash::MultiplicativeHash;
use crate::stream::Token;

/// HyperLogLog sketch with runtime precision
#[derive(Clone)]
pub struct HyperLogLog {
    /// Number of hash bits used for register index
    precision: u8,
    /// Register ranks
    registers: Box<[u8]>,
    /// Number of registers set to 0
    zeros: usize,
    /// Harmonic sum of registers: sum of `2^-rank`
    harmonic_sum: f64,
    /// Hash function fixed for the sketch lifetime
    hash: MultiplicativeHash,
}

impl HyperLogLog {
    /// Smallest supported precision
    pub const MIN_PRECISION: u8 = 1;
    /// Largest supported precision
    pub const MAX_PRECISION: u8 = 18;

    /// Create new sketch with `2^precision` zero registers
    pub fn new(precision: u8, hash: MultiplicativeHash) -> Result<Self, Error> {
        if !(Self::MIN_PRECISION..=Self::MAX_PRECISION).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }
        let m = 1usize << precision;
        debug!(
            precision,
            registers = m,
            multiplier = hash.multiplier(),
            "created hyperloglog"
        );

        Ok(Self {
            precision,
            registers: vec![0u8; m].into_boxed_slice(),
            zeros: m,
            harmonic_sum: m as f64,
            hash,
        })
    }

    /// Insert every item of the batch
    pub fn update<T: AsRef<[u8]>>(&mut self, batch: &[T]) {
        for item in batch {
            self.insert(item);
        }
    }

    /// Insert single item
    #[inline]
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) {
        let hash = self.hash.hash(item.as_ref());
        self.insert_hash(hash);
    }

    /// Insert already computed hash
    #[inline]
    pub fn insert_hash(&mut self, hash: u32) {
        let (idx, rank) = decode_hash(hash, self.precision);
        self.update_rank(idx as usize, rank);
    }

    /// Raise register `idx` to `new_rank`, never lowering it
    #[inline]
    fn update_rank(&mut self, idx: usize, new_rank: u8) {
        let old_rank = self.registers[idx];
        if new_rank > old_rank {
            self.registers[idx] = new_rank;
            self.zeros -= usize::from(old_rank == 0);
            self.harmonic_sum += inverse_pow2(new_rank) - inverse_pow2(old_rank);
        }
    }

    /// Return cardinality estimate
    pub fn estimate(&self) -> f64 {
        let m = self.registers.len() as f64;
        let estimate = alpha(self.registers.len()) * m * m / self.harmonic_sum;
        if estimate < 2.5 * m && self.zeros > 0 {
            // small range correction: linear counting over empty registers
            return m * (m / self.zeros as f64).ln();
        }
        estimate
    }

    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Return number of registers `M`
    #[inline]
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    #[inline]
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Return number of registers still set to 0
    #[inline]
    pub fn zero_registers(&self) -> usize {
        self.zeros
    }

    #[inline]
    pub fn hash_function(&self) -> MultiplicativeHash {
        self.hash
    }

    /// Return memory size of `HyperLogLog`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.registers)
    }
}

impl DistinctCounter for HyperLogLog {
    fn add_batch(&mut self, batch: &[Token]) {
        self.update(batch);
    }

    fn count(&self) -> f64 {
        self.estimate()
    }

    fn size_of(&self) -> usize {
        HyperLogLog::size_of(self)
    }

    fn name(&self) -> String {
        format!("hyperloglog(p={})", self.precision)
    }
}

impl Debug for HyperLogLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, zeros: {}, estimate: {:.0}, size: {} }}",
            self.precision,
            self.zeros,
            self.estimate(),
            self.size_of()
        )
    }
}

/// Split hash into register index (top `precision` bits) and rank of the remaining bits.
///
/// Rank is the number of leading zeros of the low `32 - precision` bits plus one,
/// so it's within `[1..33 - precision]`. `precision` must be within `[1..=31]`, which
/// `HyperLogLog::new` guarantees for every sketch.
#[inline]
pub(crate) fn decode_hash(hash: u32, precision: u8) -> (u32, u8) {
    let idx = hash >> (32 - precision);
    // sentinel bit caps the zero count at `32 - precision` when the rank bits are all zero
    let rank = ((hash << precision) | (1 << (precision - 1))).leading_zeros() + 1;
    (idx, rank as u8)
}

/// Parameter for bias correction
#[inline]
pub fn alpha(m: usize) -> f64 {
    match m {
        2 => 0.3512,
        4 => 0.5324,
        8 => 0.6355,
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        m if m >= 128 => 0.7213 / (1.0 + 1.079 / (m as f64)),
        _ => 0.673,
    }
}

/// Return `2^-rank`
#[inline]
fn inverse_pow2(rank: u8) -> f64 {
    1.0 / ((1u64 << rank) as f64)
}
