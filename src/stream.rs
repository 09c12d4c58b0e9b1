//! ## Random token stream
//! Bounded synthetic stream of random tokens delivered in fractional portions.
//!
//! The stream has a fixed target size `N` and produces every token exactly once:
//! each call to `next_portion` generates fresh tokens until `N` tokens were produced,
//! after which all further portions are empty.

use std::fmt::{Debug, Formatter};

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Symbols tokens are made of
pub const ALPHABET: &[u8; 63] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-";
/// Shortest token length
pub const MIN_TOKEN_LEN: usize = 1;
/// Longest token length
pub const MAX_TOKEN_LEN: usize = 30;

/// Immutable byte string identified by its content
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Box<[u8]>);

impl Token {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Token {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Token {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().into())
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

/// Stream of `size` random tokens
pub struct RandomStream {
    /// Number of tokens the stream produces in total
    size: usize,
    /// Number of tokens produced so far
    produced: usize,
    rng: StdRng,
    lengths: Uniform<usize>,
    symbols: Uniform<usize>,
}

impl RandomStream {
    /// Create stream of `size` tokens seeded from OS entropy
    pub fn new(size: usize) -> Self {
        Self::from_rng(size, StdRng::from_entropy())
    }

    /// Create stream of `size` tokens with fixed seed
    pub fn with_seed(size: usize, seed: u64) -> Self {
        Self::from_rng(size, StdRng::seed_from_u64(seed))
    }

    fn from_rng(size: usize, rng: StdRng) -> Self {
        Self {
            size,
            produced: 0,
            rng,
            lengths: Uniform::new_inclusive(MIN_TOKEN_LEN, MAX_TOKEN_LEN),
            symbols: Uniform::new(0, ALPHABET.len()),
        }
    }

    /// Generate next `floor(size * fraction)` tokens, or fewer if the stream runs out.
    ///
    /// Returns an empty portion once the stream is finished. Fractions which
    /// request nothing (zero, negative or NaN) return an empty portion as well.
    pub fn next_portion(&mut self, fraction: f64) -> Vec<Token> {
        let requested = (self.size as f64 * fraction) as usize;
        let count = requested.min(self.remaining());
        if count == 0 {
            return Vec::new();
        }

        let portion: Vec<Token> = (0..count).map(|_| self.next_token()).collect();
        self.produced += count;
        if self.is_finished() {
            debug!(size = self.size, "stream finished");
        }
        portion
    }

    /// Return whether all tokens were produced
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.produced >= self.size
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn produced(&self) -> usize {
        self.produced
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.size - self.produced
    }

    fn next_token(&mut self) -> Token {
        let len = self.lengths.sample(&mut self.rng);
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(ALPHABET[self.symbols.sample(&mut self.rng)]);
        }
        Token::from(bytes)
    }
}
