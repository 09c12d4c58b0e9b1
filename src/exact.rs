//! ## Exact counter
//! Accuracy oracle counting distinct tokens exactly by keeping all of them in a hash set.

use std::collections::HashSet;
use std::hash::BuildHasherDefault;
use std::mem::size_of;

use wyhash::WyHash;

use crate::counter::DistinctCounter;
use crate::stream::Token;

/// Exact distinct tokens counter
#[derive(Clone, Debug, Default)]
pub struct ExactCounter {
    tokens: HashSet<Token, BuildHasherDefault<WyHash>>,
}

impl ExactCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert all tokens of the batch, skipping already seen ones
    pub fn add(&mut self, batch: &[Token]) {
        for token in batch {
            if !self.tokens.contains(token) {
                self.tokens.insert(token.clone());
            }
        }
    }

    /// Return number of distinct tokens inserted so far
    #[inline]
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Forget all inserted tokens
    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

impl DistinctCounter for ExactCounter {
    fn add_batch(&mut self, batch: &[Token]) {
        self.add(batch);
    }

    fn count(&self) -> f64 {
        self.size() as f64
    }

    /// Approximate heap usage: hash table slots with one control byte each, plus token bytes
    fn size_of(&self) -> usize {
        size_of::<Self>()
            + self.tokens.capacity() * (size_of::<Token>() + 1)
            + self.tokens.iter().map(Token::len).sum::<usize>()
    }

    fn name(&self) -> String {
        "exact".to_string()
    }
}
