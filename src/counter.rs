//! ## Distinct counter
//! Common interface of the exact counter and the sketch, fed with the same token batches.

use crate::stream::Token;

/// Distinct counter trait implemented by both the exact baseline and the sketch under test.
pub trait DistinctCounter {
    /// Observe every token of the batch
    fn add_batch(&mut self, batch: &[Token]);
    /// Return (estimated) number of distinct tokens observed so far
    fn count(&self) -> f64;
    /// Return memory size of the counter in bytes
    fn size_of(&self) -> usize;
    /// Name used in reports
    fn name(&self) -> String;
}
