//! `hll-accuracy` measures how accurately a HyperLogLog sketch estimates the number of
//! distinct tokens in a stream, compared against an exact set-based count.
//!
//! A synthetic stream of random tokens is fed batch by batch to both counters under
//! different sketch precisions:
//!
//! ```
//! use hll_accuracy::{ExactCounter, HashFamily, HyperLogLog, RandomStream};
//!
//! let mut stream = RandomStream::with_seed(10_000, 42);
//! let mut sketch = HyperLogLog::new(10, HashFamily::with_seed(42).generate()).unwrap();
//! let mut exact = ExactCounter::new();
//! while !stream.is_finished() {
//!     let portion = stream.next_portion(0.05);
//!     exact.add(&portion);
//!     sketch.update(&portion);
//! }
//! let error = (sketch.estimate() - exact.size() as f64).abs() / exact.size() as f64;
//! assert!(error < 0.2);
//! ```
pub mod counter;
mod error;
pub mod exact;
pub mod experiment;
pub mod hash;
pub mod hyperloglog;
pub mod stats;
pub mod stream;

pub use crate::counter::DistinctCounter;
pub use crate::error::Error;
pub use crate::exact::ExactCounter;
pub use crate::hash::{HashFamily, MultiplicativeHash};
pub use crate::hyperloglog::HyperLogLog;
pub use crate::stats::TrialStatistics;
pub use crate::stream::{RandomStream, Token};
