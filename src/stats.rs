//! ## Trial statistics
//! Mean and sample standard deviation of estimates collected over repeated trials.

use crate::error::Error;

/// Summary of a collection of estimates
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (with Bessel's correction)
    pub std_dev: f64,
    /// Number of summarized samples
    pub samples: usize,
}

impl TrialStatistics {
    /// Summarize samples, requiring at least two of them
    pub fn summarize(samples: &[f64]) -> Result<Self, Error> {
        let n = samples.len();
        if n < 2 {
            return Err(Error::InsufficientSamples(n));
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let squares = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();
        Ok(Self {
            mean,
            std_dev: (squares / (n - 1) as f64).sqrt(),
            samples: n,
        })
    }

    /// Return standard deviation relative to the mean, `0` when both are `0`.
    /// Non-zero deviation around a zero mean gives infinity.
    #[inline]
    pub fn relative_std_dev(&self) -> f64 {
        if self.mean == 0.0 {
            return if self.std_dev == 0.0 { 0.0 } else { f64::INFINITY };
        }
        self.std_dev / self.mean.abs()
    }
}

/// Relative error of the estimate, `0` when both estimate and actual value are `0`.
#[inline]
pub fn relative_error(estimate: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        return if estimate == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (estimate - actual).abs() / actual
}

/// Expected relative standard error of HyperLogLog with `m` registers
#[inline]
pub fn standard_error(m: usize) -> f64 {
    1.04 / (m as f64).sqrt()
}
