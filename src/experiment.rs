//! ## Experiment driver
//! Feeds a random token stream batch by batch to both `ExactCounter` and `HyperLogLog`
//! and records how the estimate tracks the exact distinct count.
//!
//! Two kinds of runs are supported:
//! - single run: one stream per precision, reporting exact count and estimate after every batch
//! - trials: many independent streams per precision, reporting mean and standard deviation
//!   of estimates after every batch
//!
//! Configuration comes from `ExperimentConfig`, which can be overridden from environment
//! variables (see `ExperimentConfig::from_env`).

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::Error;
use crate::exact::ExactCounter;
use crate::hash::HashFamily;
use crate::hyperloglog::HyperLogLog;
use crate::stats::{relative_error, TrialStatistics};
use crate::stream::RandomStream;

/// Kind of experiment to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// One stream per precision compared against exact count
    Single,
    /// Repeated streams per precision summarized with mean and standard deviation
    Trials,
}

/// Report output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportFormat {
    /// Markdown tables
    Table,
    /// JSON records, one per line (requires `with_serde` feature)
    Json,
}

/// Experiment parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentConfig {
    /// Number of tokens in a single run stream
    pub stream_size: usize,
    /// Fraction of the stream delivered by every batch
    pub batch_fraction: f64,
    /// HyperLogLog precisions to sweep
    pub precisions: Vec<u8>,
    pub mode: Mode,
    /// Number of independent runs per precision in trials mode
    pub trials: usize,
    /// Number of tokens in every trial stream
    pub trial_stream_size: usize,
    /// Seed making runs reproducible, OS entropy is used when absent
    pub seed: Option<u64>,
    pub format: ReportFormat,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            stream_size: 1_000_000,
            batch_fraction: 0.05,
            precisions: vec![6, 10, 14],
            mode: Mode::Single,
            trials: 100,
            trial_stream_size: 100_000,
            seed: None,
            format: ReportFormat::Table,
        }
    }
}

impl ExperimentConfig {
    /// Build configuration from defaults overridden by `HLL_*` environment variables:
    /// `HLL_STREAM_SIZE`, `HLL_BATCH_FRACTION`, `HLL_PRECISIONS` (comma separated),
    /// `HLL_MODE` (`single` or `trials`), `HLL_TRIALS`, `HLL_TRIAL_STREAM_SIZE`,
    /// `HLL_SEED` and `HLL_FORMAT` (`table` or `json`).
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(v) = lookup("HLL_STREAM_SIZE") {
            config.stream_size = parse("HLL_STREAM_SIZE", &v)?;
        }
        if let Some(v) = lookup("HLL_BATCH_FRACTION") {
            config.batch_fraction = parse("HLL_BATCH_FRACTION", &v)?;
        }
        if let Some(v) = lookup("HLL_PRECISIONS") {
            config.precisions = v
                .split(',')
                .map(|p| parse("HLL_PRECISIONS", p))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = lookup("HLL_MODE") {
            config.mode = match v.trim() {
                "single" => Mode::Single,
                "trials" => Mode::Trials,
                _ => return Err(Error::invalid_config("HLL_MODE", v)),
            };
        }
        if let Some(v) = lookup("HLL_TRIALS") {
            config.trials = parse("HLL_TRIALS", &v)?;
        }
        if let Some(v) = lookup("HLL_TRIAL_STREAM_SIZE") {
            config.trial_stream_size = parse("HLL_TRIAL_STREAM_SIZE", &v)?;
        }
        if let Some(v) = lookup("HLL_SEED") {
            config.seed = Some(parse("HLL_SEED", &v)?);
        }
        if let Some(v) = lookup("HLL_FORMAT") {
            config.format = match v.trim() {
                "table" => ReportFormat::Table,
                "json" => ReportFormat::Json,
                _ => return Err(Error::invalid_config("HLL_FORMAT", v)),
            };
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that every run terminates and every precision is supported
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.batch_fraction > 0.0 && self.batch_fraction <= 1.0) {
            return Err(Error::invalid_config("batch_fraction", self.batch_fraction));
        }
        // empty batches would never finish the stream
        for (key, size) in [
            ("stream_size", self.stream_size),
            ("trial_stream_size", self.trial_stream_size),
        ] {
            if (size as f64 * self.batch_fraction) < 1.0 {
                return Err(Error::invalid_config(key, size));
            }
        }
        if self.precisions.is_empty() {
            return Err(Error::invalid_config("precisions", "[]"));
        }
        if let Some(&p) = self
            .precisions
            .iter()
            .find(|p| !(HyperLogLog::MIN_PRECISION..=HyperLogLog::MAX_PRECISION).contains(p))
        {
            return Err(Error::InvalidPrecision(p));
        }
        if self.trials < 2 {
            return Err(Error::invalid_config("trials", self.trials));
        }
        if self.format == ReportFormat::Json && cfg!(not(feature = "with_serde")) {
            return Err(Error::invalid_config("format", "json"));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_config(key, value))
}

/// Exact count and estimate after one batch of a single run
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchRecord {
    pub precision: u8,
    /// 1-based batch number
    pub batch: usize,
    /// Percentage of the stream consumed so far
    pub consumed_percent: f64,
    pub exact: usize,
    pub estimate: f64,
    pub relative_error: f64,
}

/// Estimates summary after one batch across all trials
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialRecord {
    pub precision: u8,
    /// 1-based batch number
    pub batch: usize,
    /// Percentage of the stream consumed so far
    pub consumed_percent: f64,
    pub stats: TrialStatistics,
}

/// Experiment runner owning the source of seeds for streams and hash functions.
pub struct Experiment {
    config: ExperimentConfig,
    seeds: StdRng,
    hashes: HashFamily,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self, Error> {
        config.validate()?;
        let mut seeds = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hashes = HashFamily::with_seed(seeds.gen());
        Ok(Self {
            config,
            seeds,
            hashes,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    fn stream(&mut self, size: usize) -> RandomStream {
        RandomStream::with_seed(size, self.seeds.gen())
    }

    /// Stream `stream_size` tokens into fresh exact counter and sketch,
    /// recording both after every batch.
    pub fn run_single(&mut self, precision: u8) -> Result<Vec<BatchRecord>, Error> {
        let mut sketch = HyperLogLog::new(precision, self.hashes.generate())?;
        let mut exact = ExactCounter::new();
        let mut stream = self.stream(self.config.stream_size);
        let fraction = self.config.batch_fraction;

        let mut records = Vec::new();
        while !stream.is_finished() {
            let portion = stream.next_portion(fraction);
            exact.add(&portion);
            sketch.update(&portion);

            let estimate = sketch.estimate();
            let record = BatchRecord {
                precision,
                batch: records.len() + 1,
                consumed_percent: consumed_percent(&stream),
                exact: exact.size(),
                estimate,
                relative_error: relative_error(estimate, exact.size() as f64),
            };
            info!(
                precision,
                batch = record.batch,
                exact = record.exact,
                estimate = record.estimate,
                "batch processed"
            );
            records.push(record);
        }
        Ok(records)
    }

    /// Repeat `trials` independent runs of `trial_stream_size` tokens and summarize
    /// estimates of every batch across runs.
    pub fn run_trials(&mut self, precision: u8) -> Result<Vec<TrialRecord>, Error> {
        let fraction = self.config.batch_fraction;
        let mut estimates: Vec<Vec<f64>> = Vec::new();
        let mut percents: Vec<f64> = Vec::new();

        for trial in 0..self.config.trials {
            let mut sketch = HyperLogLog::new(precision, self.hashes.generate())?;
            let mut stream = self.stream(self.config.trial_stream_size);
            let mut batch = 0;
            while !stream.is_finished() {
                sketch.update(&stream.next_portion(fraction));
                if batch == estimates.len() {
                    estimates.push(Vec::with_capacity(self.config.trials));
                    percents.push(consumed_percent(&stream));
                }
                estimates[batch].push(sketch.estimate());
                batch += 1;
            }
            debug!(precision, trial, estimate = sketch.estimate(), "trial finished");
        }

        let records = estimates
            .iter()
            .zip(percents)
            .enumerate()
            .map(|(i, (samples, consumed_percent))| -> Result<TrialRecord, Error> {
                Ok(TrialRecord {
                    precision,
                    batch: i + 1,
                    consumed_percent,
                    stats: TrialStatistics::summarize(samples)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        info!(precision, trials = self.config.trials, "trials finished");
        Ok(records)
    }
}

fn consumed_percent(stream: &RandomStream) -> f64 {
    100.0 * stream.produced() as f64 / stream.size() as f64
}
