use std::fmt;

/// Errors returned by sketch construction, trial statistics and experiment configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// HyperLogLog precision outside of the supported `[1..18]` range.
    InvalidPrecision(u8),
    /// Sample standard deviation needs at least two samples.
    InsufficientSamples(usize),
    /// Configuration value which can't be parsed or fails validation.
    InvalidConfig { key: &'static str, value: String },
}

impl Error {
    pub(crate) fn invalid_config(key: &'static str, value: impl ToString) -> Self {
        Error::InvalidConfig {
            key,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPrecision(p) => write!(f, "precision {p} is out of [1..18] range"),
            Error::InsufficientSamples(n) => {
                write!(f, "at least 2 samples are required, got {n}")
            }
            Error::InvalidConfig { key, value } => {
                write!(f, "invalid configuration value {key}={value:?}")
            }
        }
    }
}

impl std::error::Error for Error {}
