use crate::Real;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a waveform record is excluded from every downstream statistic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidWaveform {
    #[error("Time and amplitude columns differ in length ({time} vs {amplitude})")]
    LengthMismatch { time: usize, amplitude: usize },
    #[error("Only {0} valid sample(s) after cleaning, at least 2 are required")]
    TooFewSamples(usize),
    #[error("Time is not strictly increasing at sample {index}")]
    NonIncreasingTime { index: usize },
    #[error("Peak amplitude is zero")]
    ZeroPeak,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO Error reading {path}: {source}")]
    IO {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO Error: {0}")]
    Read(#[from] std::io::Error),
    #[error("{0}")]
    Invalid(#[from] InvalidWaveform),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("Threshold fraction {0} is outside (0, 1]")]
    OutOfRange(Real),
    #[error("Cannot parse threshold fraction '{0}'")]
    Parse(String),
    #[error("A sweep needs at least one point")]
    EmptySweep,
}
