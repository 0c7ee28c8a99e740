//! This crate converts recorded PMT pulse waveforms into timing statistics.
//!
//! A waveform record is a pair of equal-length columns (time, amplitude).
//! Records are normalised so that each pulse peak maps to `1.0`, crossing
//! times are extracted at one or more thresholds, and the spread of those
//! crossing times across many pulses is reported as jitter. Typical usage
//! may look like:
//! ```ignore
//! let batch = normalise_batch(records);
//! let curve = threshold_sweep(&batch.pulses, &linspace(0.1, 1.0, 50)?);
//! let bins = timewalk(&batch.pulses, ThresholdFraction::HALF, 20.0);
//! ```
pub mod analysis;
pub mod crossing;
pub mod error;
pub mod jitter;
pub mod loader;
pub mod timewalk;
pub mod waveform;

pub use analysis::{
    AnalysisReport, AnalysisSettings, Batch, SkippedRecord, TimingSummary, analyse,
    normalise_batch, threshold_sweep, timewalk, timing_summary,
};
pub use crossing::{CrossingResult, Threshold, ThresholdFraction, find_crossing, linspace};
pub use error::{InvalidWaveform, LoadError, ThresholdError};
pub use jitter::{DeviationSummary, Dispersion, JitterStatistic, aggregate};
pub use loader::{LoaderOptions, load_waveform, load_waveform_file};
pub use pmt_timing_common::Real;
pub use timewalk::{AmplitudeBin, bin_by_amplitude, make_bin_edges};
pub use waveform::{NormalizedPulse, WaveformRecord};
