//! Runs the timing statistics over a batch of waveform records.
//!
//! Each record is normalised independently, so records and thresholds are
//! processed in parallel. Every collection preserves input order, which keeps
//! the output identical between runs.
use crate::{
    AmplitudeBin, DeviationSummary, InvalidWaveform, JitterStatistic, NormalizedPulse, Real,
    Threshold, ThresholdFraction, WaveformRecord, bin_by_amplitude,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A record excluded from every statistic, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub label: Option<String>,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: InvalidWaveform,
}

fn serialize_reason<S: serde::Serializer>(
    reason: &InvalidWaveform,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// The normalised pulses of a batch of records, and the records which could not be used.
#[derive(Debug, Default, Clone)]
pub struct Batch {
    pub pulses: Vec<NormalizedPulse>,
    pub skipped: Vec<SkippedRecord>,
}

impl Batch {
    pub fn num_records(&self) -> usize {
        self.pulses.len() + self.skipped.len()
    }

    /// Records a record which was rejected before it could be normalised, e.g. while loading.
    pub fn push_skipped(&mut self, label: Option<String>, reason: InvalidWaveform) {
        warn!(
            "Skipping record {}: {reason}",
            label.as_deref().unwrap_or("<unlabelled>")
        );
        self.skipped.push(SkippedRecord { label, reason });
    }
}

/// Normalises every record. Invalid records are set aside and do not abort the batch.
#[tracing::instrument(skip_all, fields(num_records = records.len()))]
pub fn normalise_batch(records: Vec<WaveformRecord>) -> Batch {
    let results: Vec<Result<NormalizedPulse, SkippedRecord>> = records
        .into_par_iter()
        .map(|record| {
            let label = record.label().map(ToOwned::to_owned);
            NormalizedPulse::new(record).map_err(|reason| SkippedRecord { label, reason })
        })
        .collect();

    let mut batch = Batch::default();
    for result in results {
        match result {
            Ok(pulse) => batch.pulses.push(pulse),
            Err(SkippedRecord { label, reason }) => batch.push_skipped(label, reason),
        }
    }
    debug!(
        "Normalised {} pulse(s), skipped {}",
        batch.pulses.len(),
        batch.skipped.len()
    );
    batch
}

/// Crossing times of every pulse that crosses `threshold`, in pulse order.
fn crossing_times(pulses: &[NormalizedPulse], threshold: Threshold) -> Vec<Real> {
    pulses
        .par_iter()
        .filter_map(|pulse| {
            let result = pulse.crossing(threshold);
            if result.crossing_time.is_none() {
                debug!(
                    "No crossing at {threshold} for {}",
                    pulse.label().unwrap_or("<unlabelled>")
                );
            }
            result.crossing_time
        })
        .collect()
}

/// Computes the jitter-vs-threshold curve. Every threshold yields a row,
/// with absent jitter where fewer than two pulses crossed.
#[tracing::instrument(skip_all, fields(num_pulses = pulses.len(), num_thresholds = thresholds.len()))]
pub fn threshold_sweep(
    pulses: &[NormalizedPulse],
    thresholds: &[ThresholdFraction],
) -> Vec<JitterStatistic> {
    thresholds
        .par_iter()
        .map(|&fraction| {
            JitterStatistic::new(fraction, &crossing_times(pulses, Threshold::Fraction(fraction)))
        })
        .collect()
}

/// Computes the jitter of the `fraction` crossing time for each populated peak-amplitude bin.
/// Peak amplitudes are signed and in the scaled amplitude unit.
#[tracing::instrument(skip_all, fields(num_pulses = pulses.len(), fraction = %fraction, bin_width = bin_width))]
pub fn timewalk(
    pulses: &[NormalizedPulse],
    fraction: ThresholdFraction,
    bin_width: Real,
) -> Vec<AmplitudeBin> {
    let amplitude_times: Vec<(Real, Real)> = pulses
        .par_iter()
        .filter_map(|pulse| {
            pulse
                .crossing(Threshold::Fraction(fraction))
                .crossing_time
                .map(|time| (pulse.peak_amplitude(), time))
        })
        .collect();
    bin_by_amplitude(&amplitude_times, bin_width)
}

/// Crossing-time statistics at a fixed absolute trigger level and at a fraction of peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingSummary {
    pub trigger: DeviationSummary,
    pub fractional: DeviationSummary,
}

#[tracing::instrument(skip_all, fields(num_pulses = pulses.len(), trigger_level = trigger_level, fraction = %fraction))]
pub fn timing_summary(
    pulses: &[NormalizedPulse],
    trigger_level: Real,
    fraction: ThresholdFraction,
) -> TimingSummary {
    let trigger = Threshold::Absolute(trigger_level);
    let fractional = Threshold::Fraction(fraction);
    TimingSummary {
        trigger: DeviationSummary::new(trigger, &crossing_times(pulses, trigger)),
        fractional: DeviationSummary::new(fractional, &crossing_times(pulses, fractional)),
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Fractions of peak at which the jitter curve is sampled.
    pub thresholds: Vec<ThresholdFraction>,
    /// Fraction of peak used for the timewalk histogram and the summary.
    pub fraction: ThresholdFraction,
    /// Width of the peak-amplitude bins, in the scaled amplitude unit.
    pub bin_width: Real,
    /// Absolute trigger level, in the scaled amplitude unit.
    pub trigger_level: Real,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub num_records: usize,
    pub num_analysed: usize,
    pub skipped: Vec<SkippedRecord>,
    pub sweep: Vec<JitterStatistic>,
    pub timewalk: Vec<AmplitudeBin>,
    pub summary: TimingSummary,
}

/// Runs every analysis over an already normalised batch.
#[tracing::instrument(skip_all, fields(num_records = batch.num_records()))]
pub fn analyse(batch: Batch, settings: &AnalysisSettings) -> AnalysisReport {
    let sweep = threshold_sweep(&batch.pulses, &settings.thresholds);
    let timewalk = timewalk(&batch.pulses, settings.fraction, settings.bin_width);
    let summary = timing_summary(&batch.pulses, settings.trigger_level, settings.fraction);
    info!(
        "Analysed {} of {} record(s): {} threshold row(s), {} amplitude bin(s)",
        batch.pulses.len(),
        batch.num_records(),
        sweep.len(),
        timewalk.len()
    );
    AnalysisReport {
        num_records: batch.num_records(),
        num_analysed: batch.pulses.len(),
        skipped: batch.skipped,
        sweep,
        timewalk,
        summary,
    }
}

#[cfg(test)]
mod tests;
