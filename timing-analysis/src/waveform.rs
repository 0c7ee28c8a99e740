use crate::{
    InvalidWaveform, Real,
    crossing::{CrossingResult, Threshold, ThresholdFraction, find_crossing},
};
use itertools::Itertools;
use serde::Serialize;

/// A single captured detector pulse, after paired cleaning of its columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveformRecord {
    label: Option<String>,
    time: Vec<Real>,
    amplitude: Vec<Real>,
}

impl WaveformRecord {
    /// Builds a record from two equal-length columns, with no amplitude scaling.
    /// Pairs in which either value is non-finite are dropped.
    pub fn new(time: Vec<Real>, amplitude: Vec<Real>) -> Result<Self, InvalidWaveform> {
        if time.len() != amplitude.len() {
            return Err(InvalidWaveform::LengthMismatch {
                time: time.len(),
                amplitude: amplitude.len(),
            });
        }
        Self::from_samples(
            time.into_iter()
                .zip(amplitude)
                .map(|(t, a)| (Some(t), Some(a))),
            1.0,
        )
    }

    /// Builds a record from (time, amplitude) rows as they come out of a table.
    /// A row is discarded when either cell is absent or non-finite, so both
    /// columns stay index aligned. Surviving amplitudes are multiplied by
    /// `amplitude_scale`.
    pub fn from_samples<I>(samples: I, amplitude_scale: Real) -> Result<Self, InvalidWaveform>
    where
        I: IntoIterator<Item = (Option<Real>, Option<Real>)>,
    {
        let (time, amplitude): (Vec<Real>, Vec<Real>) = samples
            .into_iter()
            .filter_map(|(t, a)| t.zip(a))
            .map(|(t, a)| (t, a * amplitude_scale))
            .filter(|(t, a)| t.is_finite() && a.is_finite())
            .unzip();

        if time.len() < 2 {
            return Err(InvalidWaveform::TooFewSamples(time.len()));
        }
        if let Some(index) = time
            .iter()
            .tuple_windows()
            .position(|(prev, next)| next <= prev)
        {
            return Err(InvalidWaveform::NonIncreasingTime { index: index + 1 });
        }

        Ok(Self {
            label: None,
            time,
            amplitude,
        })
    }

    /// Attaches attribution metadata, typically the source file name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn time(&self) -> &[Real] {
        &self.time
    }

    pub fn amplitude(&self) -> &[Real] {
        &self.amplitude
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// A waveform record rescaled so that its (negative-going) peak maps to `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPulse {
    record: WaveformRecord,
    peak_index: usize,
    peak_amplitude: Real,
    norm_amplitude: Vec<Real>,
    /// Largest normalised sample. Fractional levels are taken relative to it.
    /// This is `1.0` for any pulse whose peak is negative.
    norm_maximum: Real,
}

impl NormalizedPulse {
    pub fn new(record: WaveformRecord) -> Result<Self, InvalidWaveform> {
        // First occurrence of the most negative sample.
        let (peak_index, peak_amplitude) = record
            .amplitude
            .iter()
            .copied()
            .enumerate()
            .reduce(|peak, sample| if sample.1 < peak.1 { sample } else { peak })
            .ok_or(InvalidWaveform::TooFewSamples(0))?;

        if peak_amplitude == 0.0 {
            return Err(InvalidWaveform::ZeroPeak);
        }

        let norm_amplitude: Vec<Real> = record
            .amplitude
            .iter()
            .map(|amplitude| amplitude / peak_amplitude)
            .collect();
        let norm_maximum = norm_amplitude
            .iter()
            .copied()
            .fold(Real::NEG_INFINITY, Real::max);

        Ok(Self {
            record,
            peak_index,
            peak_amplitude,
            norm_amplitude,
            norm_maximum,
        })
    }

    pub fn record(&self) -> &WaveformRecord {
        &self.record
    }

    pub fn label(&self) -> Option<&str> {
        self.record.label()
    }

    pub fn time(&self) -> &[Real] {
        self.record.time()
    }

    /// The scaled, un-normalised amplitude.
    pub fn amplitude(&self) -> &[Real] {
        self.record.amplitude()
    }

    pub fn peak_index(&self) -> usize {
        self.peak_index
    }

    /// The most negative scaled amplitude sample.
    pub fn peak_amplitude(&self) -> Real {
        self.peak_amplitude
    }

    pub fn norm_amplitude(&self) -> &[Real] {
        &self.norm_amplitude
    }

    /// Normalised level corresponding to `fraction` of the pulse height.
    pub fn fraction_level(&self, fraction: ThresholdFraction) -> Real {
        fraction.value() * self.norm_maximum
    }

    /// Finds the first crossing of the given threshold.
    /// Fractional thresholds are tested against the normalised amplitude,
    /// absolute ones against the scaled amplitude.
    pub fn crossing(&self, threshold: Threshold) -> CrossingResult {
        let crossing_time = match threshold {
            Threshold::Fraction(fraction) => {
                find_crossing(&self.norm_amplitude, self.time(), self.fraction_level(fraction))
            }
            Threshold::Absolute(level) => find_crossing(self.amplitude(), self.time(), level),
        };
        CrossingResult {
            threshold,
            crossing_time,
        }
    }
}

impl TryFrom<WaveformRecord> for NormalizedPulse {
    type Error = InvalidWaveform;

    fn try_from(record: WaveformRecord) -> Result<Self, Self::Error> {
        Self::new(record)
    }
}
