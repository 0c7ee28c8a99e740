use super::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

mod sweep;

const SAMPLE_TIME: Real = 1e-9;
const NUM_SAMPLES: usize = 100;
const RISE_SAMPLES: usize = 10;
const FALL_SAMPLES: usize = 30;

/// A negative-going triangular pulse sampled every nanosecond.
/// The rising edge starts after sample `onset` and reaches `peak` `RISE_SAMPLES` later.
fn triangular_amplitude(onset: usize, peak: Real) -> Vec<Real> {
    (0..NUM_SAMPLES)
        .map(|i| {
            if i <= onset {
                0.0
            } else if i <= onset + RISE_SAMPLES {
                peak * (i - onset) as Real / RISE_SAMPLES as Real
            } else if i < onset + RISE_SAMPLES + FALL_SAMPLES {
                peak * (onset + RISE_SAMPLES + FALL_SAMPLES - i) as Real / FALL_SAMPLES as Real
            } else {
                0.0
            }
        })
        .collect()
}

fn sample_times() -> Vec<Real> {
    (0..NUM_SAMPLES).map(|i| i as Real * SAMPLE_TIME).collect()
}

fn triangular_record(onset: usize, peak: Real) -> WaveformRecord {
    WaveformRecord::new(sample_times(), triangular_amplitude(onset, peak))
        .unwrap()
        .with_label(format!("onset{onset}_peak{peak}"))
}

/// Triangular pulses in volts with random onsets, peaks and gaussian baseline noise.
fn noisy_records(seed: u64, num_records: usize, amplitude_scale: Real) -> Vec<WaveformRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.002).unwrap();
    (0..num_records)
        .map(|_| {
            let onset = rng.random_range(20..30);
            let peak = -rng.random_range(0.02..0.12);
            let samples: Vec<_> = sample_times()
                .into_iter()
                .zip(triangular_amplitude(onset, peak))
                .map(|(t, a)| (Some(t), Some(a + noise.sample(&mut rng))))
                .collect();
            WaveformRecord::from_samples(samples, amplitude_scale).unwrap()
        })
        .collect()
}

fn settings() -> AnalysisSettings {
    AnalysisSettings {
        thresholds: crate::linspace(0.1, 1.0, 50).unwrap(),
        fraction: ThresholdFraction::HALF,
        bin_width: 20.0,
        trigger_level: -30.0,
    }
}
