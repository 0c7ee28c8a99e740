use crate::{Real, Threshold, ThresholdFraction};
use pmt_timing_common::to_nanoseconds;
use serde::Serialize;

/// Spread of an ensemble of crossing times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dispersion {
    pub n_samples: usize,
    /// Mean crossing time, in seconds.
    pub mean: Real,
    /// Population standard deviation of the deviations from the mean, in nanoseconds.
    pub rms_jitter_ns: Real,
}

fn mean(values: &[Real]) -> Real {
    values.iter().sum::<Real>() / values.len() as Real
}

/// Population (divide by n) standard deviation.
fn population_std(values: &[Real]) -> Real {
    let mean = mean(values);
    let sum_of_squares: Real = values.iter().map(|value| (value - mean).powi(2)).sum();
    (sum_of_squares / values.len() as Real).sqrt()
}

/// Computes the jitter of a set of crossing times.
/// Returns `None` when fewer than two times are supplied.
pub fn aggregate(crossing_times: &[Real]) -> Option<Dispersion> {
    if crossing_times.len() < 2 {
        return None;
    }
    let mean = mean(crossing_times);
    let deviations: Vec<Real> = crossing_times.iter().map(|time| time - mean).collect();
    Some(Dispersion {
        n_samples: crossing_times.len(),
        mean,
        rms_jitter_ns: to_nanoseconds(population_std(&deviations)),
    })
}

/// One row of the jitter-vs-threshold curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterStatistic {
    pub threshold_fraction: ThresholdFraction,
    pub n_samples: usize,
    pub rms_jitter_ns: Option<Real>,
}

impl JitterStatistic {
    pub fn new(threshold_fraction: ThresholdFraction, crossing_times: &[Real]) -> Self {
        Self {
            threshold_fraction,
            n_samples: crossing_times.len(),
            rms_jitter_ns: aggregate(crossing_times).map(|dispersion| dispersion.rms_jitter_ns),
        }
    }
}

/// Mean and spread of the crossing times at a single representative threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviationSummary {
    pub threshold: Threshold,
    pub n_samples: usize,
    pub mean_ns: Option<Real>,
    pub std_ns: Option<Real>,
}

impl DeviationSummary {
    pub fn new(threshold: Threshold, crossing_times: &[Real]) -> Self {
        let dispersion = aggregate(crossing_times);
        Self {
            threshold,
            n_samples: crossing_times.len(),
            mean_ns: dispersion.map(|dispersion| to_nanoseconds(dispersion.mean)),
            std_ns: dispersion.map(|dispersion| dispersion.rms_jitter_ns),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn insufficient_samples() {
        assert_eq!(aggregate(&[]), None);
        assert_eq!(aggregate(&[5.0]), None);
    }

    #[test]
    fn two_samples() {
        let dispersion = aggregate(&[1.0, 3.0]).unwrap();
        assert_eq!(dispersion.n_samples, 2);
        assert_eq!(dispersion.mean, 2.0);
        assert_eq!(dispersion.rms_jitter_ns, 1.0e9);
    }

    #[test]
    fn population_not_sample() {
        // sample std of these would be sqrt(32/7) ns
        let times: Vec<Real> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(|t| t * 1e-9)
            .collect();
        let dispersion = aggregate(&times).unwrap();
        assert_approx_eq!(dispersion.mean, 5e-9);
        assert_approx_eq!(dispersion.rms_jitter_ns, 2.0);
    }

    #[test]
    fn identical_times() {
        let dispersion = aggregate(&[3e-9, 3e-9, 3e-9]).unwrap();
        assert_approx_eq!(dispersion.rms_jitter_ns, 0.0);
    }

    #[test]
    fn statistic_keeps_absent_rows() {
        let statistic = JitterStatistic::new(ThresholdFraction::HALF, &[1e-9]);
        assert_eq!(statistic.n_samples, 1);
        assert_eq!(statistic.rms_jitter_ns, None);
    }

    #[test]
    fn summary_in_nanoseconds() {
        let summary = DeviationSummary::new(Threshold::Absolute(-30.0), &[10e-9, 14e-9]);
        assert_eq!(summary.n_samples, 2);
        assert_approx_eq!(summary.mean_ns.unwrap(), 12.0);
        assert_approx_eq!(summary.std_ns.unwrap(), 2.0);

        let summary = DeviationSummary::new(Threshold::Fraction(ThresholdFraction::HALF), &[]);
        assert_eq!(summary.mean_ns, None);
        assert_eq!(summary.std_ns, None);
    }
}
