use super::*;
use assert_approx_eq::assert_approx_eq;

#[test]
fn identical_pulses_have_no_jitter() {
    let batch = normalise_batch((0..5).map(|_| triangular_record(20, -50.0)).collect());
    let sweep = threshold_sweep(&batch.pulses, &settings().thresholds);

    assert_eq!(sweep.len(), 50);
    for row in sweep {
        assert_eq!(row.n_samples, 5);
        assert_approx_eq!(row.rms_jitter_ns.unwrap(), 0.0);
    }
}

#[test]
fn shifted_pulses() {
    // Crossing times differ by exactly two samples at every threshold.
    let batch = normalise_batch(vec![
        triangular_record(20, -50.0),
        triangular_record(22, -80.0),
    ]);
    let sweep = threshold_sweep(&batch.pulses, &settings().thresholds);

    for row in sweep {
        assert_eq!(row.n_samples, 2);
        assert_approx_eq!(row.rms_jitter_ns.unwrap(), 1.0);
    }
}

#[test]
fn single_pulse_keeps_every_row() {
    let batch = normalise_batch(vec![triangular_record(20, -50.0)]);
    let thresholds = settings().thresholds;
    let sweep = threshold_sweep(&batch.pulses, &thresholds);

    assert_eq!(sweep.len(), thresholds.len());
    for (row, threshold) in sweep.iter().zip(&thresholds) {
        assert_eq!(row.threshold_fraction, *threshold);
        assert_eq!(row.n_samples, 1);
        assert_eq!(row.rms_jitter_ns, None);
    }
}

#[test]
fn no_crossing_only_affects_its_threshold() {
    // Offset baseline: the normalised trace never drops below 1/6, so never crosses 10%
    let amplitude = triangular_amplitude(20, -50.0)
        .into_iter()
        .map(|a| a - 10.0)
        .collect();
    let record = WaveformRecord::new(sample_times(), amplitude).unwrap();
    let batch = normalise_batch(vec![
        record,
        triangular_record(20, -50.0),
        triangular_record(21, -50.0),
    ]);
    let thresholds = [
        ThresholdFraction::try_from(0.1).unwrap(),
        ThresholdFraction::try_from(0.55).unwrap(),
    ];
    let sweep = threshold_sweep(&batch.pulses, &thresholds);

    assert_eq!(sweep[0].n_samples, 2);
    assert_approx_eq!(sweep[0].rms_jitter_ns.unwrap(), 0.5);
    assert_eq!(sweep[1].n_samples, 3);
}

#[test]
fn scale_invariance() {
    let volts = normalise_batch(noisy_records(99, 50, 1.0));
    let millivolts = normalise_batch(noisy_records(99, 50, 1000.0));
    let thresholds = settings().thresholds;

    let volts = threshold_sweep(&volts.pulses, &thresholds);
    let millivolts = threshold_sweep(&millivolts.pulses, &thresholds);
    for (v, mv) in volts.iter().zip(&millivolts) {
        assert_eq!(v.n_samples, mv.n_samples);
        assert_approx_eq!(v.rms_jitter_ns.unwrap(), mv.rms_jitter_ns.unwrap());
    }
}
