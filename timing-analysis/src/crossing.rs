use crate::{Real, ThresholdError};
use itertools::Itertools;
use serde::Serialize;
use std::{fmt::Display, str::FromStr};

/// A threshold expressed as a fraction of the pulse peak, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ThresholdFraction(Real);

impl ThresholdFraction {
    pub const HALF: Self = Self(0.5);

    pub fn value(&self) -> Real {
        self.0
    }
}

impl TryFrom<Real> for ThresholdFraction {
    type Error = ThresholdError;

    fn try_from(value: Real) -> Result<Self, Self::Error> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ThresholdError::OutOfRange(value))
        }
    }
}

impl FromStr for ThresholdFraction {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Real::from_str(s.trim()).map_err(|_| ThresholdError::Parse(s.to_owned()))?;
        Self::try_from(value)
    }
}

impl Display for ThresholdFraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns `num_points` evenly spaced fractions, the first equal to `start`
/// and the last exactly equal to `stop`.
pub fn linspace(
    start: Real,
    stop: Real,
    num_points: usize,
) -> Result<Vec<ThresholdFraction>, ThresholdError> {
    match num_points {
        0 => Err(ThresholdError::EmptySweep),
        1 => Ok(vec![ThresholdFraction::try_from(start)?]),
        _ => {
            let step = (stop - start) / (num_points - 1) as Real;
            (0..num_points)
                .map(|i| {
                    if i == num_points - 1 {
                        stop
                    } else {
                        start + i as Real * step
                    }
                })
                .map(ThresholdFraction::try_from)
                .collect()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "level")]
pub enum Threshold {
    /// Fraction of the peak, applied to the normalised amplitude.
    Fraction(ThresholdFraction),
    /// Signed level in the scaled amplitude unit, e.g. -30 mV.
    Absolute(Real),
}

impl Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fraction(fraction) => write!(f, "{}% of peak", fraction.value() * 100.0),
            Self::Absolute(level) => write!(f, "{level} (absolute)"),
        }
    }
}

/// Outcome of looking for a threshold crossing in one pulse.
/// An absent `crossing_time` means the signal never crossed the level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossingResult {
    pub threshold: Threshold,
    pub crossing_time: Option<Real>,
}

fn sign(value: Real) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Returns the time at the start of the first sample interval over which
/// `samples - level` changes sign. Touching the level exactly counts as a
/// change, and a flat run at the level does not produce repeated crossings.
/// No interpolation is performed.
pub fn find_crossing(samples: &[Real], times: &[Real], level: Real) -> Option<Real> {
    samples
        .iter()
        .map(|sample| sign(sample - level))
        .tuple_windows()
        .position(|(this, next)| this != next)
        .and_then(|index| times.get(index).copied())
}
