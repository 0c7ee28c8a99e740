pub mod tracer;

/// Scalar type used for all sample times, amplitudes and statistics.
pub type Real = f64;

pub const NANOSECONDS_PER_SECOND: Real = 1e9;

/// Converts a duration in seconds to nanoseconds.
pub fn to_nanoseconds(seconds: Real) -> Real {
    seconds * NANOSECONDS_PER_SECOND
}
