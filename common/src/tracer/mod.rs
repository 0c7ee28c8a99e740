mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerError, TracerOptions};

/// Should be called at the start of each binary.
/// The argument is the `LevelFilter` used when `RUST_LOG` is not set.
#[macro_export]
macro_rules! init_tracer {
    ($level:expr) => {{
        let options = $crate::tracer::TracerOptions {
            default_level: $level,
        };
        match $crate::tracer::TracerEngine::new(options, env!("CARGO_BIN_NAME")) {
            Ok(tracer) => Some(tracer),
            Err(e) => {
                eprintln!("{e}");
                None
            }
        }
    }};
}
