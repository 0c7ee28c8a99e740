use thiserror::Error;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Global tracing subscriber already set: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub struct TracerOptions {
    /// Level applied when the `RUST_LOG` environment variable is absent.
    pub default_level: LevelFilter,
}

/// This object initialises the stdout tracer, given a TracerOptions struct.
pub struct TracerEngine;

impl TracerEngine {
    /// Initialises the stdout tracer for the binary
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name of the binary, recorded in the first log line.
    /// #Returns
    /// An instance of TracerEngine, or an error if a global subscriber was already installed.
    pub fn new(options: TracerOptions, service_name: &str) -> Result<Self, TracerError> {
        let stdout_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false);

        // This filter is applied to the stdout tracer
        let log_filter = EnvFilter::builder()
            .with_default_directive(options.default_level.into())
            .from_env_lossy();

        let subscriber =
            tracing_subscriber::Registry::default().with(stdout_tracer.with_filter(log_filter));

        tracing::subscriber::set_global_default(subscriber)?;
        debug!("Tracer initialised for {service_name}");

        Ok(Self)
    }
}
