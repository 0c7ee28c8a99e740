use clap::{Parser, Subcommand};
use pmt_timing_analysis::{Real, ThresholdFraction};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
pub(crate) struct SweepParameters {
    /// Smallest fraction of peak in the sweep
    #[clap(long, default_value = "0.1")]
    pub(crate) sweep_start: Real,

    /// Largest fraction of peak in the sweep
    #[clap(long, default_value = "1.0")]
    pub(crate) sweep_stop: Real,

    /// Number of evenly spaced thresholds in the sweep
    #[clap(long, default_value = "50")]
    pub(crate) sweep_points: usize,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct TimewalkParameters {
    /// Fraction of peak at which crossing times are taken
    #[clap(long, default_value = "0.5")]
    pub(crate) fraction: ThresholdFraction,

    /// Width of the peak amplitude bins, in scaled amplitude units
    #[clap(long, default_value = "20.0", value_parser = parse_bin_width)]
    pub(crate) bin_width: Real,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct SummaryParameters {
    /// Absolute trigger level, in scaled amplitude units
    #[clap(long, default_value = "-30.0", allow_hyphen_values = true)]
    pub(crate) trigger_level: Real,

    /// Fraction of peak compared against the absolute trigger
    #[clap(long, default_value = "0.5")]
    pub(crate) fraction: ThresholdFraction,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct AllParameters {
    #[clap(flatten)]
    pub(crate) sweep: SweepParameters,

    /// Width of the peak amplitude bins, in scaled amplitude units
    #[clap(long, default_value = "20.0", value_parser = parse_bin_width)]
    pub(crate) bin_width: Real,

    /// Absolute trigger level, in scaled amplitude units
    #[clap(long, default_value = "-30.0", allow_hyphen_values = true)]
    pub(crate) trigger_level: Real,

    /// Fraction of peak used for the timewalk histogram and the summary
    #[clap(long, default_value = "0.5")]
    pub(crate) fraction: ThresholdFraction,

    /// Directory in which sweep.csv, timewalk.csv and report.json are written
    #[clap(long, default_value = ".")]
    pub(crate) output_dir: PathBuf,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Mode {
    #[clap(about = "RMS jitter of the crossing time against the threshold, as a fraction of peak.")]
    Sweep {
        #[clap(flatten)]
        parameters: SweepParameters,

        /// CSV file to write, otherwise rows are logged
        #[clap(long)]
        output: Option<PathBuf>,
    },
    #[clap(about = "RMS jitter of a fixed-fraction crossing time, binned by peak amplitude.")]
    Timewalk {
        #[clap(flatten)]
        parameters: TimewalkParameters,

        /// CSV file to write, otherwise rows are logged
        #[clap(long)]
        output: Option<PathBuf>,
    },
    #[clap(about = "Crossing time mean and spread at an absolute trigger and at a fraction of peak.")]
    Summary(SummaryParameters),
    #[clap(about = "Runs every analysis and writes all result tables.")]
    All(AllParameters),
}

fn parse_bin_width(s: &str) -> Result<Real, String> {
    let width: Real = s.parse().map_err(|e| format!("{e}"))?;
    if width.is_finite() && width > 0.0 {
        Ok(width)
    } else {
        Err(format!("bin width must be positive, got {width}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_width() {
        assert_eq!(parse_bin_width("20"), Ok(20.0));
        assert!(parse_bin_width("0").is_err());
        assert!(parse_bin_width("-5").is_err());
        assert!(parse_bin_width("wide").is_err());
    }
}
