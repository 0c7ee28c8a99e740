mod parameters;
mod save_to_file;

use anyhow::Context;
use clap::Parser;
use parameters::{AllParameters, Mode, SweepParameters};
use pmt_timing_analysis::{
    AnalysisSettings, Batch, DeviationSummary, LoadError, LoaderOptions, Real, ThresholdFraction,
    linspace, load_waveform_file, normalise_batch, threshold_sweep, timewalk, timing_summary,
};
use pmt_timing_common::init_tracer;
use save_to_file::SaveToFileFilter;
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{info, level_filters::LevelFilter, warn};

// cargo run --bin timing-analyser -- --input-glob "PMT CSV Files/*.csv" all --output-dir results

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Glob pattern matching the oscilloscope CSV exports, one pulse per file
    #[clap(long, env, default_value = "PMT CSV Files/*.csv")]
    input_glob: String,

    /// Zero-based line of the column header in each CSV file
    #[clap(long, default_value = "21")]
    header_line: usize,

    /// Factor applied to every amplitude sample (1000 converts V to mV)
    #[clap(long, default_value = "1000.0")]
    amplitude_scale: Real,

    /// Log level used when RUST_LOG is not set
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, strum::Display)]
enum OutputFile {
    #[strum(to_string = "sweep.csv")]
    Sweep,
    #[strum(to_string = "timewalk.csv")]
    Timewalk,
    #[strum(to_string = "report.json")]
    Report,
}

impl OutputFile {
    fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.to_string())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(args.log_level);

    let options = LoaderOptions {
        header_line: args.header_line,
        amplitude_scale: args.amplitude_scale,
    };
    let batch = load_batch(&args.input_glob, &options)?;

    match args.mode {
        Mode::Sweep { parameters, output } => run_sweep(&batch, &parameters, output.as_deref()),
        Mode::Timewalk { parameters, output } => {
            let bins = timewalk(&batch.pulses, parameters.fraction, parameters.bin_width);
            match output {
                Some(path) => {
                    bins.iter().save_to_file(&path)?;
                    info!("Wrote {} amplitude bin(s) to {}", bins.len(), path.display());
                }
                None => {
                    for bin in &bins {
                        info!(
                            "Peak amplitude {}: {} pulse(s), RMS jitter {} ns",
                            bin.center, bin.n_samples, bin.rms_jitter_ns
                        );
                    }
                }
            }
            Ok(())
        }
        Mode::Summary(parameters) => {
            let summary =
                timing_summary(&batch.pulses, parameters.trigger_level, parameters.fraction);
            log_summary(&summary.fractional);
            log_summary(&summary.trigger);
            Ok(())
        }
        Mode::All(parameters) => run_all(batch, &parameters),
    }
}

/// Loads every file matched by the glob, in sorted path order.
/// Files which cannot be used are recorded in the batch rather than aborting it.
#[tracing::instrument(skip(options))]
fn load_batch(input_glob: &str, options: &LoaderOptions) -> anyhow::Result<Batch> {
    let mut paths = glob::glob(input_glob)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    if paths.is_empty() {
        warn!("No files match {input_glob}");
    }

    let mut records = Vec::with_capacity(paths.len());
    let mut rejected = Vec::new();
    for path in paths {
        match load_waveform_file(&path, options) {
            Ok(record) => records.push(record),
            Err(LoadError::Invalid(reason)) => {
                rejected.push((path.to_string_lossy().into_owned(), reason))
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut batch = normalise_batch(records);
    for (label, reason) in rejected {
        batch.push_skipped(Some(label), reason);
    }
    info!(
        "Loaded {} pulse(s) from {} file(s)",
        batch.pulses.len(),
        batch.num_records()
    );
    Ok(batch)
}

fn sweep_thresholds(parameters: &SweepParameters) -> anyhow::Result<Vec<ThresholdFraction>> {
    linspace(
        parameters.sweep_start,
        parameters.sweep_stop,
        parameters.sweep_points,
    )
    .context("Invalid threshold sweep")
}

fn run_sweep(
    batch: &Batch,
    parameters: &SweepParameters,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let rows = threshold_sweep(&batch.pulses, &sweep_thresholds(parameters)?);
    match output {
        Some(path) => {
            rows.iter().save_to_file(path)?;
            info!("Wrote {} threshold row(s) to {}", rows.len(), path.display());
        }
        None => {
            for row in &rows {
                info!(
                    "Threshold {}% of peak: {} pulse(s), RMS jitter {}",
                    row.threshold_fraction.value() * 100.0,
                    row.n_samples,
                    display_ns(row.rms_jitter_ns)
                );
            }
        }
    }
    Ok(())
}

fn run_all(batch: Batch, parameters: &AllParameters) -> anyhow::Result<()> {
    let settings = AnalysisSettings {
        thresholds: sweep_thresholds(&parameters.sweep)?,
        fraction: parameters.fraction,
        bin_width: parameters.bin_width,
        trigger_level: parameters.trigger_level,
    };
    let report = pmt_timing_analysis::analyse(batch, &settings);

    let dir = parameters.output_dir.as_path();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory {}", dir.display()))?;

    report.sweep.iter().save_to_file(&OutputFile::Sweep.path_in(dir))?;
    report
        .timewalk
        .iter()
        .save_to_file(&OutputFile::Timewalk.path_in(dir))?;

    let writer = BufWriter::new(File::create(OutputFile::Report.path_in(dir))?);
    serde_json::to_writer_pretty(writer, &report)?;

    log_summary(&report.summary.fractional);
    log_summary(&report.summary.trigger);
    info!(
        "Wrote {}, {} and {} to {}",
        OutputFile::Sweep,
        OutputFile::Timewalk,
        OutputFile::Report,
        dir.display()
    );
    Ok(())
}

fn display_ns(value: Option<Real>) -> String {
    value
        .map(|value| format!("{value:.3} ns"))
        .unwrap_or_else(|| "n/a".to_owned())
}

fn log_summary(summary: &DeviationSummary) {
    info!(
        "Crossing at {}: {} pulse(s), mean {}, deviation from mean (std) {}",
        summary.threshold,
        summary.n_samples,
        display_ns(summary.mean_ns),
        display_ns(summary.std_ns)
    );
}
