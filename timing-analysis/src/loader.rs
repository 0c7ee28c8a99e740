//! Reads oscilloscope CSV exports into [WaveformRecord]s.
//!
//! The exports carry a block of instrument settings before the column
//! header, then one `time,amplitude[,...]` row per sample. Only the first
//! two columns are read.
use crate::{LoadError, Real, WaveformRecord};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Zero-based line of the column header; it and every line before it are skipped.
    pub header_line: usize,
    /// Applied to every amplitude sample, e.g. `1000.0` converts volts to millivolts.
    pub amplitude_scale: Real,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            header_line: 21,
            amplitude_scale: 1000.0,
        }
    }
}

/// Parses a single cell, treating missing, empty, unparsable and non-finite cells as absent.
fn parse_cell(cell: Option<&str>) -> Option<Real> {
    let cell = cell?.trim().trim_matches('"');
    Real::from_str(cell).ok().filter(|value| value.is_finite())
}

/// Reads a waveform from any buffered text source.
/// Blank lines are ignored everywhere, including when counting to the header line.
/// Rows with either cell absent are dropped together.
pub fn load_waveform<R: BufRead>(
    reader: R,
    options: &LoaderOptions,
) -> Result<WaveformRecord, LoadError> {
    let mut samples = Vec::new();
    let lines = reader
        .lines()
        .filter(|line| !matches!(line, Ok(line) if line.trim().is_empty()));
    for line in lines.skip(options.header_line + 1) {
        let line = line?;
        let mut cells = line.split(',');
        samples.push((parse_cell(cells.next()), parse_cell(cells.next())));
    }
    let num_rows = samples.len();
    let record = WaveformRecord::from_samples(samples, options.amplitude_scale)?;
    if record.len() < num_rows {
        debug!("Dropped {} of {num_rows} row(s)", num_rows - record.len());
    }
    Ok(record)
}

/// Reads a waveform from a file, labelling the record with the file's path.
#[tracing::instrument(skip_all, level = "debug", fields(path = %path.display()))]
pub fn load_waveform_file(path: &Path, options: &LoaderOptions) -> Result<WaveformRecord, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::IO {
        path: path.to_path_buf(),
        source,
    })?;
    let record = load_waveform(BufReader::new(file), options)?;
    Ok(record.with_label(path.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvalidWaveform;
    use assert_approx_eq::assert_approx_eq;
    use std::{env, fs, io::Cursor, path::PathBuf};

    fn create_test_filename(name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("{name}.csv"));
        path
    }

    fn header(lines: usize) -> String {
        (0..lines).map(|i| format!("Setting{i},{i}\n")).collect()
    }

    #[test]
    fn parse_cells() {
        assert_eq!(parse_cell(Some(" -1.5e-3 ")), Some(-1.5e-3));
        assert_eq!(parse_cell(Some("\"2\"")), Some(2.0));
        assert_eq!(parse_cell(Some("")), None);
        assert_eq!(parse_cell(Some("NaN")), None);
        assert_eq!(parse_cell(Some("inf")), None);
        assert_eq!(parse_cell(Some("abc")), None);
        assert_eq!(parse_cell(None), None);
    }

    #[test]
    fn skips_header_and_scales() {
        let text = format!(
            "{}TIME,CH1\n-1e-9,0.001\n0,-0.020\n\n1e-9,-0.050\n",
            header(21)
        );
        let record = load_waveform(Cursor::new(text), &LoaderOptions::default()).unwrap();
        assert_eq!(record.time(), &[-1e-9, 0.0, 1e-9]);
        assert_approx_eq!(record.amplitude()[0], 1.0);
        assert_approx_eq!(record.amplitude()[1], -20.0);
        assert_approx_eq!(record.amplitude()[2], -50.0);
    }

    #[test]
    fn blank_lines_in_header_are_not_counted() {
        let options = LoaderOptions {
            header_line: 2,
            amplitude_scale: 1.0,
        };
        // the last setting is numeric and must not be read as a sample
        let text = "Sample Interval,1e-9\n\n\n0.5,7\nTIME,CH1\n0,-1\n1,-2\n";
        let record = load_waveform(Cursor::new(text), &options).unwrap();
        assert_eq!(record.time(), &[0.0, 1.0]);
        assert_eq!(record.amplitude(), &[-1.0, -2.0]);
    }

    #[test]
    fn paired_discard_of_bad_rows() {
        let options = LoaderOptions {
            header_line: 0,
            amplitude_scale: 1.0,
        };
        let text = "TIME,CH1\n0,-1\n1,oops\n2\nbad,-3\n4,-4,extra\n";
        let record = load_waveform(Cursor::new(text), &options).unwrap();
        assert_eq!(record.time(), &[0.0, 4.0]);
        assert_eq!(record.amplitude(), &[-1.0, -4.0]);
    }

    #[test]
    fn too_few_rows() {
        let options = LoaderOptions {
            header_line: 0,
            amplitude_scale: 1.0,
        };
        let result = load_waveform(Cursor::new("TIME,CH1\n0,-1\n1,x\n"), &options);
        assert!(matches!(
            result,
            Err(LoadError::Invalid(InvalidWaveform::TooFewSamples(1)))
        ));
    }

    #[test]
    fn file_is_labelled() {
        let path = create_test_filename("pmt_timing_loader_file_is_labelled");
        fs::write(&path, format!("{}TIME,CH1\n0,0\n1e-9,-0.01\n", header(21))).unwrap();
        let record = load_waveform_file(&path, &LoaderOptions::default());
        let _ = fs::remove_file(&path);

        let record = record.unwrap();
        assert_eq!(record.label(), Some(&*path.to_string_lossy()));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn missing_file() {
        let path = create_test_filename("pmt_timing_loader_missing_file_does_not_exist");
        let result = load_waveform_file(&path, &LoaderOptions::default());
        assert!(matches!(result, Err(LoadError::IO { .. })));
    }
}
