use pmt_timing_analysis::{AmplitudeBin, JitterStatistic, Real};
use std::{
    fs::File,
    io::{BufWriter, Error, Write},
    path::Path,
};

/// A result row which can be written as a line of CSV.
pub(crate) trait SavableRow {
    const HEADER: &'static str;

    fn write_row<W: Write>(&self, writer: &mut W) -> Result<(), Error>;
}

/// Absent values become empty cells.
fn optional(value: Option<Real>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

impl SavableRow for JitterStatistic {
    const HEADER: &'static str = "threshold_fraction,n_samples,rms_jitter_ns";

    fn write_row<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(
            writer,
            "{0},{1},{2}",
            self.threshold_fraction,
            self.n_samples,
            optional(self.rms_jitter_ns)
        )
    }
}

impl SavableRow for AmplitudeBin {
    const HEADER: &'static str = "lower_bound,upper_bound,center,n_samples,rms_jitter_ns";

    fn write_row<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(
            writer,
            "{0},{1},{2},{3},{4}",
            self.lower_bound, self.upper_bound, self.center, self.n_samples, self.rms_jitter_ns
        )
    }
}

pub(crate) trait SaveToFileFilter {
    fn write_table<W: Write>(self, writer: &mut W) -> Result<(), Error>;

    fn save_to_file(self, path: &Path) -> Result<(), Error>;
}

impl<'a, I, R> SaveToFileFilter for I
where
    I: Iterator<Item = &'a R>,
    R: SavableRow + 'a,
{
    fn write_table<W: Write>(self, writer: &mut W) -> Result<(), Error> {
        writeln!(writer, "{}", R::HEADER)?;
        for row in self {
            row.write_row(writer)?;
        }
        Ok(())
    }

    fn save_to_file(self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_table(&mut writer)?;
        writer.flush()
    }
}
