//! Writers for the combined table.
//!
//! Every exporter reads the same [`CombinedTable`] and writes one file. They
//! share no state, so a failure in one never affects another.
//!
//! # Example
//!
//! ```no_run
//! use bd_geocode_combiner::combiner::CombinedTable;
//! use bd_geocode_combiner::export::{exporter_for, export_to_dir};
//! use bd_geocode_combiner::files::ExportFormat;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = CombinedTable::new();
//! let exporter = exporter_for(ExportFormat::Json);
//! let path = export_to_dir(exporter.as_ref(), &table, Path::new("."))?;
//! println!("JSON saved as: {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod json;
pub mod sql;

use crate::combiner::CombinedTable;
use crate::files::ExportFormat;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub use self::csv::CsvExporter;
pub use self::json::JsonExporter;
pub use self::sql::SqlExporter;

/// Serializes a combined table into one output format.
pub trait Exporter: Send + Sync {
    /// The format this exporter produces.
    fn format(&self) -> ExportFormat;

    /// Writes the whole table to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    fn write_table(&self, table: &CombinedTable, writer: &mut dyn Write) -> Result<()>;

    /// Renders the table into a string, mostly useful in tests.
    fn render(&self, table: &CombinedTable) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_table(table, &mut buffer)?;
        String::from_utf8(buffer).context("Exporter produced invalid UTF-8")
    }
}

/// Returns the exporter for `format`.
pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter),
        ExportFormat::Json => Box::new(JsonExporter),
        ExportFormat::Sql => Box::new(SqlExporter),
    }
}

/// Writes the table to `path`, replacing any existing file.
///
/// The file is fully flushed before this returns `Ok`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_to_path(exporter: &dyn Exporter, table: &CombinedTable, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    exporter
        .write_table(table, &mut writer)
        .with_context(|| format!("Failed to write {} output: {}", exporter.format().label(), path.display()))?;

    writer
        .flush()
        .with_context(|| format!("Failed to flush file: {}", path.display()))?;

    Ok(())
}

/// Writes the table into `output_dir` under the format's standard file name.
///
/// Returns the path that was written.
pub fn export_to_dir(
    exporter: &dyn Exporter,
    table: &CombinedTable,
    output_dir: &Path,
) -> Result<PathBuf> {
    let path = output_dir.join(exporter.format().file_name());
    export_to_path(exporter, table, &path)?;
    Ok(path)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::combiner::{CombinedTable, COMBINED_HEADER};

    /// A two-row table covering a full chain and a dangling upazila.
    pub fn sample_table() -> CombinedTable {
        let mut table = CombinedTable::new();
        table.rows.push(
            [
                "10010101",
                "Union A",
                "ইউনিয়ন এ",
                "http://unionA.bd",
                "100101",
                "Savar",
                "সাভার",
                "http://savar.gov.bd",
                "1001",
                "Dhaka",
                "ঢাকা",
                "23.81",
                "90.41",
                "http://dhakadistrict.gov.bd",
                "10",
                "Dhaka",
                "ঢাকা",
                "http://dhakadiv.gov.bd",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );

        let mut dangling = vec![String::new(); COMBINED_HEADER.len()];
        dangling[0] = "10010199".to_string();
        dangling[1] = "Cox's \"Bazar\"".to_string();
        dangling[2] = "কক্সবাজার".to_string();
        dangling[3] = "http://z.bd".to_string();
        dangling[4] = "999999".to_string();
        table.rows.push(dangling);

        table
    }
}
