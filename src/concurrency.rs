//! Parallel export fan-out and error collection.
//!
//! The exporters only read the combined table and each writes its own file,
//! so they run side by side on the rayon pool. Failures are gathered in an
//! [`ErrorAggregator`] instead of stopping the remaining exporters.
//!
//! # Example
//!
//! ```no_run
//! use bd_geocode_combiner::combiner::CombinedTable;
//! use bd_geocode_combiner::concurrency::run_exporters;
//! use bd_geocode_combiner::files::ExportFormat;
//! use std::path::Path;
//!
//! let table = CombinedTable::new();
//! let report = run_exporters(&table, &ExportFormat::ALL, Path::new("."));
//!
//! for path in &report.written {
//!     println!("saved {}", path.display());
//! }
//! for error in &report.errors {
//!     eprintln!("{}", error.message);
//! }
//! ```

use crate::combiner::CombinedTable;
use crate::export::{export_to_dir, exporter_for};
use crate::files::{ExportFormat, TableKind};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// The pipeline step a recoverable error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Reading a source table
    Load(TableKind),
    /// Writing an output file
    Export(ExportFormat),
}

impl fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorStage::Load(kind) => write!(f, "load {} table", kind),
            ErrorStage::Export(format) => write!(f, "export {}", format.label()),
        }
    }
}

/// Details about a recoverable error.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    /// Where the error happened
    pub stage: ErrorStage,
    /// The file being read or written
    pub path: PathBuf,
    /// Human-readable error message
    pub message: String,
    /// The underlying error chain
    pub error_message: String,
}

impl ErrorDetails {
    /// Creates a new ErrorDetails instance.
    pub fn new(stage: ErrorStage, path: PathBuf, message: String, error_message: String) -> Self {
        Self {
            stage,
            path,
            message,
            error_message,
        }
    }

    /// Builds the details for a failed source read.
    ///
    /// ```
    /// use bd_geocode_combiner::concurrency::ErrorDetails;
    /// use bd_geocode_combiner::files::TableKind;
    /// use std::path::PathBuf;
    ///
    /// let err = anyhow::anyhow!("No such file or directory");
    /// let details = ErrorDetails::load(TableKind::Union, PathBuf::from("../unions/unions.csv"), &err);
    /// assert_eq!(details.message, "Error reading ../unions/unions.csv: No such file or directory");
    /// ```
    pub fn load(kind: TableKind, path: PathBuf, error: &anyhow::Error) -> Self {
        let error_message = format!("{:#}", error);
        let message = format!("Error reading {}: {}", path.display(), error_message);
        Self::new(ErrorStage::Load(kind), path, message, error_message)
    }

    /// Builds the details for a failed export.
    pub fn export(format: ExportFormat, path: PathBuf, error: &anyhow::Error) -> Self {
        let error_message = format!("{:#}", error);
        let message = format!("Error writing {}: {}", path.display(), error_message);
        Self::new(ErrorStage::Export(format), path, message, error_message)
    }
}

/// Thread-safe error aggregator for collecting errors from concurrent operations.
///
/// # Example
///
/// ```
/// use bd_geocode_combiner::concurrency::{ErrorAggregator, ErrorDetails, ErrorStage};
/// use bd_geocode_combiner::files::ExportFormat;
/// use std::path::PathBuf;
///
/// let aggregator = ErrorAggregator::new();
/// aggregator.add_error(ErrorDetails::new(
///     ErrorStage::Export(ExportFormat::Sql),
///     PathBuf::from("out.sql"),
///     "Error writing out.sql".to_string(),
///     "disk full".to_string(),
/// ));
///
/// assert_eq!(aggregator.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorAggregator {
    errors: Arc<Mutex<Vec<ErrorDetails>>>,
}

impl ErrorAggregator {
    /// Creates a new empty ErrorAggregator.
    pub fn new() -> Self {
        Self {
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds an error to the aggregator in a thread-safe manner.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned (i.e., another thread panicked while holding the lock).
    pub fn add_error(&self, error: ErrorDetails) {
        self.errors
            .lock()
            .expect("Error aggregator mutex poisoned")
            .push(error);
    }

    /// Adds multiple errors while holding the lock once.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn add_errors(&self, errors: Vec<ErrorDetails>) {
        self.errors
            .lock()
            .expect("Error aggregator mutex poisoned")
            .extend(errors);
    }

    /// Returns a copy of all collected errors.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn get_errors(&self) -> Vec<ErrorDetails> {
        self.errors
            .lock()
            .expect("Error aggregator mutex poisoned")
            .clone()
    }

    /// Returns the count of errors currently in the aggregator.
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn count(&self) -> usize {
        self.errors
            .lock()
            .expect("Error aggregator mutex poisoned")
            .len()
    }
}

impl Default for ErrorAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of running a set of exporters.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Files written, in [`ExportFormat`] order
    pub written: Vec<PathBuf>,
    /// Exporters that failed, in [`ExportFormat`] order
    pub errors: Vec<ErrorDetails>,
}

impl ExportReport {
    /// Returns `true` if every requested exporter succeeded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the exporters for `formats` concurrently, writing into `output_dir`.
///
/// Each format runs at most once. Results are reported in the fixed
/// csv → json → sql order whatever order the exporters finish in.
pub fn run_exporters(
    table: &CombinedTable,
    formats: &[ExportFormat],
    output_dir: &Path,
) -> ExportReport {
    let mut formats = formats.to_vec();
    formats.sort();
    formats.dedup();

    let written = Arc::new(Mutex::new(Vec::new()));
    let aggregator = ErrorAggregator::new();

    formats.par_iter().for_each(|&format| {
        let exporter = exporter_for(format);
        debug!(format = format.label(), "starting exporter");

        match export_to_dir(exporter.as_ref(), table, output_dir) {
            Ok(path) => written
                .lock()
                .expect("Export result mutex poisoned")
                .push((format, path)),
            Err(e) => {
                let path = output_dir.join(format.file_name());
                aggregator.add_error(ErrorDetails::export(format, path, &e));
            }
        }
    });

    let mut written = written.lock().expect("Export result mutex poisoned").clone();
    written.sort_by_key(|(format, _)| *format);

    let mut errors = aggregator.get_errors();
    errors.sort_by_key(|error| match error.stage {
        ErrorStage::Export(format) => Some(format),
        ErrorStage::Load(_) => None,
    });

    ExportReport {
        written: written.into_iter().map(|(_, path)| path).collect(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::sample_table;
    use tempfile::TempDir;

    fn details(format: ExportFormat) -> ErrorDetails {
        ErrorDetails::new(
            ErrorStage::Export(format),
            PathBuf::from(format.file_name()),
            "msg".to_string(),
            "err".to_string(),
        )
    }

    #[test]
    fn test_error_aggregator_new() {
        let aggregator = ErrorAggregator::new();
        assert_eq!(aggregator.count(), 0);
        assert!(aggregator.get_errors().is_empty());
    }

    #[test]
    fn test_error_aggregator_add_errors() {
        let aggregator = ErrorAggregator::default();
        aggregator.add_error(details(ExportFormat::Csv));
        aggregator.add_errors(vec![details(ExportFormat::Json), details(ExportFormat::Sql)]);

        assert_eq!(aggregator.count(), 3);
        assert_eq!(aggregator.get_errors()[1].stage, ErrorStage::Export(ExportFormat::Json));
    }

    #[test]
    fn test_error_aggregator_concurrent_adds() {
        let aggregator = ErrorAggregator::new();

        (0..64).into_par_iter().for_each(|_| {
            aggregator.add_error(details(ExportFormat::Csv));
        });

        assert_eq!(aggregator.count(), 64);
    }

    #[test]
    fn test_error_stage_display() {
        assert_eq!(ErrorStage::Load(TableKind::District).to_string(), "load district table");
        assert_eq!(ErrorStage::Export(ExportFormat::Json).to_string(), "export JSON");
    }

    #[test]
    fn test_run_exporters_all_formats() {
        let dir = TempDir::new().unwrap();
        let report = run_exporters(&sample_table(), &ExportFormat::ALL, dir.path());

        assert!(report.is_success());
        assert_eq!(
            report.written,
            vec![
                dir.path().join("bangladesh_geocode_combined.csv"),
                dir.path().join("bangladesh_geocode_combined.json"),
                dir.path().join("bangladesh_geocode_combined.sql"),
            ]
        );
        for path in &report.written {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_run_exporters_subset_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let formats = [ExportFormat::Sql, ExportFormat::Csv, ExportFormat::Sql];
        let report = run_exporters(&sample_table(), &formats, dir.path());

        assert_eq!(report.written.len(), 2);
        assert!(report.written[0].ends_with("bangladesh_geocode_combined.csv"));
        assert!(report.written[1].ends_with("bangladesh_geocode_combined.sql"));
        assert!(!dir.path().join("bangladesh_geocode_combined.json").exists());
    }

    #[test]
    fn test_run_exporters_failure_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        // A directory squatting on the JSON path makes only that exporter fail
        std::fs::create_dir(dir.path().join("bangladesh_geocode_combined.json")).unwrap();

        let report = run_exporters(&sample_table(), &ExportFormat::ALL, dir.path());

        assert!(!report.is_success());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].stage, ErrorStage::Export(ExportFormat::Json));
        assert_eq!(report.written.len(), 2);
        assert!(dir.path().join("bangladesh_geocode_combined.csv").is_file());
        assert!(dir.path().join("bangladesh_geocode_combined.sql").is_file());
    }
}
