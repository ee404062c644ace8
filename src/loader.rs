//! Delimited text loader for the administrative source tables.
//!
//! This module reads a comma-separated file into an ordered list of rows,
//! each row an ordered list of string fields. Quoted fields may contain the
//! delimiter. After parsing, any double-quote characters left at the edges
//! of a field are stripped, which cleans up irregularly quoted source data.
//!
//! # Example
//!
//! ```no_run
//! use bd_geocode_combiner::loader::TableLoader;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = TableLoader::new();
//! let rows = loader.load(Path::new("../divisions/divisions.csv"))?;
//!
//! for row in &rows {
//!     println!("{}", row.join(" | "));
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One parsed row of a source table.
pub type Row = Vec<String>;

/// Loader for comma-separated source tables.
///
/// Every id is kept as an opaque string. Rows may have different field
/// counts; validation against a table's minimum width happens later, when
/// the rows are indexed or joined.
///
/// # Example
///
/// ```
/// use bd_geocode_combiner::loader::TableLoader;
///
/// let data = "10,Dhaka,\"ঢাকা\",http://dhakadiv.gov.bd\n";
/// let rows = TableLoader::new().load_from_reader(data.as_bytes()).unwrap();
/// assert_eq!(rows, vec![vec!["10", "Dhaka", "ঢাকা", "http://dhakadiv.gov.bd"]]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLoader {
    /// Skip the first row of each file
    skip_header: bool,
}

impl TableLoader {
    /// Creates a loader that treats every row as data.
    pub fn new() -> Self {
        Self { skip_header: false }
    }

    /// Creates a loader that drops the first row of each file.
    pub fn with_header() -> Self {
        Self { skip_header: true }
    }

    /// Returns whether the first row of each file is skipped.
    pub fn skips_header(&self) -> bool {
        self.skip_header
    }

    /// Loads all rows from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid UTF-8, or
    /// contains malformed CSV. No rows are returned on error.
    pub fn load(&self, path: &Path) -> Result<Vec<Row>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        self.load_from_reader(file)
            .with_context(|| format!("Failed to parse CSV file: {}", path.display()))
    }

    /// Loads all rows from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error on the first record that cannot be read or decoded.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Vec<Row>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(self.skip_header)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();

        for (index, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read record {}", index + 1))?;
            rows.push(record.iter().map(clean_field).collect());
        }

        Ok(rows)
    }
}

/// Strips stray double quotes from both ends of a field.
///
/// Characters inside the field are left alone.
///
/// # Examples
///
/// ```
/// use bd_geocode_combiner::loader::clean_field;
///
/// assert_eq!(clean_field("\"Dhaka\""), "Dhaka");
/// assert_eq!(clean_field("\"\"Dhaka"), "Dhaka");
/// assert_eq!(clean_field("Cox's \"Bazar\" road"), "Cox's \"Bazar\" road");
/// assert_eq!(clean_field("plain"), "plain");
/// ```
pub fn clean_field(field: &str) -> String {
    field.trim_matches('"').to_string()
}
