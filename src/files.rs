//! Source table and output file catalogue.
//!
//! This module lists the four administrative tables the combiner reads and
//! the three combined files it writes, with a lookup function to retrieve
//! table information by kind.

use std::fmt;
use std::path::{Path, PathBuf};

/// The administrative level a source table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Division,
    District,
    Upazila,
    Union,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Division => "division",
            TableKind::District => "district",
            TableKind::Upazila => "upazila",
            TableKind::Union => "union",
        };
        f.write_str(name)
    }
}

/// Metadata for one source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTable {
    /// Administrative level of the rows in this table
    pub kind: TableKind,
    /// Human-readable name of the table
    pub name: &'static str,
    /// Path of the CSV file relative to the source directory
    pub relative_path: &'static str,
    /// Rows with fewer fields than this are dropped
    pub min_fields: usize,
}

impl SourceTable {
    /// Creates a new SourceTable instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use bd_geocode_combiner::files::{SourceTable, TableKind};
    ///
    /// let table = SourceTable::new(TableKind::Division, "Divisions", "divisions/divisions.csv", 4);
    /// assert_eq!(table.min_fields, 4);
    /// ```
    #[must_use]
    pub const fn new(
        kind: TableKind,
        name: &'static str,
        relative_path: &'static str,
        min_fields: usize,
    ) -> Self {
        Self {
            kind,
            name,
            relative_path,
            min_fields,
        }
    }

    /// Resolves the table's file path under `source_dir`.
    ///
    /// ```
    /// use bd_geocode_combiner::files::{get_table_by_kind, TableKind};
    /// use std::path::Path;
    ///
    /// let unions = get_table_by_kind(TableKind::Union);
    /// assert_eq!(unions.path_in(Path::new("..")), Path::new("../unions/unions.csv"));
    /// ```
    pub fn path_in(&self, source_dir: &Path) -> PathBuf {
        source_dir.join(self.relative_path)
    }
}

/// All source tables in load order.
///
/// Minimum field counts: division 4 (id, name_en, name_bn, website),
/// district 7 (id, division_id, name_en, name_bn, latitude, longitude,
/// website), upazila and union 5 (id, parent_id, name_en, name_bn, website).
pub static SOURCE_TABLES: [SourceTable; 4] = [
    SourceTable::new(TableKind::Division, "Divisions", "divisions/divisions.csv", 4),
    SourceTable::new(TableKind::District, "Districts", "districts/districts.csv", 7),
    SourceTable::new(TableKind::Upazila, "Upazilas", "upazilas/upazilas.csv", 5),
    SourceTable::new(TableKind::Union, "Unions", "unions/unions.csv", 5),
];

/// Retrieves source table metadata by kind.
///
/// # Examples
///
/// ```
/// use bd_geocode_combiner::files::{get_table_by_kind, TableKind};
///
/// let districts = get_table_by_kind(TableKind::District);
/// assert_eq!(districts.min_fields, 7);
/// ```
#[must_use]
pub fn get_table_by_kind(kind: TableKind) -> &'static SourceTable {
    match kind {
        TableKind::Division => &SOURCE_TABLES[0],
        TableKind::District => &SOURCE_TABLES[1],
        TableKind::Upazila => &SOURCE_TABLES[2],
        TableKind::Union => &SOURCE_TABLES[3],
    }
}

/// Base name shared by every combined output file and the SQL table.
pub const COMBINED_BASENAME: &str = "bangladesh_geocode_combined";

/// One of the three combined output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Sql,
}

impl ExportFormat {
    /// Every format, in reporting order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Sql];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Sql => "sql",
        }
    }

    /// Upper-case label used in progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Sql => "SQL",
        }
    }

    /// Output file name, e.g. `bangladesh_geocode_combined.csv`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", COMBINED_BASENAME, self.extension())
    }
}
