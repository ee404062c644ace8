//! MySQL dump exporter.
//!
//! Produces a `CREATE TABLE IF NOT EXISTS` statement with a fixed column
//! layout followed by one multi-row `INSERT`. String values use MySQL-style
//! backslash escaping, which is not portable to standard SQL engines.

use super::Exporter;
use crate::combiner::CombinedTable;
use crate::files::{ExportFormat, COMBINED_BASENAME};
use anyhow::{Context, Result};
use std::io::Write;

/// Column definitions for the combined table, including the surrogate key.
///
/// Types are fixed here rather than inferred from the data.
const COLUMN_DEFINITIONS: [&str; 20] = [
    "  `id` int(11) NOT NULL AUTO_INCREMENT,",
    "  `union_id` varchar(10) DEFAULT NULL,",
    "  `union_name_en` varchar(255) DEFAULT NULL,",
    "  `union_name_bn` varchar(255) DEFAULT NULL,",
    "  `union_website` varchar(255) DEFAULT NULL,",
    "  `upazila_id` varchar(10) DEFAULT NULL,",
    "  `upazila_name_en` varchar(255) DEFAULT NULL,",
    "  `upazila_name_bn` varchar(255) DEFAULT NULL,",
    "  `upazila_website` varchar(255) DEFAULT NULL,",
    "  `district_id` varchar(10) DEFAULT NULL,",
    "  `district_name_en` varchar(255) DEFAULT NULL,",
    "  `district_name_bn` varchar(255) DEFAULT NULL,",
    "  `district_latitude` decimal(10,8) DEFAULT NULL,",
    "  `district_longitude` decimal(11,8) DEFAULT NULL,",
    "  `district_website` varchar(255) DEFAULT NULL,",
    "  `division_id` varchar(10) DEFAULT NULL,",
    "  `division_name_en` varchar(255) DEFAULT NULL,",
    "  `division_name_bn` varchar(255) DEFAULT NULL,",
    "  `division_website` varchar(255) DEFAULT NULL,",
    "  PRIMARY KEY (`id`)",
];

/// Formats one value for an `INSERT` tuple.
///
/// Empty strings become `NULL`. Anything else is single-quoted with `'`
/// and `"` escaped by a backslash. Backslashes themselves are left alone.
///
/// # Examples
///
/// ```
/// use bd_geocode_combiner::export::sql::format_sql_value;
///
/// assert_eq!(format_sql_value(""), "NULL");
/// assert_eq!(format_sql_value("Dhaka"), "'Dhaka'");
/// assert_eq!(format_sql_value("Cox's"), "'Cox\\'s'");
/// assert_eq!(format_sql_value("\"x\""), "'\\\"x\\\"'");
/// ```
pub fn format_sql_value(value: &str) -> String {
    if value.is_empty() {
        return "NULL".to_string();
    }

    let escaped = value.replace('\'', "\\'").replace('"', "\\\"");
    format!("'{}'", escaped)
}

/// Writes a MySQL table definition and bulk insert.
///
/// Tuples are separated by `,` and the last one ends with `;`. When the
/// table has no data rows only the table definition is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlExporter;

impl SqlExporter {
    fn write_create_table(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "-- Bangladesh Complete Geocode Data")?;
        writeln!(writer, "-- Combined dataset with all administrative levels")?;
        writeln!(writer)?;
        writeln!(writer, "CREATE TABLE IF NOT EXISTS `{}` (", COMBINED_BASENAME)?;
        writeln!(writer, "{}", COLUMN_DEFINITIONS.join("\n"))?;
        writeln!(writer, ") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;")?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_insert(&self, table: &CombinedTable, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "INSERT INTO `{}` (", COMBINED_BASENAME)?;
        writeln!(writer, "  `{}`", table.header.join("`, `"))?;
        writeln!(writer, ") VALUES")?;

        let last = table.rows.len().saturating_sub(1);
        for (index, row) in table.rows.iter().enumerate() {
            let values: Vec<String> = row.iter().map(|value| format_sql_value(value)).collect();
            let terminator = if index < last { ',' } else { ';' };
            writeln!(writer, "({}){}", values.join(", "), terminator)?;
        }

        Ok(())
    }
}

impl Exporter for SqlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Sql
    }

    fn write_table(&self, table: &CombinedTable, writer: &mut dyn Write) -> Result<()> {
        self.write_create_table(writer)
            .context("Failed to write CREATE TABLE statement")?;

        if !table.is_empty() {
            self.write_insert(table, writer)
                .context("Failed to write INSERT statement")?;
        }

        Ok(())
    }
}
