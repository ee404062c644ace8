//! JSON exporter: an array of objects keyed by the header names.

use super::Exporter;
use crate::combiner::CombinedTable;
use crate::files::ExportFormat;
use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;

/// One data row viewed as a map from header name to value.
///
/// Keys keep header order. Values past the end of the header are skipped.
struct RecordView<'a> {
    header: &'a [String],
    row: &'a [String],
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.row.len().min(self.header.len());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in self.header.iter().zip(self.row.iter()) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Writes pretty-printed JSON with two-space indentation.
///
/// Non-ASCII text is written as-is rather than escaped.
///
/// # Example
///
/// ```
/// use bd_geocode_combiner::combiner::CombinedTable;
/// use bd_geocode_combiner::export::{Exporter, JsonExporter};
///
/// let mut table = CombinedTable::with_header(vec!["name_bn".into()]);
/// table.rows.push(vec!["ঢাকা".into()]);
///
/// let output = JsonExporter.render(&table).unwrap();
/// assert_eq!(output, "[\n  {\n    \"name_bn\": \"ঢাকা\"\n  }\n]");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn write_table(&self, table: &CombinedTable, writer: &mut dyn Write) -> Result<()> {
        let records: Vec<RecordView<'_>> = table
            .rows
            .iter()
            .map(|row| RecordView {
                header: &table.header,
                row,
            })
            .collect();

        serde_json::to_writer_pretty(writer, &records).context("Failed to serialize JSON records")?;

        Ok(())
    }
}
