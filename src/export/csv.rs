//! Quote-all CSV exporter.

use super::Exporter;
use crate::combiner::CombinedTable;
use crate::files::ExportFormat;
use anyhow::{Context, Result};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;

/// Writes the header and every row with all fields quoted.
///
/// Embedded quotes are doubled and rows end with CRLF.
///
/// # Example
///
/// ```
/// use bd_geocode_combiner::combiner::CombinedTable;
/// use bd_geocode_combiner::export::{CsvExporter, Exporter};
///
/// let mut table = CombinedTable::with_header(vec!["a".into(), "b".into()]);
/// table.rows.push(vec!["1".into(), "".into()]);
///
/// let output = CsvExporter.render(&table).unwrap();
/// assert_eq!(output, "\"a\",\"b\"\r\n\"1\",\"\"\r\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn write_table(&self, table: &CombinedTable, writer: &mut dyn Write) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::CRLF)
            .flexible(true)
            .from_writer(writer);

        for (index, row) in table.all_rows().enumerate() {
            csv_writer
                .write_record(row)
                .with_context(|| format!("Failed to write CSV row {}", index))?;
        }

        csv_writer.flush().context("Failed to flush CSV writer")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::sample_table;

    #[test]
    fn test_header_line() {
        let output = CsvExporter.render(&sample_table()).unwrap();
        let first_line = output.split("\r\n").next().unwrap();

        assert!(first_line.starts_with("\"union_id\",\"union_name_en\","));
        assert!(first_line.ends_with(",\"division_website\""));
        assert_eq!(first_line.matches("\",\"").count(), 17);
    }

    #[test]
    fn test_every_field_quoted() {
        let output = CsvExporter.render(&sample_table()).unwrap();
        let lines: Vec<&str> = output.split_terminator("\r\n").collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("\"10010101\",\"Union A\",\"ইউনিয়ন এ\","));
        assert!(lines[2].ends_with(",\"\",\"\",\"\",\"\""));
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        let output = CsvExporter.render(&sample_table()).unwrap();
        assert!(output.contains("\"Cox's \"\"Bazar\"\"\""));
    }

    #[test]
    fn test_field_with_comma_round_trips() {
        let mut table = CombinedTable::with_header(vec!["name".into()]);
        table.rows.push(vec!["Sadar, North".into()]);

        let output = CsvExporter.render(&table).unwrap();
        assert_eq!(output, "\"name\"\r\n\"Sadar, North\"\r\n");

        let rows = crate::loader::TableLoader::with_header()
            .load_from_reader(output.as_bytes())
            .unwrap();
        assert_eq!(rows, vec![vec!["Sadar, North"]]);
    }

    #[test]
    fn test_header_only_table() {
        let output = CsvExporter.render(&CombinedTable::new()).unwrap();
        assert_eq!(output.matches("\r\n").count(), 1);
    }
}
