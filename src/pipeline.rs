//! End-to-end combine run: load → index → join → export.
//!
//! # Example
//!
//! ```no_run
//! use bd_geocode_combiner::pipeline::{run_pipeline, PipelineConfig, PipelineOutcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//!
//! match run_pipeline(&config)? {
//!     PipelineOutcome::Completed(summary) => {
//!         println!("Generated {} records", summary.record_count);
//!     }
//!     PipelineOutcome::NoData { .. } => eprintln!("Error: No data to process"),
//! }
//! # Ok(())
//! # }
//! ```

use crate::combiner::{CombinedTable, Combiner, JoinStats};
use crate::concurrency::{run_exporters, ErrorDetails, ExportReport};
use crate::files::{get_table_by_kind, ExportFormat, TableKind, SOURCE_TABLES};
use crate::hierarchy::HierarchyIndex;
use crate::loader::{Row, TableLoader};
use crate::utilities::{create_spinner, default_source_dir, ensure_directory, format_count, format_duration};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{info, warn};

/// Settings for one combine run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root holding the four table directories
    pub source_dir: PathBuf,
    /// Directory the combined files are written to
    pub output_dir: PathBuf,
    /// Formats to export
    pub formats: Vec<ExportFormat>,
    /// Drop the first row of every source file
    pub skip_source_headers: bool,
    /// Print progress lines and spinners
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: PathBuf::from("."),
            formats: ExportFormat::ALL.to_vec(),
            skip_source_headers: false,
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    fn loader(&self) -> TableLoader {
        if self.skip_source_headers {
            TableLoader::with_header()
        } else {
            TableLoader::new()
        }
    }

    fn progress(&self, message: &str) {
        if self.show_progress {
            println!("{}", message);
        }
    }
}

/// Raw rows of all four source tables.
#[derive(Debug, Clone, Default)]
pub struct SourceRows {
    pub divisions: Vec<Row>,
    pub districts: Vec<Row>,
    pub upazilas: Vec<Row>,
    pub unions: Vec<Row>,
    /// Tables that could not be read; each is represented by zero rows
    pub errors: Vec<ErrorDetails>,
}

impl SourceRows {
    /// Rows loaded for `kind`.
    pub fn rows(&self, kind: TableKind) -> &[Row] {
        match kind {
            TableKind::Division => &self.divisions,
            TableKind::District => &self.districts,
            TableKind::Upazila => &self.upazilas,
            TableKind::Union => &self.unions,
        }
    }

    fn rows_mut(&mut self, kind: TableKind) -> &mut Vec<Row> {
        match kind {
            TableKind::Division => &mut self.divisions,
            TableKind::District => &mut self.districts,
            TableKind::Upazila => &mut self.upazilas,
            TableKind::Union => &mut self.unions,
        }
    }
}

/// Loads every source table, degrading unreadable tables to zero rows.
///
/// Each failure is printed to stderr as `Error reading <path>: <message>`
/// and recorded in [`SourceRows::errors`].
pub fn load_sources(config: &PipelineConfig) -> SourceRows {
    let loader = config.loader();
    let mut sources = SourceRows::default();

    for table in &SOURCE_TABLES {
        let path = table.path_in(&config.source_dir);
        let spinner = create_spinner(&format!("Reading {}...", table.name), config.show_progress);

        match loader.load(&path) {
            Ok(rows) => {
                spinner.finish_and_clear();
                info!(table = %table.kind, rows = rows.len(), path = %path.display(), "loaded source table");
                *sources.rows_mut(table.kind) = rows;
            }
            Err(e) => {
                spinner.finish_and_clear();
                let details = ErrorDetails::load(table.kind, path, &e);
                eprintln!("{}", details.message);
                warn!(table = %table.kind, error = %details.error_message, "source table unreadable");
                sources.errors.push(details);
            }
        }
    }

    sources
}

/// Counts reported after a completed run.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Data rows in the combined table
    pub record_count: usize,
    /// Source tables that could not be read
    pub load_errors: Vec<ErrorDetails>,
    pub join_stats: JoinStats,
    /// Files written and exporters that failed
    pub export: ExportReport,
    /// Wall-clock duration of the run, e.g. "1m 5s"
    pub elapsed: String,
}

impl PipelineSummary {
    /// Returns `true` if every requested output was written.
    pub fn is_success(&self) -> bool {
        self.export.is_success()
    }
}

/// Result of a run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// The combined table had no data rows; nothing was written
    NoData { load_errors: Vec<ErrorDetails> },
    /// Outputs were attempted for every requested format
    Completed(PipelineSummary),
}

/// Loads, indexes and joins the source tables without writing anything.
pub fn build_combined_table(config: &PipelineConfig) -> (CombinedTable, SourceRows, JoinStats) {
    config.progress("Reading data files...");
    let sources = load_sources(config);

    let index = HierarchyIndex::build(&sources.divisions, &sources.districts, &sources.upazilas);

    if config.show_progress {
        for table in &SOURCE_TABLES {
            let loaded = sources.rows(table.kind).len();
            match index.stats_for(table.kind) {
                Some(stats) => println!(
                    "  ✓ {}: {} rows loaded, {} indexed",
                    table.name,
                    format_count(loaded),
                    format_count(stats.indexed())
                ),
                None => println!("  ✓ {}: {} rows loaded", table.name, format_count(loaded)),
            }
        }
    }

    config.progress("Creating combined dataset...");
    let (table, join_stats) = Combiner::new(&index).combine_with_stats(&sources.unions);

    let min_fields = get_table_by_kind(TableKind::Union).min_fields;
    info!(
        records = table.record_count(),
        skipped = join_stats.dropped,
        min_fields,
        "combined dataset built"
    );

    (table, sources, join_stats)
}

/// Runs the whole pipeline.
///
/// When the combined table has no data rows, returns
/// [`PipelineOutcome::NoData`] without creating any output file.
///
/// # Errors
///
/// Returns an error only if the output directory cannot be created.
/// Unreadable sources and failed exporters are reported in the outcome.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let epoch = SystemTime::now();

    let (table, sources, join_stats) = build_combined_table(config);

    if table.is_empty() {
        return Ok(PipelineOutcome::NoData {
            load_errors: sources.errors,
        });
    }

    config.progress(&format!(
        "Generated {} records (plus header)",
        table.record_count()
    ));

    ensure_directory(&config.output_dir).context("Failed to prepare output directory")?;

    let spinner = create_spinner(
        &format!("Writing {} output files...", config.formats.len()),
        config.show_progress,
    );
    let export = run_exporters(&table, &config.formats, &config.output_dir);
    spinner.finish_and_clear();

    if config.show_progress {
        for path in &export.written {
            let label = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_uppercase())
                .unwrap_or_default();
            println!("{} saved as: {}", label, path.display());
        }
    }
    for error in &export.errors {
        eprintln!("❌ {}", error.message);
    }

    let elapsed = format_duration(epoch, None).unwrap_or_else(|_| "0s".to_string());

    Ok(PipelineOutcome::Completed(PipelineSummary {
        record_count: table.record_count(),
        load_errors: sources.errors,
        join_stats,
        export,
        elapsed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiner::COMBINED_HEADER;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const DIVISIONS: &str = "\"10\",\"Dhaka\",\"ঢাকা\",\"http://dhakadiv.gov.bd\"\n";
    const DISTRICTS: &str =
        "\"1001\",\"10\",\"Dhaka\",\"ঢাকা\",\"23.81\",\"90.41\",\"http://dhakadistrict.gov.bd\"\n";
    const UPAZILAS: &str = "\"100101\",\"1001\",\"Savar\",\"সাভার\",\"http://savar.gov.bd\"\n";
    const UNIONS: &str = "\"10010101\",\"100101\",\"Union A\",\"ইউনিয়ন এ\",\"http://unionA.bd\"\n\
\"10010102\",\"999999\",\"Union B\",\"ইউনিয়ন বি\",\"http://unionB.bd\"\n\
\"short\",\"100101\"\n";

    fn write_source(root: &Path, kind: TableKind, contents: &str) {
        let path = get_table_by_kind(kind).path_in(root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn fixture(unions: &str) -> (TempDir, PipelineConfig) {
        let temp = TempDir::new().unwrap();
        let source_dir = temp.path().join("data");
        write_source(&source_dir, TableKind::Division, DIVISIONS);
        write_source(&source_dir, TableKind::District, DISTRICTS);
        write_source(&source_dir, TableKind::Upazila, UPAZILAS);
        write_source(&source_dir, TableKind::Union, unions);

        let config = PipelineConfig {
            source_dir,
            output_dir: temp.path().join("out"),
            show_progress: false,
            ..PipelineConfig::default()
        };
        (temp, config)
    }

    fn completed(outcome: PipelineOutcome) -> PipelineSummary {
        match outcome {
            PipelineOutcome::Completed(summary) => summary,
            PipelineOutcome::NoData { .. } => panic!("expected a completed run"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_dir, PathBuf::from(".."));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.formats, ExportFormat::ALL.to_vec());
        assert!(!config.skip_source_headers);
    }

    #[test]
    fn test_full_run_writes_all_outputs() {
        let (_temp, config) = fixture(UNIONS);
        let summary = completed(run_pipeline(&config).unwrap());

        assert!(summary.is_success());
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.join_stats.dropped, 1);
        assert_eq!(summary.join_stats.full, 1);
        assert_eq!(summary.join_stats.missing_upazila, 1);
        assert!(summary.load_errors.is_empty());
        assert_eq!(summary.export.written.len(), 3);

        for format in ExportFormat::ALL {
            assert!(config.output_dir.join(format.file_name()).is_file());
        }
    }

    #[test]
    fn test_scenario_rows() {
        let (_temp, config) = fixture(UNIONS);
        let (table, _, _) = build_combined_table(&config);

        assert_eq!(table.header, COMBINED_HEADER);
        assert_eq!(table.rows[0][0], "10010101");
        assert_eq!(table.rows[0][4], "100101");
        assert_eq!(table.rows[0][8], "1001");
        assert_eq!(table.rows[0][14], "10");
        assert_eq!(table.rows[0][2], "ইউনিয়ন এ");
        assert_eq!(table.rows[0][17], "http://dhakadiv.gov.bd");

        assert_eq!(table.rows[1][..5], ["10010102", "Union B", "ইউনিয়ন বি", "http://unionB.bd", "999999"]);
        assert!(table.rows[1][5..].iter().all(|value| value.is_empty()));
    }

    #[test]
    fn test_json_matches_csv_rows() {
        let (_temp, config) = fixture(UNIONS);
        completed(run_pipeline(&config).unwrap());

        let csv_text = fs::read_to_string(config.output_dir.join("bangladesh_geocode_combined.csv")).unwrap();
        let csv_rows = TableLoader::with_header().load_from_reader(csv_text.as_bytes()).unwrap();

        let json_text = fs::read_to_string(config.output_dir.join("bangladesh_geocode_combined.json")).unwrap();
        let json: Value = serde_json::from_str(&json_text).unwrap();
        let json_rows: Vec<Vec<String>> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|record| {
                COMBINED_HEADER
                    .iter()
                    .map(|name| record[*name].as_str().unwrap().to_string())
                    .collect()
            })
            .collect();

        assert_eq!(json_rows.len(), 2);
        assert_eq!(json_rows, csv_rows);
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let (_temp, config) = fixture(UNIONS);

        completed(run_pipeline(&config).unwrap());
        let first: Vec<Vec<u8>> = ExportFormat::ALL
            .iter()
            .map(|f| fs::read(config.output_dir.join(f.file_name())).unwrap())
            .collect();

        completed(run_pipeline(&config).unwrap());
        let second: Vec<Vec<u8>> = ExportFormat::ALL
            .iter()
            .map(|f| fs::read(config.output_dir.join(f.file_name())).unwrap())
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_no_union_rows_writes_nothing() {
        let (_temp, config) = fixture("\"only\",\"three\",\"fields\"\n");
        let outcome = run_pipeline(&config).unwrap();

        assert!(matches!(outcome, PipelineOutcome::NoData { .. }));
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_missing_source_degrades_to_empty() {
        let (_temp, config) = fixture(UNIONS);
        fs::remove_file(get_table_by_kind(TableKind::District).path_in(&config.source_dir)).unwrap();

        let summary = completed(run_pipeline(&config).unwrap());

        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.load_errors.len(), 1);
        assert!(summary.load_errors[0].message.starts_with("Error reading "));
        assert_eq!(summary.join_stats.missing_district, 1);
    }

    #[test]
    fn test_missing_union_table_is_no_data() {
        let (_temp, config) = fixture(UNIONS);
        fs::remove_file(get_table_by_kind(TableKind::Union).path_in(&config.source_dir)).unwrap();

        match run_pipeline(&config).unwrap() {
            PipelineOutcome::NoData { load_errors } => assert_eq!(load_errors.len(), 1),
            PipelineOutcome::Completed(_) => panic!("expected no data"),
        }
    }

    #[test]
    fn test_skip_source_headers() {
        let unions = format!("\"id\",\"upazila_id\",\"name_en\",\"name_bn\",\"url\"\n{}", UNIONS);
        let (_temp, mut config) = fixture(&unions);

        let (table, _, _) = build_combined_table(&config);
        assert_eq!(table.record_count(), 3);
        assert_eq!(table.rows[0][0], "id");

        config.skip_source_headers = true;
        let (table, _, _) = build_combined_table(&config);
        assert_eq!(table.record_count(), 2);
        assert_eq!(table.rows[0][0], "10010101");
    }

    #[test]
    fn test_format_subset() {
        let (_temp, mut config) = fixture(UNIONS);
        config.formats = vec![ExportFormat::Sql];

        let summary = completed(run_pipeline(&config).unwrap());

        assert_eq!(summary.export.written.len(), 1);
        assert!(config.output_dir.join("bangladesh_geocode_combined.sql").is_file());
        assert!(!config.output_dir.join("bangladesh_geocode_combined.csv").exists());
    }
}
