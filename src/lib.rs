//! Bangladesh Geocode Combiner Library
//!
//! This library joins the four administrative tables of Bangladesh
//! (division → district → upazila → union) into one denormalized dataset
//! and exports it as CSV, JSON and SQL.

pub mod combiner;
pub mod concurrency;
pub mod export;
pub mod files;
pub mod hierarchy;
pub mod loader;
pub mod pipeline;
pub mod utilities;

pub use combiner::{CombinedRecord, CombinedTable, Combiner, COMBINED_HEADER};
pub use concurrency::{run_exporters, ErrorAggregator, ErrorDetails, ExportReport};
pub use export::{CsvExporter, Exporter, JsonExporter, SqlExporter};
pub use files::{ExportFormat, SourceTable, TableKind, SOURCE_TABLES};
pub use hierarchy::{District, Division, HierarchyIndex, Upazila, Union};
pub use loader::{Row, TableLoader};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineOutcome, PipelineSummary};
