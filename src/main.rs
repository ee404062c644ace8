//! Bangladesh geocode combiner CLI application
//!
//! Joins the division, district, upazila and union tables into one combined
//! dataset and writes it as CSV, JSON and SQL.

use anyhow::Result;
use bd_geocode_combiner::{
    files::ExportFormat,
    pipeline::{run_pipeline, PipelineConfig, PipelineOutcome, PipelineSummary},
    utilities::{default_source_dir, format_count},
};
use clap::Parser;
use std::path::PathBuf;

/// Bangladesh Geocode Combined Dataset Creator
///
/// Reads divisions, districts, upazilas and unions from CSV files and writes
/// one denormalized row per union, with every ancestor's fields attached.
/// Running without arguments reads `../<level>s/<level>s.csv` and writes
/// `bangladesh_geocode_combined.{csv,json,sql}` into the current directory.
#[derive(Parser, Debug)]
#[command(name = "bd-geocode-combiner")]
#[command(about = "Combine Bangladesh administrative tables into CSV, JSON and SQL")]
#[command(version)]
struct Cli {
    /// Directory containing divisions/, districts/, upazilas/ and unions/
    #[arg(short, long, default_value_os_t = default_source_dir())]
    source_dir: PathBuf,

    /// Directory to write the combined files into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output format to write (repeatable; defaults to all three)
    #[arg(short, long = "format", value_enum)]
    formats: Vec<ExportFormat>,

    /// Treat the first row of every source file as a header and skip it
    #[arg(long)]
    skip_source_headers: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let formats = if self.formats.is_empty() {
            ExportFormat::ALL.to_vec()
        } else {
            self.formats
        };

        PipelineConfig {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            formats,
            skip_source_headers: self.skip_source_headers,
            show_progress: true,
        }
    }
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let config = Cli::parse().into_config();

    println!("Bangladesh Geocode Combined Dataset Creator");
    println!("============================================");

    let outcome = match run_pipeline(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ Processing failed");
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    match outcome {
        PipelineOutcome::NoData { .. } => {
            eprintln!("Error: No data to process");
            std::process::exit(1);
        }
        PipelineOutcome::Completed(summary) => {
            print_summary(&summary);
            if !summary.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Prints the closing banner with the record count and written files.
fn print_summary(summary: &PipelineSummary) {
    if summary.is_success() {
        println!("\nAll files created successfully!");
    } else {
        println!(
            "\n⚠️  {} of {} output files failed",
            summary.export.errors.len(),
            summary.export.errors.len() + summary.export.written.len()
        );
    }

    if !summary.load_errors.is_empty() {
        println!(
            "⚠️  {} source tables could not be read and were treated as empty",
            summary.load_errors.len()
        );
    }

    println!("\nFiles generated:");
    for path in &summary.export.written {
        println!("- {}", path.display());
    }

    println!(
        "\n✅ {} records combined in {}",
        format_count(summary.record_count),
        summary.elapsed
    );
}
