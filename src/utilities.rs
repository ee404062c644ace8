//! Utility functions for the geocode combiner.
//!
//! This module provides common utilities for directory management, number
//! and duration formatting, and terminal spinners.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Default root holding the `divisions/`, `districts/`, `upazilas/` and
/// `unions/` directories, relative to the working directory.
///
/// # Examples
///
/// ```
/// use bd_geocode_combiner::utilities::default_source_dir;
///
/// assert_eq!(default_source_dir(), std::path::PathBuf::from(".."));
/// ```
pub fn default_source_dir() -> PathBuf {
    PathBuf::from("..")
}

/// Creates `path` and any missing parents.
///
/// Succeeds silently if the directory already exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, or if `path` exists
/// but is not a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;

    if !path.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    Ok(())
}

/// Formats a number with thousand separators.
///
/// Uses US English locale formatting (comma as thousand separator).
///
/// # Examples
///
/// ```
/// use bd_geocode_combiner::utilities::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1000), "1,000");
/// assert_eq!(format_count(4554), "4,554");
/// ```
pub fn format_count(n: usize) -> String {
    let s = n.to_string();
    let len = s.len();

    if len <= 3 {
        return s;
    }

    let mut result = String::with_capacity(len + (len - 1) / 3);

    for (digit_count, c) in s.chars().rev().enumerate() {
        if digit_count > 0 && digit_count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

/// Formats a duration in a human-readable format.
///
/// Returns a string in the format "Xh Ym Zs" where:
/// - Hours are only shown if > 0
/// - Minutes are shown if > 0 or if hours > 0
/// - Seconds are always shown
///
/// # Errors
///
/// Returns an error if the end time is before the start time.
///
/// # Examples
///
/// ```
/// use std::time::{SystemTime, Duration};
/// use bd_geocode_combiner::utilities::format_duration;
///
/// let start = SystemTime::now();
/// let end = start + Duration::from_secs(125);
///
/// assert_eq!(format_duration(start, Some(end)).unwrap(), "2m 5s");
/// ```
pub fn format_duration(start: SystemTime, end: Option<SystemTime>) -> Result<String> {
    let end_time = end.unwrap_or_else(SystemTime::now);

    let duration = end_time
        .duration_since(start)
        .context("End time is before start time (negative duration)")?;

    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();

    if hours > 0 {
        parts.push(format!("{}h", hours));
    }

    if minutes > 0 || hours > 0 {
        parts.push(format!("{}m", minutes));
    }

    parts.push(format!("{}s", seconds));

    Ok(parts.join(" "))
}

/// Creates a spinner with the "bouncingBar" style.
///
/// Returns a hidden spinner when `visible` is false, so callers can drive
/// it unconditionally.
pub fn create_spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[
                "[    ]", "[=   ]", "[==  ]", "[=== ]", "[ ===]", "[  ==]", "[   =]", "[    ]",
                "[   =]", "[  ==]", "[ ===]", "[====]",
            ]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(42), "42");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12345), "12,345");
        assert_eq!(format_count(123456), "123,456");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        let start = SystemTime::UNIX_EPOCH;

        let result = format_duration(start, Some(start)).unwrap();
        assert_eq!(result, "0s");

        let end = start + Duration::from_secs(45);
        assert_eq!(format_duration(start, Some(end)).unwrap(), "45s");

        let end = start + Duration::from_secs(3665); // 1h 1m 5s
        assert_eq!(format_duration(start, Some(end)).unwrap(), "1h 1m 5s");

        let end = start + Duration::from_secs(3600);
        assert_eq!(format_duration(start, Some(end)).unwrap(), "1h 0m 0s");

        let end = start - Duration::from_secs(10);
        assert!(format_duration(start, Some(end)).is_err());
    }

    #[test]
    fn test_ensure_directory_creates_nested() -> Result<()> {
        let temp = TempDir::new()?;
        let nested = temp.path().join("a").join("b");

        ensure_directory(&nested)?;
        assert!(nested.is_dir());

        ensure_directory(&nested)?;
        Ok(())
    }

    #[test]
    fn test_ensure_directory_rejects_file() -> Result<()> {
        let temp = TempDir::new()?;
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "x")?;

        assert!(ensure_directory(&file_path).is_err());
        Ok(())
    }

    #[test]
    fn test_hidden_spinner() {
        let spinner = create_spinner("Loading", false);
        assert!(spinner.is_hidden());
        spinner.finish_and_clear();
    }
}
