//! Join engine that flattens the administrative hierarchy.
//!
//! The `Combiner` walks every union row up through its ancestors:
//! 1. The union's `upazila_id` selects an upazila
//! 2. That upazila's `district_id` selects a district
//! 3. That district's `division_id` selects a division
//!
//! A missing parent at any step leaves that level's fields, and every level
//! above it, as empty strings. A dangling id never aborts the join.
//!
//! # Example
//!
//! ```
//! use bd_geocode_combiner::combiner::{Combiner, COMBINED_HEADER};
//! use bd_geocode_combiner::hierarchy::HierarchyIndex;
//!
//! let index = HierarchyIndex::default();
//! let unions = vec![vec![
//!     "10010101".to_string(),
//!     "999999".to_string(),
//!     "Union A".to_string(),
//!     "ইউনিয়ন এ".to_string(),
//!     "http://unionA.bd".to_string(),
//! ]];
//!
//! let table = Combiner::new(&index).combine(&unions);
//! assert_eq!(table.header, COMBINED_HEADER);
//! assert_eq!(table.record_count(), 1);
//! assert_eq!(table.rows[0][0], "10010101");
//! assert_eq!(table.rows[0][5], "");
//! ```

use crate::hierarchy::{HierarchyIndex, HierarchyRecord, Union};
use crate::loader::Row;
use tracing::debug;

/// Number of columns in a combined record.
pub const COMBINED_WIDTH: usize = 18;

/// Column names of the combined table, in output order:
/// union (4) → upazila (4) → district (6) → division (4).
pub const COMBINED_HEADER: [&str; COMBINED_WIDTH] = [
    "union_id",
    "union_name_en",
    "union_name_bn",
    "union_website",
    "upazila_id",
    "upazila_name_en",
    "upazila_name_bn",
    "upazila_website",
    "district_id",
    "district_name_en",
    "district_name_bn",
    "district_latitude",
    "district_longitude",
    "district_website",
    "division_id",
    "division_name_en",
    "division_name_bn",
    "division_website",
];

/// One union together with all of its resolved ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedRecord {
    pub union_id: String,
    pub union_name_en: String,
    pub union_name_bn: String,
    pub union_website: String,
    pub upazila_id: String,
    pub upazila_name_en: String,
    pub upazila_name_bn: String,
    pub upazila_website: String,
    pub district_id: String,
    pub district_name_en: String,
    pub district_name_bn: String,
    pub district_latitude: String,
    pub district_longitude: String,
    pub district_website: String,
    pub division_id: String,
    pub division_name_en: String,
    pub division_name_bn: String,
    pub division_website: String,
}

impl CombinedRecord {
    /// Converts the record into a row in [`COMBINED_HEADER`] order.
    pub fn into_row(self) -> Row {
        vec![
            self.union_id,
            self.union_name_en,
            self.union_name_bn,
            self.union_website,
            self.upazila_id,
            self.upazila_name_en,
            self.upazila_name_bn,
            self.upazila_website,
            self.district_id,
            self.district_name_en,
            self.district_name_bn,
            self.district_latitude,
            self.district_longitude,
            self.district_website,
            self.division_id,
            self.division_name_en,
            self.division_name_bn,
            self.division_website,
        ]
    }
}

/// How far up the hierarchy a union resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Division found
    Full,
    /// Upazila and district found, division missing
    MissingDivision,
    /// Upazila found, district missing
    MissingDistrict,
    /// Upazila missing
    MissingUpazila,
}

/// Counts gathered during a join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Union rows seen
    pub rows: usize,
    /// Union rows dropped for being too narrow
    pub dropped: usize,
    pub full: usize,
    pub missing_upazila: usize,
    pub missing_district: usize,
    pub missing_division: usize,
}

impl JoinStats {
    fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Full => self.full += 1,
            Resolution::MissingUpazila => self.missing_upazila += 1,
            Resolution::MissingDistrict => self.missing_district += 1,
            Resolution::MissingDivision => self.missing_division += 1,
        }
    }
}

/// The header row plus one data row per union.
///
/// Rows keep the order of the union source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedTable {
    /// Column names; always [`COMBINED_HEADER`] for tables built by the combiner
    pub header: Vec<String>,
    /// Data rows, each as wide as the header
    pub rows: Vec<Row>,
}

impl CombinedTable {
    /// Creates a table with the standard header and no rows.
    pub fn new() -> Self {
        Self::with_header(COMBINED_HEADER.iter().map(|name| name.to_string()).collect())
    }

    /// Creates an empty table with a custom header.
    pub fn with_header(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Number of data rows, excluding the header.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when only the header is present.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the header followed by every data row.
    pub fn all_rows(&self) -> impl Iterator<Item = &Row> {
        std::iter::once(&self.header).chain(self.rows.iter())
    }
}

impl Default for CombinedTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies a field out of an optional ancestor, or returns an empty string.
fn field<T>(record: Option<&T>, get: impl Fn(&T) -> &String) -> String {
    record.map(get).cloned().unwrap_or_default()
}

/// Joins union rows against a [`HierarchyIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Combiner<'a> {
    index: &'a HierarchyIndex,
}

impl<'a> Combiner<'a> {
    /// Creates a combiner over an already built index.
    pub fn new(index: &'a HierarchyIndex) -> Self {
        Self { index }
    }

    /// Resolves one union against the index.
    ///
    /// The union's own fields, including its `upazila_id`, are always kept.
    /// Each lookup uses the id resolved by the previous step, or the empty
    /// string when that step found nothing.
    pub fn resolve(&self, union: &Union) -> (CombinedRecord, Resolution) {
        let upazila = self.index.upazilas.get(&union.upazila_id);
        let district_id = upazila.map_or("", |u| u.district_id.as_str());

        let district = self.index.districts.get(district_id);
        let division_id = district.map_or("", |d| d.division_id.as_str());

        let division = self.index.divisions.get(division_id);

        let resolution = match (upazila, district, division) {
            (None, _, _) => Resolution::MissingUpazila,
            (Some(_), None, _) => Resolution::MissingDistrict,
            (Some(_), Some(_), None) => Resolution::MissingDivision,
            (Some(_), Some(_), Some(_)) => Resolution::Full,
        };

        let record = CombinedRecord {
            union_id: union.id.clone(),
            union_name_en: union.name_en.clone(),
            union_name_bn: union.name_bn.clone(),
            union_website: union.website.clone(),
            upazila_id: union.upazila_id.clone(),
            upazila_name_en: field(upazila, |u| &u.name_en),
            upazila_name_bn: field(upazila, |u| &u.name_bn),
            upazila_website: field(upazila, |u| &u.website),
            district_id: district_id.to_string(),
            district_name_en: field(district, |d| &d.name_en),
            district_name_bn: field(district, |d| &d.name_bn),
            district_latitude: field(district, |d| &d.latitude),
            district_longitude: field(district, |d| &d.longitude),
            district_website: field(district, |d| &d.website),
            division_id: division_id.to_string(),
            division_name_en: field(division, |d| &d.name_en),
            division_name_bn: field(division, |d| &d.name_bn),
            division_website: field(division, |d| &d.website),
        };

        (record, resolution)
    }

    /// Builds the combined table from raw union rows.
    ///
    /// Rows with fewer than five fields are skipped. The header row is
    /// present even when no union rows survive.
    pub fn combine(&self, union_rows: &[Row]) -> CombinedTable {
        self.combine_with_stats(union_rows).0
    }

    /// Same as [`Combiner::combine`], also returning resolution counts.
    pub fn combine_with_stats(&self, union_rows: &[Row]) -> (CombinedTable, JoinStats) {
        let mut table = CombinedTable::new();
        table.rows.reserve(union_rows.len());

        let mut stats = JoinStats {
            rows: union_rows.len(),
            ..JoinStats::default()
        };

        for row in union_rows {
            let Some(union) = Union::from_row(row) else {
                stats.dropped += 1;
                continue;
            };

            let (record, resolution) = self.resolve(&union);
            stats.record(resolution);
            table.rows.push(record.into_row());
        }

        debug!(
            rows = stats.rows,
            dropped = stats.dropped,
            full = stats.full,
            missing_upazila = stats.missing_upazila,
            missing_district = stats.missing_district,
            missing_division = stats.missing_division,
            "joined union table"
        );

        (table, stats)
    }
}
