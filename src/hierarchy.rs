//! Administrative hierarchy records and lookup indexes.
//!
//! Division, district and upazila rows are indexed by their id (always the
//! first field) so the combiner can walk from a union up to its division.
//! Union rows are never indexed, only iterated.
//!
//! Indexing is lenient:
//! 1. Rows narrower than the table's minimum field count are dropped
//! 2. A later row with a duplicate id replaces the earlier one
//!
//! Both cases are counted in [`IndexStats`] but never treated as errors.

use crate::files::{get_table_by_kind, TableKind};
use crate::loader::Row;
use std::collections::HashMap;
use tracing::debug;

/// A record that can be built from one source row.
pub trait HierarchyRecord: Sized {
    /// The table this record type is loaded from.
    const KIND: TableKind;

    /// Builds the record from the leading fields of `row`.
    ///
    /// Callers must check the row width first; see [`HierarchyRecord::from_row`].
    fn from_fields(row: &[String]) -> Self;

    /// The record's own id.
    fn id(&self) -> &str;

    /// Builds the record if `row` meets the table's minimum width.
    ///
    /// ```
    /// use bd_geocode_combiner::hierarchy::{Division, HierarchyRecord};
    ///
    /// let row: Vec<String> = vec!["10".into(), "Dhaka".into(), "ঢাকা".into()];
    /// assert!(Division::from_row(&row).is_none());
    /// ```
    fn from_row(row: &[String]) -> Option<Self> {
        if row.len() < get_table_by_kind(Self::KIND).min_fields {
            return None;
        }
        Some(Self::from_fields(row))
    }
}

/// Top-level administrative unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    pub id: String,
    pub name_en: String,
    pub name_bn: String,
    pub website: String,
}

impl HierarchyRecord for Division {
    const KIND: TableKind = TableKind::Division;

    fn from_fields(row: &[String]) -> Self {
        Self {
            id: row[0].clone(),
            name_en: row[1].clone(),
            name_bn: row[2].clone(),
            website: row[3].clone(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// District within a division. Latitude and longitude stay as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub id: String,
    pub division_id: String,
    pub name_en: String,
    pub name_bn: String,
    pub latitude: String,
    pub longitude: String,
    pub website: String,
}

impl HierarchyRecord for District {
    const KIND: TableKind = TableKind::District;

    fn from_fields(row: &[String]) -> Self {
        Self {
            id: row[0].clone(),
            division_id: row[1].clone(),
            name_en: row[2].clone(),
            name_bn: row[3].clone(),
            latitude: row[4].clone(),
            longitude: row[5].clone(),
            website: row[6].clone(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Sub-district within a district.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upazila {
    pub id: String,
    pub district_id: String,
    pub name_en: String,
    pub name_bn: String,
    pub website: String,
}

impl HierarchyRecord for Upazila {
    const KIND: TableKind = TableKind::Upazila;

    fn from_fields(row: &[String]) -> Self {
        Self {
            id: row[0].clone(),
            district_id: row[1].clone(),
            name_en: row[2].clone(),
            name_bn: row[3].clone(),
            website: row[4].clone(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Leaf-level unit. Only iterated by the combiner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub id: String,
    pub upazila_id: String,
    pub name_en: String,
    pub name_bn: String,
    pub website: String,
}

impl HierarchyRecord for Union {
    const KIND: TableKind = TableKind::Union;

    fn from_fields(row: &[String]) -> Self {
        Self {
            id: row[0].clone(),
            upazila_id: row[1].clone(),
            name_en: row[2].clone(),
            name_bn: row[3].clone(),
            website: row[4].clone(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Counts gathered while indexing one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Rows seen in the source
    pub rows: usize,
    /// Rows dropped for being too narrow
    pub dropped: usize,
    /// Rows that replaced an earlier row with the same id
    pub overwritten: usize,
}

impl IndexStats {
    /// Number of distinct ids in the resulting index.
    pub fn indexed(&self) -> usize {
        self.rows - self.dropped - self.overwritten
    }
}

/// Builds an id → record map from `rows`, last write wins.
///
/// # Examples
///
/// ```
/// use bd_geocode_combiner::hierarchy::{index_rows, Upazila};
///
/// let rows: Vec<Vec<String>> = vec![
///     vec!["1".into(), "10".into(), "Old".into(), "".into(), "".into()],
///     vec!["1".into(), "10".into(), "New".into(), "".into(), "".into()],
///     vec!["2".into()],
/// ];
/// let (index, stats) = index_rows::<Upazila>(&rows);
///
/// assert_eq!(index["1"].name_en, "New");
/// assert_eq!(stats.dropped, 1);
/// assert_eq!(stats.overwritten, 1);
/// ```
pub fn index_rows<T: HierarchyRecord>(rows: &[Row]) -> (HashMap<String, T>, IndexStats) {
    let mut index = HashMap::with_capacity(rows.len());
    let mut stats = IndexStats {
        rows: rows.len(),
        ..IndexStats::default()
    };

    for row in rows {
        let Some(record) = T::from_row(row) else {
            stats.dropped += 1;
            continue;
        };

        if index.insert(record.id().to_string(), record).is_some() {
            stats.overwritten += 1;
        }
    }

    let kind = T::KIND;
    debug!(
        table = %kind,
        rows = stats.rows,
        dropped = stats.dropped,
        overwritten = stats.overwritten,
        "indexed source table"
    );

    (index, stats)
}

/// Lookup maps for the three indexed levels.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    pub divisions: HashMap<String, Division>,
    pub districts: HashMap<String, District>,
    pub upazilas: HashMap<String, Upazila>,
    pub division_stats: IndexStats,
    pub district_stats: IndexStats,
    pub upazila_stats: IndexStats,
}

impl HierarchyIndex {
    /// Indexes the division, district and upazila rows.
    pub fn build(division_rows: &[Row], district_rows: &[Row], upazila_rows: &[Row]) -> Self {
        let (divisions, division_stats) = index_rows::<Division>(division_rows);
        let (districts, district_stats) = index_rows::<District>(district_rows);
        let (upazilas, upazila_stats) = index_rows::<Upazila>(upazila_rows);

        Self {
            divisions,
            districts,
            upazilas,
            division_stats,
            district_stats,
            upazila_stats,
        }
    }

    /// Returns the stats for an indexed table, or `None` for unions.
    pub fn stats_for(&self, kind: TableKind) -> Option<IndexStats> {
        match kind {
            TableKind::Division => Some(self.division_stats),
            TableKind::District => Some(self.district_stats),
            TableKind::Upazila => Some(self.upazila_stats),
            TableKind::Union => None,
        }
    }
}
