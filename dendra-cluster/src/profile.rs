//! Access to item profiles.
//!
//! Everything the engine correlates is an *item* (a sample, a data store, a
//! probe set) described by a numeric value at each of a shared set of
//! measurement points. [`ProfileSource`] is that `(item, point) -> value`
//! boundary; a fetch may fail for an individual point (e.g. an item that was
//! never quantitated), and callers decide per-pair how to recover.

use dendra_core::{DendraError, Result};

/// Read access to the numeric profiles of a set of items.
pub trait ProfileSource {
    /// Number of items.
    fn item_count(&self) -> usize;

    /// Number of shared measurement points per item.
    fn point_count(&self) -> usize;

    /// The value of `item` at measurement `point`.
    ///
    /// May fail per-point; NaN is a legal value and means "measured but
    /// unusable" rather than an error.
    fn value(&self, item: usize, point: usize) -> Result<f64>;

    /// Gather the full profile of one item.
    fn profile(&self, item: usize) -> Result<Vec<f64>> {
        (0..self.point_count())
            .map(|point| self.value(item, point))
            .collect()
    }
}

/// Dense in-memory profile storage: one row of values per item.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileTable {
    rows: Vec<Vec<f64>>,
    labels: Option<Vec<String>>,
}

impl ProfileTable {
    /// Build a table from rows of observations.
    ///
    /// All rows must have the same length; NaN entries are allowed.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::build(rows, None)
    }

    /// Build a labeled table (one label per item).
    pub fn from_rows_labeled(rows: Vec<Vec<f64>>, labels: &[&str]) -> Result<Self> {
        if labels.len() != rows.len() {
            return Err(DendraError::InvalidInput(format!(
                "ProfileTable: {} labels for {} rows",
                labels.len(),
                rows.len(),
            )));
        }
        let labels = labels.iter().map(|s| s.to_string()).collect();
        Self::build(rows, Some(labels))
    }

    fn build(rows: Vec<Vec<f64>>, labels: Option<Vec<String>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(DendraError::InvalidInput(
                "ProfileTable: need at least one item".into(),
            ));
        }
        let points = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != points {
                return Err(DendraError::InvalidInput(format!(
                    "ProfileTable: row {} has {} points, expected {}",
                    i,
                    row.len(),
                    points,
                )));
            }
        }
        Ok(Self { rows, labels })
    }

    /// Item labels, if provided.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// One item's full row.
    pub fn row(&self, item: usize) -> Option<&[f64]> {
        self.rows.get(item).map(|r| r.as_slice())
    }
}

impl ProfileSource for ProfileTable {
    fn item_count(&self) -> usize {
        self.rows.len()
    }

    fn point_count(&self) -> usize {
        self.rows[0].len()
    }

    fn value(&self, item: usize, point: usize) -> Result<f64> {
        self.rows
            .get(item)
            .and_then(|row| row.get(point))
            .copied()
            .ok_or_else(|| {
                DendraError::InvalidInput(format!(
                    "ProfileTable: no value for item {} at point {}",
                    item, point,
                ))
            })
    }

    fn profile(&self, item: usize) -> Result<Vec<f64>> {
        self.row(item).map(|r| r.to_vec()).ok_or_else(|| {
            DendraError::InvalidInput(format!("ProfileTable: no item {}", item))
        })
    }
}
