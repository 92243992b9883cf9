//! All-vs-all pairwise similarity matrix.
//!
//! Computes the complete triangle of pairwise Pearson correlations for a set
//! of items, as displayed by the viewer's correlation table. Construction is
//! a cancellable unit of background work with a per-pair progress callback;
//! lookup is symmetric over the packed upper triangle.

use dendra_core::{CancelToken, DendraError, Result, Summarizable};

use crate::correlation::pearson;
use crate::profile::ProfileSource;

/// Symmetric matrix of pairwise item correlations, stored as a packed upper
/// triangle of `m * (m - 1) / 2` entries.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimilarityMatrix {
    condensed: Vec<f32>,
    n: usize,
    labels: Option<Vec<String>>,
}

impl SimilarityMatrix {
    /// Compute the full pairwise matrix over `source`.
    ///
    /// Checks `cancel` before each pair and calls `progress(done, total)`
    /// after each pair. Any failure fetching a value aborts the whole
    /// computation; a degenerate (NaN) correlation does not — it is stored
    /// as computed.
    pub fn compute<S, F>(source: &S, cancel: &CancelToken, progress: F) -> Result<Self>
    where
        S: ProfileSource,
        F: FnMut(usize, usize),
    {
        Self::build(source, None, cancel, progress)
    }

    /// As [`compute`](Self::compute), attaching one label per item.
    pub fn compute_labeled<S, F>(
        source: &S,
        labels: &[&str],
        cancel: &CancelToken,
        progress: F,
    ) -> Result<Self>
    where
        S: ProfileSource,
        F: FnMut(usize, usize),
    {
        if labels.len() != source.item_count() {
            return Err(DendraError::InvalidInput(format!(
                "SimilarityMatrix: {} labels for {} items",
                labels.len(),
                source.item_count(),
            )));
        }
        let labels = labels.iter().map(|s| s.to_string()).collect();
        Self::build(source, Some(labels), cancel, progress)
    }

    fn build<S, F>(
        source: &S,
        labels: Option<Vec<String>>,
        cancel: &CancelToken,
        mut progress: F,
    ) -> Result<Self>
    where
        S: ProfileSource,
        F: FnMut(usize, usize),
    {
        let n = source.item_count();
        if n < 2 {
            return Err(DendraError::InvalidInput(
                "SimilarityMatrix: need at least 2 items".into(),
            ));
        }
        let points = source.point_count();
        if points < 3 {
            return Err(DendraError::InvalidInput(format!(
                "SimilarityMatrix: need at least 3 measurement points, got {}",
                points,
            )));
        }

        let total = n * (n - 1) / 2;
        let mut condensed = Vec::with_capacity(total);
        let mut row_i = vec![0.0_f64; points];
        let mut row_j = vec![0.0_f64; points];

        for i in 0..n {
            for j in (i + 1)..n {
                if cancel.is_cancelled() {
                    return Err(DendraError::Cancelled);
                }
                for p in 0..points {
                    row_i[p] = source.value(i, p)?;
                    row_j[p] = source.value(j, p)?;
                }
                condensed.push(pearson(&row_i, &row_j)?);
                progress(condensed.len(), total);
            }
        }

        Ok(Self {
            condensed,
            n,
            labels,
        })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always false: construction requires at least 2 items.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of stored pairs (`len * (len - 1) / 2`).
    pub fn pair_count(&self) -> usize {
        self.condensed.len()
    }

    /// Item labels, if provided at construction.
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// The correlation between items `i` and `j`.
    ///
    /// Symmetric: `get(i, j) == get(j, i)`; the diagonal is 1.0.
    pub fn get(&self, i: usize, j: usize) -> Result<f32> {
        if i >= self.n || j >= self.n {
            return Err(DendraError::InvalidInput(format!(
                "SimilarityMatrix: index ({}, {}) out of range for {} items",
                i, j, self.n,
            )));
        }
        if i == j {
            return Ok(1.0);
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        let offset = lo * self.n - lo * (lo + 1) / 2 + (hi - lo - 1);
        Ok(self.condensed[offset])
    }

    /// Minimum and maximum finite off-diagonal correlation, for colour
    /// scaling. `None` if every stored pair is degenerate.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for &r in &self.condensed {
            if !r.is_finite() {
                continue;
            }
            range = Some(match range {
                None => (r, r),
                Some((lo, hi)) => (lo.min(r), hi.max(r)),
            });
        }
        range
    }
}

impl Summarizable for SimilarityMatrix {
    fn summary(&self) -> String {
        format!(
            "SimilarityMatrix: {} items, {} pairs",
            self.n,
            self.condensed.len(),
        )
    }
}
