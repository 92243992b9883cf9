//! Cluster similarity sources.
//!
//! [`ClusterSource`] decouples the agglomeration algorithm from what is
//! being clustered: it reports how many base items exist and the similarity
//! between two arbitrary index sets (already-merged clusters).
//! [`ProfileClusterSource`] is the default domain implementation, averaging
//! memoised pairwise Pearson correlations between the two sets.

use std::sync::{Mutex, PoisonError};

use dendra_core::Result;

use crate::correlation::pearson;
use crate::profile::ProfileSource;

/// What the clusterer needs to know about the items it is grouping.
///
/// `Send + Sync` because a source is handed to a background run and shared
/// by the parallel candidate-refill scan.
pub trait ClusterSource: Send + Sync {
    /// Number of base items to cluster.
    fn len(&self) -> usize;

    /// True if there is nothing to cluster.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Similarity between two disjoint sets of base-item indices.
    ///
    /// An `Err` here aborts a clustering run; implementations should
    /// recover from per-pair data problems internally and reserve errors
    /// for structural failures.
    fn similarity(&self, a: &[usize], b: &[usize]) -> Result<f32>;

    /// Theoretical minimum of the metric.
    fn min_value(&self) -> f32;

    /// Theoretical maximum of the metric.
    fn max_value(&self) -> f32;
}

/// Pair state in the memo: not yet computed, or computed (possibly to an
/// unusable NaN, which stays cached so degenerate pairs are not retried).
type Memo = Mutex<Vec<Option<f32>>>;

/// Clusters items by the mean pairwise Pearson correlation of their
/// profiles.
///
/// Base-item correlations are computed on first use and memoised. A pair
/// whose correlation is degenerate, or whose underlying values cannot be
/// fetched, is excluded from the average; if no pair in a comparison is
/// usable the similarity is a neutral `0.0`, never NaN and never an error.
#[derive(Debug)]
pub struct ProfileClusterSource<S> {
    source: S,
    n: usize,
    memo: Memo,
}

impl<S: ProfileSource> ProfileClusterSource<S> {
    pub fn new(source: S) -> Self {
        let n = source.item_count();
        Self {
            source,
            n,
            memo: Mutex::new(vec![None; n * n]),
        }
    }

    /// The underlying profile source.
    pub fn profiles(&self) -> &S {
        &self.source
    }

    /// Memoised base-pair correlation; NaN marks an unusable pair.
    fn pair_value(&self, i: usize, j: usize) -> f32 {
        if let Some(r) = self.lock_memo()[i * self.n + j] {
            return r;
        }

        // A fetch failure affects only this pair: record it as unusable
        // rather than failing the whole cluster comparison.
        let r = match (self.source.profile(i), self.source.profile(j)) {
            (Ok(a), Ok(b)) => pearson(&a, &b).unwrap_or(f32::NAN),
            _ => f32::NAN,
        };

        let mut memo = self.lock_memo();
        memo[i * self.n + j] = Some(r);
        memo[j * self.n + i] = Some(r);
        r
    }

    fn lock_memo(&self) -> std::sync::MutexGuard<'_, Vec<Option<f32>>> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: ProfileSource + Send + Sync> ClusterSource for ProfileClusterSource<S> {
    fn len(&self) -> usize {
        self.n
    }

    fn similarity(&self, a: &[usize], b: &[usize]) -> Result<f32> {
        let mut sum = 0.0_f64;
        let mut count = 0_usize;

        for &i in a {
            for &j in b {
                let r = self.pair_value(i, j);
                if r.is_finite() {
                    sum += f64::from(r);
                    count += 1;
                }
            }
        }

        if count == 0 {
            // No usable pair between the two sets: neutral, not NaN.
            return Ok(0.0);
        }
        Ok((sum / count as f64) as f32)
    }

    fn min_value(&self) -> f32 {
        -1.0
    }

    fn max_value(&self) -> f32 {
        1.0
    }
}
