//! Greedy agglomerative clustering with a bounded candidate cache.
//!
//! Repeatedly merges the two most similar live clusters until one remains,
//! keeping a sorted, capacity-bounded cache of the best-known candidate
//! pairs so that most merge steps avoid a full O(live²) rescan. The cache
//! can go stale between refills, so the produced dendrogram approximates —
//! rather than reproduces — an exact nearest-neighbour agglomeration; this
//! is the accepted trade for throughput on large item counts.
//!
//! A run is a single cooperative background task: strictly sequential
//! merges, a cancellation token checked at loop granularity, and progress
//! reported after every merge. [`Clusterer::spawn`] wraps a run in a worker
//! thread with an event channel so interactive callers never block on it.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use dendra_core::{CancelToken, DendraError, Result};

use crate::source::ClusterSource;
use crate::tree::ClusterNode;

/// Refill trigger: a full all-pairs rescan runs once the cache holds fewer
/// candidates than this. An empirical floor, not a correctness requirement.
pub const DEFAULT_REFILL_FLOOR: usize = 100;

/// Tuning knobs for the candidate cache.
///
/// The defaults reproduce the behaviour the viewer has always had; both
/// values are performance tunings with no formal justification, which is
/// why they are configuration rather than constants.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClustererConfig {
    /// Maximum retained candidates; `None` means the initial item count.
    pub cache_capacity: Option<usize>,
    /// Full-rescan trigger; see [`DEFAULT_REFILL_FLOOR`].
    pub refill_floor: usize,
}

impl Default for ClustererConfig {
    fn default() -> Self {
        Self {
            cache_capacity: None,
            refill_floor: DEFAULT_REFILL_FLOOR,
        }
    }
}

/// What a background clustering run emits over its channel.
///
/// Exactly one of the terminal events (`Completed`, `Cancelled`, `Failed`)
/// is sent per run, after any number of `Progress` events.
#[derive(Debug)]
pub enum ClusterEvent {
    /// `(items_merged_so_far, total_items)`.
    Progress(usize, usize),
    /// The run finished; here is the root of the dendrogram.
    Completed(ClusterNode),
    /// The run observed its cancellation token. No partial tree survives.
    Cancelled,
    /// The run aborted on a structural error.
    Failed(DendraError),
}

/// A candidate merge: two live arena slots and their similarity.
///
/// Slots, not node references: "drop every candidate touching cluster X"
/// is then an index comparison, and ownership of the nodes themselves
/// stays with the arena.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    a: usize,
    b: usize,
    similarity: f32,
}

/// Agglomerative clusterer over a [`ClusterSource`].
pub struct Clusterer<S> {
    source: S,
    config: ClustererConfig,
    cancel: CancelToken,
}

impl<S: ClusterSource> Clusterer<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, ClustererConfig::default())
    }

    pub fn with_config(source: S, config: ClustererConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// A handle that cancels this run when triggered; grab it before
    /// calling [`run`](Self::run) or [`spawn`](Self::spawn).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the clustering to completion on the current thread.
    ///
    /// `progress` receives `(items_merged_so_far, total_items)` after each
    /// merge. Returns the root node, `Err(Cancelled)` if the token fired,
    /// or the first structural error from the similarity source.
    pub fn run<F>(self, mut progress: F) -> Result<ClusterNode>
    where
        F: FnMut(usize, usize),
    {
        let Clusterer {
            source,
            config,
            cancel,
        } = self;

        let n = source.len();
        if n == 0 {
            return Err(DendraError::InvalidInput(
                "cannot cluster an empty item set".into(),
            ));
        }
        if n == 1 {
            return Ok(ClusterNode::leaf(0));
        }

        let capacity = config.cache_capacity.unwrap_or(n).max(1);
        let refill_floor = config.refill_floor;

        // Arena of live clusters. Merged slots are retired with `take`;
        // `members` mirrors each slot's leaf indices so similarity calls
        // never re-walk the trees.
        let mut nodes: Vec<Option<ClusterNode>> =
            (0..n).map(|i| Some(ClusterNode::leaf(i))).collect();
        let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
        let mut live: Vec<usize> = (0..n).collect();

        // Ascending by similarity; the best pair is always at the tail.
        let mut cache: Vec<Candidate> = Vec::with_capacity(capacity);

        while live.len() > 1 {
            if cancel.is_cancelled() {
                return Err(DendraError::Cancelled);
            }

            if cache.len() < refill_floor {
                refill(&source, &cancel, &mut cache, &live, &members, capacity)?;
            }

            let best = cache.pop().ok_or_else(|| {
                DendraError::Computation("candidate cache empty after a full refill".into())
            })?;

            let left = take_slot(&mut nodes, best.a)?;
            let right = take_slot(&mut nodes, best.b)?;
            let mut merged_members = take_slot(&mut members, best.a)?;
            merged_members.extend(take_slot(&mut members, best.b)?);

            let new_id = nodes.len();
            nodes.push(Some(ClusterNode::merge(left, right, best.similarity)));
            members.push(Some(merged_members));

            live.retain(|&c| c != best.a && c != best.b);
            live.push(new_id);

            // Both merged slots are dead; every candidate touching them is
            // stale.
            cache.retain(|c| {
                c.a != best.a && c.a != best.b && c.b != best.a && c.b != best.b
            });

            // Compare the new cluster against the survivors. Pointless when
            // the cache just emptied: the next iteration rebuilds it anyway.
            if !cache.is_empty() {
                extend(&source, &mut cache, new_id, &live, &members, capacity)?;
            }

            progress(n - live.len(), n);
        }

        let root_id = live[0];
        take_slot(&mut nodes, root_id)
    }

    /// Run on a worker thread, reporting through a channel.
    ///
    /// The receiver sees zero or more [`ClusterEvent::Progress`] events
    /// followed by exactly one terminal event.
    pub fn spawn(self) -> (JoinHandle<()>, Receiver<ClusterEvent>)
    where
        S: 'static,
    {
        let (tx, rx) = mpsc::channel();
        let progress_tx = tx.clone();
        let handle = thread::spawn(move || {
            let outcome = self.run(|done, total| {
                let _ = progress_tx.send(ClusterEvent::Progress(done, total));
            });
            let terminal = match outcome {
                Ok(root) => ClusterEvent::Completed(root),
                Err(DendraError::Cancelled) => ClusterEvent::Cancelled,
                Err(e) => ClusterEvent::Failed(e),
            };
            let _ = tx.send(terminal);
        });
        (handle, rx)
    }
}

/// Retire an arena slot, failing loudly if a candidate referenced a cluster
/// that is no longer live (which would mean the invalidation step is
/// broken).
fn take_slot<T>(slots: &mut [Option<T>], id: usize) -> Result<T> {
    slots
        .get_mut(id)
        .and_then(Option::take)
        .ok_or_else(|| DendraError::Computation(format!("cluster slot {} is not live", id)))
}

/// Similarity between two live clusters, sanitised for the sorted cache:
/// NaN/infinite values become the neutral 0.0 here, at the boundary where
/// similarities are produced, so the cache's ordering invariant can never
/// be poisoned.
fn cluster_similarity<S: ClusterSource>(
    source: &S,
    members: &[Option<Vec<usize>>],
    a: usize,
    b: usize,
) -> Result<f32> {
    let set_a = members_of(members, a)?;
    let set_b = members_of(members, b)?;
    let r = source.similarity(set_a, set_b)?;
    Ok(if r.is_finite() { r } else { 0.0 })
}

fn members_of(members: &[Option<Vec<usize>>], id: usize) -> Result<&[usize]> {
    members
        .get(id)
        .and_then(|m| m.as_deref())
        .ok_or_else(|| DendraError::Computation(format!("cluster slot {} has no members", id)))
}

/// Insert keeping ascending order; once full, only candidates beating the
/// current minimum get in, evicting that minimum.
fn insert_candidate(cache: &mut Vec<Candidate>, candidate: Candidate, capacity: usize) {
    debug_assert!(candidate.similarity.is_finite());
    if cache.len() >= capacity {
        if candidate.similarity <= cache[0].similarity {
            return;
        }
        cache.remove(0);
    }
    let at = cache.partition_point(|c| c.similarity < candidate.similarity);
    cache.insert(at, candidate);
}

/// Full O(live²) rescan: score every unordered pair of live clusters into
/// the cache. The expensive step the cache exists to amortise.
#[cfg(not(feature = "parallel"))]
fn refill<S: ClusterSource>(
    source: &S,
    cancel: &CancelToken,
    cache: &mut Vec<Candidate>,
    live: &[usize],
    members: &[Option<Vec<usize>>],
    capacity: usize,
) -> Result<()> {
    for (i, &a) in live.iter().enumerate() {
        for &b in &live[i + 1..] {
            if cancel.is_cancelled() {
                return Err(DendraError::Cancelled);
            }
            let similarity = cluster_similarity(source, members, a, b)?;
            insert_candidate(cache, Candidate { a, b, similarity }, capacity);
        }
    }
    Ok(())
}

/// Full O(live²) rescan, scored row-parallel. Only the similarity source is
/// read concurrently; insertion into the sorted cache stays sequential.
#[cfg(feature = "parallel")]
fn refill<S: ClusterSource>(
    source: &S,
    cancel: &CancelToken,
    cache: &mut Vec<Candidate>,
    live: &[usize],
    members: &[Option<Vec<usize>>],
    capacity: usize,
) -> Result<()> {
    use rayon::prelude::*;

    let rows: Vec<Vec<Candidate>> = live
        .par_iter()
        .enumerate()
        .map(|(i, &a)| {
            if cancel.is_cancelled() {
                return Err(DendraError::Cancelled);
            }
            live[i + 1..]
                .iter()
                .map(|&b| {
                    let similarity = cluster_similarity(source, members, a, b)?;
                    Ok(Candidate { a, b, similarity })
                })
                .collect()
        })
        .collect::<Result<_>>()?;

    for candidate in rows.into_iter().flatten() {
        insert_candidate(cache, candidate, capacity);
    }
    Ok(())
}

/// Score the freshly merged cluster against every other live cluster,
/// admitting anything above the cache's current minimum.
fn extend<S: ClusterSource>(
    source: &S,
    cache: &mut Vec<Candidate>,
    new_id: usize,
    live: &[usize],
    members: &[Option<Vec<usize>>],
    capacity: usize,
) -> Result<()> {
    for &other in live {
        if other == new_id {
            continue;
        }
        let similarity = cluster_similarity(source, members, new_id, other)?;
        let floor = match cache.first() {
            Some(c) => c.similarity,
            None => break,
        };
        if similarity > floor {
            insert_candidate(
                cache,
                Candidate {
                    a: new_id,
                    b: other,
                    similarity,
                },
                capacity,
            );
        }
    }
    Ok(())
}
