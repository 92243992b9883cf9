//! Correlation-based hierarchical clustering for the dendra viewer.
//!
//! Given a set of items each described by a numeric profile across shared
//! measurement points, this crate:
//!
//! - **Correlates** — NaN-tolerant Pearson correlation ([`pearson`])
//! - **Tabulates** — the all-vs-all pairwise table ([`SimilarityMatrix`]),
//!   computed as a cancellable background unit with progress reporting
//! - **Clusters** — greedy agglomeration with a bounded candidate cache
//!   ([`Clusterer`]) over any [`ClusterSource`], producing an immutable
//!   binary merge tree ([`ClusterNode`])
//! - **Cuts** — threshold cuts of the dendrogram into maximal sub-clusters
//!   ([`cut`], [`cut_indices`])
//!
//! The clusterer trades exactness for throughput: its candidate cache can
//! go stale between refills, so results approximate a full nearest-
//! neighbour agglomeration and merge heights are not guaranteed monotone.

pub mod cluster;
pub mod correlation;
pub mod cut;
pub mod matrix;
pub mod profile;
pub mod source;
pub mod tree;

pub use cluster::{ClusterEvent, Clusterer, ClustererConfig, DEFAULT_REFILL_FLOOR};
pub use correlation::pearson;
pub use cut::{cut, cut_indices};
pub use matrix::SimilarityMatrix;
pub use profile::{ProfileSource, ProfileTable};
pub use source::{ClusterSource, ProfileClusterSource};
pub use tree::ClusterNode;
