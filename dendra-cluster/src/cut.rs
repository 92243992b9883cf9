//! Horizontal dendrogram cuts.
//!
//! Cutting a completed tree at a similarity threshold yields the maximal
//! sub-clusters whose merge height is at or above the threshold — the
//! operation behind the viewer's draggable cut line and replicate-style
//! groupings.

use crate::tree::ClusterNode;

/// The maximal sub-clusters of `root` whose height is `>= threshold`.
///
/// Descent stops at the first node at or above the threshold, so each
/// returned node is a whole cluster, not a leaf list. The threshold is
/// clamped to the leaf height (1.0); a leaf reached during descent is
/// therefore always its own singleton cluster. Heights are not assumed
/// monotone.
pub fn cut(root: &ClusterNode, threshold: f32) -> Vec<&ClusterNode> {
    let threshold = threshold.min(ClusterNode::LEAF_HEIGHT);
    let mut clusters = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.height() >= threshold {
            clusters.push(node);
        } else if let Some((left, right)) = node.children() {
            stack.push(right);
            stack.push(left);
        }
    }
    clusters
}

/// As [`cut`], mapped to each cluster's leaf indices so callers can get
/// back to their domain items. Minimum-group-size filtering is left to the
/// caller.
pub fn cut_indices(root: &ClusterNode, threshold: f32) -> Vec<Vec<usize>> {
    cut(root, threshold)
        .into_iter()
        .map(ClusterNode::leaf_indices)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ((0, 1)@0.9, (2, 3)@0.4)@0.2
    fn sample_tree() -> ClusterNode {
        let ab = ClusterNode::merge(ClusterNode::leaf(0), ClusterNode::leaf(1), 0.9);
        let cd = ClusterNode::merge(ClusterNode::leaf(2), ClusterNode::leaf(3), 0.4);
        ClusterNode::merge(ab, cd, 0.2)
    }

    #[test]
    fn cut_at_minimum_never_splits() {
        let tree = sample_tree();
        let groups = cut_indices(&tree, -1.0);
        assert_eq!(groups, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn cut_at_maximum_isolates_every_leaf() {
        let tree = sample_tree();
        let groups = cut_indices(&tree, 1.0);
        assert_eq!(groups, vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn cut_returns_maximal_clusters() {
        let tree = sample_tree();
        let groups = cut_indices(&tree, 0.5);
        // (0,1) merged at 0.9 survives whole; (2,3) at 0.4 splits.
        assert_eq!(groups, vec![vec![0, 1], vec![2], vec![3]]);

        let clusters = cut(&tree, 0.5);
        assert!(!clusters[0].is_leaf());
        assert_eq!(clusters[0].height(), 0.9);
    }

    #[test]
    fn threshold_above_leaf_height_is_clamped() {
        let tree = sample_tree();
        assert_eq!(cut(&tree, 5.0).len(), 4);
    }

    #[test]
    fn cut_handles_non_monotone_heights() {
        // A child merged at a *higher* similarity than its parent's
        // sibling subtree; cache staleness can produce this.
        let inner = ClusterNode::merge(ClusterNode::leaf(0), ClusterNode::leaf(1), 0.3);
        let outer = ClusterNode::merge(inner, ClusterNode::leaf(2), 0.6);
        // The outer node qualifies even though a descendant is below
        // threshold: descent stops there.
        assert_eq!(cut_indices(&outer, 0.5), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn cutting_a_single_leaf() {
        let leaf = ClusterNode::leaf(0);
        assert_eq!(cut_indices(&leaf, 0.0), vec![vec![0]]);
    }
}
