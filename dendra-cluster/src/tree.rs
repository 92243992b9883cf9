//! Dendrogram nodes.
//!
//! A [`ClusterNode`] is either a leaf wrapping one base-item index, or an
//! internal node owning the two children it merged and the similarity at
//! which the merge happened. Nodes are immutable once constructed; the
//! completed tree for `n` items has exactly `n` leaves and `n - 1` internal
//! nodes.

use dendra_core::Summarizable;

/// One node of a binary merge tree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterNode {
    height: f32,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum NodeKind {
    Leaf(usize),
    Internal(Box<ClusterNode>, Box<ClusterNode>),
}

impl ClusterNode {
    /// Height assigned to every leaf: the maximum similarity, by
    /// convention.
    pub const LEAF_HEIGHT: f32 = 1.0;

    /// A leaf wrapping one base-item index.
    pub fn leaf(index: usize) -> Self {
        Self {
            height: Self::LEAF_HEIGHT,
            kind: NodeKind::Leaf(index),
        }
    }

    /// An internal node merging `left` and `right` at similarity `height`.
    pub fn merge(left: ClusterNode, right: ClusterNode, height: f32) -> Self {
        Self {
            height,
            kind: NodeKind::Internal(Box::new(left), Box::new(right)),
        }
    }

    /// The similarity at which this node's children were merged; 1.0 for
    /// leaves.
    ///
    /// Because the clusterer's candidate cache is an approximation, heights
    /// are not guaranteed to decrease from leaves to root.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// The wrapped item index, for leaves only.
    pub fn leaf_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf(index) => Some(index),
            NodeKind::Internal(..) => None,
        }
    }

    /// Both children, for internal nodes only.
    pub fn children(&self) -> Option<(&ClusterNode, &ClusterNode)> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal(left, right) => Some((left, right)),
        }
    }

    /// Every leaf index under this node, in left-to-right display order.
    ///
    /// Iterative with an explicit stack, so tree depth (worst case the item
    /// count) cannot overflow the call stack.
    pub fn leaf_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf(index) => indices.push(*index),
                NodeKind::Internal(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        indices
    }

    /// Number of leaves under this node.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf(_) => count += 1,
                NodeKind::Internal(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        count
    }

    /// Number of internal (merge) nodes under and including this node.
    pub fn internal_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let NodeKind::Internal(left, right) = &node.kind {
                count += 1;
                stack.push(right.as_ref());
                stack.push(left.as_ref());
            }
        }
        count
    }
}

impl Summarizable for ClusterNode {
    fn summary(&self) -> String {
        format!(
            "ClusterNode: {} leaves, {} merges, height {:.3}",
            self.leaf_count(),
            self.internal_count(),
            self.height,
        )
    }
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
    fn leaf_has_unit_height_and_its_index() {
        let leaf = ClusterNode::leaf(7);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.height(), 1.0);
        assert_eq!(leaf.leaf_index(), Some(7));
        assert!(leaf.children().is_none());
        assert_eq!(leaf.leaf_indices(), vec![7]);
    }

    #[test]
    fn internal_node_owns_both_children() {
        let tree = sample_tree();
        assert!(!tree.is_leaf());
        assert_eq!(tree.leaf_index(), None);
        let (left, right) = tree.children().unwrap();
        assert_eq!(left.height(), 0.9);
        assert_eq!(right.height(), 0.4);
    }

    #[test]
    fn leaf_indices_in_display_order() {
        assert_eq!(sample_tree().leaf_indices(), vec![0, 1, 2, 3]);

        let flipped = ClusterNode::merge(
            ClusterNode::leaf(5),
            ClusterNode::merge(ClusterNode::leaf(3), ClusterNode::leaf(4), 0.8),
            0.1,
        );
        assert_eq!(flipped.leaf_indices(), vec![5, 3, 4]);
    }

    #[test]
    fn node_counts() {
        let tree = sample_tree();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.internal_count(), 3);
    }

    #[test]
    fn deep_tree_does_not_overflow() {
        // A maximally unbalanced 10_000-leaf comb.
        let mut node = ClusterNode::leaf(0);
        for i in 1..10_000 {
            node = ClusterNode::merge(node, ClusterNode::leaf(i), 0.5);
        }
        assert_eq!(node.leaf_count(), 10_000);
        assert_eq!(node.leaf_indices().len(), 10_000);
    }

    #[test]
    fn summary_format() {
        assert_eq!(
            sample_tree().summary(),
            "ClusterNode: 4 leaves, 3 merges, height 0.200",
        );
    }
}
