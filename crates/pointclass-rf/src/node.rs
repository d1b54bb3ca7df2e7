use std::fmt;

use crate::splitter::Splitter;

/// Index into a tree's `Vec<Node>` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in a tree arena.
///
/// Trees are stored as `Vec<Node>` with [`NodeIndex`] child references
/// instead of pointers, so ownership is a strict tree and serialization is a
/// straight pre-order walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An interior node: `classify_sample` false goes left, true goes right.
    Split {
        /// The fitted decision boundary.
        splitter: Splitter,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
    },
    /// A terminal node holding the class histogram of the training samples
    /// that reached it.
    Leaf {
        /// Per-class sample counts; sums to the samples that reached the leaf.
        counts: Vec<u32>,
    },
}

impl Node {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
