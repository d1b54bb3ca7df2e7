//! Recursive induction of a single randomized decision tree.

use rand_chacha::ChaCha8Rng;

use crate::dataset::FeatureView;
use crate::generator::SplitGenerator;
use crate::node::{Node, NodeIndex};
use crate::split::{SplitCriterion, find_best_split};

/// Shared, read-only inputs of one tree's build.
pub(crate) struct BuildContext<'a> {
    pub(crate) features: &'a FeatureView<'a>,
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) max_depth: usize,
    pub(crate) min_samples_per_node: usize,
    pub(crate) criterion: SplitCriterion,
}

/// One tree of the ensemble: an arena of nodes rooted at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
}

impl Tree {
    /// Build a tree over the given in-bag sample indices.
    pub(crate) fn build(
        ctx: &BuildContext<'_>,
        in_bag: &[usize],
        generator: &mut SplitGenerator,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut nodes = Vec::new();
        build_node(ctx, in_bag, 0, generator, rng, &mut nodes);
        Tree { nodes }
    }

    /// Assemble a tree from an already-decoded arena.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Tree { nodes }
    }

    /// Traverse from the root and return the class histogram of the leaf
    /// this sample lands in.
    pub(crate) fn leaf_counts(&self, sample: &[f32]) -> &[u32] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { counts } => return counts,
                Node::Split {
                    splitter,
                    left,
                    right,
                } => {
                    idx = if splitter.classify_sample(sample) {
                        right.index()
                    } else {
                        left.index()
                    };
                }
            }
        }
    }

    /// Return the total number of nodes (splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));
        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }
        max_depth
    }
}

/// Recursively build the subtree for one sample subset.
///
/// Returns the arena index of the node just created.
fn build_node(
    ctx: &BuildContext<'_>,
    subset: &[usize],
    depth: usize,
    generator: &mut SplitGenerator,
    rng: &mut ChaCha8Rng,
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let make_leaf = |arena: &mut Vec<Node>| -> NodeIndex {
        let mut counts = vec![0u32; ctx.n_classes];
        for &si in subset {
            counts[ctx.labels[si]] += 1;
        }
        let idx = arena.len();
        arena.push(Node::Leaf { counts });
        NodeIndex::new(idx)
    };

    if depth >= ctx.max_depth || subset.len() < ctx.min_samples_per_node {
        return make_leaf(arena);
    }

    let best = match find_best_split(
        ctx.features,
        ctx.labels,
        subset,
        ctx.n_classes,
        ctx.criterion,
        generator,
        rng,
    ) {
        Some(best) => best,
        // Covers pure subsets and all-tied projections.
        None => return make_leaf(arena),
    };

    let mut left_subset = Vec::with_capacity(subset.len() / 2);
    let mut right_subset = Vec::with_capacity(subset.len() / 2);
    for &si in subset {
        if best.splitter.classify_sample(ctx.features.row(si)) {
            right_subset.push(si);
        } else {
            left_subset.push(si);
        }
    }

    // A one-sided partition cannot make progress; fall back to a leaf.
    if left_subset.is_empty() || right_subset.is_empty() {
        return make_leaf(arena);
    }

    // Arena pattern: reserve the index, recurse, then write the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        counts: vec![0; ctx.n_classes],
    });

    let left = build_node(ctx, &left_subset, depth + 1, generator, rng, arena);
    let right = build_node(ctx, &right_subset, depth + 1, generator, rng, arena);

    arena[node_idx] = Node::Split {
        splitter: best.splitter,
        left,
        right,
    };
    NodeIndex::new(node_idx)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{BuildContext, Tree};
    use crate::dataset::FeatureView;
    use crate::generator::{SplitFamily, SplitGenerator};
    use crate::node::Node;
    use crate::split::SplitCriterion;

    fn build(
        values: &[f32],
        n_samples: usize,
        n_features: usize,
        labels: &[usize],
        n_classes: usize,
        max_depth: usize,
        min_samples_per_node: usize,
        seed: u64,
    ) -> Tree {
        let features = FeatureView::new(values, n_samples, n_features).unwrap();
        let ctx = BuildContext {
            features: &features,
            labels,
            n_classes,
            max_depth,
            min_samples_per_node,
            criterion: SplitCriterion::Gini,
        };
        let in_bag: Vec<usize> = (0..n_samples).collect();
        let mut generator = SplitGenerator::new(SplitFamily::AxisAligned, 5);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Tree::build(&ctx, &in_bag, &mut generator, &mut rng)
    }

    #[test]
    fn pure_labels_make_a_root_leaf() {
        let tree = build(&[0.0, 1.0, 2.0, 3.0], 4, 1, &[1, 1, 1, 1], 2, 42, 1, 7);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.leaf_counts(&[9.0]), &[0, 4]);
    }

    #[test]
    fn separable_data_builds_internal_root_with_pure_leaves() {
        let tree = build(&[0.0, 1.0, 2.0, 3.0], 4, 1, &[0, 0, 1, 1], 2, 2, 1, 7);
        match &tree.nodes[0] {
            Node::Split { splitter, .. } => {
                let t = splitter.threshold();
                assert!(t > 1.0 && t < 2.0, "threshold {t} not between classes");
            }
            Node::Leaf { .. } => panic!("expected an internal root"),
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_counts(&[0.5]), &[2, 0]);
        assert_eq!(tree.leaf_counts(&[2.5]), &[0, 2]);
    }

    #[test]
    fn max_depth_one_bounds_the_tree() {
        // Interleaved labels force deep splits when unconstrained.
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let labels = [0, 1, 0, 1, 0, 1, 0, 1];
        let tree = build(&values, 8, 1, &labels, 2, 1, 1, 7);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn small_subsets_stop_splitting() {
        let tree = build(&[0.0, 1.0, 2.0, 3.0], 4, 1, &[0, 0, 1, 1], 2, 42, 5, 7);
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn leaf_counts_sum_to_samples_reached() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let labels = [0, 0, 1, 1, 2, 2];
        let tree = build(&values, 6, 1, &labels, 3, 42, 1, 7);
        let total: u32 = tree
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf { counts } => Some(counts.iter().sum::<u32>()),
                Node::Split { .. } => None,
            })
            .sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn every_split_has_two_children_in_bounds() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let labels = [0, 0, 1, 1, 0, 0, 1, 1];
        let tree = build(&values, 8, 1, &labels, 2, 42, 1, 7);
        for node in &tree.nodes {
            if let Node::Split { left, right, .. } = node {
                assert!(left.index() < tree.n_nodes());
                assert!(right.index() < tree.n_nodes());
                assert_ne!(left, right);
            }
        }
    }
}
