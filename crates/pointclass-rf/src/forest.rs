//! Forest training with parallel, independently seeded tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::{FeatureView, validate_labels};
use crate::error::RfError;
use crate::generator::SplitGenerator;
use crate::params::ForestParams;
use crate::tree::{BuildContext, Tree};

/// A fitted ensemble of randomized decision trees.
///
/// Owns its trees and one shared [`ForestParams`] block; both are immutable
/// after training or loading.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    pub(crate) trees: Vec<Tree>,
    pub(crate) params: ForestParams,
}

impl RandomForest {
    /// Return the parameter block the forest was trained with.
    #[must_use]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features the forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.params.n_features
    }

    /// Return the number of classes the forest distinguishes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.params.n_classes
    }

    /// Borrow the trees of the ensemble.
    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }
}

/// Derive one tree's RNG seed from the forest seed and the tree's ordinal.
///
/// A splitmix64 finalizer over the pair, so every tree's stream is fixed by
/// `(forest_seed, tree_index)` alone and parallel construction needs no
/// coordination to stay reproducible.
pub(crate) fn tree_seed(forest_seed: u64, tree_index: u64) -> u64 {
    let mut z = forest_seed
        .wrapping_add(tree_index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Draw one tree's in-bag sample indices.
///
/// With replacement when `sample_reduction` is zero, otherwise a
/// without-replacement draw of `ceil(n_samples * sample_reduction)` indices.
fn draw_in_bag(
    n_samples: usize,
    n_in_bag_samples: usize,
    sample_reduction: f32,
    rng: &mut ChaCha8Rng,
) -> Vec<usize> {
    if sample_reduction > 0.0 {
        let count = ((n_samples as f64) * f64::from(sample_reduction)).ceil() as usize;
        let count = count.clamp(1, n_samples);
        rand::seq::index::sample(rng, n_samples, count).into_vec()
    } else {
        (0..n_in_bag_samples)
            .map(|_| rng.gen_range(0..n_samples))
            .collect()
    }
}

/// Train the forest ensemble.
#[instrument(skip_all, fields(n_trees = config.params.n_trees, n_samples = features.n_samples()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &FeatureView<'_>,
    labels: &[usize],
) -> Result<RandomForest, RfError> {
    let n_samples = features.n_samples();
    if n_samples == 0 {
        return Err(RfError::EmptyDataset);
    }
    features.check_finite()?;

    let n_classes = match config.n_classes {
        Some(n) => n,
        None => labels.iter().max().copied().unwrap_or(0) + 1,
    };
    validate_labels(labels, n_samples, n_classes)?;

    // Complete the persisted block from the data, then validate it whole.
    let mut params = config.params.clone();
    params.n_classes = n_classes;
    params.n_features = features.n_features();
    params.n_samples = n_samples;
    if params.n_in_bag_samples == 0 {
        params.n_in_bag_samples = n_samples;
    }
    params.validate()?;

    info!(
        n_trees = params.n_trees,
        n_samples,
        n_features = params.n_features,
        n_classes,
        n_in_bag_samples = params.n_in_bag_samples,
        sample_reduction = params.sample_reduction,
        "training random forest"
    );

    let ctx = BuildContext {
        features,
        labels,
        n_classes,
        max_depth: params.max_depth,
        min_samples_per_node: params.min_samples_per_node,
        criterion: config.criterion,
    };

    let n_in_bag_samples = params.n_in_bag_samples;
    let sample_reduction = params.sample_reduction;
    let family = config.family;
    let n_proposals = config.n_proposals;
    let forest_seed = config.seed;

    let trees: Vec<Tree> = (0..params.n_trees)
        .into_par_iter()
        .map(|tree_index| {
            let mut rng =
                ChaCha8Rng::seed_from_u64(tree_seed(forest_seed, tree_index as u64));
            let in_bag = draw_in_bag(n_samples, n_in_bag_samples, sample_reduction, &mut rng);
            let mut generator = SplitGenerator::new(family, n_proposals);
            Tree::build(&ctx, &in_bag, &mut generator, &mut rng)
        })
        .collect();

    debug!(n_trees_trained = trees.len(), "tree training complete");

    Ok(RandomForest { trees, params })
}
