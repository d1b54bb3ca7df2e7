//! Configuration builder for forest training.

use crate::dataset::FeatureView;
use crate::error::RfError;
use crate::forest::RandomForest;
use crate::generator::SplitFamily;
use crate::params::ForestParams;
use crate::split::SplitCriterion;

/// Configuration for training a randomized decision forest.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter              | Default       |
/// |------------------------|---------------|
/// | `n_trees`              | 100           |
/// | `max_depth`            | 42            |
/// | `min_samples_per_node` | 5             |
/// | `sample_reduction`     | 0.0 (bootstrap with replacement) |
/// | `split_family`         | `AxisAligned` |
/// | `criterion`            | `Gini`        |
/// | `n_proposals`          | 5             |
/// | `n_classes`            | derived from labels |
/// | `seed`                 | 42            |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) params: ForestParams,
    pub(crate) family: SplitFamily,
    pub(crate) criterion: SplitCriterion,
    pub(crate) n_proposals: usize,
    pub(crate) n_classes: Option<usize>,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: ForestParams::default(),
            family: SplitFamily::AxisAligned,
            criterion: SplitCriterion::Gini,
            n_proposals: 5,
            n_classes: None,
            seed: 42,
        }
    }

    /// Set the number of trees in the ensemble.
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.params.n_trees = n_trees;
        self
    }

    /// Set the maximum tree depth (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.params.max_depth = max_depth;
        self
    }

    /// Set the minimum subset size a node needs to attempt a split.
    #[must_use]
    pub fn with_min_samples_per_node(mut self, min_samples_per_node: usize) -> Self {
        self.params.min_samples_per_node = min_samples_per_node;
        self
    }

    /// Set the number of bootstrap draws per tree.
    ///
    /// Zero (the default) draws as many as there are training samples.
    /// Ignored when `sample_reduction` is positive.
    #[must_use]
    pub fn with_n_in_bag_samples(mut self, n_in_bag_samples: usize) -> Self {
        self.params.n_in_bag_samples = n_in_bag_samples;
        self
    }

    /// Set the without-replacement sampling fraction.
    ///
    /// When positive, each tree draws `ceil(n_samples * fraction)` distinct
    /// samples instead of a full bootstrap.
    #[must_use]
    pub fn with_sample_reduction(mut self, sample_reduction: f32) -> Self {
        self.params.sample_reduction = sample_reduction;
        self
    }

    /// Set the splitter family proposed at every node.
    #[must_use]
    pub fn with_split_family(mut self, family: SplitFamily) -> Self {
        self.family = family;
        self
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the candidates per node for the linear and quadratic families.
    #[must_use]
    pub fn with_n_proposals(mut self, n_proposals: usize) -> Self {
        self.n_proposals = n_proposals;
        self
    }

    /// Fix the class count instead of deriving it from the labels.
    ///
    /// Useful when some classes are absent from the training set.
    #[must_use]
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = Some(n_classes);
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the feature-extraction resolution recorded in the model file.
    #[must_use]
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.params.resolution = resolution;
        self
    }

    /// Set the feature-extraction radius recorded in the model file.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.params.radius = radius;
        self
    }

    /// Set the feature scale count recorded in the model file.
    #[must_use]
    pub fn with_num_scales(mut self, num_scales: i32) -> Self {
        self.params.num_scales = num_scales;
        self
    }

    /// Return the parameter block as configured so far.
    ///
    /// The data-derived counts stay zero until `fit` completes them.
    #[must_use]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a forest on the provided dataset.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `features` has zero rows |
    /// | [`RfError::LabelCountMismatch`] | label length differs from the row count |
    /// | [`RfError::LabelOutOfRange`] | a label is `>= n_classes` |
    /// | [`RfError::NonFiniteValue`] | any feature value is NaN or infinite |
    /// | [`RfError::InvalidClassCount`] and friends | the completed params block fails validation |
    pub fn fit(
        &self,
        features: &FeatureView<'_>,
        labels: &[usize],
    ) -> Result<RandomForest, RfError> {
        crate::forest::train(self, features, labels)
    }
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self::new()
    }
}
