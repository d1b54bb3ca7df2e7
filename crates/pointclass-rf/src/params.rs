//! The persisted forest parameter block.

use crate::error::RfError;

/// Parameters of a trained forest, persisted verbatim in the model file.
///
/// The counts (`n_classes`, `n_features`, `n_samples`, `n_in_bag_samples`)
/// are filled in from the training data at fit time. `resolution`, `radius`,
/// and `num_scales` describe the feature-extraction geometry of the point
/// cloud pipeline; the forest algorithm never reads them, they are carried
/// only so a model file records how its features were computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    /// Number of classes the forest distinguishes.
    pub n_classes: usize,
    /// Number of features per sample.
    pub n_features: usize,
    /// Number of training samples the forest was fitted on.
    pub n_samples: usize,
    /// Number of bootstrap draws per tree (0 means "same as n_samples").
    pub n_in_bag_samples: usize,
    /// Maximum tree depth; the root is at depth 0.
    pub max_depth: usize,
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Subsets smaller than this become leaves without a split search.
    pub min_samples_per_node: usize,
    /// When positive, each tree draws this fraction of samples without
    /// replacement instead of a full bootstrap.
    pub sample_reduction: f32,
    /// Point cloud spacing the features were computed at (pass-through).
    pub resolution: f64,
    /// Neighborhood radius used during feature extraction (pass-through).
    pub radius: f64,
    /// Number of feature scales (pass-through).
    pub num_scales: i32,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_classes: 0,
            n_features: 0,
            n_samples: 0,
            n_in_bag_samples: 0,
            max_depth: 42,
            n_trees: 100,
            min_samples_per_node: 5,
            sample_reduction: 0.0,
            resolution: -1.0,
            radius: 0.6,
            num_scales: 5,
        }
    }
}

impl ForestParams {
    /// Validate a completed parameter block.
    ///
    /// Called after the data-derived counts have been filled in at fit time,
    /// and again on every block decoded from a model file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::InvalidClassCount`] | `n_classes < 2` |
    /// | [`RfError::InvalidFeatureCount`] | `n_features == 0` |
    /// | [`RfError::InvalidTreeCount`] | `n_trees == 0` |
    /// | [`RfError::InvalidMaxDepth`] | `max_depth == 0` |
    /// | [`RfError::InvalidMinSamplesPerNode`] | `min_samples_per_node == 0` |
    /// | [`RfError::InvalidSampleReduction`] | `sample_reduction` outside `[0, 1]` or non-finite |
    pub fn validate(&self) -> Result<(), RfError> {
        if self.n_classes < 2 {
            return Err(RfError::InvalidClassCount {
                n_classes: self.n_classes,
            });
        }
        if self.n_features == 0 {
            return Err(RfError::InvalidFeatureCount {
                n_features: self.n_features,
            });
        }
        if self.n_trees == 0 {
            return Err(RfError::InvalidTreeCount {
                n_trees: self.n_trees,
            });
        }
        if self.max_depth == 0 {
            return Err(RfError::InvalidMaxDepth {
                max_depth: self.max_depth,
            });
        }
        if self.min_samples_per_node == 0 {
            return Err(RfError::InvalidMinSamplesPerNode {
                min_samples_per_node: self.min_samples_per_node,
            });
        }
        if !self.sample_reduction.is_finite()
            || self.sample_reduction < 0.0
            || self.sample_reduction > 1.0
        {
            return Err(RfError::InvalidSampleReduction {
                sample_reduction: self.sample_reduction,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ForestParams;
    use crate::error::RfError;

    fn completed() -> ForestParams {
        ForestParams {
            n_classes: 3,
            n_features: 8,
            n_samples: 100,
            n_in_bag_samples: 100,
            ..ForestParams::default()
        }
    }

    #[test]
    fn completed_block_is_valid() {
        assert!(completed().validate().is_ok());
    }

    #[test]
    fn single_class_rejected() {
        let params = ForestParams {
            n_classes: 1,
            ..completed()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, RfError::InvalidClassCount { n_classes: 1 }));
    }

    #[test]
    fn zero_depth_rejected() {
        let params = ForestParams {
            max_depth: 0,
            ..completed()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            RfError::InvalidMaxDepth { max_depth: 0 }
        ));
    }

    #[test]
    fn zero_trees_rejected() {
        let params = ForestParams {
            n_trees: 0,
            ..completed()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            RfError::InvalidTreeCount { n_trees: 0 }
        ));
    }

    #[test]
    fn sample_reduction_above_one_rejected() {
        let params = ForestParams {
            sample_reduction: 1.5,
            ..completed()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            RfError::InvalidSampleReduction { .. }
        ));
    }

    #[test]
    fn defaults_mirror_training_pipeline() {
        let params = ForestParams::default();
        assert_eq!(params.max_depth, 42);
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.min_samples_per_node, 5);
        assert_eq!(params.num_scales, 5);
        assert!((params.radius - 0.6).abs() < f64::EPSILON);
    }
}
