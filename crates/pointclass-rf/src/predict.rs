//! Ensemble voting and batch classification.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::confusion::ConfusionMatrix;
use crate::dataset::FeatureView;
use crate::error::RfError;
use crate::forest::RandomForest;

/// Post-classification smoothing policy.
///
/// The engine only carries the flag: smoothing itself is applied by a
/// spatial regularizer downstream, which consumes the raw per-sample
/// distributions exposed in [`ClassificationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regularization {
    /// Keep the raw ensemble votes.
    None,
    /// Request neighborhood-based smoothing from the downstream regularizer.
    LocalSmooth,
}

/// Averaged class probability distribution for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the predicted class: argmax, ties broken by lowest class id.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0usize;
        let mut best_p = f64::NEG_INFINITY;
        for (idx, &p) in self.probs.iter().enumerate() {
            if p > best_p {
                best_p = p;
                best = idx;
            }
        }
        best
    }

    /// Return the probability distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

/// Output of [`RandomForest::classify`]: predictions plus the raw ensemble
/// distributions a regularizer can post-process.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    predictions: Vec<usize>,
    distributions: Vec<ClassDistribution>,
    regularization: Regularization,
}

impl ClassificationResult {
    /// Return the predicted class per query sample.
    #[must_use]
    pub fn predictions(&self) -> &[usize] {
        &self.predictions
    }

    /// Return the raw per-sample ensemble distributions.
    #[must_use]
    pub fn distributions(&self) -> &[ClassDistribution] {
        &self.distributions
    }

    /// Return the smoothing policy requested by the caller.
    #[must_use]
    pub fn regularization(&self) -> Regularization {
        self.regularization
    }

    /// Score the predictions against known labels.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::EmptyDataset`] when there are no predictions and
    /// [`RfError::LabelCountMismatch`] when the label count differs.
    pub fn evaluate(&self, labels: &[usize], n_classes: usize) -> Result<ConfusionMatrix, RfError> {
        if labels.len() != self.predictions.len() {
            return Err(RfError::LabelCountMismatch {
                expected: self.predictions.len(),
                got: labels.len(),
            });
        }
        ConfusionMatrix::from_labels(labels, &self.predictions, n_classes)
    }
}

impl RandomForest {
    /// Return the averaged class probability distribution for one sample.
    ///
    /// Each tree contributes its leaf histogram normalized to a
    /// distribution; the ensemble result is the mean across trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len()`
    /// differs from the trained feature count.
    pub fn predict_proba(&self, sample: &[f32]) -> Result<ClassDistribution, RfError> {
        if sample.len() != self.params.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.params.n_features,
                got: sample.len(),
            });
        }

        let mut avg = vec![0.0f64; self.params.n_classes];
        for tree in &self.trees {
            let counts = tree.leaf_counts(sample);
            let total: u32 = counts.iter().sum();
            if total == 0 {
                continue;
            }
            let total = f64::from(total);
            for (acc, &c) in avg.iter_mut().zip(counts) {
                *acc += f64::from(c) / total;
            }
        }
        let n = self.trees.len() as f64;
        avg.iter_mut().for_each(|v| *v /= n);

        Ok(ClassDistribution::new(avg))
    }

    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len()`
    /// differs from the trained feature count.
    pub fn predict(&self, sample: &[f32]) -> Result<usize, RfError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when the query matrix
    /// feature count differs from the model's.
    pub fn predict_batch(&self, features: &FeatureView<'_>) -> Result<Vec<usize>, RfError> {
        self.check_query_shape(features)?;
        (0..features.n_samples())
            .into_par_iter()
            .map(|i| self.predict(features.row(i)))
            .collect()
    }

    /// Return probability distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when the query matrix
    /// feature count differs from the model's.
    pub fn predict_proba_batch(
        &self,
        features: &FeatureView<'_>,
    ) -> Result<Vec<ClassDistribution>, RfError> {
        self.check_query_shape(features)?;
        (0..features.n_samples())
            .into_par_iter()
            .map(|i| self.predict_proba(features.row(i)))
            .collect()
    }

    /// Classify a query matrix, keeping the raw distributions for a
    /// downstream regularizer.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when the query matrix
    /// feature count differs from the model's.
    pub fn classify(
        &self,
        features: &FeatureView<'_>,
        regularization: Regularization,
    ) -> Result<ClassificationResult, RfError> {
        let distributions = self.predict_proba_batch(features)?;
        let predictions = distributions
            .iter()
            .map(ClassDistribution::predicted_class)
            .collect();
        Ok(ClassificationResult {
            predictions,
            distributions,
            regularization,
        })
    }

    fn check_query_shape(&self, features: &FeatureView<'_>) -> Result<(), RfError> {
        if features.n_features() != self.params.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.params.n_features,
                got: features.n_features(),
            });
        }
        Ok(())
    }
}
