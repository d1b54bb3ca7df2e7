//! Borrowed, row-major views over caller-owned feature matrices.

use crate::error::RfError;

/// Read-only view of an `n_samples x n_features` row-major `f32` matrix.
///
/// The engine never owns training or query data; a `FeatureView` borrows the
/// caller's flat buffer for the duration of a train or classify call.
#[derive(Debug, Clone, Copy)]
pub struct FeatureView<'a> {
    values: &'a [f32],
    n_samples: usize,
    n_features: usize,
}

impl<'a> FeatureView<'a> {
    /// Create a view over a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::InvalidFeatureCount`] | `n_features` is zero |
    /// | [`RfError::MatrixShapeMismatch`] | `values.len() != n_samples * n_features` |
    pub fn new(values: &'a [f32], n_samples: usize, n_features: usize) -> Result<Self, RfError> {
        if n_features == 0 {
            return Err(RfError::InvalidFeatureCount { n_features });
        }
        let expected = n_samples * n_features;
        if values.len() != expected {
            return Err(RfError::MatrixShapeMismatch {
                expected,
                got: values.len(),
                n_samples,
                n_features,
            });
        }
        Ok(Self {
            values,
            n_samples,
            n_features,
        })
    }

    /// Return the feature row for one sample.
    #[must_use]
    pub fn row(&self, sample_index: usize) -> &'a [f32] {
        let start = sample_index * self.n_features;
        &self.values[start..start + self.n_features]
    }

    /// Return the number of samples (rows).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Return the number of features (columns).
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Verify that every value referenced by the view is finite.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::NonFiniteValue`] for the first NaN or infinity found.
    pub(crate) fn check_finite(&self) -> Result<(), RfError> {
        for (i, &v) in self.values.iter().enumerate() {
            if !v.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index: i / self.n_features,
                    feature_index: i % self.n_features,
                });
            }
        }
        Ok(())
    }
}

/// Validate a label vector against the sample count and class range.
pub(crate) fn validate_labels(
    labels: &[usize],
    n_samples: usize,
    n_classes: usize,
) -> Result<(), RfError> {
    if labels.len() != n_samples {
        return Err(RfError::LabelCountMismatch {
            expected: n_samples,
            got: labels.len(),
        });
    }
    for (sample_index, &label) in labels.iter().enumerate() {
        if label >= n_classes {
            return Err(RfError::LabelOutOfRange {
                label,
                sample_index,
                n_classes,
            });
        }
    }
    Ok(())
}
