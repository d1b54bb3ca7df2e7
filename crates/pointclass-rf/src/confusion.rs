//! Confusion matrix and per-class classification metrics.

use std::fmt;

use crate::error::RfError;

/// A confusion matrix for multi-class classification.
///
/// Entry `[true_class][predicted_class]` counts how many samples with the
/// given true label received the given prediction.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    /// The class index.
    pub class: usize,
    /// Precision: TP / (TP + FP). 0.0 if nothing was predicted as this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if the class has no true samples.
    pub recall: f64,
    /// F1: harmonic mean of precision and recall. 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::EmptyDataset`] when no labels are provided,
    /// [`RfError::LabelCountMismatch`] when the two slices differ in
    /// length, and [`RfError::LabelOutOfRange`] when a label or prediction
    /// is `>= n_classes`.
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if predicted.len() != true_labels.len() {
            return Err(RfError::LabelCountMismatch {
                expected: true_labels.len(),
                got: predicted.len(),
            });
        }
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (i, (&t, &p)) in true_labels.iter().zip(predicted.iter()).enumerate() {
            if t.max(p) >= n_classes {
                return Err(RfError::LabelOutOfRange {
                    label: t.max(p),
                    sample_index: i,
                    n_classes,
                });
            }
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let mut correct = 0usize;
        let mut total = 0usize;
        for (i, row) in self.matrix.iter().enumerate() {
            correct += row[i];
            total += row.iter().sum::<usize>();
        }
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted_c: usize = (0..self.n_classes).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = if predicted_c == 0 {
                    0.0
                } else {
                    tp as f64 / predicted_c as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the underlying matrix rows, true class major.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_classes {
            write!(f, "{:>8}", format!("pred{j}"))?;
        }
        writeln!(f)?;
        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "{:>8}", format!("true{i}"))?;
            for val in row {
                write!(f, "{val:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let labels = vec![0, 0, 1, 1, 2, 2];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, 3).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);

        for m in cm.class_metrics() {
            assert!((m.precision - 1.0).abs() < f64::EPSILON);
            assert!((m.recall - 1.0).abs() < f64::EPSILON);
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
            assert_eq!(m.support, 2);
        }
    }

    #[test]
    fn known_confusion_matrix() {
        let true_labels = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let predicted = vec![0, 0, 1, 1, 1, 2, 2, 2, 0];
        let cm = ConfusionMatrix::from_labels(&true_labels, &predicted, 3).unwrap();

        // Every class: TP=2, FP=1, FN=1.
        let metrics = cm.class_metrics();
        for m in &metrics {
            assert!((m.precision - 2.0 / 3.0).abs() < 1e-10);
            assert!((m.recall - 2.0 / 3.0).abs() < 1e-10);
            assert_eq!(m.support, 3);
        }
        assert!((cm.accuracy() - 6.0 / 9.0).abs() < 1e-10);
    }

    #[test]
    fn empty_labels_error() {
        let err = ConfusionMatrix::from_labels(&[], &[], 3).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn mismatched_lengths_error() {
        let err = ConfusionMatrix::from_labels(&[0, 1, 1], &[0, 1], 2).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelCountMismatch {
                expected: 3,
                got: 2,
            }
        ));
    }

    #[test]
    fn out_of_range_prediction_error() {
        let err = ConfusionMatrix::from_labels(&[0, 1], &[0, 5], 2).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelOutOfRange {
                label: 5,
                sample_index: 1,
                n_classes: 2,
            }
        ));
    }

    #[test]
    fn as_rows_returns_matrix() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 1], &[0, 1, 0, 1], 2).unwrap();
        assert_eq!(cm.as_rows()[0], vec![1, 1]);
        assert_eq!(cm.as_rows()[1], vec![1, 1]);
    }

    #[test]
    fn zero_support_class_metrics() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 1], &[0, 0, 1, 1], 3).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[2].support, 0);
        assert!((metrics[2].recall - 0.0).abs() < f64::EPSILON);
        assert!((metrics[2].f1 - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_formatting() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2).unwrap();
        let output = format!("{cm}");
        assert!(output.contains("pred1"));
        assert!(output.contains("true0"));
    }
}
