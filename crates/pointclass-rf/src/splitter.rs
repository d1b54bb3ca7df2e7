//! Fitted binary decision boundaries over feature vectors.

use crate::dataset::FeatureView;

/// A fitted decision boundary: samples projecting above the threshold go
/// right, the rest go left.
///
/// The three kinds trade evaluation cost for expressiveness: axis-aligned
/// splitters compare a single feature, linear splitters a random weighted
/// sum of all features, quadratic splitters additionally weight every
/// pairwise feature product. A splitter is immutable once its threshold has
/// been fitted and is owned exclusively by the tree node holding it.
#[derive(Debug, Clone, PartialEq)]
pub enum Splitter {
    /// Compare one feature against the threshold.
    AxisAligned {
        /// Feature column to compare.
        feature: usize,
        /// Fitted decision threshold.
        threshold: f32,
    },
    /// Compare a weighted sum of all features against the threshold.
    Linear {
        /// One weight per feature.
        weights: Vec<f32>,
        /// Fitted decision threshold.
        threshold: f32,
    },
    /// Compare a weighted sum of features and all pairwise feature products
    /// against the threshold.
    Quadratic {
        /// Feature count; the weight vector has `n_features + n_features^2`
        /// entries, linear terms first.
        n_features: usize,
        /// Linear weights followed by the row-major pairwise product weights.
        weights: Vec<f32>,
        /// Fitted decision threshold.
        threshold: f32,
    },
}

impl Splitter {
    /// Project a feature vector to the scalar the threshold is compared against.
    #[must_use]
    pub fn project(&self, v: &[f32]) -> f32 {
        match self {
            Splitter::AxisAligned { feature, .. } => v[*feature],
            Splitter::Linear { weights, .. } => {
                let mut acc = 0.0f64;
                for (w, x) in weights.iter().zip(v) {
                    acc += f64::from(*w) * f64::from(*x);
                }
                acc as f32
            }
            Splitter::Quadratic {
                n_features,
                weights,
                ..
            } => {
                let n = *n_features;
                let mut acc = 0.0f64;
                for (w, x) in weights[..n].iter().zip(v) {
                    acc += f64::from(*w) * f64::from(*x);
                }
                let mut k = n;
                for i in 0..n {
                    let vi = f64::from(v[i]);
                    for j in 0..n {
                        acc += f64::from(weights[k]) * vi * f64::from(v[j]);
                        k += 1;
                    }
                }
                acc as f32
            }
        }
    }

    /// Classify a feature vector: `true` sends the sample right.
    #[must_use]
    pub fn classify_sample(&self, v: &[f32]) -> bool {
        self.project(v) > self.threshold()
    }

    /// Return the fitted threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        match self {
            Splitter::AxisAligned { threshold, .. }
            | Splitter::Linear { threshold, .. }
            | Splitter::Quadratic { threshold, .. } => *threshold,
        }
    }

    /// Fit the threshold chosen by the split search.
    pub(crate) fn set_threshold(&mut self, new_threshold: f32) {
        match self {
            Splitter::AxisAligned { threshold, .. }
            | Splitter::Linear { threshold, .. }
            | Splitter::Quadratic { threshold, .. } => *threshold = new_threshold,
        }
    }

    /// Project every listed sample, pairing each scalar with its class.
    ///
    /// Output order matches `sample_indices`; used only while fitting the
    /// threshold.
    pub(crate) fn map_points(
        &self,
        features: &FeatureView<'_>,
        labels: &[usize],
        sample_indices: &[usize],
    ) -> Vec<(f32, usize)> {
        sample_indices
            .iter()
            .map(|&si| (self.project(features.row(si)), labels[si]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Splitter;
    use crate::dataset::FeatureView;

    #[test]
    fn axis_aligned_projects_feature() {
        let splitter = Splitter::AxisAligned {
            feature: 1,
            threshold: 0.0,
        };
        assert_eq!(splitter.project(&[5.0, 7.0, 9.0]), 7.0);
    }

    #[test]
    fn axis_aligned_threshold_is_exclusive() {
        let splitter = Splitter::AxisAligned {
            feature: 0,
            threshold: 2.0,
        };
        assert!(!splitter.classify_sample(&[2.0]));
        assert!(splitter.classify_sample(&[2.5]));
    }

    #[test]
    fn linear_projects_dot_product() {
        let splitter = Splitter::Linear {
            weights: vec![1.0, -2.0, 0.5],
            threshold: 0.0,
        };
        // 1*4 - 2*1 + 0.5*2 = 3
        assert!((splitter.project(&[4.0, 1.0, 2.0]) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn quadratic_projects_pairwise_products() {
        // weights: [linear: 1, 0][products: w[2]=v0*v0, w[3]=v0*v1, w[4]=v1*v0, w[5]=v1*v1]
        let splitter = Splitter::Quadratic {
            n_features: 2,
            weights: vec![1.0, 0.0, 0.0, 1.0, 0.0, 2.0],
            threshold: 0.0,
        };
        // v = [3, 2]: 1*3 + 1*(3*2) + 2*(2*2) = 3 + 6 + 8 = 17
        assert!((splitter.project(&[3.0, 2.0]) - 17.0).abs() < 1e-5);
    }

    #[test]
    fn map_points_preserves_index_order() {
        let values = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let features = FeatureView::new(&values, 3, 2).unwrap();
        let labels = [0, 1, 0];
        let splitter = Splitter::AxisAligned {
            feature: 1,
            threshold: 0.0,
        };
        let mapped = splitter.map_points(&features, &labels, &[2, 0]);
        assert_eq!(mapped, vec![(30.0, 0), (10.0, 0)]);
    }

    #[test]
    fn set_threshold_updates_all_kinds() {
        let mut splitter = Splitter::Linear {
            weights: vec![1.0],
            threshold: 0.0,
        };
        splitter.set_threshold(4.5);
        assert_eq!(splitter.threshold(), 4.5);
    }
}
