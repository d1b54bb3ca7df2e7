//! Impurity criteria and the per-node best-split search.

use rand_chacha::ChaCha8Rng;

use crate::dataset::FeatureView;
use crate::generator::SplitGenerator;
use crate::splitter::Splitter;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// For `Gini`: `1 - Σ(p_i²)` where `p_i = count_i / n_samples`.
    /// For `Entropy`: `-Σ(p_i · ln(p_i))` summed only over classes where `p_i > 0`.
    /// Returns 0.0 when `n_samples` is zero.
    #[must_use]
    pub fn impurity(&self, class_counts: &[u32], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = f64::from(c) / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => {
                -class_counts
                    .iter()
                    .filter(|&&c| c > 0)
                    .map(|&c| {
                        let p = f64::from(c) / n;
                        p * p.ln()
                    })
                    .sum::<f64>()
            }
        }
    }
}

/// The winning candidate of a node's split search.
#[derive(Debug)]
pub(crate) struct BestSplit {
    /// The winning splitter with its threshold fitted.
    pub(crate) splitter: Splitter,
    /// Weighted impurity decrease of the winning boundary.
    pub(crate) gain: f64,
}

/// Search the generator's proposals for the best threshold on this subset.
///
/// Every proposal is projected over the subset, sorted, and scanned once with
/// running left/right class histograms. Boundaries between equal projected
/// values are skipped; the threshold is the midpoint of the winning adjacent
/// pair. Ties across proposals keep the first-found candidate, so the result
/// is deterministic given the generator's proposal order.
///
/// Returns `None` when no boundary yields positive gain (pure subsets,
/// constant projections).
pub(crate) fn find_best_split(
    features: &FeatureView<'_>,
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    generator: &mut SplitGenerator,
    rng: &mut ChaCha8Rng,
) -> Option<BestSplit> {
    let n_samples = sample_indices.len();
    if n_samples < 2 {
        return None;
    }

    let mut parent_counts = vec![0u32; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples);

    generator.init(features, sample_indices, rng);

    let mut best: Option<BestSplit> = None;
    for _ in 0..generator.num_proposals() {
        let mut proposal = generator.gen_proposal(rng);
        let mut mapped = proposal.map_points(features, labels, sample_indices);
        mapped.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        // Incremental scan: left grows from empty, right shrinks from full.
        let mut left_counts = vec![0u32; n_classes];
        let mut right_counts = parent_counts.clone();
        let mut best_here: Option<(f32, f64)> = None;

        for i in 0..(n_samples - 1) {
            let (val_i, class_i) = mapped[i];
            left_counts[class_i] += 1;
            right_counts[class_i] -= 1;

            // No valid threshold exists between identical values.
            let val_next = mapped[i + 1].0;
            if val_i == val_next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n_samples - n_left;
            let gain = (n_samples as f64) * parent_impurity
                - (n_left as f64) * criterion.impurity(&left_counts, n_left)
                - (n_right as f64) * criterion.impurity(&right_counts, n_right);

            if best_here.is_none_or(|(_, g)| gain > g) {
                best_here = Some(((val_i + val_next) / 2.0, gain));
            }
        }

        if let Some((threshold, gain)) = best_here
            && gain > 0.0
            && best.as_ref().is_none_or(|b| gain > b.gain)
        {
            proposal.set_threshold(threshold);
            best = Some(BestSplit {
                splitter: proposal,
                gain,
            });
        }
    }

    best
}
