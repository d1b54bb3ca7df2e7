//! Split-proposal strategies: each produces a bounded stream of candidate
//! splitters for one tree node.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::dataset::FeatureView;
use crate::splitter::Splitter;

/// Which splitter kind a forest proposes at every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitFamily {
    /// Single-feature threshold splits (cheapest, the default).
    AxisAligned,
    /// Random linear combinations of all features.
    Linear,
    /// Random linear combinations plus pairwise feature products.
    Quadratic,
}

/// Candidate-splitter generator for one tree node.
///
/// A generator is transient: `init` prepares it for a node's sample subset,
/// after which `gen_proposal` may be called up to `num_proposals()` times.
/// Proposals come back with an unfitted threshold; the split search fits it.
#[derive(Debug)]
pub enum SplitGenerator {
    /// See [`AxisAlignedRandomSplitGenerator`].
    AxisAligned(AxisAlignedRandomSplitGenerator),
    /// See [`LinearSplitGenerator`].
    Linear(LinearSplitGenerator),
    /// See [`QuadraticSplitGenerator`].
    Quadratic(QuadraticSplitGenerator),
}

impl SplitGenerator {
    /// Create a generator of the given family.
    ///
    /// `n_proposals` bounds the candidates per node for the linear and
    /// quadratic families; the axis-aligned family derives its own bound
    /// from the feature count at `init` time.
    #[must_use]
    pub fn new(family: SplitFamily, n_proposals: usize) -> Self {
        match family {
            SplitFamily::AxisAligned => {
                SplitGenerator::AxisAligned(AxisAlignedRandomSplitGenerator::default())
            }
            SplitFamily::Linear => SplitGenerator::Linear(LinearSplitGenerator { n_features: 0, n_proposals }),
            SplitFamily::Quadratic => {
                SplitGenerator::Quadratic(QuadraticSplitGenerator { n_features: 0, n_proposals })
            }
        }
    }

    /// Prepare the proposal space for one node's sample subset.
    pub fn init(
        &mut self,
        features: &FeatureView<'_>,
        _sample_indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) {
        match self {
            SplitGenerator::AxisAligned(g) => g.init(features.n_features(), rng),
            SplitGenerator::Linear(g) => g.n_features = features.n_features(),
            SplitGenerator::Quadratic(g) => g.n_features = features.n_features(),
        }
    }

    /// Upper bound on the candidates this node will offer.
    #[must_use]
    pub fn num_proposals(&self) -> usize {
        match self {
            SplitGenerator::AxisAligned(g) => g.features.len(),
            SplitGenerator::Linear(g) => g.n_proposals,
            SplitGenerator::Quadratic(g) => g.n_proposals,
        }
    }

    /// Produce one unfitted candidate splitter.
    pub fn gen_proposal(&mut self, rng: &mut ChaCha8Rng) -> Splitter {
        match self {
            SplitGenerator::AxisAligned(g) => g.gen_proposal(),
            SplitGenerator::Linear(g) => Splitter::Linear {
                weights: draw_weights(g.n_features, rng),
                threshold: 0.0,
            },
            SplitGenerator::Quadratic(g) => Splitter::Quadratic {
                n_features: g.n_features,
                weights: draw_weights(g.n_features + g.n_features * g.n_features, rng),
                threshold: 0.0,
            },
        }
    }
}

/// Draw a fresh standard-normal weight vector.
fn draw_weights(len: usize, rng: &mut ChaCha8Rng) -> Vec<f32> {
    (0..len).map(|_| rng.sample(StandardNormal)).collect()
}

/// Proposes axis-aligned splits over `round(sqrt(n_features))` distinct
/// feature columns drawn uniformly at `init` time.
///
/// Proposals cycle through the drawn columns, wrapping when asked for more
/// than were selected. The working set keeps insertion order so the proposal
/// sequence is a pure function of the RNG stream.
#[derive(Debug, Default)]
pub struct AxisAlignedRandomSplitGenerator {
    features: Vec<usize>,
    cursor: usize,
}

impl AxisAlignedRandomSplitGenerator {
    fn init(&mut self, n_features: usize, rng: &mut ChaCha8Rng) {
        let target = ((n_features as f64).sqrt().round() as usize)
            .clamp(1, n_features);
        self.features.clear();
        // Rejection-sample until the required number of distinct columns is found.
        while self.features.len() < target {
            let candidate = rng.gen_range(0..n_features);
            if !self.features.contains(&candidate) {
                self.features.push(candidate);
            }
        }
        self.cursor = 0;
    }

    fn gen_proposal(&mut self) -> Splitter {
        if self.cursor == self.features.len() {
            self.cursor = 0;
        }
        let feature = self.features[self.cursor];
        self.cursor += 1;
        Splitter::AxisAligned {
            feature,
            threshold: 0.0,
        }
    }
}

/// Proposes a configured number of fresh random linear splitters per node.
#[derive(Debug)]
pub struct LinearSplitGenerator {
    n_features: usize,
    n_proposals: usize,
}

/// Proposes a configured number of fresh random quadratic splitters per node.
#[derive(Debug)]
pub struct QuadraticSplitGenerator {
    n_features: usize,
    n_proposals: usize,
}
