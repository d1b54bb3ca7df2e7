//! Randomized decision forest classification for point cloud features.
//!
//! Trains bagged ensembles of decision trees over flat `f32` feature
//! matrices, with axis-aligned, linear, or quadratic decision boundaries
//! at each node, parallel training via rayon, seeded reproducibility, and
//! a compact binary model format.

mod codec;
mod config;
mod confusion;
mod dataset;
mod error;
mod forest;
mod generator;
mod node;
mod params;
mod predict;
mod split;
mod splitter;
mod tree;

pub use config::RandomForestConfig;
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::FeatureView;
pub use error::RfError;
pub use forest::RandomForest;
pub use generator::SplitFamily;
pub use node::{Node, NodeIndex};
pub use params::ForestParams;
pub use predict::{ClassDistribution, ClassificationResult, Regularization};
pub use split::SplitCriterion;
pub use splitter::Splitter;
pub use tree::Tree;
