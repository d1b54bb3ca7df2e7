use std::path::PathBuf;

/// Errors from random forest training, classification, and model I/O.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_classes is less than 2.
    #[error("n_classes must be at least 2, got {n_classes}")]
    InvalidClassCount {
        /// The invalid class count.
        n_classes: usize,
    },

    /// Returned when n_features is zero.
    #[error("n_features must be at least 1, got {n_features}")]
    InvalidFeatureCount {
        /// The invalid feature count.
        n_features: usize,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid tree count.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid depth limit.
        max_depth: usize,
    },

    /// Returned when min_samples_per_node is zero.
    #[error("min_samples_per_node must be at least 1, got {min_samples_per_node}")]
    InvalidMinSamplesPerNode {
        /// The invalid minimum node size.
        min_samples_per_node: usize,
    },

    /// Returned when sample_reduction is outside [0.0, 1.0] or non-finite.
    #[error("sample_reduction must be in [0.0, 1.0], got {sample_reduction}")]
    InvalidSampleReduction {
        /// The invalid reduction fraction.
        sample_reduction: f32,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the flat feature buffer disagrees with the declared shape.
    #[error("feature buffer has {got} values, expected {expected} ({n_samples} samples x {n_features} features)")]
    MatrixShapeMismatch {
        /// The expected buffer length.
        expected: usize,
        /// The actual buffer length.
        got: usize,
        /// The declared sample count.
        n_samples: usize,
        /// The declared feature count.
        n_features: usize,
    },

    /// Returned when the label vector length disagrees with the sample count.
    #[error("label vector has {got} entries, expected {expected}")]
    LabelCountMismatch {
        /// The expected label count (one per sample).
        expected: usize,
        /// The actual label count.
        got: usize,
    },

    /// Returned when a training label is outside [0, n_classes).
    #[error("label {label} at sample {sample_index} is outside [0, {n_classes})")]
    LabelOutOfRange {
        /// The offending label value.
        label: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The number of classes the forest is configured for.
        n_classes: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a query matrix has a different feature count than the model.
    #[error("query input has {got} features, model expects {expected}")]
    PredictionFeatureMismatch {
        /// The feature count the model was trained on.
        expected: usize,
        /// The feature count of the query input.
        got: usize,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the model stream ends before the forest is complete.
    #[error("model stream ended unexpectedly")]
    TruncatedModel,

    /// Returned when a node tag byte is neither leaf nor split.
    #[error("unknown node tag {tag:#04x} in model stream")]
    UnknownNodeTag {
        /// The unrecognized tag byte.
        tag: u8,
    },

    /// Returned when a splitter tag byte names no known splitter kind.
    #[error("unknown splitter tag {tag:#04x} in model stream")]
    UnknownSplitterTag {
        /// The unrecognized tag byte.
        tag: u8,
    },

    /// Returned when a stored feature index is outside the model's feature range.
    #[error("stored feature index {feature} is outside [0, {n_features})")]
    InvalidFeatureIndex {
        /// The stored feature index.
        feature: i32,
        /// The feature count from the model's params block.
        n_features: usize,
    },

    /// Returned when a serialized tree nests deeper than the params block allows.
    #[error("model tree exceeds the declared max_depth of {max_depth}")]
    ModelDepthExceeded {
        /// The depth limit from the model's params block.
        max_depth: usize,
    },
}
