//! Binary model format.
//!
//! A model file is a [`ForestParams`] block followed by each tree in
//! pre-order, all fields native-endian:
//!
//! - params: seven `u64` counts (`n_classes`, `n_features`, `n_samples`,
//!   `n_in_bag_samples`, `max_depth`, `n_trees`, `min_samples_per_node`),
//!   then `f32 sample_reduction`, `f64 resolution`, `f64 radius`,
//!   `i32 num_scales`
//! - node: a tag byte; a leaf (`0`) is followed by `n_classes` `u32`
//!   histogram counts; a split (`1`) by a splitter tag byte, the splitter
//!   payload, the full left subtree, then the full right subtree
//! - splitter payloads: axis-aligned (`0`) is `i32` feature + `f32`
//!   threshold; linear (`1`) is `n_features` `f32` weights + `f32`
//!   threshold; quadratic (`2`) is `n_features + n_features^2` `f32`
//!   weights + `f32` threshold
//!
//! Weight vector lengths are implied by the params block, so the stream
//! carries no per-node length fields.

use std::io::{self, Write};
use std::path::Path;

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::node::{Node, NodeIndex};
use crate::params::ForestParams;
use crate::splitter::Splitter;
use crate::tree::Tree;

const TAG_LEAF: u8 = 0;
const TAG_SPLIT: u8 = 1;

const TAG_AXIS_ALIGNED: u8 = 0;
const TAG_LINEAR: u8 = 1;
const TAG_QUADRATIC: u8 = 2;

impl RandomForest {
    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::WriteModel`] when the file cannot be written.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();

        let write = |path: &Path| -> io::Result<usize> {
            let bytes = encode(self)?;
            std::fs::write(path, &bytes)?;
            Ok(bytes.len())
        };
        let size_bytes = write(path).map_err(|e| RfError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(size_bytes, n_trees = self.trees.len(), "model saved");
        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::ReadModel`] when the file cannot be read, and any
    /// of the [`RandomForest::from_bytes`] errors when its content does not
    /// decode.
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| RfError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let forest = Self::from_bytes(&bytes)?;
        debug!(
            n_trees = forest.params.n_trees,
            n_features = forest.params.n_features,
            n_classes = forest.params.n_classes,
            "model loaded"
        );
        Ok(forest)
    }

    /// Decode a model from an in-memory byte stream.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::TruncatedModel`] | the stream ends mid-decode |
    /// | [`RfError::UnknownNodeTag`] | a node tag is neither leaf nor split |
    /// | [`RfError::UnknownSplitterTag`] | a splitter tag names no known kind |
    /// | [`RfError::InvalidFeatureIndex`] | a stored feature index is out of range |
    /// | [`RfError::ModelDepthExceeded`] | a tree nests deeper than `max_depth` |
    /// | [`RfError::InvalidClassCount`] and friends | the params block fails validation |
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RfError> {
        let mut stream = bytes;
        let params = read_params(&mut stream)?;
        params.validate()?;

        // The tree count is untrusted input; grow as trees decode.
        let mut trees = Vec::new();
        for _ in 0..params.n_trees {
            trees.push(Tree::from_nodes(read_tree(&mut stream, &params)?));
        }

        Ok(RandomForest { trees, params })
    }
}

/// Encode the whole model into a byte buffer.
fn encode(forest: &RandomForest) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    write_params(&forest.params, &mut out)?;
    for tree in &forest.trees {
        write_node(tree, NodeIndex::new(0), &mut out)?;
    }
    Ok(out)
}

fn write_params<W: Write>(params: &ForestParams, out: &mut W) -> io::Result<()> {
    out.write_u64::<NativeEndian>(params.n_classes as u64)?;
    out.write_u64::<NativeEndian>(params.n_features as u64)?;
    out.write_u64::<NativeEndian>(params.n_samples as u64)?;
    out.write_u64::<NativeEndian>(params.n_in_bag_samples as u64)?;
    out.write_u64::<NativeEndian>(params.max_depth as u64)?;
    out.write_u64::<NativeEndian>(params.n_trees as u64)?;
    out.write_u64::<NativeEndian>(params.min_samples_per_node as u64)?;
    out.write_f32::<NativeEndian>(params.sample_reduction)?;
    out.write_f64::<NativeEndian>(params.resolution)?;
    out.write_f64::<NativeEndian>(params.radius)?;
    out.write_i32::<NativeEndian>(params.num_scales)?;
    Ok(())
}

fn read_params(stream: &mut &[u8]) -> Result<ForestParams, RfError> {
    Ok(ForestParams {
        n_classes: read_u64(stream)? as usize,
        n_features: read_u64(stream)? as usize,
        n_samples: read_u64(stream)? as usize,
        n_in_bag_samples: read_u64(stream)? as usize,
        max_depth: read_u64(stream)? as usize,
        n_trees: read_u64(stream)? as usize,
        min_samples_per_node: read_u64(stream)? as usize,
        sample_reduction: stream
            .read_f32::<NativeEndian>()
            .map_err(|_| RfError::TruncatedModel)?,
        resolution: stream
            .read_f64::<NativeEndian>()
            .map_err(|_| RfError::TruncatedModel)?,
        radius: stream
            .read_f64::<NativeEndian>()
            .map_err(|_| RfError::TruncatedModel)?,
        num_scales: stream
            .read_i32::<NativeEndian>()
            .map_err(|_| RfError::TruncatedModel)?,
    })
}

/// Write the subtree rooted at `root` in pre-order.
///
/// Walks with an explicit stack so stream nesting never translates into
/// call-stack nesting.
fn write_node<W: Write>(tree: &Tree, root: NodeIndex, out: &mut W) -> io::Result<()> {
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
        match &tree.nodes[idx.index()] {
            Node::Leaf { counts } => {
                out.write_u8(TAG_LEAF)?;
                for &c in counts {
                    out.write_u32::<NativeEndian>(c)?;
                }
            }
            Node::Split {
                splitter,
                left,
                right,
            } => {
                out.write_u8(TAG_SPLIT)?;
                write_splitter(splitter, out)?;
                // Left subtree is emitted first, so it is pushed last.
                stack.push(*right);
                stack.push(*left);
            }
        }
    }
    Ok(())
}

fn write_splitter<W: Write>(splitter: &Splitter, out: &mut W) -> io::Result<()> {
    match splitter {
        Splitter::AxisAligned { feature, threshold } => {
            out.write_u8(TAG_AXIS_ALIGNED)?;
            out.write_i32::<NativeEndian>(*feature as i32)?;
            out.write_f32::<NativeEndian>(*threshold)?;
        }
        Splitter::Linear { weights, threshold } => {
            out.write_u8(TAG_LINEAR)?;
            for &w in weights {
                out.write_f32::<NativeEndian>(w)?;
            }
            out.write_f32::<NativeEndian>(*threshold)?;
        }
        Splitter::Quadratic {
            weights, threshold, ..
        } => {
            out.write_u8(TAG_QUADRATIC)?;
            for &w in weights {
                out.write_f32::<NativeEndian>(w)?;
            }
            out.write_f32::<NativeEndian>(*threshold)?;
        }
    }
    Ok(())
}

/// Which parent link an arena slot decodes into.
enum Slot {
    Root,
    Left(usize),
    Right(usize),
}

/// Decode one pre-order tree stream into a node arena rooted at index 0.
///
/// Iterative with an explicit slot stack: the file's nesting depth must
/// never become call-stack depth, since both `max_depth` and the split
/// chain come from untrusted input.
fn read_tree(stream: &mut &[u8], params: &ForestParams) -> Result<Vec<Node>, RfError> {
    let mut arena = Vec::new();
    let mut pending = vec![(Slot::Root, 0usize)];

    while let Some((slot, depth)) = pending.pop() {
        let tag = read_u8(stream)?;
        let idx = arena.len();
        match tag {
            TAG_LEAF => {
                let mut counts = Vec::new();
                for _ in 0..params.n_classes {
                    counts.push(read_u32(stream)?);
                }
                arena.push(Node::Leaf { counts });
            }
            TAG_SPLIT => {
                // Splits only occur above the depth limit; the build never
                // produces one at max_depth or below it in the tree.
                if depth >= params.max_depth {
                    return Err(RfError::ModelDepthExceeded {
                        max_depth: params.max_depth,
                    });
                }
                let splitter = read_splitter(stream, params)?;
                // Child indices are patched in as each subtree decodes.
                arena.push(Node::Split {
                    splitter,
                    left: NodeIndex::new(0),
                    right: NodeIndex::new(0),
                });
                // Pre-order: the left subtree decodes next, so it is
                // pushed last.
                pending.push((Slot::Right(idx), depth + 1));
                pending.push((Slot::Left(idx), depth + 1));
            }
            tag => return Err(RfError::UnknownNodeTag { tag }),
        }
        match slot {
            Slot::Root => {}
            Slot::Left(parent) => {
                if let Node::Split { left, .. } = &mut arena[parent] {
                    *left = NodeIndex::new(idx);
                }
            }
            Slot::Right(parent) => {
                if let Node::Split { right, .. } = &mut arena[parent] {
                    *right = NodeIndex::new(idx);
                }
            }
        }
    }

    Ok(arena)
}

fn read_splitter(stream: &mut &[u8], params: &ForestParams) -> Result<Splitter, RfError> {
    let tag = read_u8(stream)?;
    match tag {
        TAG_AXIS_ALIGNED => {
            let feature = stream
                .read_i32::<NativeEndian>()
                .map_err(|_| RfError::TruncatedModel)?;
            if feature < 0 || feature as usize >= params.n_features {
                return Err(RfError::InvalidFeatureIndex {
                    feature,
                    n_features: params.n_features,
                });
            }
            Ok(Splitter::AxisAligned {
                feature: feature as usize,
                threshold: read_f32(stream)?,
            })
        }
        TAG_LINEAR => Ok(Splitter::Linear {
            weights: read_weights(stream, params.n_features)?,
            threshold: read_f32(stream)?,
        }),
        TAG_QUADRATIC => {
            let n = params.n_features;
            Ok(Splitter::Quadratic {
                n_features: n,
                weights: read_weights(stream, n + n * n)?,
                threshold: read_f32(stream)?,
            })
        }
        tag => Err(RfError::UnknownSplitterTag { tag }),
    }
}

fn read_weights(stream: &mut &[u8], count: usize) -> Result<Vec<f32>, RfError> {
    let mut weights = Vec::new();
    for _ in 0..count {
        weights.push(read_f32(stream)?);
    }
    Ok(weights)
}

fn read_u8(stream: &mut &[u8]) -> Result<u8, RfError> {
    stream.read_u8().map_err(|_| RfError::TruncatedModel)
}

fn read_u32(stream: &mut &[u8]) -> Result<u32, RfError> {
    stream
        .read_u32::<NativeEndian>()
        .map_err(|_| RfError::TruncatedModel)
}

fn read_u64(stream: &mut &[u8]) -> Result<u64, RfError> {
    stream
        .read_u64::<NativeEndian>()
        .map_err(|_| RfError::TruncatedModel)
}

fn read_f32(stream: &mut &[u8]) -> Result<f32, RfError> {
    stream
        .read_f32::<NativeEndian>()
        .map_err(|_| RfError::TruncatedModel)
}
