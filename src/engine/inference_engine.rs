use std::path::Path;

use crate::pipeline::batch_assembler::Batch;
use crate::preprocess::Tensor;
use crate::shared::error::VisionError;
use crate::shared::geometry::{CenterBox, ImageGeometry};

/// One detection as the engine reports it: class index into the label
/// table, confidence in `[0, 1]`, and a center-form box already rescaled
/// to source-image coordinates.
///
/// Ephemeral — produced by the engine, consumed immediately by
/// post-processing.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDetection {
    pub class_index: usize,
    pub confidence: f32,
    pub bbox: CenterBox,
}

/// Capability interface for the native inference engine.
///
/// The handle is stateful: `predict_image` loads a tensor's activations
/// and `detect` reads detections out of them, so the two calls pair up.
/// A handle is not safe to share across concurrent callers without
/// external synchronization, hence `&mut self` throughout.
pub trait InferenceEngine: Send {
    /// Required input dimensions, `(width, height)`.
    fn input_shape(&self) -> (u32, u32);

    /// Number of output classes.
    fn output_size(&self) -> usize;

    /// Loads a single tensor's activations and returns the raw class
    /// probability vector, one score per class.
    fn predict_image(&mut self, tensor: &Tensor) -> Result<Vec<f32>, VisionError>;

    /// Runs the network on an already-flattened input vector.
    fn predict(&mut self, flat: &[f32]) -> Result<Vec<f32>, VisionError>;

    /// Reads detections from the last loaded activations, rescaled to
    /// `frame_size` coordinates. Detections below `threshold` are dropped
    /// engine-side.
    fn detect(
        &mut self,
        frame_size: ImageGeometry,
        threshold: f32,
        hierarchical_threshold: f32,
    ) -> Result<Vec<RawDetection>, VisionError>;

    /// Runs one forward pass over a whole batch and returns one detection
    /// list per tensor, in batch order.
    fn detect_batch(
        &mut self,
        batch: &Batch,
        frame_size: ImageGeometry,
        threshold: f32,
        hierarchical_threshold: f32,
    ) -> Result<Vec<Vec<RawDetection>>, VisionError>;
}

/// Constructs engine handles from persisted network artifacts.
pub trait LoadEngine {
    type Engine: InferenceEngine;

    fn load(
        &self,
        config: &Path,
        weights: &Path,
        batch_size: usize,
    ) -> Result<Self::Engine, VisionError>;
}
