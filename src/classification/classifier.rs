use crate::detection::post_processor::{top_k, Classification};
use crate::engine::inference_engine::InferenceEngine;
use crate::preprocess::image_normalizer::{normalize, ImageInput};
use crate::shared::error::VisionError;
use crate::shared::labels::LabelTable;

/// Whole-image classifier over a native network.
///
/// Accepts either a raw flattened input vector or any `ImageInput`;
/// results are `(label, probability)` pairs ranked descending, optionally
/// truncated to the top `k`.
#[derive(Debug)]
pub struct Classifier<E> {
    engine: E,
    labels: LabelTable,
}

impl<E: InferenceEngine> Classifier<E> {
    /// Builds a classifier, validating that the label table matches the
    /// network's output size. `None` falls back to numeric labels.
    pub fn new(engine: E, labels: Option<LabelTable>) -> Result<Self, VisionError> {
        let outputs = engine.output_size();
        let labels = labels.unwrap_or_else(|| LabelTable::numbered(outputs));
        if labels.len() != outputs {
            return Err(VisionError::LabelCount {
                labels: labels.len(),
                outputs,
            });
        }
        Ok(Self { engine, labels })
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Classifies an already-flattened input vector.
    pub fn classify(
        &mut self,
        flat: &[f32],
        top: Option<usize>,
    ) -> Result<Vec<Classification>, VisionError> {
        let probabilities = self.engine.predict(flat)?;
        Ok(top_k(&self.labels, &probabilities, top))
    }

    /// Normalizes an image to the network input shape and classifies it.
    /// The image's original geometry is irrelevant here — only detectors
    /// rescale boxes.
    pub fn classify_image(
        &mut self,
        input: ImageInput,
        top: Option<usize>,
    ) -> Result<Vec<Classification>, VisionError> {
        let (tensor, _) = normalize(input, self.engine.input_shape())?;
        let probabilities = self.engine.predict_image(&tensor)?;
        Ok(top_k(&self.labels, &probabilities, top))
    }
}
