use crate::detection::post_processor::{self, Detection, LabelGroup};
use crate::engine::inference_engine::{InferenceEngine, RawDetection};
use crate::preprocess::image_normalizer::{normalize, ImageInput};
use crate::shared::error::VisionError;
use crate::shared::labels::LabelTable;

/// Default minimum confidence (55%), applied engine-side.
pub const DEFAULT_THRESHOLD: f32 = 0.55;

#[derive(Clone, Copy, Debug)]
pub struct DetectOptions {
    pub threshold: f32,
    pub hierarchical_threshold: f32,
    /// Cap on the number of label groups in grouped output.
    pub max_labels: Option<usize>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            hierarchical_threshold: DEFAULT_THRESHOLD,
            max_labels: None,
        }
    }
}

/// Single-image detector: normalize → load activations → read detections
/// rescaled to the image's original geometry → label.
pub struct ImageDetector<E> {
    engine: E,
    labels: LabelTable,
}

impl<E: InferenceEngine> ImageDetector<E> {
    pub fn new(engine: E, labels: LabelTable) -> Self {
        Self { engine, labels }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Flat detection list, one entry per raw detection, center-form boxes.
    pub fn detect(
        &mut self,
        input: ImageInput,
        options: &DetectOptions,
    ) -> Result<Vec<Detection>, VisionError> {
        let raw = self.detect_raw(input, options)?;
        post_processor::label_detections(raw, &self.labels)
    }

    /// Grouped-by-label records in the serving response shape.
    pub fn detect_grouped(
        &mut self,
        input: ImageInput,
        options: &DetectOptions,
    ) -> Result<Vec<LabelGroup>, VisionError> {
        let raw = self.detect_raw(input, options)?;
        post_processor::group_by_label(raw, &self.labels, options.max_labels)
    }

    fn detect_raw(
        &mut self,
        input: ImageInput,
        options: &DetectOptions,
    ) -> Result<Vec<RawDetection>, VisionError> {
        let (tensor, geometry) = normalize(input, self.engine.input_shape())?;
        self.engine.predict_image(&tensor)?;
        self.engine
            .detect(geometry, options.threshold, options.hierarchical_threshold)
    }
}
