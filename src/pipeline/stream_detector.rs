use std::collections::VecDeque;

use crate::detection::image_detector::DEFAULT_THRESHOLD;
use crate::detection::post_processor::{self, Detection};
use crate::engine::inference_engine::InferenceEngine;
use crate::pipeline::batch_assembler::{Batch, BatchAssembler};
use crate::preprocess::frame_reformatter::FrameReformatter;
use crate::shared::error::VisionError;
use crate::shared::frame::Frame;
use crate::shared::labels::LabelTable;

/// Streaming detector: reformat → batch → engine → flatten over a live
/// frame stream, preserving frame order across batch boundaries.
///
/// Evaluation is pull-based: nothing runs until the returned iterator is
/// polled, and dropping it stops all further frame consumption.
pub struct StreamDetector<E> {
    engine: E,
    labels: LabelTable,
    batch_size: usize,
    threshold: f32,
    hierarchical_threshold: f32,
}

impl<E: InferenceEngine> StreamDetector<E> {
    pub fn new(engine: E, labels: LabelTable, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be at least 1");
        Self {
            engine,
            labels,
            batch_size,
            threshold: DEFAULT_THRESHOLD,
            hierarchical_threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_thresholds(mut self, threshold: f32, hierarchical_threshold: f32) -> Self {
        self.threshold = threshold;
        self.hierarchical_threshold = hierarchical_threshold;
        self
    }

    /// Lazily detects over `frames`, yielding one detection list per
    /// frame, in frame order. The first failure ends the stream.
    pub fn detect<I>(&mut self, frames: I) -> FrameDetections<'_, E, I::IntoIter>
    where
        I: IntoIterator<Item = Frame>,
    {
        let target = self.engine.input_shape();
        FrameDetections {
            engine: &mut self.engine,
            labels: &self.labels,
            threshold: self.threshold,
            hierarchical_threshold: self.hierarchical_threshold,
            batches: BatchAssembler::new(
                FrameReformatter::new(frames.into_iter(), target),
                self.batch_size,
            ),
            ready: VecDeque::new(),
            done: false,
        }
    }
}

/// Lazy per-frame detection stream.
///
/// Frame geometry is read from the first frame the reformatter sees
/// (assumed uniform for the stream) and handed to every batched engine
/// call. Results from each batch are queued and drained one frame at a
/// time, so batch boundaries are invisible to the output ordering.
pub struct FrameDetections<'a, E, I>
where
    I: Iterator<Item = Frame>,
{
    engine: &'a mut E,
    labels: &'a LabelTable,
    threshold: f32,
    hierarchical_threshold: f32,
    batches: BatchAssembler<FrameReformatter<I>>,
    ready: VecDeque<Vec<Detection>>,
    done: bool,
}

impl<E, I> FrameDetections<'_, E, I>
where
    E: InferenceEngine,
    I: Iterator<Item = Frame>,
{
    fn run_batch(&mut self, batch: &Batch) -> Result<(), VisionError> {
        let geometry = self
            .batches
            .get_ref()
            .geometry()
            .expect("a non-empty batch implies a reformatted frame");

        let results = self.engine.detect_batch(
            batch,
            geometry,
            self.threshold,
            self.hierarchical_threshold,
        )?;
        if results.len() != batch.len() {
            return Err(VisionError::engine(format!(
                "engine returned {} detection lists for a batch of {}",
                results.len(),
                batch.len()
            )));
        }

        for raw in results {
            self.ready
                .push_back(post_processor::label_detections(raw, self.labels)?);
        }
        Ok(())
    }
}

impl<E, I> Iterator for FrameDetections<'_, E, I>
where
    E: InferenceEngine,
    I: Iterator<Item = Frame>,
{
    type Item = Result<Vec<Detection>, VisionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(detections) = self.ready.pop_front() {
                return Some(Ok(detections));
            }
            if self.done {
                return None;
            }
            match self.batches.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(batch)) => {
                    if let Err(e) = self.run_batch(&batch) {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}
