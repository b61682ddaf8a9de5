use ndarray::{Array4, ArrayView3, Axis};

use crate::preprocess::Tensor;
use crate::shared::error::VisionError;

/// A group of tensors concatenated along a new leading axis into one
/// contiguous `(n, channels, height, width)` buffer — the engine's
/// expected flattened input layout.
///
/// Batch order equals input-stream order; every member is a real input
/// tensor, never a padding placeholder.
#[derive(Clone, Debug)]
pub struct Batch {
    data: Array4<f32>,
}

impl Batch {
    /// Concatenates `tensors` in order. All tensors must share one shape.
    pub fn from_tensors(tensors: &[Tensor]) -> Result<Self, VisionError> {
        debug_assert!(!tensors.is_empty(), "a batch holds at least one tensor");
        let first = tensors[0].raw_dim();
        for tensor in &tensors[1..] {
            if tensor.raw_dim() != first {
                return Err(VisionError::ShapeMismatch {
                    expected: [first[0], first[1], first[2]],
                    actual: tensor.shape().to_vec(),
                });
            }
        }
        let views: Vec<_> = tensors.iter().map(|t| t.view()).collect();
        let data = ndarray::stack(Axis(0), &views).map_err(|e| VisionError::engine(e.to_string()))?;
        Ok(Self { data })
    }

    /// Number of tensors in the batch.
    pub fn len(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-tensor `(channels, height, width)` shape.
    pub fn tensor_shape(&self) -> (usize, usize, usize) {
        let shape = self.data.shape();
        (shape[1], shape[2], shape[3])
    }

    pub fn tensor(&self, index: usize) -> ArrayView3<'_, f32> {
        self.data.index_axis(Axis(0), index)
    }

    /// The whole batch as one contiguous flat buffer.
    pub fn as_slice(&self) -> &[f32] {
        self.data
            .as_slice()
            .expect("stacked batch is contiguous standard layout")
    }
}

/// Lazily groups a tensor stream into fixed-size batches, in input order.
///
/// Emits `ceil(L / batch_size)` batches for a stream of length `L`; the
/// final batch simply holds whatever remains, so nothing downstream ever
/// sees padding. The first upstream error is forwarded and the assembler
/// fuses — batching means one bad tensor would corrupt the whole batch's
/// engine call.
pub struct BatchAssembler<I> {
    tensors: I,
    batch_size: usize,
    done: bool,
}

impl<I> BatchAssembler<I> {
    pub fn new(tensors: I, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be at least 1");
        Self {
            tensors,
            batch_size,
            done: false,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.tensors
    }
}

impl<I> Iterator for BatchAssembler<I>
where
    I: Iterator<Item = Result<Tensor, VisionError>>,
{
    type Item = Result<Batch, VisionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut pending = Vec::with_capacity(self.batch_size);
        while pending.len() < self.batch_size {
            match self.tensors.next() {
                Some(Ok(tensor)) => pending.push(tensor),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => break,
            }
        }

        if pending.is_empty() {
            self.done = true;
            return None;
        }

        let batch = Batch::from_tensors(&pending);
        if batch.is_err() {
            self.done = true;
        }
        Some(batch)
    }
}
