use thiserror::Error;

/// Pipeline error taxonomy.
///
/// Every variant is unrecoverable at the point it is raised and propagates
/// to the immediate caller; the library never retries. A failure inside a
/// batch invalidates the whole batch.
#[derive(Error, Debug)]
pub enum VisionError {
    /// The source image or frame could not be read or decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// A tensor's shape disagrees with the engine's required input shape.
    /// Indicates a normalizer bug or a mis-scaled frame source.
    #[error("tensor shape {actual:?} does not match required input {expected:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        actual: Vec<usize>,
    },

    /// The engine returned a class index outside the label table. Signals a
    /// configuration mismatch between weights and labels; never coerced.
    #[error("class index {index} outside label table of {len} entries")]
    LabelIndex { index: usize, len: usize },

    /// The label table length does not match the network's output size.
    #[error("label table has {labels} entries but network output size is {outputs}")]
    LabelCount { labels: usize, outputs: usize },

    /// The caller supplied neither an image nor a raw array where one of
    /// those was expected.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Opaque failure surfaced by the inference engine; not interpreted
    /// further.
    #[error("inference engine failure: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl VisionError {
    /// Wraps an engine-side failure message.
    pub fn engine(message: impl Into<String>) -> Self {
        VisionError::Engine(message.into().into())
    }
}
