pub mod frame_reformatter;
pub mod image_normalizer;

/// Normalized network input: channel-first `(channels, height, width)`,
/// float32 in `[0, 1]`. Produced only by the image normalizer and the
/// frame reformatter; spatial dimensions always equal the engine's
/// required input shape.
pub type Tensor = ndarray::Array3<f32>;
