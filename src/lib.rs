//! Detection and classification pipeline around a native darknet-style
//! inference engine.
//!
//! The engine itself (weight loading, forward pass, NMS) lives behind the
//! [`engine::inference_engine::InferenceEngine`] trait; this crate owns
//! everything around it: image-to-tensor normalization, lazy batch assembly
//! over frame streams, and post-processing of raw detections into labeled,
//! grouped, ranked results.

pub mod classification;
pub mod detection;
pub mod engine;
pub mod pipeline;
pub mod preprocess;
pub mod serving;
pub mod shared;
pub mod storage;
