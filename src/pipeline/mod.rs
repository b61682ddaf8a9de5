pub mod batch_assembler;
pub mod stream_detector;
