pub mod image_detector;
pub mod post_processor;
