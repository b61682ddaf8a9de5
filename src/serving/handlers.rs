use image::DynamicImage;
use serde::Serialize;

use crate::classification::classifier::Classifier;
use crate::detection::image_detector::{DetectOptions, ImageDetector};
use crate::detection::post_processor::LabelGroup;
use crate::engine::inference_engine::InferenceEngine;
use crate::preprocess::image_normalizer::ImageInput;
use crate::serving::ServeError;
use crate::shared::error::VisionError;

/// Default classifier result cap when the request doesn't name one.
pub const DEFAULT_CLASSIFIER_TOP: usize = 5;

/// Default minimum confidence, in percent.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 55.0;

/// A decoded request payload, resolved once from the content type.
#[derive(Debug)]
pub enum RequestBody {
    Image(DynamicImage),
    Array(Vec<f32>),
}

/// Per-request prediction knobs, mirroring the request fields
/// `MaxLabels` and `MinConfidence` (percent).
#[derive(Clone, Copy, Debug)]
pub struct PredictOptions {
    pub max_labels: Option<usize>,
    pub min_confidence: f32,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            max_labels: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Detector response: `{"Labels": [...]}`.
#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    #[serde(rename = "Labels")]
    pub labels: Vec<LabelGroup>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassScore {
    pub name: String,
    /// Percent.
    pub confidence: f32,
}

/// Classifier response: `{"Labels": [...]}`.
#[derive(Debug, Serialize)]
pub struct ClassificationResponse {
    #[serde(rename = "Labels")]
    pub labels: Vec<ClassScore>,
}

/// The `input_fn` shape: decodes a request payload by content type.
/// `image/*` bodies become bitmaps; `application/json` bodies become raw
/// float arrays.
pub fn decode_request(data: &[u8], content_type: &str) -> Result<RequestBody, ServeError> {
    if content_type.starts_with("image/") {
        let image = image::load_from_memory(data).map_err(VisionError::from)?;
        Ok(RequestBody::Image(image))
    } else if content_type == "application/json" {
        let array: Vec<f32> = serde_json::from_slice(data)?;
        Ok(RequestBody::Array(array))
    } else {
        Err(ServeError::ContentType(content_type.to_string()))
    }
}

/// The detector `predict_fn` shape. Detector models only accept images;
/// the confidence floor is applied engine-side at `min_confidence / 100`.
pub fn detect_request<E: InferenceEngine>(
    detector: &mut ImageDetector<E>,
    body: RequestBody,
    options: &PredictOptions,
) -> Result<DetectionResponse, ServeError> {
    let RequestBody::Image(image) = body else {
        return Err(
            VisionError::UnsupportedInput("detector model expects an image".to_string()).into(),
        );
    };

    let threshold = options.min_confidence / 100.0;
    let detect_options = DetectOptions {
        threshold,
        hierarchical_threshold: threshold,
        max_labels: options.max_labels,
    };
    let labels = detector.detect_grouped(ImageInput::Bitmap(image), &detect_options)?;
    Ok(DetectionResponse { labels })
}

/// The classifier `predict_fn` shape: accepts an image or a raw array.
/// `max_labels: None` applies the default cap of [`DEFAULT_CLASSIFIER_TOP`].
pub fn classify_request<E: InferenceEngine>(
    classifier: &mut Classifier<E>,
    body: RequestBody,
    max_labels: Option<usize>,
) -> Result<ClassificationResponse, ServeError> {
    let top = max_labels.or(Some(DEFAULT_CLASSIFIER_TOP));
    let ranked = match body {
        RequestBody::Image(image) => classifier.classify_image(ImageInput::Bitmap(image), top)?,
        RequestBody::Array(flat) => classifier.classify(&flat, top)?,
    };

    let labels = ranked
        .into_iter()
        .map(|c| ClassScore {
            name: c.label,
            confidence: c.confidence * 100.0,
        })
        .collect();
    Ok(ClassificationResponse { labels })
}

/// The `output_fn` shape: serializes a prediction for the accept type.
/// Only JSON is supported; `*/*` and an empty accept default to it.
pub fn encode_response<T: Serialize>(value: &T, accept: &str) -> Result<Vec<u8>, ServeError> {
    match accept {
        "application/json" | "*/*" | "" => Ok(serde_json::to_vec(value)?),
        other => Err(ServeError::ContentType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::inference_engine::RawDetection;
    use crate::pipeline::batch_assembler::Batch;
    use crate::preprocess::Tensor;
    use crate::shared::geometry::{CenterBox, ImageGeometry};
    use crate::shared::labels::LabelTable;
    use approx::assert_relative_eq;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    struct StubEngine {
        detections: Vec<RawDetection>,
        probabilities: Vec<f32>,
        last_threshold: Option<f32>,
    }

    impl StubEngine {
        fn detector(detections: Vec<RawDetection>) -> Self {
            Self {
                detections,
                probabilities: vec![],
                last_threshold: None,
            }
        }

        fn classifier(probabilities: Vec<f32>) -> Self {
            Self {
                detections: vec![],
                probabilities,
                last_threshold: None,
            }
        }
    }

    impl InferenceEngine for StubEngine {
        fn input_shape(&self) -> (u32, u32) {
            (4, 4)
        }

        fn output_size(&self) -> usize {
            self.probabilities.len()
        }

        fn predict_image(&mut self, _tensor: &Tensor) -> Result<Vec<f32>, VisionError> {
            Ok(self.probabilities.clone())
        }

        fn predict(&mut self, _flat: &[f32]) -> Result<Vec<f32>, VisionError> {
            Ok(self.probabilities.clone())
        }

        fn detect(
            &mut self,
            _frame_size: ImageGeometry,
            threshold: f32,
            _hierarchical_threshold: f32,
        ) -> Result<Vec<RawDetection>, VisionError> {
            self.last_threshold = Some(threshold);
            Ok(self.detections.clone())
        }

        fn detect_batch(
            &mut self,
            _batch: &Batch,
            _frame_size: ImageGeometry,
            _threshold: f32,
            _hierarchical_threshold: f32,
        ) -> Result<Vec<Vec<RawDetection>>, VisionError> {
            Ok(vec![])
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn raw(class_index: usize, confidence: f32) -> RawDetection {
        RawDetection {
            class_index,
            confidence,
            bbox: CenterBox::new(8.0, 8.0, 4.0, 4.0),
        }
    }

    // ── input_fn ─────────────────────────────────────────────────────

    #[test]
    fn test_decode_image_content_type() {
        let body = decode_request(&png_bytes(), "image/png").unwrap();
        assert!(matches!(body, RequestBody::Image(_)));
    }

    #[test]
    fn test_decode_json_array() {
        let body = decode_request(b"[0.1, 0.2, 0.3]", "application/json").unwrap();
        let RequestBody::Array(values) = body else {
            panic!("expected an array body");
        };
        assert_eq!(values.len(), 3);
        assert_relative_eq!(values[2], 0.3);
    }

    #[test]
    fn test_decode_unknown_content_type_rejected() {
        let err = decode_request(b"x", "text/csv").unwrap_err();
        assert!(matches!(err, ServeError::ContentType(_)));
    }

    #[test]
    fn test_decode_corrupt_image_is_decode_error() {
        let err = decode_request(b"not an image", "image/png").unwrap_err();
        assert!(matches!(err, ServeError::Vision(VisionError::Decode(_))));
    }

    // ── detector predict_fn ──────────────────────────────────────────

    #[test]
    fn test_detect_request_produces_grouped_schema() {
        let engine = StubEngine::detector(vec![raw(0, 0.9), raw(0, 0.7), raw(1, 0.6)]);
        let labels = LabelTable::from_lines("cat\ndog\n");
        let mut detector = ImageDetector::new(engine, labels);

        let body = decode_request(&png_bytes(), "image/png").unwrap();
        let response = detect_request(&mut detector, body, &PredictOptions::default()).unwrap();

        assert_eq!(response.labels.len(), 2);
        assert_eq!(response.labels[0].name, "cat");
        assert_eq!(response.labels[0].instances.len(), 2);
        assert_relative_eq!(response.labels[0].confidence, 90.0);
    }

    #[test]
    fn test_detect_request_rejects_array_body() {
        let engine = StubEngine::detector(vec![]);
        let labels = LabelTable::from_lines("cat\n");
        let mut detector = ImageDetector::new(engine, labels);

        let err = detect_request(
            &mut detector,
            RequestBody::Array(vec![0.0]),
            &PredictOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ServeError::Vision(VisionError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn test_detect_request_scales_min_confidence_to_threshold() {
        let engine = StubEngine::detector(vec![]);
        let labels = LabelTable::from_lines("cat\n");
        let mut detector = ImageDetector::new(engine, labels);

        let body = decode_request(&png_bytes(), "image/png").unwrap();
        detect_request(&mut detector, body, &PredictOptions::default()).unwrap();
        // Default MinConfidence of 55 percent reaches the engine as 0.55
        assert_relative_eq!(detector.engine().last_threshold.unwrap(), 0.55);
    }

    // ── classifier predict_fn ────────────────────────────────────────

    #[test]
    fn test_classify_request_defaults_to_top_five() {
        let engine = StubEngine::classifier(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let labels = LabelTable::from_lines("a\nb\nc\nd\ne\nf\n");
        let mut classifier = Classifier::new(engine, Some(labels)).unwrap();

        let response =
            classify_request(&mut classifier, RequestBody::Array(vec![0.0]), None).unwrap();
        assert_eq!(response.labels.len(), 5);
        assert_eq!(response.labels[0].name, "f");
        assert_relative_eq!(response.labels[0].confidence, 60.0);
    }

    #[test]
    fn test_classify_request_accepts_image_body() {
        let engine = StubEngine::classifier(vec![0.9, 0.1]);
        let labels = LabelTable::from_lines("cat\ndog\n");
        let mut classifier = Classifier::new(engine, Some(labels)).unwrap();

        let body = decode_request(&png_bytes(), "image/png").unwrap();
        let response = classify_request(&mut classifier, body, Some(1)).unwrap();
        assert_eq!(response.labels.len(), 1);
        assert_eq!(response.labels[0].name, "cat");
    }

    // ── output_fn ────────────────────────────────────────────────────

    #[test]
    fn test_encode_response_json() {
        let engine = StubEngine::detector(vec![raw(0, 0.5)]);
        let labels = LabelTable::from_lines("cat\n");
        let mut detector = ImageDetector::new(engine, labels);
        let body = decode_request(&png_bytes(), "image/png").unwrap();
        let response = detect_request(&mut detector, body, &PredictOptions::default()).unwrap();

        let bytes = encode_response(&response, "application/json").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["Labels"][0]["Name"], "cat");
        assert!(json["Labels"][0]["Instances"][0]["BoundingBox"]["Top"].is_number());
    }

    #[test]
    fn test_encode_response_rejects_unknown_accept() {
        let err = encode_response(&serde_json::json!({}), "application/x-npy").unwrap_err();
        assert!(matches!(err, ServeError::ContentType(_)));
    }
}
