use serde::Serialize;

use crate::engine::inference_engine::RawDetection;
use crate::shared::error::VisionError;
use crate::shared::geometry::{CenterBox, EdgeBox};
use crate::shared::labels::LabelTable;

/// A labeled detection in flat form, bbox still in center form. Owned by
/// the caller once returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: CenterBox,
}

/// One instance inside a label group. Confidence is in percent; the box
/// is edge form.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    pub confidence: f32,
    pub bounding_box: EdgeBox,
}

/// Grouped-by-label detection record, shaped for the serving response
/// schema: `{Name, Confidence, Instances, Parents}`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelGroup {
    pub name: String,
    /// Headline confidence: the group's highest instance confidence,
    /// in percent.
    pub confidence: f32,
    pub instances: Vec<Instance>,
    pub parents: Vec<String>,
}

/// A classifier result: label and probability in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

fn resolve(labels: &LabelTable, index: usize) -> Result<String, VisionError> {
    labels
        .get(index)
        .map(str::to_string)
        .ok_or(VisionError::LabelIndex {
            index,
            len: labels.len(),
        })
}

/// Maps raw detections 1:1 to labeled detections, preserving order.
///
/// An out-of-range class index is fatal — it means the engine and the
/// label table disagree.
pub fn label_detections(
    raw: Vec<RawDetection>,
    labels: &LabelTable,
) -> Result<Vec<Detection>, VisionError> {
    raw.into_iter()
        .map(|d| {
            Ok(Detection {
                label: resolve(labels, d.class_index)?,
                confidence: d.confidence,
                bbox: d.bbox,
            })
        })
        .collect()
}

/// Groups raw detections by class index into per-label records.
///
/// Instances within a group are sorted by confidence descending and
/// carry edge-form boxes; the group's headline confidence is its best
/// instance's. Confidences are reported in percent. When `max_labels`
/// is set, only the first N groups survive.
pub fn group_by_label(
    raw: Vec<RawDetection>,
    labels: &LabelTable,
    max_labels: Option<usize>,
) -> Result<Vec<LabelGroup>, VisionError> {
    let mut sorted = raw;
    sorted.sort_by_key(|d| d.class_index);

    let mut groups = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let class_index = sorted[start].class_index;
        let mut end = start;
        while end < sorted.len() && sorted[end].class_index == class_index {
            end += 1;
        }

        let name = resolve(labels, class_index)?;
        let mut members: Vec<&RawDetection> = sorted[start..end].iter().collect();
        members.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let instances: Vec<Instance> = members
            .iter()
            .map(|d| Instance {
                confidence: d.confidence * 100.0,
                bounding_box: d.bbox.to_edge(),
            })
            .collect();
        let headline = instances[0].confidence;

        groups.push(LabelGroup {
            name,
            confidence: headline,
            instances,
            parents: Vec::new(),
        });
        start = end;
    }

    if let Some(cap) = max_labels {
        groups.truncate(cap);
    }
    Ok(groups)
}

/// Ranks `(label, probability)` pairs by probability descending and
/// keeps the top `k` when a positive cap is given; otherwise all pairs
/// are returned.
pub fn top_k(labels: &LabelTable, probabilities: &[f32], top: Option<usize>) -> Vec<Classification> {
    let mut ranked: Vec<Classification> = labels
        .iter()
        .zip(probabilities.iter())
        .map(|(label, &confidence)| Classification {
            label: label.to_string(),
            confidence,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(k) = top.filter(|&k| k > 0) {
        ranked.truncate(k);
    }
    ranked
}
