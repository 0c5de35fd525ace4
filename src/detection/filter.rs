use crate::models::{ConfidenceTier, Detection, KeptDetection};

/// Keep detections scoring at or above `threshold`, numbering the survivors
/// from 1 in their original order.
pub fn filter_by_confidence(
    detections: &[Detection],
    threshold: f32,
    high_confidence_cutoff: f32,
) -> Vec<KeptDetection> {
    detections
        .iter()
        .filter(|d| d.score >= threshold)
        .enumerate()
        .map(|(i, d)| KeptDetection {
            label_index: i + 1,
            detection: *d,
            tier: ConfidenceTier::classify(d.score, high_confidence_cutoff),
        })
        .collect()
}
