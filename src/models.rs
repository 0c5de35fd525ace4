use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnnotateError, Result};

/// Box corners in input-image pixel space.
///
/// Coordinates are kept exactly as the detector emitted them: they may be
/// fractional, negative, past the image edge, or inverted (`x1 > x2`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCoords {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoxCoords {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Signed width; negative for an inverted box.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Signed height; negative for an inverted box.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

impl TryFrom<&[f32]> for BoxCoords {
    type Error = AnnotateError;

    fn try_from(coords: &[f32]) -> Result<Self> {
        match *coords {
            [x1, y1, x2, y2] => Ok(Self::new(x1, y1, x2, y2)),
            _ => Err(AnnotateError::invalid_input(format!(
                "bounding box must have 4 coordinates, got {}",
                coords.len()
            ))),
        }
    }
}

/// One raw output unit from the upstream detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoxCoords,
    pub score: f32,
}

impl Detection {
    pub fn new(bbox: BoxCoords, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// Detection record as it arrives over the detector boundary, before the box
/// arity has been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub bbox: Vec<f32>,
    pub score: f32,
}

impl RawDetection {
    pub fn new(bbox: Vec<f32>, score: f32) -> Self {
        Self { bbox, score }
    }
}

impl TryFrom<&RawDetection> for Detection {
    type Error = AnnotateError;

    fn try_from(raw: &RawDetection) -> Result<Self> {
        Ok(Detection::new(BoxCoords::try_from(raw.bbox.as_slice())?, raw.score))
    }
}

/// Convert a whole batch of raw records. Fails on the first malformed record;
/// there is no partial conversion.
pub fn validate_detections(raw: &[RawDetection]) -> Result<Vec<Detection>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| {
            Detection::try_from(r).map_err(|e| match e {
                AnnotateError::InvalidInput(msg) => {
                    AnnotateError::InvalidInput(format!("detection #{}: {}", i + 1, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Visual confidence bucket of a kept detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// Strictly above the high-confidence cutoff. Drawn red.
    High,
    /// At or below the cutoff but above the threshold. Drawn orange.
    Medium,
}

impl ConfidenceTier {
    /// `score > cutoff` is high; a score equal to the cutoff is medium.
    pub fn classify(score: f32, cutoff: f32) -> Self {
        if score > cutoff {
            ConfidenceTier::High
        } else {
            ConfidenceTier::Medium
        }
    }
}

/// A detection that passed the confidence gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeptDetection {
    /// 1-based, assigned in original input order.
    pub label_index: usize,
    pub detection: Detection,
    pub tier: ConfidenceTier,
}

impl KeptDetection {
    pub fn score(&self) -> f32 {
        self.detection.score
    }

    pub fn label(&self) -> String {
        self.label_index.to_string()
    }
}

/// Output of one annotation call.
#[derive(Debug, Clone)]
pub struct AnnotationResult {
    /// Copy of the input with boxes and labels burned in.
    pub annotated_image: RgbImage,
    /// Number of detections before filtering.
    pub total_count: usize,
    pub kept_count: usize,
    /// Scores of kept detections, in label-index order.
    pub kept_scores: Vec<f32>,
    pub kept: Vec<KeptDetection>,
}

impl AnnotationResult {
    /// Zero detections survived the threshold. Not an error.
    pub fn is_empty(&self) -> bool {
        self.kept_count == 0
    }

    /// Write the annotated image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.annotated_image.save(path)?;
        Ok(())
    }
}

/// Stroke and text colour, plain RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const RED: Color = Color([255, 0, 0]);
    pub const ORANGE: Color = Color([255, 165, 0]);

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_arity_is_checked() {
        assert!(BoxCoords::try_from([1.0f32, 2.0, 3.0].as_slice()).is_err());
        assert!(BoxCoords::try_from([1.0f32, 2.0, 3.0, 4.0, 5.0].as_slice()).is_err());
        let b = BoxCoords::try_from([1.0f32, 2.0, 3.0, 4.0].as_slice()).unwrap();
        assert_eq!(b, BoxCoords::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn inverted_box_is_kept_as_is() {
        let b = BoxCoords::try_from([50.0f32, 50.0, 10.0, 10.0].as_slice()).unwrap();
        assert_eq!(b.x1, 50.0);
        assert!(b.is_degenerate());
        assert_eq!(b.width(), -40.0);
    }

    #[test]
    fn validation_names_the_bad_record() {
        let raw = vec![
            RawDetection::new(vec![0.0, 0.0, 1.0, 1.0], 0.8),
            RawDetection::new(vec![0.0, 0.0, 1.0], 0.8),
        ];
        let err = validate_detections(&raw).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("detection #2"));
    }

    #[test]
    fn save_failures_are_encode_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AnnotationResult {
            annotated_image: RgbImage::new(4, 4),
            total_count: 0,
            kept_count: 0,
            kept_scores: vec![],
            kept: vec![],
        };

        let err = result.save(dir.path().join("annotated.notaformat")).unwrap_err();
        assert!(matches!(err, AnnotateError::Encode(_)));

        result.save(dir.path().join("annotated.png")).unwrap();
        assert!(dir.path().join("annotated.png").is_file());
    }

    #[test]
    fn tier_boundary_is_strict() {
        assert_eq!(ConfidenceTier::classify(0.9, 0.9), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::classify(0.9000001, 0.9), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::classify(0.75, 0.9), ConfidenceTier::Medium);
    }
}
