use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnnotateError, Result};
use crate::models::Color;

pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_HIGH_CONFIDENCE_CUTOFF: f32 = 0.9;
pub const DEFAULT_STROKE_WIDTH: u32 = 3;
pub const DEFAULT_FONT_SIZE: u32 = 40;
pub const DEFAULT_LABEL_OFFSET: i32 = 50;

/// Rendering and filtering parameters for the annotator.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationConfig {
    /// Detections scoring below this are dropped.
    pub score_threshold: f32,
    /// Scores strictly above this are drawn in `high_color`.
    pub high_confidence_cutoff: f32,
    pub stroke_width: u32,
    /// Label glyph height in pixels.
    pub font_size: u32,
    /// Vertical distance from the box top edge up to the label origin.
    pub label_offset: i32,
    pub high_color: Color,
    pub medium_color: Color,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            high_confidence_cutoff: DEFAULT_HIGH_CONFIDENCE_CUTOFF,
            stroke_width: DEFAULT_STROKE_WIDTH,
            font_size: DEFAULT_FONT_SIZE,
            label_offset: DEFAULT_LABEL_OFFSET,
            high_color: Color::RED,
            medium_color: Color::ORANGE,
        }
    }
}

impl AnnotationConfig {
    /// Read a JSON config file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            AnnotateError::invalid_input(format!("config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.score_threshold.is_finite() {
            return Err(AnnotateError::invalid_input("score_threshold must be finite"));
        }
        if !self.high_confidence_cutoff.is_finite() {
            return Err(AnnotateError::invalid_input(
                "high_confidence_cutoff must be finite",
            ));
        }
        if self.stroke_width == 0 {
            return Err(AnnotateError::invalid_input("stroke_width must be at least 1"));
        }
        if self.font_size == 0 {
            return Err(AnnotateError::invalid_input("font_size must be at least 1"));
        }
        Ok(())
    }
}
