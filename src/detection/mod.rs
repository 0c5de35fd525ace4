pub mod filter;
pub mod glyphs;
pub mod render;

use image::RgbImage;
use tracing::{debug, info};

use crate::config::AnnotationConfig;
use crate::error::{AnnotateError, Result};
use crate::models::{AnnotationResult, ConfidenceTier, Detection, RawDetection, validate_detections};

/// Turns raw detector output into a numbered, colour-coded overlay.
///
/// An `Annotator` holds only its configuration, so one instance can be shared
/// across threads and reused for any number of images.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: AnnotationConfig,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AnnotationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_threshold(mut self, score_threshold: f32) -> Self {
        self.config.score_threshold = score_threshold;
        self
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    pub fn threshold(&self) -> f32 {
        self.config.score_threshold
    }

    /// Filter, number and draw already-validated detections.
    ///
    /// The input image is never touched; drawing happens on a copy.
    pub fn annotate(&self, image: &RgbImage, detections: &[Detection]) -> AnnotationResult {
        let cfg = &self.config;
        let kept = filter::filter_by_confidence(detections, cfg.score_threshold, cfg.high_confidence_cutoff);

        debug!(
            total = detections.len(),
            kept = kept.len(),
            threshold = cfg.score_threshold,
            "filtered detections"
        );

        let mut canvas = image.clone();
        for k in &kept {
            let color = match k.tier {
                ConfidenceTier::High => cfg.high_color,
                ConfidenceTier::Medium => cfg.medium_color,
            }
            .to_rgb();
            let bbox = &k.detection.bbox;

            if bbox.is_degenerate() {
                debug!(label = k.label_index, ?bbox, "drawing degenerate box as-is");
            }
            render::draw_box_outline(&mut canvas, bbox, cfg.stroke_width, color);
            render::draw_label(&mut canvas, bbox, &k.label(), cfg.label_offset, cfg.font_size, color);
        }

        let kept_scores: Vec<f32> = kept.iter().map(|k| k.score()).collect();
        AnnotationResult {
            annotated_image: canvas,
            total_count: detections.len(),
            kept_count: kept.len(),
            kept_scores,
            kept,
        }
    }

    /// Validate raw detector records, then annotate. A malformed record fails
    /// the whole call; nothing is drawn.
    pub fn annotate_raw(&self, image: &RgbImage, raw: &[RawDetection]) -> Result<AnnotationResult> {
        let detections = validate_detections(raw)?;
        Ok(self.annotate(image, &detections))
    }

    /// Decode an encoded image (PNG, BMP, JPEG, ...) and annotate it.
    pub fn annotate_encoded(&self, bytes: &[u8], raw: &[RawDetection]) -> Result<AnnotationResult> {
        let image = decode_rgb(bytes)?;
        let result = self.annotate_raw(&image, raw)?;
        info!(
            width = image.width(),
            height = image.height(),
            kept = result.kept_count,
            "annotated uploaded image"
        );
        Ok(result)
    }
}

/// One-shot annotation with the default rendering settings.
pub fn annotate(image: &RgbImage, detections: &[RawDetection], score_threshold: f32) -> Result<AnnotationResult> {
    Annotator::new()
        .with_threshold(score_threshold)
        .annotate_raw(image, detections)
}

/// Decode any supported raster format into RGB8.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| AnnotateError::invalid_input(format!("failed to decode image: {}", e)))
}
