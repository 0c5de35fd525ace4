use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::detection::Annotator;
use crate::error::AnnotateError;
use crate::inference::Detector;
use crate::models::{AnnotationResult, RawDetection, validate_detections};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Numbered step directory, e.g. `01_detections`.
    fn step_dir(&self, index: usize, name: &str) -> Result<PathBuf> {
        let dir = self.output_dir.join(format!("{:02}_{}", index, name));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Context shared by both stages
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Everything one run produced: the annotation plus the detector's raw output.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnnotationResult,
    pub raw_detections: Vec<RawDetection>,
}

/// Detector stage followed by the annotation stage.
///
/// The two stages only share the `RawDetection` records, so the detector can
/// be swapped for a fixed list in tests.
pub struct AnalysisPipeline {
    detector: Arc<dyn Detector>,
    annotator: Annotator,
    context: PipelineContext,
}

impl AnalysisPipeline {
    pub fn new(detector: Arc<dyn Detector>, annotator: Annotator) -> Self {
        Self {
            detector,
            annotator,
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run detection and annotation on one image.
    pub fn run(&self, image: &RgbImage) -> Result<AnalysisOutcome> {
        if let Some(debug) = &self.context.debug {
            let path = debug.step_dir(0, "input")?.join("01.png");
            image
                .save(&path)
                .map_err(AnnotateError::Encode)
                .with_context(|| format!("Failed to save debug input {}", path.display()))?;
            self.note(format!("Debug: saved {}", path.display()));
        }

        self.note(format!("Running detector: {}", self.detector.name()));
        let raw_detections = self.detector.detect(image)?;
        self.note(format!("  → {} raw detections", raw_detections.len()));

        if let Some(debug) = &self.context.debug {
            let path = debug.step_dir(1, "detections")?.join("detections.json");
            std::fs::write(&path, serde_json::to_string_pretty(&raw_detections)?)?;
            self.note(format!("Debug: saved {}", path.display()));
        }

        let detections = validate_detections(&raw_detections)?;
        let result = self.annotator.annotate(image, &detections);
        self.note(format!(
            "  → kept {} of {} (threshold {:.2})",
            result.kept_count,
            result.total_count,
            self.annotator.threshold()
        ));

        if let Some(debug) = &self.context.debug {
            let path = debug.step_dir(2, "annotated")?.join("01.png");
            result
                .save(&path)
                .with_context(|| format!("Failed to save debug output {}", path.display()))?;
            self.note(format!("Debug: saved {}", path.display()));
        }

        Ok(AnalysisOutcome {
            result,
            raw_detections,
        })
    }

    /// Progress line: logged at info level under `verbose`, debug otherwise.
    ///
    /// The CLI already lowers its filter to debug for `--verbose`, so the split
    /// only matters when the pipeline is embedded with an info-level subscriber.
    fn note(&self, msg: String) {
        if self.context.verbose {
            info!("{}", msg);
        } else {
            debug!("{}", msg);
        }
    }
}

/// Open and decode an image file as RGB8.
///
/// Unreadable or undecodable files are reported as invalid input.
pub fn load_image(path: &Path) -> Result<RgbImage, AnnotateError> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| AnnotateError::invalid_input(format!("cannot open {}: {}", path.display(), e)))?;
    let reader = reader
        .with_guessed_format()
        .map_err(|e| AnnotateError::invalid_input(format!("cannot read {}: {}", path.display(), e)))?;
    let img = reader
        .decode()
        .map_err(|e| AnnotateError::invalid_input(format!("failed to decode {}: {}", path.display(), e)))?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::StaticDetector;

    #[test]
    fn debug_dir_must_be_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("leftover.txt"), "x").unwrap();

        let pipeline = AnalysisPipeline::new(Arc::new(StaticDetector::default()), Annotator::new());
        assert!(pipeline.with_debug(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn debug_dir_is_created() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("debug");

        let pipeline = AnalysisPipeline::new(Arc::new(StaticDetector::default()), Annotator::new())
            .with_debug(target.clone())
            .unwrap();
        assert!(target.is_dir());
        assert!(pipeline.context().debug.is_some());
    }

    #[test]
    fn load_image_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scan.bmp");
        std::fs::write(&path, b"not a bitmap").unwrap();

        assert!(load_image(&path).unwrap_err().is_invalid_input());
        assert!(load_image(&dir.path().join("missing.bmp")).unwrap_err().is_invalid_input());
    }
}
