//! Boundary to the external stenosis detector.
//!
//! Model weights and the forward pass live outside this crate. A [`Detector`]
//! only has to hand back raw `(box, score)` records for an image.

use image::RgbImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{AnnotateError, Result};
use crate::models::RawDetection;

pub trait Detector: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Run detection on one image.
    fn detect(&self, image: &RgbImage) -> Result<Vec<RawDetection>>;
}

/// Detections produced elsewhere and stored as JSON:
/// `[{"bbox": [x1, y1, x2, y2], "score": 0.93}, ...]`.
#[derive(Debug, Clone)]
pub struct JsonDetections {
    path: PathBuf,
    name: String,
}

impl JsonDetections {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("json:{}", path.display());
        Self { path, name }
    }

    /// Parse a detection list from JSON text.
    pub fn parse(text: &str) -> Result<Vec<RawDetection>> {
        serde_json::from_str(text).map_err(|e| AnnotateError::Detector(format!("malformed detection list: {}", e)))
    }
}

impl Detector for JsonDetections {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, _image: &RgbImage) -> Result<Vec<RawDetection>> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| AnnotateError::Detector(format!("{}: {}", self.path.display(), e)))?;
        let detections = Self::parse(&text)?;
        debug!(path = %self.path.display(), count = detections.len(), "loaded detections");
        Ok(detections)
    }
}

/// Returns the same detections for every image.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Vec<RawDetection>,
}

impl StaticDetector {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }
}

impl Detector for StaticDetector {
    fn name(&self) -> &str {
        "static"
    }

    fn detect(&self, _image: &RgbImage) -> Result<Vec<RawDetection>> {
        Ok(self.detections.clone())
    }
}

/// Load-once cache of detectors keyed by model location.
///
/// Owned explicitly by whoever needs it, and clearable, so tests can start
/// from an empty cache.
#[derive(Default)]
pub struct ModelRegistry {
    models: Mutex<HashMap<String, Arc<dyn Detector>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn Detector>>> {
        // A panic in another loader leaves the map itself consistent.
        self.models.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached detector for `key`, calling `loader` on first use.
    ///
    /// The returned `Arc` is cloned out so the lock is released before the
    /// caller runs the detector. A failed load caches nothing.
    pub fn get_or_load<F>(&self, key: &str, loader: F) -> Result<Arc<dyn Detector>>
    where
        F: FnOnce() -> Result<Arc<dyn Detector>>,
    {
        let mut models = self.lock();
        if let Some(model) = models.get(key) {
            debug!(key, "model registry hit");
            return Ok(model.clone());
        }

        info!(key, "loading detector");
        let model = loader()?;
        models.insert(key.to_string(), model.clone());
        Ok(model)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached detector.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn parse_reads_bbox_and_score() {
        let dets = JsonDetections::parse(r#"[{"bbox": [1, 2, 3, 4], "score": 0.5}]"#).unwrap();
        assert_eq!(dets, vec![RawDetection::new(vec![1.0, 2.0, 3.0, 4.0], 0.5)]);
    }

    #[test]
    fn parse_keeps_wrong_arity_for_later_validation() {
        let dets = JsonDetections::parse(r#"[{"bbox": [1, 2, 3], "score": 0.5}]"#).unwrap();
        assert_eq!(dets[0].bbox.len(), 3);
    }

    #[test]
    fn malformed_json_is_a_detector_error() {
        let err = JsonDetections::parse("{not json").unwrap_err();
        assert!(matches!(err, AnnotateError::Detector(_)));
    }

    #[test]
    fn missing_file_is_a_detector_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let det = JsonDetections::new(dir.path().join("missing.json"));
        let err = det.detect(&RgbImage::new(1, 1)).unwrap_err();
        assert!(matches!(err, AnnotateError::Detector(_)));
    }

    #[test]
    fn registry_loads_once_and_resets() {
        let registry = ModelRegistry::new();
        let loads = AtomicUsize::new(0);
        let loader = || -> Result<Arc<dyn Detector>> {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StaticDetector::default()))
        };

        registry.get_or_load("faster_rcnn", loader).unwrap();
        registry.get_or_load("faster_rcnn", loader).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(registry.contains("faster_rcnn"));

        registry.clear();
        assert!(registry.is_empty());
        registry.get_or_load("faster_rcnn", loader).unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let registry = ModelRegistry::new();
        let result = registry.get_or_load("broken", || Err(AnnotateError::Detector("no weights".into())));
        assert!(result.is_err());
        assert!(!registry.contains("broken"));
    }
}
