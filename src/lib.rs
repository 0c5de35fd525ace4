pub mod config;
pub mod detection;
pub mod error;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod report;

pub use config::AnnotationConfig;
pub use detection::{Annotator, annotate};
pub use error::{AnnotateError, Result};
pub use inference::{Detector, JsonDetections, ModelRegistry, StaticDetector};
pub use models::{
    AnnotationResult, BoxCoords, Color, ConfidenceTier, Detection, KeptDetection, RawDetection,
};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, load_image};
pub use report::{Briefing, ScoreRow};
