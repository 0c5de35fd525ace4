use thiserror::Error;

/// Errors raised by the annotation core and its collaborators.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// Malformed image or malformed detection record. Not recoverable locally.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream detector failed to produce detections.
    #[error("detector failure: {0}")]
    Detector(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the annotated image failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

impl AnnotateError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T, E = AnnotateError> = std::result::Result<T, E>;
