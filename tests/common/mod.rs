mod fixtures;
pub use fixtures::*;

// Re-export commonly used types for tests; not every test file uses all of them
#[allow(unused_imports)]
pub use stenosis_annotate::{AnnotateError, AnnotationResult, Annotator, Detection, RawDetection, annotate};
