use image::{ImageBuffer, Rgb, RgbImage};
use stenosis_annotate::RawDetection;
use tempfile::NamedTempFile;

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const ORANGE: Rgb<u8> = Rgb([255, 165, 0]);

/// A 200x200 gradient, so every pixel differs from both annotation colours.
pub fn angiogram() -> RgbImage {
    ImageBuffer::from_fn(200, 200, |x, y| Rgb([(x / 2) as u8, (y / 2) as u8, 200u8]))
}

/// Writes `img` as a BMP, the usual angiogram upload format.
pub fn save_bmp(img: &RgbImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".bmp")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Bmp)
        .expect("Failed to save test image");
    file
}

/// Writes the detections as the JSON list the CLI consumes.
pub fn save_detections(dets: &[RawDetection]) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp detections file");
    std::fs::write(file.path(), serde_json::to_string(dets).unwrap())
        .expect("Failed to write detections");
    file
}

pub fn raw(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> RawDetection {
    RawDetection::new(vec![x1, y1, x2, y2], score)
}

/// The three-detection example used throughout: two kept, one dropped.
pub fn scenario_a() -> Vec<RawDetection> {
    vec![
        raw(10.0, 10.0, 50.0, 50.0, 0.95),
        raw(60.0, 60.0, 90.0, 90.0, 0.81),
        raw(5.0, 5.0, 20.0, 20.0, 0.5),
    ]
}

pub fn count_color(img: &RgbImage, color: Rgb<u8>) -> usize {
    img.pixels().filter(|p| **p == color).count()
}
