use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::detection::glyphs;
use crate::models::BoxCoords;

/// Draw a rectangle outline `stroke_width` pixels thick, growing inward from
/// the given corners.
///
/// Corners are used exactly as given. Inverted or zero-area boxes are still
/// drawn; nothing is reordered.
pub fn draw_box_outline(canvas: &mut RgbImage, bbox: &BoxCoords, stroke_width: u32, color: Rgb<u8>) {
    for i in 0..stroke_width {
        let inset = i as f32;
        let (left, top) = (bbox.x1 + inset, bbox.y1 + inset);
        let (right, bottom) = (bbox.x2 - inset, bbox.y2 - inset);

        draw_horizontal_edge(canvas, top, left, right, color);
        draw_vertical_edge(canvas, right, top, bottom, color);
        draw_horizontal_edge(canvas, bottom, right, left, color);
        draw_vertical_edge(canvas, left, bottom, top, color);
    }
}

/// Clip an axis-aligned edge to `[-1, dim]` on both axes before handing it to
/// imageproc, whose line iterator walks every integer step between the
/// endpoints. Pixels landing on the canvas are the same as for the unclipped
/// edge. Returns `None` when the edge cannot touch the canvas.
fn clip_edge(fixed: f32, a: f32, b: f32, fixed_dim: u32, run_dim: u32) -> Option<(f32, f32, f32)> {
    if fixed.is_nan() || a.is_nan() || b.is_nan() {
        return None;
    }
    if fixed < -1.0 || fixed > fixed_dim as f32 {
        return None;
    }
    let hi = run_dim as f32;
    Some((fixed, a.clamp(-1.0, hi), b.clamp(-1.0, hi)))
}

fn draw_horizontal_edge(canvas: &mut RgbImage, y: f32, x_start: f32, x_end: f32, color: Rgb<u8>) {
    let (w, h) = canvas.dimensions();
    if let Some((y, x0, x1)) = clip_edge(y, x_start, x_end, h, w) {
        draw_line_segment_mut(canvas, (x0, y), (x1, y), color);
    }
}

fn draw_vertical_edge(canvas: &mut RgbImage, x: f32, y_start: f32, y_end: f32, color: Rgb<u8>) {
    let (w, h) = canvas.dimensions();
    if let Some((x, y0, y1)) = clip_edge(x, y_start, y_end, w, h) {
        draw_line_segment_mut(canvas, (x, y0), (x, y1), color);
    }
}

/// Draw a label left-aligned to the box's left edge, `offset` pixels above
/// its top edge.
pub fn draw_label(
    canvas: &mut RgbImage,
    bbox: &BoxCoords,
    text: &str,
    offset: i32,
    font_size: u32,
    color: Rgb<u8>,
) {
    let x = bbox.x1 as i32;
    let y = (bbox.y1 - offset as f32) as i32;
    glyphs::draw_digits_mut(canvas, text, x, y, font_size, color);
}
