use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
/// Rows per line of text, including one row of spacing below the glyph.
const LINE_ROWS: u32 = GLYPH_ROWS + 1;
/// Columns per character, including one column of spacing.
const ADVANCE_COLS: u32 = GLYPH_COLS + 1;

/// 5x7 digit bitmaps, one byte per row, bit 4 is the leftmost column.
static DIGITS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Side length in pixels of one glyph cell for a given font size.
pub fn cell_size(font_size: u32) -> u32 {
    (font_size / LINE_ROWS).max(1)
}

/// Draw digits with their top-left corner at `(x, y)`.
///
/// Characters other than ASCII digits advance the cursor without drawing.
/// Anything outside the canvas is clipped.
pub fn draw_digits_mut(canvas: &mut RgbImage, text: &str, x: i32, y: i32, font_size: u32, color: Rgb<u8>) {
    let cell = cell_size(font_size) as i64;
    let mut cursor = x as i64;

    for ch in text.chars() {
        if let Some(bitmap) = ch.to_digit(10).map(|d| &DIGITS[d as usize]) {
            for (row, bits) in bitmap.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                        continue;
                    }
                    let px = cursor + col as i64 * cell;
                    let py = y as i64 + row as i64 * cell;
                    fill_cell(canvas, px, py, cell, color);
                }
            }
        }
        cursor += ADVANCE_COLS as i64 * cell;
    }
}

/// Fill one square cell, clamped to the canvas. Coordinates are widened so
/// far-off-image labels never overflow.
fn fill_cell(canvas: &mut RgbImage, x: i64, y: i64, size: i64, color: Rgb<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let left = x.max(0);
    let top = y.max(0);
    let right = (x + size).min(w);
    let bottom = (y + size).min(h);
    if left >= right || top >= bottom {
        return;
    }
    let rect = Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32);
    draw_filled_rect_mut(canvas, rect, color);
}
