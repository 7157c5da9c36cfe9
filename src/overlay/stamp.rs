use chrono::{Datelike, NaiveDate};

use crate::video::Frame;

/// Stamp colour (camcorder orange)
pub const STAMP_RGB: [u8; 3] = [255, 170, 60];

const SHADOW_RGB: [u8; 3] = [20, 10, 0];

/// Format a date the way consumer camcorders burn it in: `OCT 19 2026`
pub fn format_stamp(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = ["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];
    let month = MONTHS[date.month0() as usize];
    format!("{} {:02} {}", month, date.day(), date.year())
}

/// Each row is 5 bits, bit 4 leftmost.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Month abbreviations plus AM/PM
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),

        _ => None,
    }
}

fn fill_block(frame: &mut Frame, x: i32, y: i32, scale: i32, rgb: [u8; 3]) {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    for py in y..y + scale {
        for px in x..x + scale {
            if px >= 0 && py >= 0 && px < w && py < h {
                frame.set_pixel(px as u32, py as u32, [rgb[0], rgb[1], rgb[2], 255]);
            }
        }
    }
}

fn draw_char(frame: &mut Frame, x: i32, y: i32, scale: i32, ch: char) {
    let Some(rows) = glyph5x7(ch) else { return };

    // Shadow first, offset by one block
    for pass in [(scale.max(1) / 2).max(1), 0] {
        let rgb = if pass == 0 { STAMP_RGB } else { SHADOW_RGB };
        for (ry, bits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if bits & (1 << (4 - rx)) != 0 {
                    fill_block(frame, x + rx * scale + pass, y + ry as i32 * scale + pass, scale, rgb);
                }
            }
        }
    }
}

/// Pixel width of `text` at `scale`
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    chars * 6 * scale - scale
}

/// Burn `text` into the bottom-right corner, scaled with the frame height
pub fn draw_stamp(frame: &mut Frame, text: &str) {
    let scale = (frame.height() / 120).max(1);
    let margin = 4 * scale;
    let width = text_width(text, scale);
    let x = frame.width().saturating_sub(width + margin) as i32;
    let y = frame.height().saturating_sub(7 * scale + margin) as i32;

    let mut cursor = x;
    for ch in text.chars() {
        draw_char(frame, cursor, y, scale as i32, ch);
        cursor += 6 * scale as i32;
    }
}
