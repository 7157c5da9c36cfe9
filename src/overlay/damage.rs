use crate::video::Frame;

/// Dust colour (warm near-black)
const DUST_RGB: [u8; 3] = [18, 14, 10];

/// Dropout streak colour
const STREAK_RGB: [u8; 3] = [235, 235, 225];

/// Deterministic sine-keyed sequence
#[derive(Debug, Clone)]
pub struct SeededSequence {
    seed: f64,
    counter: u64,
}

impl SeededSequence {
    pub fn new(seed: u32) -> Self {
        Self { seed: seed as f64, counter: 0 }
    }

    /// Next value in `[0, 1)`
    pub fn next(&mut self) -> f64 {
        let x = (self.seed + self.counter as f64).sin() * 10_000.0;
        self.counter += 1;
        x - x.floor()
    }

    /// Next value in `[min, max)`
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }
}

/// Derive the damage seed from a stable installation id and the display.
///
/// 32-bit multiplicative string hash (`h * 31 + byte`, wrapping).
pub fn damage_seed(installation_id: &str, display_width: u32, display_height: u32, pixel_ratio: f32) -> u32 {
    let key = format!("{}|{}x{}@{:.2}", installation_id, display_width, display_height, pixel_ratio);
    key.bytes()
        .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(byte as u32))
}

/// Source-over a colour with coverage `alpha` onto a texture pixel
fn blend_over(dst: &mut [u8; 4], rgb: [u8; 3], alpha: f32) {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    for ch in 0..3 {
        let mixed = (rgb[ch] as f32 * alpha + dst[ch] as f32 * dst_a * (1.0 - alpha)) / out_a;
        dst[ch] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Generate the damage texture for `seed` at `width` x `height`.
///
/// 3-7 soft elliptical dust blobs followed by 15-34 thin dropout streaks,
/// on a transparent layer.
pub fn generate_damage_map(seed: u32, width: u32, height: u32) -> Frame {
    let mut layer = Frame::new_transparent(width, height);
    if width == 0 || height == 0 {
        return layer;
    }

    let mut seq = SeededSequence::new(seed);
    let w = width as f64;
    let h = height as f64;
    let short_side = w.min(h);

    let blobs = 3 + (seq.next() * 5.0).floor() as u32;
    for _ in 0..blobs {
        let cx = seq.next() * w;
        let cy = seq.next() * h;
        let radius = seq.range(0.04, 0.16) * short_side;
        let stretch = seq.range(0.5, 1.5);
        let opacity = seq.range(0.15, 0.5) as f32;
        draw_blob(&mut layer, cx, cy, radius.max(1.0), (radius * stretch).max(1.0), opacity);
    }

    let streaks = 15 + (seq.next() * 20.0).floor() as u32;
    for _ in 0..streaks {
        let y = (seq.next() * h).floor() as u32;
        let x0 = seq.next() * w;
        let length = seq.range(0.05, 0.4) * w;
        let opacity = seq.range(0.05, 0.3) as f32;
        let start = x0.floor() as u32;
        let end = ((x0 + length).ceil() as u32).min(width);
        for x in start..end {
            blend_over(layer.get_pixel_mut(x, y.min(height - 1)), STREAK_RGB, opacity);
        }
    }

    layer
}

fn draw_blob(layer: &mut Frame, cx: f64, cy: f64, rx: f64, ry: f64, opacity: f32) {
    let (width, height) = layer.dimensions();
    let x0 = (cx - rx).floor().max(0.0) as u32;
    let y0 = (cy - ry).floor().max(0.0) as u32;
    let x1 = ((cx + rx).ceil() as u32).min(width);
    let y1 = ((cy + ry).ceil() as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = (x as f64 + 0.5 - cx) / rx;
            let dy = (y as f64 + 0.5 - cy) / ry;
            let d = (dx * dx + dy * dy).sqrt();
            if d >= 1.0 {
                continue;
            }
            // Quadratic falloff toward the rim
            let falloff = (1.0 - d) * (1.0 - d);
            blend_over(layer.get_pixel_mut(x, y), DUST_RGB, opacity * falloff as f32);
        }
    }
}
