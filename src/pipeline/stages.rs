/// Hue shifts at or below this are skipped
pub const HUE_EPSILON: f32 = 0.01;

/// Curvature at or below this is treated as a flat lens
pub const CURVATURE_EPSILON: f32 = 0.01;

/// Weight of the fringe sample over the bleed sample
pub const FRINGE_OPACITY: f32 = 0.6;

/// Fraction of the height, at the bottom of the rolled range, drawn as the sync bar
pub const SYNC_BAR_FRACTION: f32 = 0.05;

/// Brightness left in the sync bar
pub const SYNC_BAR_LEVEL: f32 = 0.08;

/// Bit-crush step at crush = 100
pub const MAX_CRUSH_STEP: f32 = 128.0;

/// Reads RGB from a working buffer with optional unsharp-mask sharpening
pub struct Sampler<'a> {
    data: &'a [u8],
    width: i32,
    height: i32,
    sharpen: f32,
}

impl<'a> Sampler<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, sharpen: f32) -> Self {
        Self {
            data,
            width: width as i32,
            height: height as i32,
            sharpen,
        }
    }

    fn at(&self, x: i32, y: i32) -> [f32; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[idx] as f32, self.data[idx + 1] as f32, self.data[idx + 2] as f32]
    }

    fn clamped(&self, x: i32, y: i32) -> [f32; 3] {
        self.at(x.clamp(0, self.width - 1), y.clamp(0, self.height - 1))
    }

    /// Fetch RGB at an integer coordinate.
    ///
    /// With sharpening, neighbours outside the frame are clamped to the
    /// edge; without it, anything outside the frame reads as black.
    pub fn fetch(&self, x: i32, y: i32) -> [f32; 3] {
        if self.sharpen > 0.0 {
            let k = self.sharpen;
            let c = self.clamped(x, y);
            let t = self.clamped(x, y - 1);
            let b = self.clamped(x, y + 1);
            let l = self.clamped(x - 1, y);
            let r = self.clamped(x + 1, y);
            let mut out = [0.0; 3];
            for ch in 0..3 {
                out[ch] = c[ch] * (1.0 + 4.0 * k) - k * (t[ch] + b[ch] + l[ch] + r[ch]);
            }
            out
        } else if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.at(x, y)
        } else {
            [0.0; 3]
        }
    }
}

/// Chroma offsets for one frame: bleed smears red further than blue, fringe
/// splits them symmetrically on top of that.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromaOffsets {
    pub red_bleed: i32,
    pub blue_bleed: i32,
    pub fringe: i32,
}

impl ChromaOffsets {
    pub fn new(bleed: f32, fringe: f32) -> Self {
        Self {
            red_bleed: bleed.round() as i32,
            blue_bleed: (bleed * 0.5).round() as i32,
            fringe: fringe.round() as i32,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.red_bleed == 0 && self.blue_bleed == 0 && self.fringe == 0
    }

    /// Fetch a pixel with bleed and fringe applied to red and blue
    pub fn fetch(&self, sampler: &Sampler<'_>, x: i32, y: i32) -> [f32; 3] {
        let base = sampler.fetch(x, y);
        if self.is_neutral() {
            return base;
        }

        let rx = x - self.red_bleed;
        let bx = x - self.blue_bleed;
        let mut red = if self.red_bleed != 0 { sampler.fetch(rx, y)[0] } else { base[0] };
        let mut blue = if self.blue_bleed != 0 { sampler.fetch(bx, y)[2] } else { base[2] };

        if self.fringe != 0 {
            let red_fringe = sampler.fetch(rx + self.fringe, y)[0];
            let blue_fringe = sampler.fetch(bx - self.fringe, y)[2];
            red = red * (1.0 - FRINGE_OPACITY) + red_fringe * FRINGE_OPACITY;
            blue = blue * (1.0 - FRINGE_OPACITY) + blue_fringe * FRINGE_OPACITY;
        }

        [red, base[1], blue]
    }
}

/// Radial lens remap in normalized `[-1, 1]` space
pub fn barrel(nx: f32, ny: f32, curvature: f32) -> (f32, f32) {
    let f = 1.0 + curvature * (nx * nx + ny * ny);
    (nx * f, ny * f)
}

/// Per-row tear offset: a slow sine plus noise, thresholded to a hard +/- step
pub fn wave_offset(row: u32, phase: f32, amount: f32, noise: f32) -> f32 {
    let shape = (row as f32 * 0.04 + phase).sin() + (noise - 0.5) * 0.8;
    if shape > 0.0 { amount } else { -amount }
}

/// Rotate the hue of an RGB triple (0-255 scale) by `shift` turns
pub fn rotate_hue(rgb: [f32; 3], shift: f32) -> [f32; 3] {
    let r = rgb[0] / 255.0;
    let g = rgb[1] / 255.0;
    let b = rgb[2] / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta == 0.0 {
        return rgb;
    }

    let s = if l > 0.5 { delta / (2.0 - max - min) } else { delta / (max + min) };
    let mut h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    h /= 6.0;

    h += shift;
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    [channel(h + 1.0 / 3.0) * 255.0, channel(h) * 255.0, channel(h - 1.0 / 3.0) * 255.0]
}

/// Saturation toward luma, then contrast around mid-grey, then brightness.
/// Deliberately unclamped.
pub fn grade(rgb: [f32; 3], saturation: f32, contrast: f32, brightness: f32) -> [f32; 3] {
    let gray = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
    rgb.map(|v| {
        let v = gray + (v - gray) * saturation;
        let v = (v - 128.0) * contrast + 128.0;
        v * brightness
    })
}

/// Flash blowout
pub fn flash(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|v| v * 3.0 + 100.0)
}

/// 256-entry quantization table, built once per frame
#[derive(Debug, Clone)]
pub struct BitCrushLut {
    table: [u8; 256],
    identity: bool,
}

impl BitCrushLut {
    /// `crush` 0-100 maps linearly onto a 0-128 step; steps under one level
    /// leave values untouched. Values round to the nearest multiple of the
    /// step and saturate at 255, except at the full step where the top level
    /// is held at 128 so the output is two-level.
    pub fn new(crush: f32) -> Self {
        let step = crush.clamp(0.0, 100.0) / 100.0 * MAX_CRUSH_STEP;
        let mut table = [0u8; 256];

        if step < 1.0 {
            for (i, slot) in table.iter_mut().enumerate() {
                *slot = i as u8;
            }
            return Self { table, identity: true };
        }

        let top = if step >= MAX_CRUSH_STEP { (255.0 / step).floor() } else { f32::INFINITY };
        for (i, slot) in table.iter_mut().enumerate() {
            let level = (i as f32 / step).round().min(top);
            *slot = (level * step).round().clamp(0.0, 255.0) as u8;
        }
        Self { table, identity: false }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn lookup(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    /// Clamp into byte range, then quantize
    pub fn apply(&self, value: f32) -> f32 {
        self.table[value.clamp(0.0, 255.0) as usize] as f32
    }

    /// Number of distinct output levels
    pub fn levels(&self) -> usize {
        let mut seen = [false; 256];
        for &v in &self.table {
            seen[v as usize] = true;
        }
        seen.iter().filter(|&&s| s).count()
    }
}

/// Edge darkening relative to the half-diagonal
#[derive(Debug, Clone, Copy)]
pub struct Vignette {
    cx: f32,
    cy: f32,
    max_radius: f32,
    strength: f32,
}

impl Vignette {
    pub fn new(width: u32, height: u32, strength: f32) -> Self {
        let cx = (width as f32 - 1.0) / 2.0;
        let cy = (height as f32 - 1.0) / 2.0;
        Self {
            cx,
            cy,
            max_radius: (cx * cx + cy * cy).sqrt().max(f32::EPSILON),
            strength,
        }
    }

    pub fn factor(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.cx;
        let dy = y - self.cy;
        let distance = (dx * dx + dy * dy).sqrt();
        (1.0 - distance / self.max_radius * self.strength).max(0.0)
    }
}

/// Even-row dimming for this frame; `flicker` is drawn once per frame
pub fn scanline_multiplier(intensity: f32, flicker: f32) -> f32 {
    1.0 - intensity * 0.2 - intensity * flicker
}
