use crate::video::Frame;

/// Every Nth pixel of the flat buffer is sampled
pub const SAMPLE_STRIDE: usize = 4;

/// Width of the corner band, as a fraction of each axis
pub const CORNER_MARGIN: f32 = 0.2;

/// Summed |dR|+|dG|+|dB| a corner sample must exceed to count as motion
pub const MOTION_NOISE_FLOOR: u32 = 50;

/// Per-frame scene statistics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalysisResult {
    /// Rec.601 luma of the sampled channel averages, 0-255
    pub luma: f32,
    /// Average red minus average blue; positive is warm
    pub temperature: f32,
    /// Fraction of corner samples that moved, 0-1
    pub corner_motion: f32,
}

/// Analyze `current` against the previous raw frame.
///
/// A missing previous frame, or one whose size differs from `current`,
/// yields a motion ratio of 0.
pub fn analyze(current: &Frame, previous: Option<&Frame>) -> AnalysisResult {
    let (width, height) = current.dimensions();
    let data = current.as_raw();
    let pixel_count = width as usize * height as usize;
    if pixel_count == 0 {
        return AnalysisResult::default();
    }

    let previous = previous
        .filter(|prev| prev.dimensions() == current.dimensions())
        .map(|prev| prev.as_raw());

    let margin_x = (width as f32 * CORNER_MARGIN).floor() as usize;
    let margin_y = (height as f32 * CORNER_MARGIN).floor() as usize;
    let w = width as usize;
    let h = height as usize;

    let (mut total_r, mut total_g, mut total_b) = (0u64, 0u64, 0u64);
    let mut samples = 0u64;
    let mut corner_samples = 0u32;
    let mut corner_moved = 0u32;

    for p in (0..pixel_count).step_by(SAMPLE_STRIDE) {
        let i = p * 4;
        let (r, g, b) = (data[i], data[i + 1], data[i + 2]);
        total_r += r as u64;
        total_g += g as u64;
        total_b += b as u64;
        samples += 1;

        let Some(prev) = previous else { continue };

        let x = p % w;
        let y = p / w;
        let corner = (x < margin_x || x > w - margin_x) && (y < margin_y || y > h - margin_y);
        if !corner {
            continue;
        }

        corner_samples += 1;
        let diff = r.abs_diff(prev[i]) as u32 + g.abs_diff(prev[i + 1]) as u32 + b.abs_diff(prev[i + 2]) as u32;
        if diff > MOTION_NOISE_FLOOR {
            corner_moved += 1;
        }
    }

    let avg_r = total_r as f32 / samples as f32;
    let avg_g = total_g as f32 / samples as f32;
    let avg_b = total_b as f32 / samples as f32;

    let corner_motion = if corner_samples > 0 {
        corner_moved as f32 / corner_samples as f32
    } else {
        0.0
    };

    AnalysisResult {
        luma: 0.299 * avg_r + 0.587 * avg_g + 0.114 * avg_b,
        temperature: avg_r - avg_b,
        corner_motion,
    }
}
