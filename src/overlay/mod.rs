//! # Overlay Compositor
//!
//! Whole-frame passes that run after the per-pixel loop: bloom, the seeded
//! lens damage layer and the date stamp.
//!
//! The damage texture comes from a sine-keyed sequence seeded per
//! installation, so a given seed and size always produce the same layer.
//!
//! The pipeline only needs three primitives from its environment, expressed
//! by the [`Compositor`] trait. [`CpuCompositor`] is the software
//! implementation used everywhere by default.

pub mod damage;
pub mod stamp;

use rayon::prelude::*;

use crate::video::Frame;

/// Bloom layer brightness multiplier
pub const BLOOM_BRIGHTNESS: f32 = 1.5;

/// Bloom layer contrast
pub const BLOOM_CONTRAST: f32 = 1.2;

/// Bloom opacity at `bloom = 1`
pub const BLOOM_MAX_OPACITY: f32 = 0.6;

/// Compositing primitives the pipeline depends on
pub trait Compositor {
    /// Blur a frame by roughly `radius` pixels
    fn blur(&self, frame: &Frame, radius: f32) -> Frame;

    /// Screen-blend `layer` over `base` at `opacity`
    fn screen(&self, base: &mut Frame, layer: &Frame, opacity: f32);

    /// Alpha-composite `layer` over `base`, shifted by `offset`, at `opacity`
    fn overlay(&self, base: &mut Frame, layer: &Frame, offset: (i32, i32), opacity: f32);
}

/// Software compositor: gaussian blur for small radii, three box passes
/// (row-parallel) for large ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuCompositor;

impl CpuCompositor {
    pub fn new() -> Self {
        Self
    }
}

impl Compositor for CpuCompositor {
    fn blur(&self, frame: &Frame, radius: f32) -> Frame {
        if !(radius > 0.0) {
            return frame.clone();
        }
        if radius < 2.0 {
            return Frame::new(image::imageops::blur(frame.as_image(), radius));
        }

        // Three box passes approximate a gaussian with sigma = radius
        let box_radius = ((((4.0 * radius * radius + 1.0).sqrt()) - 1.0) / 2.0).round().max(1.0) as usize;
        let (width, height) = frame.dimensions();
        let mut data = frame.as_raw().to_vec();
        let mut scratch = vec![0u8; data.len()];
        for _ in 0..3 {
            box_horizontal(&data, &mut scratch, width as usize, box_radius);
            box_vertical(&scratch, &mut data, width as usize, height as usize, box_radius);
        }

        match Frame::from_rgba_bytes(width, height, data) {
            Ok(blurred) => blurred,
            Err(_) => frame.clone(),
        }
    }

    fn screen(&self, base: &mut Frame, layer: &Frame, opacity: f32) {
        if opacity <= 0.0 || base.dimensions() != layer.dimensions() {
            return;
        }
        let opacity = opacity.min(1.0);
        let width = base.width() as usize;
        base.as_raw_mut()
            .par_chunks_mut(width * 4)
            .zip(layer.as_raw().par_chunks(width * 4))
            .for_each(|(dst, src)| {
                for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    for ch in 0..3 {
                        let a = d[ch] as f32 / 255.0;
                        let b = s[ch] as f32 / 255.0;
                        let screened = 1.0 - (1.0 - a) * (1.0 - b);
                        let mixed = a + (screened - a) * opacity;
                        d[ch] = (mixed * 255.0).round().clamp(0.0, 255.0) as u8;
                    }
                }
            });
    }

    fn overlay(&self, base: &mut Frame, layer: &Frame, offset: (i32, i32), opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        let opacity = opacity.min(1.0);
        let (bw, bh) = base.dimensions();
        let (lw, lh) = layer.dimensions();

        for ly in 0..lh {
            let y = ly as i32 + offset.1;
            if y < 0 || y >= bh as i32 {
                continue;
            }
            for lx in 0..lw {
                let x = lx as i32 + offset.0;
                if x < 0 || x >= bw as i32 {
                    continue;
                }
                let src = layer.get_pixel(lx, ly);
                if src[3] == 0 {
                    continue;
                }
                let alpha = src[3] as f32 / 255.0 * opacity;
                let dst = base.get_pixel_mut(x as u32, y as u32);
                for ch in 0..3 {
                    let mixed = dst[ch] as f32 * (1.0 - alpha) + src[ch] as f32 * alpha;
                    dst[ch] = mixed.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

fn box_horizontal(src: &[u8], dst: &mut [u8], width: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    dst.par_chunks_mut(width * 4)
        .zip(src.par_chunks(width * 4))
        .for_each(|(out_row, in_row)| {
            for ch in 0..4 {
                let px = |x: isize| in_row[(x.clamp(0, width as isize - 1) as usize) * 4 + ch] as u32;
                let mut sum: u32 = (-(radius as isize)..=radius as isize).map(px).sum();
                for x in 0..width {
                    out_row[x * 4 + ch] = ((sum + window / 2) / window) as u8;
                    sum += px(x as isize + radius as isize + 1);
                    sum -= px(x as isize - radius as isize);
                }
            }
        });
}

fn box_vertical(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    let stride = width * 4;
    dst.par_chunks_mut(stride).enumerate().for_each(|(y, out_row)| {
        for (i, out) in out_row.iter_mut().enumerate() {
            let mut sum = 0u32;
            for dy in -(radius as isize)..=radius as isize {
                let yy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                sum += src[yy * stride + i] as u32;
            }
            *out = ((sum + window / 2) / window) as u8;
        }
    });
}

/// Screen a softened, brightened copy of `frame` back over itself
pub fn apply_bloom<C: Compositor + ?Sized>(compositor: &C, frame: &mut Frame, amount: f32) {
    if amount <= 0.0 {
        return;
    }
    let radius = (frame.width() as f32 * 0.05).max(2.0);
    let mut layer = compositor.blur(frame, radius);
    for px in layer.as_raw_mut().chunks_exact_mut(4) {
        for v in px.iter_mut().take(3) {
            let bright = *v as f32 / 255.0 * BLOOM_BRIGHTNESS;
            let contrasted = (bright - 0.5) * BLOOM_CONTRAST + 0.5;
            *v = (contrasted * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
    compositor.screen(frame, &layer, amount * BLOOM_MAX_OPACITY);
}
