use tracing::debug;

use super::params::RetroParams;
use super::stages::{
    barrel, flash, grade, rotate_hue, scanline_multiplier, wave_offset, BitCrushLut, ChromaOffsets, Sampler,
    Vignette, CURVATURE_EPSILON, HUE_EPSILON, SYNC_BAR_FRACTION, SYNC_BAR_LEVEL,
};
use super::state::TemporalState;
use crate::analysis::{analyze, AnalysisResult};
use crate::error::{FrameError, Result};
use crate::overlay::stamp::draw_stamp;
use crate::overlay::{apply_bloom, Compositor, CpuCompositor};
use crate::rng::RandomSource;
use crate::video::Frame;

/// Brightness lift inside a tracking band
const TRACKING_LIFT: f32 = 40.0;

/// Rows covered by a tracking band
const TRACKING_BAND_ROWS: u32 = 2;

/// Largest damage overlay offset per axis
const DAMAGE_WOBBLE: f32 = 2.0;

/// One frame's worth of input
#[derive(Debug, Clone, Copy)]
pub struct FrameRequest<'a> {
    /// Raw frame already cropped and scaled to render size
    pub raw: &'a Frame,
    pub params: &'a RetroParams,
    /// Blow the frame out as if a flash fired
    pub flash: bool,
    /// Text burned in when `params.date_stamp` is on
    pub date_stamp: Option<&'a str>,
    /// Forget the previous frame before rendering
    pub reset: bool,
}

impl<'a> FrameRequest<'a> {
    pub fn new(raw: &'a Frame, params: &'a RetroParams) -> Self {
        Self {
            raw,
            params,
            flash: false,
            date_stamp: None,
            reset: false,
        }
    }

    pub fn with_flash(mut self, flash: bool) -> Self {
        self.flash = flash;
        self
    }

    pub fn with_date_stamp(mut self, text: Option<&'a str>) -> Self {
        self.date_stamp = text;
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

/// Pipeline output for one frame
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub frame: Frame,
    pub analysis: AnalysisResult,
}

/// Per-frame decisions drawn before the pixel loop
struct FramePlan {
    jitter: (i32, i32),
    wave: Vec<f32>,
    roll: Option<f32>,
    hue_shift: Option<f32>,
    crush: BitCrushLut,
    vignette: Option<Vignette>,
    scanline: Option<f32>,
    tracking_band: Option<u32>,
}

/// The effect pipeline and the temporal state it carries between frames
pub struct RetroPipeline<C: Compositor = CpuCompositor> {
    compositor: C,
    state: TemporalState,
    damage_seed: u32,
}

impl RetroPipeline<CpuCompositor> {
    pub fn new(damage_seed: u32) -> Self {
        Self::with_compositor(CpuCompositor::new(), damage_seed)
    }
}

impl<C: Compositor> RetroPipeline<C> {
    pub fn with_compositor(compositor: C, damage_seed: u32) -> Self {
        Self {
            compositor,
            state: TemporalState::new(),
            damage_seed,
        }
    }

    pub fn state(&self) -> &TemporalState {
        &self.state
    }

    pub fn damage_seed(&self) -> u32 {
        self.damage_seed
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Next temporal effect runs without a previous frame
    pub fn invalidate_previous(&mut self) {
        self.state.invalidate_previous();
    }

    /// Drop all temporal state
    pub fn reset(&mut self) {
        debug!("Pipeline state reset");
        self.state.reset();
    }

    /// Render one frame through every stage and overlay
    pub fn render<R: RandomSource + ?Sized>(&mut self, request: FrameRequest<'_>, rng: &mut R) -> Result<RenderedFrame> {
        let params = request.params.clamped();
        let raw = request.raw;
        let (width, height) = raw.dimensions();
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height }.into());
        }

        if request.reset {
            self.state.invalidate_previous();
        }
        self.state.resize(width, height);

        let analysis = analyze(raw, self.state.previous_raw());
        let source = self.prepare_source(raw, &params);
        let plan = self.plan_frame(&params, &analysis, width, height, rng);

        let data = self.run_stages(&source, &params, &plan, request.flash, rng);
        let mut frame = Frame::from_rgba_bytes(width, height, data)?;

        self.state.store_previous(raw.clone());

        apply_bloom(&self.compositor, &mut frame, params.bloom);

        if params.lens_damage > 0.0 {
            let dx = wobble(rng);
            let dy = wobble(rng);
            if let Some(texture) = self.state.damage_texture(self.damage_seed) {
                self.compositor.overlay(&mut frame, texture, (dx, dy), params.lens_damage);
            }
        }

        if params.date_stamp {
            if let Some(text) = request.date_stamp {
                draw_stamp(&mut frame, text);
            }
        }

        Ok(RenderedFrame { frame, analysis })
    }

    /// Blur prefilter, then interlace odd rows toward the previous frame
    fn prepare_source(&self, raw: &Frame, params: &RetroParams) -> Frame {
        let mut source = if params.blur > 0.0 {
            self.compositor.blur(raw, params.blur)
        } else {
            raw.clone()
        };

        if params.interlace > 0.0 {
            if let Some(previous) = self.state.previous_raw() {
                let stride = raw.width() as usize * 4;
                let amount = params.interlace;
                let prev = previous.as_raw();
                for (y, row) in source.as_raw_mut().chunks_exact_mut(stride).enumerate() {
                    if y % 2 == 0 {
                        continue;
                    }
                    let prev_row = &prev[y * stride..(y + 1) * stride];
                    for (i, v) in row.iter_mut().enumerate() {
                        if i % 4 == 3 {
                            continue;
                        }
                        let mixed = *v as f32 + (prev_row[i] as f32 - *v as f32) * amount;
                        *v = mixed.round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        }
        source
    }

    fn plan_frame<R: RandomSource + ?Sized>(
        &mut self,
        params: &RetroParams,
        analysis: &AnalysisResult,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> FramePlan {
        let jitter = self.state.jitter.step(
            analysis.corner_motion,
            params.motion_threshold,
            params.jitter_intensity,
            rng,
        );

        let phase = self.state.advance_wave();
        let wave = if params.wave_amount > 0.0 {
            (0..height)
                .map(|y| wave_offset(y, phase, params.wave_amount, rng.next_unit()))
                .collect()
        } else {
            Vec::new()
        };

        let roll = (params.roll_speed > 0.0).then(|| self.state.roll.advance(params.roll_speed, height));

        let hue = analysis.temperature / 255.0 * params.hue_shift;
        let hue_shift = (hue.abs() > HUE_EPSILON).then_some(hue);

        let vignette = (params.vignette > 0.0).then(|| Vignette::new(width, height, params.vignette));

        let scanline = (params.scanline_intensity > 0.0)
            .then(|| scanline_multiplier(params.scanline_intensity, rng.next_unit() * 0.08));

        let tracking_band = if params.tracking_noise > 0.0 && rng.next_unit() < params.tracking_noise * 0.3 {
            let start = (rng.next_unit() * height.saturating_sub(4) as f32).floor() as u32;
            debug!("Tracking band at row {}", start);
            Some(start)
        } else {
            None
        };

        FramePlan {
            jitter,
            wave,
            roll,
            hue_shift,
            crush: BitCrushLut::new(params.bit_crush),
            vignette,
            scanline,
            tracking_band,
        }
    }

    fn run_stages<R: RandomSource + ?Sized>(
        &self,
        source: &Frame,
        params: &RetroParams,
        plan: &FramePlan,
        flash_frame: bool,
        rng: &mut R,
    ) -> Vec<u8> {
        let (width, height) = source.dimensions();
        let (w, h) = (width as f32, height as f32);
        let sampler = Sampler::new(source.as_raw(), width, height, params.sharpen);
        let chroma = ChromaOffsets::new(params.color_bleed, params.lens_fringe);
        let warp = params.curvature.abs() > CURVATURE_EPSILON;
        let sync_bar_start = h * (1.0 - SYNC_BAR_FRACTION);
        let mut out = vec![0u8; width as usize * height as usize * 4];

        for y in 0..height {
            let rolled_y = match plan.roll {
                Some(offset) => (y as f32 + offset).floor() as u32 % height,
                None => y,
            };
            let in_sync_bar = plan.roll.is_some() && rolled_y as f32 >= sync_bar_start;
            let in_tracking_band = plan
                .tracking_band
                .map_or(false, |start| rolled_y >= start && rolled_y < start + TRACKING_BAND_ROWS);
            let wave_dx = plan.wave.get(y as usize).copied().unwrap_or(0.0);

            for x in 0..width {
                let mut sx = x as f32;
                let mut sy = rolled_y as f32;
                if warp {
                    let nx = sx / w * 2.0 - 1.0;
                    let ny = sy / h * 2.0 - 1.0;
                    let (bx, by) = barrel(nx, ny, params.curvature);
                    sx = (bx + 1.0) * 0.5 * w;
                    sy = (by + 1.0) * 0.5 * h;
                }
                sx += wave_dx + plan.jitter.0 as f32;
                sy += plan.jitter.1 as f32;
                let (ix, iy) = (sx.floor() as i32, sy.floor() as i32);

                let mut rgb = if in_sync_bar {
                    sampler.fetch(ix, iy).map(|v| v * SYNC_BAR_LEVEL)
                } else {
                    chroma.fetch(&sampler, ix, iy)
                };

                if let Some(shift) = plan.hue_shift {
                    rgb = rotate_hue(rgb, shift);
                }
                rgb = grade(rgb, params.saturation, params.contrast, params.brightness);
                if flash_frame {
                    rgb = flash(rgb);
                }
                if !plan.crush.is_identity() {
                    rgb = rgb.map(|v| plan.crush.apply(v));
                }
                if let Some(vignette) = &plan.vignette {
                    let factor = vignette.factor(x as f32, y as f32);
                    rgb = rgb.map(|v| v * factor);
                }
                if params.noise > 0.0 {
                    let delta = (rng.next_unit() - 0.5) * params.noise;
                    rgb = rgb.map(|v| v + delta);
                }
                if let Some(multiplier) = plan.scanline {
                    if y % 2 == 0 {
                        rgb = rgb.map(|v| v * multiplier);
                    }
                }
                if in_tracking_band {
                    let spread = 50.0 + params.tracking_noise * 50.0;
                    let jolt = (rng.next_unit() - 0.5) * spread;
                    rgb = rgb.map(|v| (v + TRACKING_LIFT).min(255.0) + jolt);
                }

                let idx = (y as usize * width as usize + x as usize) * 4;
                for ch in 0..3 {
                    out[idx + ch] = rgb[ch].round().clamp(0.0, 255.0) as u8;
                }
                out[idx + 3] = 255;
            }
        }
        out
    }
}

/// Whole-pixel offset in `[-2, 2]`
fn wobble<R: RandomSource + ?Sized>(rng: &mut R) -> i32 {
    ((rng.next_unit() * (2.0 * DAMAGE_WOBBLE + 1.0)).floor() - DAMAGE_WOBBLE).clamp(-DAMAGE_WOBBLE, DAMAGE_WOBBLE) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::damage::generate_damage_map;
    use crate::rng::{seeded_source, ConstantRandom, SequenceRandom};

    fn gradient(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_black(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [(x * 10) as u8, (y * 10) as u8, 90, 255]);
            }
        }
        frame
    }

    #[test]
    fn test_neutral_params_pass_frame_through() {
        let raw = gradient(20, 16);
        let params = RetroParams::neutral();
        let mut pipeline = RetroPipeline::new(1);
        let mut rng = ConstantRandom(0.5);

        for _ in 0..3 {
            let out = pipeline.render(FrameRequest::new(&raw, &params), &mut rng).unwrap();
            assert_eq!(out.frame, raw);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let raw = gradient(24, 18);
        let params = RetroParams::default();
        let mut a = RetroPipeline::new(7);
        let mut b = RetroPipeline::new(7);
        let mut rng_a = seeded_source(99);
        let mut rng_b = seeded_source(99);

        for _ in 0..4 {
            let fa = a.render(FrameRequest::new(&raw, &params), &mut rng_a).unwrap();
            let fb = b.render(FrameRequest::new(&raw, &params), &mut rng_b).unwrap();
            assert_eq!(fa.frame, fb.frame);
        }
    }

    #[test]
    fn test_flash_blows_out_midtones() {
        let raw = Frame::new_filled(8, 8, [128, 128, 128]);
        let params = RetroParams::neutral();
        let mut pipeline = RetroPipeline::new(1);
        let out = pipeline
            .render(FrameRequest::new(&raw, &params).with_flash(true), &mut ConstantRandom(0.5))
            .unwrap();
        assert_eq!(out.frame.get_pixel(3, 3), [255, 255, 255, 255]);
    }

    #[test]
    fn test_scanlines_dim_even_rows() {
        let raw = Frame::new_filled(6, 6, [100, 100, 100]);
        let mut params = RetroParams::neutral();
        params.scanline_intensity = 1.0;
        let mut pipeline = RetroPipeline::new(1);
        // Zero flicker
        let out = pipeline.render(FrameRequest::new(&raw, &params), &mut ConstantRandom(0.0)).unwrap();
        assert_eq!(out.frame.get_pixel(2, 0)[0], 80);
        assert_eq!(out.frame.get_pixel(2, 1)[0], 100);
    }

    #[test]
    fn test_roll_draws_sync_bar() {
        let raw = Frame::new_filled(4, 20, [200, 200, 200]);
        let mut params = RetroParams::neutral();
        params.roll_speed = 1.0;
        let mut pipeline = RetroPipeline::new(1);
        let out = pipeline.render(FrameRequest::new(&raw, &params), &mut ConstantRandom(0.5)).unwrap();

        // Offset 1: output row 18 reads rolled row 19, the last 5%
        assert_eq!(out.frame.get_pixel(1, 18)[0], 16);
        assert_eq!(out.frame.get_pixel(1, 17)[0], 200);
        assert_eq!(out.frame.get_pixel(1, 19)[0], 200);
    }

    #[test]
    fn test_wave_shifts_rows() {
        let raw = gradient(20, 4);
        let mut params = RetroParams::neutral();
        params.wave_amount = 3.0;
        let mut pipeline = RetroPipeline::new(1);
        let out = pipeline.render(FrameRequest::new(&raw, &params), &mut ConstantRandom(0.5)).unwrap();

        // Row 0 at phase 0 sits exactly on zero and tears left
        assert_eq!(out.frame.get_pixel(5, 0)[0], 20);
        assert_eq!(out.frame.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_motion_detected_and_reset_clears_it() {
        let dark = Frame::new_black(40, 40);
        let bright = Frame::new_filled(40, 40, [255, 255, 255]);
        let params = RetroParams::neutral();
        let mut rng = ConstantRandom(0.5);

        let mut pipeline = RetroPipeline::new(1);
        pipeline.render(FrameRequest::new(&dark, &params), &mut rng).unwrap();
        let moved = pipeline.render(FrameRequest::new(&bright, &params), &mut rng).unwrap();
        assert_eq!(moved.analysis.corner_motion, 1.0);

        let reset = pipeline
            .render(FrameRequest::new(&dark, &params).with_reset(true), &mut rng)
            .unwrap();
        assert_eq!(reset.analysis.corner_motion, 0.0);
    }

    #[test]
    fn test_resolution_change_mid_stream() {
        let params = RetroParams::default();
        let mut pipeline = RetroPipeline::new(3);
        let mut rng = seeded_source(1);

        pipeline.render(FrameRequest::new(&gradient(16, 12), &params), &mut rng).unwrap();
        let out = pipeline.render(FrameRequest::new(&gradient(24, 18), &params), &mut rng).unwrap();
        assert_eq!(out.frame.dimensions(), (24, 18));
        assert_eq!(pipeline.state().dimensions(), Some((24, 18)));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let raw = Frame::new_black(0, 0);
        let params = RetroParams::default();
        let result = RetroPipeline::new(1).render(FrameRequest::new(&raw, &params), &mut ConstantRandom(0.5));
        assert!(result.is_err());
    }

    #[test]
    fn test_date_stamp_only_when_enabled() {
        let raw = Frame::new_black(120, 90);
        let mut params = RetroParams::neutral();
        let mut pipeline = RetroPipeline::new(1);
        let mut rng = ConstantRandom(0.5);

        let plain = pipeline
            .render(FrameRequest::new(&raw, &params).with_date_stamp(Some("JAN 01 1990")), &mut rng)
            .unwrap();
        assert_eq!(plain.frame, raw);

        params.date_stamp = true;
        let stamped = pipeline
            .render(FrameRequest::new(&raw, &params).with_date_stamp(Some("JAN 01 1990")), &mut rng)
            .unwrap();
        assert_ne!(stamped.frame, raw);
    }

    #[test]
    fn test_wobble_bounds() {
        assert_eq!(wobble(&mut ConstantRandom(0.0)), -2);
        assert_eq!(wobble(&mut ConstantRandom(0.5)), 0);
        assert_eq!(wobble(&mut ConstantRandom(0.999)), 2);
    }

    fn render_one<R: RandomSource>(raw: &Frame, params: &RetroParams, rng: &mut R) -> Frame {
        RetroPipeline::new(1).render(FrameRequest::new(raw, params), rng).unwrap().frame
    }

    #[test]
    fn test_interlace_blends_odd_rows_toward_previous_raw() {
        let dark = Frame::new_black(8, 8);
        let bright = Frame::new_filled(8, 8, [200, 200, 200]);
        let mut params = RetroParams::neutral();
        params.interlace = 0.5;
        let mut pipeline = RetroPipeline::new(1);
        let mut rng = ConstantRandom(0.5);

        // Nothing to blend against yet
        let first = pipeline.render(FrameRequest::new(&dark, &params), &mut rng).unwrap();
        assert_eq!(first.frame, dark);

        let second = pipeline.render(FrameRequest::new(&bright, &params), &mut rng).unwrap();
        for y in 0..8 {
            let expected = if y % 2 == 1 { 100 } else { 200 };
            assert_eq!(second.frame.get_pixel(3, y)[0], expected, "row {y}");
        }

        // The previous frame is the raw input, not the blended output
        let third = pipeline.render(FrameRequest::new(&bright, &params), &mut rng).unwrap();
        assert_eq!(third.frame, bright);

        let reset = pipeline
            .render(FrameRequest::new(&dark, &params).with_reset(true), &mut rng)
            .unwrap();
        assert_eq!(reset.frame, dark);
    }

    #[test]
    fn test_noise_shares_one_delta_across_channels() {
        let raw = Frame::new_filled(4, 1, [100, 150, 50]);
        let mut params = RetroParams::neutral();
        params.noise = 40.0;
        let mut rng = SequenceRandom::new(vec![0.0, 0.9, 0.25, 0.75]);

        let out = render_one(&raw, &params, &mut rng);
        for (x, delta) in [-20i32, 16, -10, 10].into_iter().enumerate() {
            let expected = [100 + delta, 150 + delta, 50 + delta].map(|v| v as u8);
            assert_eq!(out.get_pixel(x as u32, 0)[..3], expected, "pixel {x}");
        }
    }

    #[test]
    fn test_tracking_band_lifts_two_rolled_rows() {
        let raw = Frame::new_filled(2, 20, [100, 100, 100]);
        let mut params = RetroParams::neutral();
        params.tracking_noise = 1.0;
        // Band fires (0.1 < 0.3), starts at floor(0.25 * 16) = 4, zero jolt
        let band = || SequenceRandom::new(vec![0.1, 0.25, 0.5, 0.5, 0.5, 0.5]);

        let out = render_one(&raw, &params, &mut band());
        let lifted: Vec<u32> = (0..20).filter(|&y| out.get_pixel(0, y)[0] != 100).collect();
        assert_eq!(lifted, vec![4, 5]);
        assert_eq!(out.get_pixel(1, 4)[..3], [140, 140, 140]);

        // One row of roll moves the band up one output row
        params.roll_speed = 1.0;
        let rolled = render_one(&raw, &params, &mut band());
        assert_eq!(rolled.get_pixel(0, 3)[0], 140);
        assert_eq!(rolled.get_pixel(0, 4)[0], 140);
        assert_eq!(rolled.get_pixel(0, 5)[0], 100);
        assert_eq!(rolled.get_pixel(0, 2)[0], 100);
    }

    #[test]
    fn test_lens_damage_overlay() {
        let raw = Frame::new_filled(64, 48, [128, 128, 128]);
        let texture = generate_damage_map(42, 64, 48);
        let mut params = RetroParams::neutral();

        let mut pipeline = RetroPipeline::new(42);
        let clean = pipeline.render(FrameRequest::new(&raw, &params), &mut ConstantRandom(0.0)).unwrap();
        assert_eq!(clean.frame, raw);

        params.lens_damage = 1.0;
        for (draw, offset) in [(0.5, (0, 0)), (0.0, (-2, -2))] {
            let mut expected = raw.clone();
            CpuCompositor::new().overlay(&mut expected, &texture, offset, 1.0);

            let out = RetroPipeline::new(42)
                .render(FrameRequest::new(&raw, &params), &mut ConstantRandom(draw))
                .unwrap();
            assert_ne!(out.frame, raw);
            assert_eq!(out.frame, expected);
        }
    }

    #[test]
    fn test_bleed_and_fringe_shift_red_and_blue() {
        let mut raw = Frame::new_black(8, 2);
        for y in 0..2 {
            for x in 0..4 {
                raw.set_pixel(x, y, [200, 200, 200, 255]);
            }
        }

        let mut params = RetroParams::neutral();
        params.color_bleed = 2.0;
        let bled = render_one(&raw, &params, &mut ConstantRandom(0.5));
        assert_eq!(bled.get_pixel(4, 0)[..3], [200, 0, 200]);
        assert_eq!(bled.get_pixel(5, 0)[..3], [200, 0, 0]);
        assert_eq!(bled.get_pixel(6, 0)[..3], [0, 0, 0]);

        params.color_bleed = 0.0;
        params.lens_fringe = 1.0;
        let fringed = render_one(&raw, &params, &mut ConstantRandom(0.5));
        assert_eq!(fringed.get_pixel(3, 1)[..3], [80, 200, 200]);
        assert_eq!(fringed.get_pixel(4, 1)[..3], [0, 0, 120]);
    }

    #[test]
    fn test_curvature_remaps_toward_edges() {
        let raw = gradient(20, 16);
        let mut params = RetroParams::neutral();

        params.curvature = 0.5;
        let barrel = render_one(&raw, &params, &mut ConstantRandom(0.5));
        assert_eq!(barrel.get_pixel(10, 8), raw.get_pixel(10, 8));
        // Corner samples far outside the frame
        assert_eq!(barrel.get_pixel(0, 0)[..3], [0, 0, 0]);

        params.curvature = -0.5;
        let pincushion = render_one(&raw, &params, &mut ConstantRandom(0.5));
        assert_eq!(pincushion.get_pixel(0, 0), raw.get_pixel(10, 8));
    }

    #[test]
    fn test_hue_rotation_follows_temperature() {
        let mut params = RetroParams::neutral();
        params.hue_shift = 2.0;

        // No red/blue imbalance, no rotation
        let grey = Frame::new_filled(8, 8, [120, 120, 120]);
        assert_eq!(render_one(&grey, &params, &mut ConstantRandom(0.5)), grey);

        let warm = Frame::new_filled(8, 8, [200, 100, 50]);
        let rotated = render_one(&warm, &params, &mut ConstantRandom(0.5));
        assert_ne!(rotated.get_pixel(4, 4), warm.get_pixel(4, 4));

        params.hue_shift = 0.0;
        assert_eq!(render_one(&warm, &params, &mut ConstantRandom(0.5)), warm);
    }

    #[test]
    fn test_bit_crush_quantizes_frame() {
        let mut raw = Frame::new_black(2, 1);
        raw.set_pixel(0, 0, [100, 100, 100, 255]);
        raw.set_pixel(1, 0, [50, 200, 255, 255]);
        let mut params = RetroParams::neutral();
        params.bit_crush = 100.0;

        let out = render_one(&raw, &params, &mut ConstantRandom(0.5));
        assert_eq!(out.get_pixel(0, 0)[..3], [128, 128, 128]);
        assert_eq!(out.get_pixel(1, 0)[..3], [0, 128, 128]);
    }
}
