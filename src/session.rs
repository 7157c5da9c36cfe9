use chrono::Local;
use tracing::{debug, info, warn};

use crate::error::{CaptureError, FrameError, Result};
use crate::geometry::{crop_and_scale, crop_rect, target_dimensions};
use crate::overlay::stamp::format_stamp;
use crate::overlay::{Compositor, CpuCompositor};
use crate::pipeline::{FrameRequest, RenderedFrame, RetroParams, RetroPipeline};
use crate::rng::RandomSource;
use crate::ticker::{FrameClock, TickSource};
use crate::video::capture::{encode_still, FlashMode};
use crate::video::{Frame, FrameSource};

/// Why a display tick did not render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A captured still is on screen
    UnderReview,
    /// Too soon after the last frame for the current fps
    Gated,
    SourceNotReady,
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    Rendered(RenderedFrame),
    Skipped(SkipReason),
}

impl TickOutcome {
    pub fn rendered(&self) -> Option<&RenderedFrame> {
        match self {
            TickOutcome::Rendered(frame) => Some(frame),
            TickOutcome::Skipped(_) => None,
        }
    }
}

/// Recoverable failures in a row that [`LiveSession::run`] tolerates
pub const MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Totals from [`LiveSession::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rendered: u32,
    /// Ticks lost to a recoverable error
    pub dropped: u32,
}

/// A captured still
#[derive(Debug, Clone)]
pub struct Still {
    pub frame: Frame,
    pub jpeg: Vec<u8>,
    pub flash_fired: bool,
}

pub struct LiveSession<S: FrameSource, C: Compositor = CpuCompositor> {
    pipeline: RetroPipeline<C>,
    source: S,
    params: RetroParams,
    clock: FrameClock,
    device_portrait: bool,
    flash_mode: FlashMode,
    jpeg_quality: f32,
    date_text: Option<String>,
    reviewing: bool,
    pending_reset: bool,
    last: Option<RenderedFrame>,
}

impl<S: FrameSource> LiveSession<S, CpuCompositor> {
    pub fn new(source: S, params: RetroParams, damage_seed: u32) -> Self {
        Self::with_pipeline(source, params, RetroPipeline::new(damage_seed))
    }
}

impl<S: FrameSource, C: Compositor> LiveSession<S, C> {
    pub fn with_pipeline(source: S, params: RetroParams, pipeline: RetroPipeline<C>) -> Self {
        Self {
            pipeline,
            source,
            params,
            clock: FrameClock::new(),
            device_portrait: false,
            flash_mode: FlashMode::default(),
            jpeg_quality: crate::video::capture::DEFAULT_JPEG_QUALITY,
            date_text: None,
            reviewing: false,
            pending_reset: false,
            last: None,
        }
    }

    pub fn with_device_portrait(mut self, portrait: bool) -> Self {
        self.device_portrait = portrait;
        self
    }

    pub fn with_flash_mode(mut self, mode: FlashMode) -> Self {
        self.flash_mode = mode;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: f32) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Fixed date stamp text; otherwise today's date is used
    pub fn with_date_text<T: Into<String>>(mut self, text: T) -> Self {
        self.date_text = Some(text.into());
        self
    }

    pub fn params(&self) -> &RetroParams {
        &self.params
    }

    /// Swap the parameter snapshot used from the next frame on
    pub fn set_params(&mut self, params: RetroParams) {
        self.params = params;
    }

    pub fn pipeline(&self) -> &RetroPipeline<C> {
        &self.pipeline
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn last_frame(&self) -> Option<&RenderedFrame> {
        self.last.as_ref()
    }

    pub fn is_reviewing(&self) -> bool {
        self.reviewing
    }

    /// Freeze on the current output
    pub fn pause_for_review(&mut self) {
        debug!("Entering review");
        self.reviewing = true;
    }

    /// Back to live. The stale previous frame is dropped so the first live
    /// frame does not interlace against the pre-review scene.
    pub fn resume(&mut self) {
        if self.reviewing {
            debug!("Leaving review");
        }
        self.reviewing = false;
        self.pending_reset = true;
        self.clock.reset();
    }

    /// Handle one display tick at `now_ms`
    pub fn tick<R: RandomSource + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> Result<TickOutcome> {
        if self.reviewing {
            return Ok(TickOutcome::Skipped(SkipReason::UnderReview));
        }
        if !self.clock.tick(now_ms, self.params.frame_interval_ms()) {
            return Ok(TickOutcome::Skipped(SkipReason::Gated));
        }
        if !self.source.is_ready() {
            debug!("Tick at {:.1}ms skipped, source not ready", now_ms);
            return Ok(TickOutcome::Skipped(SkipReason::SourceNotReady));
        }

        let rendered = self.render_frame(false, rng)?;
        Ok(TickOutcome::Rendered(rendered))
    }

    /// Render up to `frames` frames from `ticks`, handing each to `on_frame`
    /// with its index.
    ///
    /// A recoverable error drops that tick and the loop carries on. Stops
    /// early when the ticks end, the source runs dry or the session is in
    /// review.
    pub fn run<T, R, F>(&mut self, ticks: &mut T, frames: u32, rng: &mut R, mut on_frame: F) -> Result<RunStats>
    where
        T: TickSource + ?Sized,
        R: RandomSource + ?Sized,
        F: FnMut(u32, &RenderedFrame) -> Result<()>,
    {
        let mut stats = RunStats::default();
        let mut failures = 0;
        while stats.rendered < frames {
            let Some(now) = ticks.next_tick() else { break };
            match self.tick(now, rng) {
                Ok(TickOutcome::Rendered(rendered)) => {
                    failures = 0;
                    on_frame(stats.rendered, &rendered)?;
                    stats.rendered += 1;
                }
                Ok(TickOutcome::Skipped(SkipReason::Gated)) => {}
                Ok(TickOutcome::Skipped(SkipReason::SourceNotReady)) => {
                    warn!("Source ran out after {} frames", stats.rendered);
                    break;
                }
                Ok(TickOutcome::Skipped(SkipReason::UnderReview)) => {
                    debug!("Run stopped, session is in review");
                    break;
                }
                Err(e) if e.is_recoverable() && failures < MAX_CONSECUTIVE_FAILURES => {
                    failures += 1;
                    stats.dropped += 1;
                    warn!("Dropped frame at {:.1}ms: {}", now, e.user_message());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(stats)
    }

    /// Take a still: fire the flash if the scene calls for it, encode the
    /// frame as JPEG and enter review.
    pub fn capture_still<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<Still> {
        let luma = self.last.as_ref().map(|last| last.analysis.luma);
        let flash_fired = match luma {
            Some(luma) => self.flash_mode.should_fire(luma),
            None => self.flash_mode == FlashMode::On,
        };

        let frame = if flash_fired || self.last.is_none() {
            if !self.source.is_ready() {
                return Err(CaptureError::NoFrame.into());
            }
            self.render_frame(flash_fired, rng)?.frame
        } else {
            match self.last.as_ref() {
                Some(last) => last.frame.clone(),
                None => return Err(CaptureError::NoFrame.into()),
            }
        };

        let jpeg = encode_still(&frame, self.jpeg_quality)?;
        info!(
            "Captured still {}x{} ({} bytes, flash {})",
            frame.width(),
            frame.height(),
            jpeg.len(),
            if flash_fired { "fired" } else { "off" }
        );
        self.pause_for_review();
        Ok(Still { frame, jpeg, flash_fired })
    }

    /// Crop and scale the latest source frame onto the canvas
    fn raw_frame(&mut self) -> Result<Frame> {
        let source = self.source.latest_frame()?;
        let (sw, sh) = source.dimensions();
        if sw == 0 || sh == 0 {
            return Err(FrameError::InvalidDimensions { width: sw, height: sh }.into());
        }

        let params = self.params.clamped();
        let (width, height) = target_dimensions(
            params.aspect_ratio,
            params.orientation,
            self.device_portrait,
            params.quality_px(),
        );
        let crop = crop_rect(sw, sh, width as f32 / height as f32, params.zoom);
        Ok(crop_and_scale(&source, crop, width, height, self.source.facing().mirrored()))
    }

    fn render_frame<R: RandomSource + ?Sized>(&mut self, flash: bool, rng: &mut R) -> Result<RenderedFrame> {
        let raw = self.raw_frame()?;
        let stamp = match (&self.date_text, self.params.date_stamp) {
            (Some(text), _) => Some(text.clone()),
            (None, true) => Some(format_stamp(Local::now().date_naive())),
            (None, false) => None,
        };

        let request = FrameRequest::new(&raw, &self.params)
            .with_flash(flash)
            .with_date_stamp(stamp.as_deref())
            .with_reset(std::mem::take(&mut self.pending_reset));
        let rendered = self.pipeline.render(request, rng)?;
        self.last = Some(rendered.clone());
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetroError;
    use crate::rng::ConstantRandom;
    use crate::ticker::FixedRateTicks;
    use crate::video::{Facing, SequenceSource, StillSource};
    use tempfile::TempDir;

    struct OfflineSource;

    impl FrameSource for OfflineSource {
        fn is_ready(&self) -> bool {
            false
        }

        fn native_dimensions(&self) -> (u32, u32) {
            (0, 0)
        }

        fn facing(&self) -> Facing {
            Facing::Environment
        }

        fn latest_frame(&mut self) -> Result<Frame> {
            Err(FrameError::NoFrames { path: "offline".into() }.into())
        }
    }

    /// Ready source whose every frame fails the same way
    struct FailingSource(fn() -> RetroError);

    impl FrameSource for FailingSource {
        fn is_ready(&self) -> bool {
            true
        }

        fn native_dimensions(&self) -> (u32, u32) {
            (160, 120)
        }

        fn facing(&self) -> Facing {
            Facing::Environment
        }

        fn latest_frame(&mut self) -> Result<Frame> {
            Err((self.0)())
        }
    }

    // Resampling may land a flat field one level off
    fn near(value: u8, expected: u8) -> bool {
        (value as i32 - expected as i32).abs() <= 3
    }

    fn session(color: [u8; 3]) -> LiveSession<StillSource> {
        let mut params = RetroParams::neutral();
        params.quality = 80.0;
        let source = StillSource::new(Frame::new_filled(160, 120, color), Facing::Environment);
        LiveSession::new(source, params, 11)
    }

    #[test]
    fn test_tick_renders_at_canvas_size() {
        let mut live = session([60, 60, 60]);
        let outcome = live.tick(0.0, &mut ConstantRandom(0.5)).unwrap();
        let rendered = outcome.rendered().unwrap();
        assert_eq!(rendered.frame.dimensions(), (80, 60));
        assert!(near(rendered.frame.get_pixel(40, 30)[0], 60));
    }

    #[test]
    fn test_ticks_gated_by_fps() {
        let mut live = session([60, 60, 60]);
        let mut rng = ConstantRandom(0.5);
        assert!(live.tick(0.0, &mut rng).unwrap().rendered().is_some());
        assert!(matches!(
            live.tick(16.7, &mut rng).unwrap(),
            TickOutcome::Skipped(SkipReason::Gated)
        ));
        assert!(live.tick(100.0, &mut rng).unwrap().rendered().is_some());
    }

    #[test]
    fn test_source_not_ready_skips() {
        let mut live = LiveSession::new(OfflineSource, RetroParams::default(), 1);
        assert!(matches!(
            live.tick(0.0, &mut ConstantRandom(0.5)).unwrap(),
            TickOutcome::Skipped(SkipReason::SourceNotReady)
        ));
        assert!(live.capture_still(&mut ConstantRandom(0.5)).is_err());
    }

    #[test]
    fn test_dark_scene_auto_flash_and_review() {
        let mut live = session([20, 20, 20]);
        let mut rng = ConstantRandom(0.5);
        live.tick(0.0, &mut rng).unwrap();

        let still = live.capture_still(&mut rng).unwrap();
        assert!(still.flash_fired);
        // 20 * 3 + 100
        assert!(near(still.frame.get_pixel(40, 30)[0], 160));
        assert_eq!(&still.jpeg[..2], &[0xFF, 0xD8]);

        assert!(live.is_reviewing());
        assert!(matches!(
            live.tick(1000.0, &mut rng).unwrap(),
            TickOutcome::Skipped(SkipReason::UnderReview)
        ));
    }

    #[test]
    fn test_bright_scene_reuses_last_frame() {
        let mut live = session([200, 200, 200]);
        let mut rng = ConstantRandom(0.5);
        live.tick(0.0, &mut rng).unwrap();

        let still = live.capture_still(&mut rng).unwrap();
        assert!(!still.flash_fired);
        assert!(near(still.frame.get_pixel(40, 30)[0], 200));
    }

    #[test]
    fn test_resume_drops_previous_frame() {
        let mut live = session([200, 200, 200]);
        let mut rng = ConstantRandom(0.5);
        live.tick(0.0, &mut rng).unwrap();
        live.pause_for_review();
        live.resume();

        assert!(!live.is_reviewing());
        let rendered = live.tick(5000.0, &mut rng).unwrap();
        assert_eq!(rendered.rendered().unwrap().analysis.corner_motion, 0.0);
        assert!(live.pipeline().state().previous_raw().is_some());
    }

    #[test]
    fn test_user_camera_is_mirrored() {
        let mut frame = Frame::new_black(160, 120);
        for y in 0..120 {
            for x in 0..80 {
                frame.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }
        let mut params = RetroParams::neutral();
        params.quality = 80.0;
        let mut live = LiveSession::new(StillSource::new(frame, Facing::User), params, 1);

        let outcome = live.tick(0.0, &mut ConstantRandom(0.5)).unwrap();
        let rendered = outcome.rendered().unwrap();
        assert!(near(rendered.frame.get_pixel(75, 30)[0], 255));
        assert!(near(rendered.frame.get_pixel(5, 30)[0], 0));
    }

    fn sequence_with_corrupt_frame(dir: &TempDir) -> SequenceSource {
        for (i, value) in [(0, 40u8), (2, 200)] {
            Frame::new_filled(16, 12, [value, value, value])
                .save_png(dir.path().join(format!("f_{:03}.png", i)))
                .unwrap();
        }
        std::fs::write(dir.path().join("f_001.png"), b"not a png at all").unwrap();
        SequenceSource::open(dir.path(), Facing::Environment, false).unwrap()
    }

    #[test]
    fn test_corrupt_frame_fails_only_its_own_tick() {
        let dir = TempDir::new().unwrap();
        let mut params = RetroParams::neutral();
        params.quality = 80.0;
        let mut live = LiveSession::new(sequence_with_corrupt_frame(&dir), params, 3);
        let mut rng = ConstantRandom(0.5);

        assert!(live.tick(0.0, &mut rng).unwrap().rendered().is_some());
        let err = live.tick(100.0, &mut rng).unwrap_err();
        assert!(err.is_recoverable());
        let outcome = live.tick(200.0, &mut rng).unwrap();
        assert!(near(outcome.rendered().unwrap().frame.get_pixel(40, 30)[0], 200));
    }

    #[test]
    fn test_run_skips_recoverable_errors() {
        let dir = TempDir::new().unwrap();
        let mut params = RetroParams::neutral();
        params.quality = 80.0;
        let mut live = LiveSession::new(sequence_with_corrupt_frame(&dir), params, 3);

        let mut reds = Vec::new();
        let stats = live
            .run(&mut FixedRateTicks::display(), 10, &mut ConstantRandom(0.5), |index, rendered| {
                assert_eq!(index as usize, reds.len());
                reds.push(rendered.frame.get_pixel(40, 30)[0]);
                Ok(())
            })
            .unwrap();

        assert_eq!(stats, RunStats { rendered: 2, dropped: 1 });
        assert!(near(reds[0], 40) && near(reds[1], 200), "{reds:?}");
    }

    #[test]
    fn test_run_stops_at_frame_count() {
        let mut live = session([60, 60, 60]);
        let mut ticks = FixedRateTicks::display();
        let stats = live.run(&mut ticks, 3, &mut ConstantRandom(0.5), |_, _| Ok(())).unwrap();
        assert_eq!(stats, RunStats { rendered: 3, dropped: 0 });
    }

    #[test]
    fn test_run_propagates_unrecoverable_errors() {
        let source = FailingSource(|| FrameError::InvalidDimensions { width: 0, height: 0 }.into());
        let mut live = LiveSession::new(source, RetroParams::neutral(), 1);
        let err = live
            .run(&mut FixedRateTicks::display(), 5, &mut ConstantRandom(0.5), |_, _| Ok(()))
            .unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_run_gives_up_after_repeated_failures() {
        let source = FailingSource(|| FrameError::LoadFailed { path: "cam".into() }.into());
        let mut live = LiveSession::new(source, RetroParams::neutral(), 1);
        let mut ticks = FixedRateTicks::display().limited(10_000);
        let err = live.run(&mut ticks, 5, &mut ConstantRandom(0.5), |_, _| Ok(())).unwrap_err();
        assert!(err.is_recoverable());
    }
}
