use tracing::debug;

use crate::overlay::damage::generate_damage_map;
use crate::rng::RandomSource;
use crate::video::Frame;

/// Frames the shake stays active after motion crosses the threshold
pub const JITTER_SUSTAIN_FRAMES: u32 = 4;

/// Wave phase advance per rendered frame (radians)
pub const WAVE_PHASE_STEP: f32 = 0.15;

/// Motion-triggered "tracking shake"
#[derive(Debug, Clone, Copy, Default)]
pub struct JitterState {
    sustain: u32,
}

impl JitterState {
    /// Re-arm on motion, then draw this frame's displacement.
    ///
    /// Returns `(0, 0)` once the sustain window runs out.
    pub fn step<R: RandomSource + ?Sized>(
        &mut self,
        corner_motion: f32,
        threshold: f32,
        max_intensity: f32,
        rng: &mut R,
    ) -> (i32, i32) {
        if corner_motion > threshold {
            self.sustain = JITTER_SUSTAIN_FRAMES;
        }
        if self.sustain == 0 {
            return (0, 0);
        }

        let intensity = (corner_motion * max_intensity * 2.0).max(2.0).min(max_intensity);
        let dx = ((rng.next_unit() - 0.5) * intensity).floor() as i32;
        let dy = ((rng.next_unit() - 0.5) * intensity).floor() as i32;
        self.sustain -= 1;
        (dx, dy)
    }

    pub fn sustain(&self) -> u32 {
        self.sustain
    }

    pub fn is_active(&self) -> bool {
        self.sustain > 0
    }
}

/// Rolling vertical sync accumulator
#[derive(Debug, Clone, Copy, Default)]
pub struct RollState {
    offset: f32,
}

impl RollState {
    /// Advance by `speed` rows and wrap into `[0, height)`
    pub fn advance(&mut self, speed: f32, height: u32) -> f32 {
        self.offset = wrap(self.offset + speed, height);
        self.offset
    }

    /// Re-wrap after a height change
    pub fn rewrap(&mut self, height: u32) {
        self.offset = wrap(self.offset, height);
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}

fn wrap(value: f32, height: u32) -> f32 {
    if height == 0 {
        return 0.0;
    }
    let h = height as f32;
    let wrapped = value.rem_euclid(h);
    // rem_euclid can round up to exactly h for tiny negative inputs
    if wrapped >= h { 0.0 } else { wrapped }
}

/// Cached seeded damage texture
#[derive(Debug, Clone)]
struct DamageCache {
    seed: u32,
    texture: Frame,
}

/// Cross-frame state owned by one pipeline
#[derive(Debug, Clone, Default)]
pub struct TemporalState {
    dimensions: Option<(u32, u32)>,
    previous_raw: Option<Frame>,
    pub jitter: JitterState,
    pub roll: RollState,
    wave_phase: f32,
    damage: Option<DamageCache>,
}

impl TemporalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Swap to a new render size before any pixel work for the frame.
    ///
    /// The previous raw frame is resampled so it matches the new size and
    /// the damage texture is dropped so it is rebuilt at the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.dimensions == Some((width, height)) {
            return;
        }

        debug!("Temporal state resized {:?} -> {}x{}", self.dimensions, width, height);
        self.previous_raw = self
            .previous_raw
            .take()
            .map(|prev| prev.resize_nearest(width, height));
        self.roll.rewrap(height);
        self.damage = None;
        self.dimensions = Some((width, height));
    }

    /// Previous raw frame, only if it matches the current size
    pub fn previous_raw(&self) -> Option<&Frame> {
        let dims = self.dimensions?;
        self.previous_raw.as_ref().filter(|prev| prev.dimensions() == dims)
    }

    /// Forget the previous raw frame; temporal effects skip it for one frame
    pub fn invalidate_previous(&mut self) {
        self.previous_raw = None;
    }

    pub fn store_previous(&mut self, raw: Frame) {
        self.previous_raw = Some(raw);
    }

    /// Advance the wave clock and return the phase for this frame
    pub fn advance_wave(&mut self) -> f32 {
        let phase = self.wave_phase;
        self.wave_phase += WAVE_PHASE_STEP;
        phase
    }

    pub fn wave_phase(&self) -> f32 {
        self.wave_phase
    }

    /// Damage texture for the current size, generated on first use
    pub fn damage_texture(&mut self, seed: u32) -> Option<&Frame> {
        let (width, height) = self.dimensions?;
        let stale = self
            .damage
            .as_ref()
            .map_or(true, |cache| cache.seed != seed || cache.texture.dimensions() != (width, height));

        if stale {
            debug!("Generating damage texture {}x{} for seed {}", width, height, seed);
            self.damage = Some(DamageCache {
                seed,
                texture: generate_damage_map(seed, width, height),
            });
        }
        self.damage.as_ref().map(|cache| &cache.texture)
    }

    /// Drop everything, as after a pipeline restart
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
