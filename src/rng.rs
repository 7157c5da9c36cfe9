use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for SmallRng {
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }
}

/// Entropy-seeded generator for live preview
pub fn live_source() -> SmallRng {
    SmallRng::from_entropy()
}

/// Seeded generator for reproducible renders
pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Always returns the same value.
///
/// `ConstantRandom(0.5)` zeroes every centred draw (`rand - 0.5`), which
/// silences noise and jitter without disabling the stages themselves.
#[derive(Debug, Clone, Copy)]
pub struct ConstantRandom(pub f32);

impl RandomSource for ConstantRandom {
    fn next_unit(&mut self) -> f32 {
        self.0
    }
}

/// Replays a fixed sequence, cycling when it runs out
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
