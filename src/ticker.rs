/// Display refresh the CLI simulates
pub const DISPLAY_HZ: f64 = 60.0;

/// True when enough time has passed since the last rendered frame
pub fn gate(elapsed_ms: f64, interval_ms: f64) -> bool {
    elapsed_ms > interval_ms
}

/// Keeps the time of the last rendered frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the tick at `now_ms` renders.
    ///
    /// The first tick always renders. Afterwards the remainder past the
    /// interval is carried so the average rate does not drift.
    pub fn tick(&mut self, now_ms: f64, interval_ms: f64) -> bool {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return true;
        };

        let elapsed = now_ms - last;
        if !gate(elapsed, interval_ms) {
            return false;
        }
        self.last_ms = Some(now_ms - elapsed % interval_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Anything that produces display ticks (timestamps in milliseconds)
pub trait TickSource {
    fn next_tick(&mut self) -> Option<f64>;
}

/// Evenly spaced ticks, optionally bounded
#[derive(Debug, Clone)]
pub struct FixedRateTicks {
    period_ms: f64,
    next_ms: f64,
    remaining: Option<u64>,
}

impl FixedRateTicks {
    pub fn new(hz: f64) -> Self {
        Self {
            period_ms: 1000.0 / hz.max(1.0),
            next_ms: 0.0,
            remaining: None,
        }
    }

    /// Display refresh at [`DISPLAY_HZ`]
    pub fn display() -> Self {
        Self::new(DISPLAY_HZ)
    }

    pub fn limited(mut self, ticks: u64) -> Self {
        self.remaining = Some(ticks);
        self
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }
}

impl TickSource for FixedRateTicks {
    fn next_tick(&mut self) -> Option<f64> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let now = self.next_ms;
        self.next_ms += self.period_ms;
        Some(now)
    }
}

impl Iterator for FixedRateTicks {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.next_tick()
    }
}
