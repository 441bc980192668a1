//! Fixed-step game clock using an accumulator.
//!
//! `draw_web()` runs at the display's frame rate with a variable delta.
//! [`GameClock`] turns `performance.now()` timestamps into whole ticks so the
//! timer queue always advances in exact 100 ms steps.

/// Longest frame gap honoured. Anything longer (tab in background) is
/// treated as this much time, so timed effects pause instead of burning out
/// in a single frame.
const MAX_FRAME_MS: f64 = 500.0;

pub struct GameClock {
    ms_per_tick: f64,
    /// Elapsed milliseconds not yet consumed as ticks.
    accumulator: f64,
    /// `None` until the first frame.
    last_timestamp: Option<f64>,
}

impl GameClock {
    pub fn new(ms_per_tick: u64) -> Self {
        Self {
            ms_per_tick: ms_per_tick.max(1) as f64,
            accumulator: 0.0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp and get the number of ticks to run.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        ticks
    }
}
