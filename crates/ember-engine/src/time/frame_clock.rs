use std::time::{Duration, Instant};

/// Snapshot produced by one [`FrameClock::tick`].
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped time since the previous tick.
    pub delta: Duration,

    /// Sum of all clamped deltas since the clock was created or reset.
    pub elapsed: Duration,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Number of ticks before this one.
    pub frame_index: u64,
}

impl FrameTime {
    /// `delta` in seconds.
    #[inline]
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Produces per-frame deltas for the main loop.
///
/// Deltas are clamped so a debugger break, a minimized window or a long
/// stall does not hand a multi-second step to game logic.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    /// Creates a clock with custom delta clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Moves the baseline to now and forgets accumulated time.
    ///
    /// Called when a run starts so window creation and user setup do not
    /// show up as the first frame's delta.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.elapsed = Duration::ZERO;
        self.frame_index = 0;
    }

    /// Total clamped time accumulated so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advances the clock.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.elapsed += dt;

        let ft = FrameTime {
            delta: dt,
            elapsed: self.elapsed,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_clamped_to_minimum() {
        let mut clock = FrameClock::new();
        let base = clock.last;
        let ft = clock.tick_at(base);
        assert_eq!(ft.delta, FrameClock::DEFAULT_DT_MIN);
    }

    #[test]
    fn delta_is_clamped_to_maximum_after_stall() {
        let mut clock = FrameClock::new();
        let base = clock.last;
        let ft = clock.tick_at(base + Duration::from_secs(5));
        assert_eq!(ft.delta, FrameClock::DEFAULT_DT_MAX);
    }

    #[test]
    fn elapsed_accumulates_and_index_advances() {
        let mut clock = FrameClock::new();
        let base = clock.last;
        let a = clock.tick_at(base + Duration::from_millis(16));
        let b = clock.tick_at(base + Duration::from_millis(32));

        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert_eq!(b.delta, Duration::from_millis(16));
        assert_eq!(b.elapsed, Duration::from_millis(32));
        assert_eq!(clock.elapsed(), Duration::from_millis(32));
    }

    #[test]
    fn reset_clears_accumulated_time() {
        let mut clock = FrameClock::new();
        let base = clock.last;
        clock.tick_at(base + Duration::from_millis(40));
        clock.reset();

        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert_eq!(clock.tick().frame_index, 0);
    }
}
