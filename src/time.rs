//! Frame timing.
//!
//! The element tree never reads a clock. The host samples its monotonic clock
//! once per frame and hands the result down as a [`Frame`].

use embassy_time::{Duration, Instant};

/// Time context for a single draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Monotonic timestamp sampled at the start of the frame
    pub now: Instant,
    /// Time elapsed since the previous frame
    pub delta: Duration,
}

impl Frame {
    pub const fn new(now: Instant, delta: Duration) -> Self {
        Self { now, delta }
    }

    /// Convenience constructor from raw millisecond values.
    pub const fn from_millis(now_ms: u64, delta_ms: u64) -> Self {
        Self {
            now: Instant::from_millis(now_ms),
            delta: Duration::from_millis(delta_ms),
        }
    }
}

/// Turns successive clock readings into [`Frame`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Record a new clock reading and return the frame for it.
    ///
    /// The first tick has a zero delta. A reading earlier than the previous one
    /// also yields a zero delta rather than wrapping.
    pub fn tick(&mut self, now: Instant) -> Frame {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_ticks(0),
        };
        self.last = Some(now);
        Frame { now, delta }
    }
}

/// Elapsed-duration check against an externally supplied clock.
///
/// [`check`](Timer::check) does not rearm the timer: once the window has
/// elapsed it keeps returning `true` until [`reset`](Timer::reset) is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            last: Instant::from_millis(0),
        }
    }

    pub const fn from_millis(duration_ms: u64) -> Self {
        Self::new(Duration::from_millis(duration_ms))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Start a new window at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Whether the current window has fully elapsed at `now`.
    pub fn check(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) >= self.duration
    }

    /// Time left in the current window, zero once elapsed.
    pub fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        if elapsed >= self.duration {
            Duration::from_ticks(0)
        } else {
            self.duration - elapsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_at_duration_boundary() {
        let mut timer = Timer::from_millis(5000);
        timer.reset(Instant::from_millis(0));

        assert!(!timer.check(Instant::from_millis(4999)));
        assert!(timer.check(Instant::from_millis(5000)));
    }

    #[test]
    fn test_timer_stays_elapsed_until_reset() {
        let mut timer = Timer::from_millis(100);
        timer.reset(Instant::from_millis(1000));

        assert!(timer.check(Instant::from_millis(1100)));
        assert!(timer.check(Instant::from_millis(1100)));
        assert!(timer.check(Instant::from_millis(1500)));

        timer.reset(Instant::from_millis(1500));
        assert!(!timer.check(Instant::from_millis(1599)));
        assert!(timer.check(Instant::from_millis(1600)));
    }

    #[test]
    fn test_timer_remaining() {
        let mut timer = Timer::from_millis(250);
        timer.reset(Instant::from_millis(0));

        assert_eq!(timer.remaining(Instant::from_millis(100)).as_millis(), 150);
        assert_eq!(timer.remaining(Instant::from_millis(300)).as_millis(), 0);
    }

    #[test]
    fn test_frame_clock_deltas() {
        let mut clock = FrameClock::new();

        let first = clock.tick(Instant::from_millis(40));
        assert_eq!(first.delta.as_millis(), 0);

        let second = clock.tick(Instant::from_millis(73));
        assert_eq!(second.now.as_millis(), 73);
        assert_eq!(second.delta.as_millis(), 33);

        // Backwards readings do not wrap
        let third = clock.tick(Instant::from_millis(50));
        assert_eq!(third.delta.as_millis(), 0);
    }
}
