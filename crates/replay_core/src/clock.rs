//! The process-wide simulated clock.
//!
//! Simulated time is a continuous value in minutes, advanced by a fixed rate
//! once per rendering frame and freely repositionable by the scrub control.
//! Exceeding the configured maximum wraps back to the minimum so playback
//! loops rather than stopping. All transitions go through [PlaybackClock]'s
//! operations; no caller mutates the fields directly.

use tracing::warn;

use crate::config::SimulationBounds;

/// Default advance per frame, in simulated minutes.
pub const DEFAULT_TICK_RATE: f64 = 0.000_2;

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    current: f64,
    bounds: SimulationBounds,
    rate: f64,
    initialized: bool,
}

impl PlaybackClock {
    /// A clock that advances `rate` simulated minutes per tick. It holds at
    /// zero until [PlaybackClock::initialize] establishes its bounds.
    pub fn new(rate: f64) -> Self {
        Self {
            current: 0.0,
            bounds: SimulationBounds { min: 0.0, max: 0.0 },
            rate,
            initialized: false,
        }
    }

    /// Sets the bounds and rewinds to `bounds.min`. Callable once per
    /// session; a repeated call mid-playback is ignored with a warning so a
    /// running tick chain can never observe its domain changing underneath
    /// it.
    pub fn initialize(&mut self, bounds: SimulationBounds) {
        if self.initialized {
            warn!("clock already initialized, ignoring re-initialization");
            return;
        }
        self.bounds = bounds;
        self.current = bounds.min;
        self.initialized = true;
    }

    /// Advances by the configured rate, wrapping to `bounds.min` when the
    /// result exceeds `bounds.max`. Total and deterministic: N ticks from a
    /// known state always land on the same value.
    pub fn tick(&mut self) {
        let next = self.current + self.rate;
        self.current = if next > self.bounds.max {
            self.bounds.min
        } else {
            next
        };
    }

    /// Repositions the clock exactly at `value`, no wrap or clamp applied.
    /// The scrub control owns range enforcement.
    pub fn seek(&mut self, value: f64) {
        self.current = value;
    }

    pub fn now(&self) -> f64 {
        self.current
    }

    pub fn bounds(&self) -> SimulationBounds {
        self.bounds
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE)
    }
}

/// Clock-face label (`HH:MM`, modulo 24 h) for a simulated minute count.
/// The one display context that rounds instead of truncating.
pub fn clock_label(minutes: f64) -> String {
    let total = minutes.round() as i64;
    format!("{:02}:{:02}", (total / 60) % 24, total % 60)
}
