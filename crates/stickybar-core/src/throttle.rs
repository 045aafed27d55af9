#![forbid(unsafe_code)]

//! Leading-edge rate gate with an injectable time source.
//!
//! [`Throttle`] bounds how often scroll/resize measurements are evaluated:
//! [`ready()`](Throttle::ready) answers true at most once per interval. The
//! clock is injectable so tests drive the gate deterministically without
//! real timers — production uses the monotonic clock, tests a
//! [`ManualClock`] advanced by hand.
//!
//! # Invariants
//!
//! 1. The first `ready()` call always passes.
//! 2. After a passing call, every call within `interval` fails.
//! 3. A zero interval disables the gate entirely.

use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

/// A manually advanceable clock for deterministic tests.
///
/// All handles cloned from the same `ManualClock` see the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch: Instant,
    offset_us: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            offset_us: Rc::new(Cell::new(0)),
        }
    }

    /// Advance the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        let us = delta.as_micros().min(u128::from(u64::MAX)) as u64;
        self.offset_us.set(self.offset_us.get().saturating_add(us));
    }

    /// Current manual time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.epoch + Duration::from_micros(self.offset_us.get())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a [`Throttle`] reads time from.
#[derive(Debug, Clone)]
pub enum TimeSource {
    /// Real monotonic time.
    Real,
    /// Deterministic manual clock for testing.
    Manual(ManualClock),
}

impl TimeSource {
    fn now(&self) -> Instant {
        match self {
            Self::Real => Instant::now(),
            Self::Manual(clock) => clock.now(),
        }
    }
}

/// Leading-edge throttle gate.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
    clock: TimeSource,
}

impl Throttle {
    /// Gate on the real monotonic clock.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, TimeSource::Real)
    }

    /// Gate on an explicit time source.
    #[must_use]
    pub fn with_clock(interval: Duration, clock: TimeSource) -> Self {
        Self {
            interval,
            last: None,
            clock,
        }
    }

    /// Configured minimum spacing between passing calls.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a call is admitted now. Admitting a call starts a new window.
    pub fn ready(&mut self) -> bool {
        if self.interval.is_zero() {
            return true;
        }
        let now = self.clock.now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last admitted call; the next `ready()` passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for Throttle {
    /// 200 ms gate on the real clock.
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
