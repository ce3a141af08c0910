//! Monotonic clocks
//!
//! Everything time-dependent in Anatomia (frame ticks, reveal windows, round
//! advances) reads time through the [`Clock`] trait instead of calling
//! `Instant::now()` directly. Hosts use [`SystemClock`]; tests use
//! [`ManualClock`] and advance it explicitly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source
///
/// `now()` returns the time elapsed since an arbitrary, fixed epoch chosen by
/// the clock. Only differences between readings are meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Shared, type-erased clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by `std::time::Instant`
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Create a shared handle to a fresh system clock
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Manually advanced clock with microsecond resolution
///
/// ```
/// use anatomia_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_millis(1500));
/// assert_eq!(clock.now(), Duration::from_millis(1500));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            micros: AtomicU64::new(0),
        }
    }

    /// Create a shared manual clock
    ///
    /// Returns the concrete handle so tests can keep advancing it after
    /// handing a `SharedClock` clone to the code under test.
    pub fn shared() -> Arc<ManualClock> {
        Arc::new(Self::new())
    }

    /// Move the clock forward, saturating at the largest reading
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        let _ = self
            .micros
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |micros| {
                Some(micros.saturating_add(by))
            });
    }

    /// Move the clock forward by fractional seconds
    ///
    /// Negative and NaN amounts are ignored; amounts too large for a
    /// `Duration` (including infinity) saturate.
    pub fn advance_secs(&self, secs: f32) {
        match Duration::try_from_secs_f32(secs) {
            Ok(by) => self.advance(by),
            Err(_) if secs > 0.0 => self.advance(Duration::MAX),
            Err(_) => {}
        }
    }

    /// Jump to an absolute reading
    ///
    /// Readings never go backwards; a target earlier than the current reading
    /// is ignored.
    pub fn set(&self, to: Duration) {
        let to = u64::try_from(to.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_max(to, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Acquire))
    }
}
