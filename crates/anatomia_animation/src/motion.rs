//! Shared motion state
//!
//! Every hotspot marker pulses, every highlighted mesh glows and every area
//! marker breathes. Rather than each widget evaluating its own sine waves on
//! its own redraw loop, one subscriber computes all three oscillations per
//! tick and publishes a [`MotionSnapshot`] that consumers read.

use crate::scheduler::{FrameScheduler, FrameTime, Subscription};
use std::sync::{Arc, Mutex, PoisonError};

/// Angular frequency of the point-marker pulse (rad/s)
pub const PULSE_FREQUENCY: f32 = 4.0;
/// Pulse amplitude around a scale of 1.0
pub const PULSE_AMPLITUDE: f32 = 0.15;
/// Angular frequency of the highlight color cycle (rad/s)
pub const COLOR_FREQUENCY: f32 = 6.0;
/// Angular frequency of the area-ring breathing (rad/s)
pub const RING_FREQUENCY: f32 = 2.0;
/// Ring amplitude around a scale of 1.0
pub const RING_AMPLITUDE: f32 = 0.075;

/// Oscillation values for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSnapshot {
    /// Elapsed scheduler time the values were derived from
    pub elapsed: f32,
    /// Point-marker scale in `[0.85, 1.15]`
    pub pulse_scale: f32,
    /// Highlight color blend factor in `[0, 1]`
    pub color_phase: f32,
    /// Area-ring scale in `[0.925, 1.075]`
    pub area_ring_scale: f32,
}

impl MotionSnapshot {
    /// Derive all oscillations from elapsed seconds
    pub fn at(elapsed: f32) -> Self {
        Self {
            elapsed,
            pulse_scale: 1.0 + PULSE_AMPLITUDE * (elapsed * PULSE_FREQUENCY).sin(),
            color_phase: ((elapsed * COLOR_FREQUENCY).sin() + 1.0) * 0.5,
            area_ring_scale: 1.0 + RING_AMPLITUDE * (elapsed * RING_FREQUENCY).sin(),
        }
    }
}

impl Default for MotionSnapshot {
    fn default() -> Self {
        Self::at(0.0)
    }
}

/// Cloneable read-only view of the latest snapshot
#[derive(Clone, Debug, Default)]
pub struct MotionReader {
    snapshot: Arc<Mutex<MotionSnapshot>>,
}

impl MotionReader {
    /// Latest published snapshot
    pub fn snapshot(&self) -> MotionSnapshot {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: MotionSnapshot) {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

/// Motion state driven by a single scheduler subscription
///
/// Dropping it unsubscribes; readers keep returning the last snapshot.
pub struct SharedMotionState {
    reader: MotionReader,
    subscription: Subscription,
}

impl SharedMotionState {
    /// Scheduler id the motion state registers under
    pub const SUBSCRIPTION_ID: &'static str = "shared-motion";

    /// Subscribe to the scheduler and start publishing snapshots
    pub fn attach(scheduler: &FrameScheduler) -> Self {
        let reader = MotionReader::default();
        let publisher = reader.clone();
        let subscription = scheduler.subscribe(Self::SUBSCRIPTION_ID, move |time: FrameTime| {
            publisher.publish(MotionSnapshot::at(time.elapsed));
        });

        tracing::debug!("SharedMotionState: attached");
        Self {
            reader,
            subscription,
        }
    }

    /// Handle for consumers
    pub fn reader(&self) -> MotionReader {
        self.reader.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> MotionSnapshot {
        self.reader.snapshot()
    }

    /// Freeze or resume the oscillations without unsubscribing
    pub fn set_active(&self, active: bool) {
        self.subscription.set_active(active);
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}
