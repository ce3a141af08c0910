//! Frame scheduler
//!
//! Multiplexes one host-provided per-frame tick source over many named
//! callbacks. Widgets subscribe instead of running their own redraw loops:
//! - `subscribe()` registers (or overrides) a callback under a string id
//! - `set_active()` toggles a callback without removing it
//! - dropping or calling `unsubscribe()` on the returned [`Subscription`]
//!   removes it
//!
//! The host tick source is started lazily on the first subscription and
//! stopped when the registry empties. Elapsed time is measured from the moment
//! the loop (re)started, not from wall-clock history.

use anatomia_core::SharedClock;
use indexmap::IndexMap;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Timing information passed to every subscriber on each tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the loop last started
    pub elapsed: f32,
    /// Seconds since the previous tick
    pub delta: f32,
}

/// Callback invoked once per tick while its subscription is active
pub type TickCallback = Box<dyn FnMut(FrameTime) + Send>;

type SharedCallback = Arc<Mutex<TickCallback>>;

/// Host-side per-frame tick source (e.g. a display refresh callback)
///
/// The scheduler calls `start()` when the first subscription arrives and
/// `stop()` when the last one leaves. While started, the host is expected to
/// call [`FrameScheduler::tick`] once per frame.
pub trait TickSource: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Tick source for hosts that drive `tick()` unconditionally
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTickSource;

impl TickSource for NullTickSource {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

/// Tick source that only records whether the host loop should be running
///
/// Clones share state, so a headless host (or a test) can keep one clone and
/// poll `is_running()` to decide whether to keep ticking.
#[derive(Clone, Debug, Default)]
pub struct ManualTickSource {
    running: Arc<AtomicBool>,
    starts: Arc<AtomicU64>,
    stops: Arc<AtomicU64>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of times the scheduler started the loop
    pub fn start_count(&self) -> u64 {
        self.starts.load(Ordering::Relaxed)
    }

    /// Number of times the scheduler stopped the loop
    pub fn stop_count(&self) -> u64 {
        self.stops.load(Ordering::Relaxed)
    }
}

impl TickSource for ManualTickSource {
    fn start(&mut self) {
        self.running.store(true, Ordering::Release);
        self.starts.fetch_add(1, Ordering::Relaxed);
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.stops.fetch_add(1, Ordering::Relaxed);
    }
}

struct SubscriptionRecord {
    /// Distinguishes this record from later overrides of the same id
    token: u64,
    callback: SharedCallback,
    active: bool,
}

struct SchedulerInner {
    subscriptions: IndexMap<String, SubscriptionRecord>,
    next_token: u64,
    clock: SharedClock,
    tick_source: Box<dyn TickSource>,
    running: bool,
    origin: Duration,
    last_frame: Duration,
    frame_count: u64,
}

impl SchedulerInner {
    /// Register a record, returning its token and any record it replaced
    ///
    /// The replaced record owns a user callback and must be dropped by the
    /// caller after the registry lock is released.
    fn insert(
        &mut self,
        id: String,
        callback: TickCallback,
        active: bool,
    ) -> (u64, Option<SubscriptionRecord>) {
        let token = self.next_token;
        self.next_token += 1;

        let record = SubscriptionRecord {
            token,
            callback: Arc::new(Mutex::new(callback)),
            active,
        };

        let replaced = self.subscriptions.insert(id.clone(), record);
        if replaced.is_some() {
            tracing::debug!("FrameScheduler: subscription '{}' overridden", id);
        }

        if !self.running {
            let now = self.clock.now();
            self.origin = now;
            self.last_frame = now;
            self.frame_count = 0;
            self.running = true;
            self.tick_source.start();
            tracing::debug!("FrameScheduler: tick source started");
        }

        (token, replaced)
    }

    /// Unregister `id` if it still carries `token`
    ///
    /// Like [`insert`](Self::insert), hands the removed record back so it is
    /// dropped outside the lock.
    fn remove(&mut self, id: &str, token: u64) -> Option<SubscriptionRecord> {
        let matches = self
            .subscriptions
            .get(id)
            .is_some_and(|record| record.token == token);
        if !matches {
            return None;
        }

        let removed = self.subscriptions.shift_remove(id);

        if self.subscriptions.is_empty() && self.running {
            self.running = false;
            self.tick_source.stop();
            tracing::debug!(
                "FrameScheduler: tick source stopped after {} frames",
                self.frame_count
            );
        }
        removed
    }

    fn set_active(&mut self, id: &str, active: bool) -> bool {
        match self.subscriptions.get_mut(id) {
            Some(record) => {
                record.active = active;
                true
            }
            None => false,
        }
    }

    fn is_current(&self, id: &str, token: u64) -> bool {
        self.subscriptions
            .get(id)
            .is_some_and(|record| record.token == token && record.active)
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking subscriber can poison its own callback lock; the registry
    // data stays consistent, so keep going with the inner value.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// The shared frame scheduler
///
/// Explicitly constructed and owned by whatever composes the scene; there is
/// no global instance, so several isolated schedulers can coexist (one per
/// test, one per viewport).
///
/// ```
/// use anatomia_animation::{FrameScheduler, ManualTickSource};
/// use anatomia_core::ManualClock;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let clock = ManualClock::shared();
/// let source = ManualTickSource::new();
/// let scheduler = FrameScheduler::with_tick_source(clock.clone(), source.clone());
///
/// let ticks = Arc::new(AtomicU32::new(0));
/// let counter = ticks.clone();
/// let sub = scheduler.subscribe("counter", move |_| {
///     counter.fetch_add(1, Ordering::Relaxed);
/// });
/// assert!(source.is_running());
///
/// scheduler.tick();
/// assert_eq!(ticks.load(Ordering::Relaxed), 1);
///
/// sub.unsubscribe();
/// assert!(!source.is_running());
/// ```
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl FrameScheduler {
    /// Create a scheduler driven unconditionally by the host
    pub fn new(clock: SharedClock) -> Self {
        Self::with_tick_source(clock, NullTickSource)
    }

    /// Create a scheduler that starts and stops the given tick source
    pub fn with_tick_source<S>(clock: SharedClock, tick_source: S) -> Self
    where
        S: TickSource + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                subscriptions: IndexMap::new(),
                next_token: 0,
                clock,
                tick_source: Box::new(tick_source),
                running: false,
                origin: Duration::ZERO,
                last_frame: Duration::ZERO,
                frame_count: 0,
            })),
        }
    }

    /// Get a weak handle for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register an active callback under `id`
    ///
    /// A later subscription with the same id replaces this one.
    pub fn subscribe<F>(&self, id: impl Into<String>, callback: F) -> Subscription
    where
        F: FnMut(FrameTime) + Send + 'static,
    {
        self.subscribe_with(id, callback, true)
    }

    /// Register a callback with an explicit initial activity
    pub fn subscribe_with<F>(&self, id: impl Into<String>, callback: F, active: bool) -> Subscription
    where
        F: FnMut(FrameTime) + Send + 'static,
    {
        subscribe_into(&self.inner, id.into(), Box::new(callback), active)
    }

    /// Toggle a subscription without removing it
    ///
    /// Returns `false` if no subscription exists under `id`.
    pub fn set_active(&self, id: &str, active: bool) -> bool {
        lock(&self.inner).set_active(id, active)
    }

    /// Whether the subscription under `id` exists and is active
    pub fn is_active(&self, id: &str) -> bool {
        lock(&self.inner)
            .subscriptions
            .get(id)
            .is_some_and(|record| record.active)
    }

    /// Whether the tick source is currently running
    pub fn is_running(&self) -> bool {
        lock(&self.inner).running
    }

    /// Number of registered subscriptions, active or not
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscriptions.len()
    }

    /// Number of subscriptions that will receive the next tick
    pub fn active_count(&self) -> usize {
        lock(&self.inner)
            .subscriptions
            .values()
            .filter(|record| record.active)
            .count()
    }

    /// Frames dispatched since the loop last started
    pub fn frame_count(&self) -> u64 {
        lock(&self.inner).frame_count
    }

    /// Dispatch one frame to every active subscriber
    ///
    /// Returns `false` without dispatching when nothing is subscribed.
    /// The registry lock is released before callbacks run, so callbacks may
    /// toggle, add or remove subscriptions. A callback removed or deactivated
    /// earlier in the same tick is skipped. A panicking callback is logged and
    /// does not affect the rest of the dispatch.
    pub fn tick(&self) -> bool {
        let (time, batch) = {
            let mut inner = lock(&self.inner);
            if !inner.running {
                return false;
            }

            let now = inner.clock.now();
            let time = FrameTime {
                elapsed: now.saturating_sub(inner.origin).as_secs_f32(),
                delta: now.saturating_sub(inner.last_frame).as_secs_f32(),
            };
            inner.last_frame = now;
            inner.frame_count += 1;

            let batch: Vec<(String, u64, SharedCallback)> = inner
                .subscriptions
                .iter()
                .filter(|(_, record)| record.active)
                .map(|(id, record)| (id.clone(), record.token, Arc::clone(&record.callback)))
                .collect();

            (time, batch)
        };

        tracing::trace!(
            "FrameScheduler: tick elapsed={:.3}s delta={:.4}s subscribers={}",
            time.elapsed,
            time.delta,
            batch.len()
        );

        for (id, token, callback) in batch {
            if !lock(&self.inner).is_current(&id, token) {
                continue;
            }

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut callback = lock(&callback);
                (*callback)(time);
            }));

            if let Err(payload) = result {
                tracing::error!(
                    "FrameScheduler: subscriber '{}' panicked: {}",
                    id,
                    panic_message(payload.as_ref())
                );
            }
        }

        true
    }
}

fn subscribe_into(
    inner: &Arc<Mutex<SchedulerInner>>,
    id: String,
    callback: TickCallback,
    active: bool,
) -> Subscription {
    let (token, replaced) = lock(inner).insert(id.clone(), callback, active);
    // The old callback may own subscriptions of its own
    drop(replaced);
    Subscription {
        id,
        token,
        inner: Arc::downgrade(inner),
    }
}

/// A weak handle to the frame scheduler
///
/// Components hold this instead of the scheduler itself. It does not keep the
/// scheduler alive; operations on a dead handle are no-ops.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Register a callback; returns `None` if the scheduler was dropped
    pub fn subscribe<F>(&self, id: impl Into<String>, callback: F, active: bool) -> Option<Subscription>
    where
        F: FnMut(FrameTime) + Send + 'static,
    {
        self.inner
            .upgrade()
            .map(|inner| subscribe_into(&inner, id.into(), Box::new(callback), active))
    }

    /// Toggle a subscription; returns `false` if it or the scheduler is gone
    pub fn set_active(&self, id: &str, active: bool) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| lock(&inner).set_active(id, active))
    }

    /// Whether the scheduler's tick source is running
    pub fn is_running(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| lock(&inner).running)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Registration returned by `subscribe()`
///
/// Dropping it removes the callback. If the id has since been re-subscribed,
/// this stale registration leaves the newer record untouched.
pub struct Subscription {
    id: String,
    token: u64,
    inner: Weak<Mutex<SchedulerInner>>,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Toggle this subscription without removing it
    pub fn set_active(&self, active: bool) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = lock(&inner);
            if inner
                .subscriptions
                .get(&self.id)
                .is_some_and(|record| record.token == self.token)
            {
                inner.set_active(&self.id, active);
            }
        }
    }

    /// Whether this exact registration is still present and active
    pub fn is_active(&self) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| lock(&inner).is_current(&self.id, self.token))
    }

    /// Remove the callback immediately
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    fn remove(&self) {
        if let Some(inner) = self.inner.upgrade() {
            let removed = lock(&inner).remove(&self.id, self.token);
            drop(removed);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("token", &self.token)
            .finish()
    }
}
