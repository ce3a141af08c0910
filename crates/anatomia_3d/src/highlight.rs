//! Model highlighting
//!
//! Hovering a hotspot lights up every sub-part whose vertical center lies in
//! the hotspot's band. Measuring every part's bounds on every frame is the
//! expensive way to answer that; [`SpatialHighlightIndex`] measures each part
//! once when the model is mounted and answers from a map afterwards.
//!
//! [`HighlightController`] wires the index to the shared frame scheduler and
//! the shared motion state so the active highlight pulses with everything
//! else in the scene.

use crate::catalog::HotspotCatalog;
use crate::model::{PartId, SceneModel, Tint};
use anatomia_animation::{FrameTime, MotionReader, MotionSnapshot, SchedulerHandle, Subscription};
use anatomia_core::Color;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Look of the emissive highlight
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub color: Color,
    /// Emission at `color_phase == 0`
    pub min_intensity: f32,
    /// Emission at `color_phase == 1`
    pub max_intensity: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x38BDF8),
            min_intensity: 0.35,
            max_intensity: 0.8,
        }
    }
}

impl HighlightStyle {
    /// Highlight tint for the given frame
    pub fn tint(&self, motion: &MotionSnapshot) -> Tint {
        let t = motion.color_phase.clamp(0.0, 1.0);
        Tint::new(
            self.color,
            self.min_intensity + (self.max_intensity - self.min_intensity) * t,
        )
    }
}

/// What one highlight pass did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HighlightOutcome {
    /// Parts inside the active band
    pub highlighted: usize,
    /// Tint writes actually issued
    pub writes: usize,
    /// Enumerated parts with no cached center
    pub skipped: usize,
}

/// Per-mount cache of sub-part vertical centers
#[derive(Clone, Debug, Default)]
pub struct SpatialHighlightIndex {
    centers: FxHashMap<PartId, f32>,
}

impl SpatialHighlightIndex {
    /// Measure every renderable part of a freshly mounted model once
    pub fn build<M: SceneModel + ?Sized>(model: &M) -> Self {
        let mut centers = FxHashMap::default();
        model.for_each_part(&mut |part| {
            if let Some(center) = model.compute_bounds(part).and_then(|b| b.vertical_center()) {
                centers.insert(part, center);
            }
        });

        tracing::debug!("SpatialHighlightIndex: cached {} part centers", centers.len());
        Self { centers }
    }

    /// Discard the cache and measure a newly mounted model
    pub fn rebuild<M: SceneModel + ?Sized>(&mut self, model: &M) {
        *self = Self::build(model);
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Cached vertical center of a part
    pub fn center(&self, part: PartId) -> Option<f32> {
        self.centers.get(&part).copied()
    }

    /// Parts whose cached center lies in `[y_min, y_max]`
    pub fn parts_in_band(&self, y_min: f32, y_max: f32) -> Vec<PartId> {
        self.centers
            .iter()
            .filter(|&(_, &y)| y >= y_min && y <= y_max)
            .map(|(&part, _)| part)
            .collect()
    }

    /// Update every part's tint for the current hover state
    ///
    /// With nothing hovered every part returns to neutral. A hovered id the
    /// catalog does not know changes nothing and returns `None`. Otherwise
    /// parts in the hotspot's band get the highlight tint and the rest go
    /// neutral. Tints are only written when they differ from the current
    /// value, and parts missing from the cache are left alone.
    pub fn apply<M: SceneModel + ?Sized>(
        &self,
        model: &mut M,
        catalog: &HotspotCatalog,
        hovered: Option<&str>,
        style: &HighlightStyle,
        motion: &MotionSnapshot,
    ) -> Option<HighlightOutcome> {
        let band = match hovered {
            Some(id) => Some(catalog.get(id)?),
            None => None,
        };
        let highlight = style.tint(motion);

        let mut outcome = HighlightOutcome::default();
        let mut writes: Vec<(PartId, Tint)> = Vec::new();

        model.for_each_part(&mut |part| {
            let Some(&center) = self.centers.get(&part) else {
                outcome.skipped += 1;
                return;
            };

            let wanted = match band {
                Some(entry) if entry.covers_height(center) => {
                    outcome.highlighted += 1;
                    highlight
                }
                _ => Tint::NEUTRAL,
            };

            if model.tint(part) != Some(wanted) {
                writes.push((part, wanted));
            }
        });

        outcome.writes = writes.len();
        for (part, tint) in writes {
            model.set_tint(part, tint);
        }

        tracing::trace!(
            "SpatialHighlightIndex: hovered={:?} highlighted={} writes={}",
            hovered,
            outcome.highlighted,
            outcome.writes
        );
        Some(outcome)
    }
}

struct HighlightState<M> {
    model: M,
    index: SpatialHighlightIndex,
    catalog: HotspotCatalog,
    style: HighlightStyle,
    hovered: Option<String>,
    last_outcome: Option<HighlightOutcome>,
}

impl<M: SceneModel> HighlightState<M> {
    fn refresh(&mut self, motion: &MotionSnapshot) {
        let outcome = self.index.apply(
            &mut self.model,
            &self.catalog,
            self.hovered.as_deref(),
            &self.style,
            motion,
        );
        if outcome.is_some() {
            self.last_outcome = outcome;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mounted model plus its highlight cache, re-evaluated every frame
///
/// Owns the model exclusively: the bounding cache and the tint registry live
/// and die with the mount.
pub struct HighlightController<M: SceneModel + Send + 'static> {
    state: Arc<Mutex<HighlightState<M>>>,
    subscription: Subscription,
}

impl<M: SceneModel + Send + 'static> HighlightController<M> {
    /// Scheduler id [`attach`](Self::attach) registers under
    pub const SUBSCRIPTION_ID: &'static str = "model-highlight";

    /// Mount a model and start highlighting on the scheduler's ticks
    ///
    /// Registers under [`SUBSCRIPTION_ID`](Self::SUBSCRIPTION_ID), so it
    /// replaces any other controller attached this way to the same
    /// scheduler. Use [`attach_with_id`](Self::attach_with_id) to mount
    /// several models side by side. Returns `None` if the scheduler has been
    /// dropped.
    pub fn attach(
        scheduler: &SchedulerHandle,
        model: M,
        catalog: HotspotCatalog,
        motion: MotionReader,
        style: HighlightStyle,
    ) -> Option<Self> {
        Self::attach_with_id(
            scheduler,
            Self::SUBSCRIPTION_ID,
            model,
            catalog,
            motion,
            style,
        )
    }

    /// Mount a model under its own scheduler id
    pub fn attach_with_id(
        scheduler: &SchedulerHandle,
        id: impl Into<String>,
        model: M,
        catalog: HotspotCatalog,
        motion: MotionReader,
        style: HighlightStyle,
    ) -> Option<Self> {
        let index = SpatialHighlightIndex::build(&model);
        let state = Arc::new(Mutex::new(HighlightState {
            model,
            index,
            catalog,
            style,
            hovered: None,
            last_outcome: None,
        }));

        let tick_state = Arc::clone(&state);
        let subscription = scheduler.subscribe(
            id,
            move |_time: FrameTime| {
                lock(&tick_state).refresh(&motion.snapshot());
            },
            true,
        )?;

        Some(Self {
            state,
            subscription,
        })
    }

    /// Set or clear the hovered hotspot
    pub fn set_hovered(&self, hotspot: Option<&str>) {
        lock(&self.state).hovered = hotspot.map(str::to_owned);
    }

    pub fn hovered(&self) -> Option<String> {
        lock(&self.state).hovered.clone()
    }

    /// Replace the mounted model
    ///
    /// The old model, its cache and its tints are dropped; the new model is
    /// measured from scratch.
    pub fn remount(&self, model: M) {
        let mut state = lock(&self.state);
        state.index.rebuild(&model);
        state.model = model;
        state.last_outcome = None;
        tracing::debug!("HighlightController: remounted model");
    }

    /// Outcome of the most recent pass that ran
    pub fn last_outcome(&self) -> Option<HighlightOutcome> {
        lock(&self.state).last_outcome
    }

    /// Number of cached part centers for the current mount
    pub fn cached_parts(&self) -> usize {
        lock(&self.state).index.len()
    }

    /// Run a closure against the mounted model
    pub fn with_model<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&lock(&self.state).model)
    }

    /// Pause or resume per-frame highlighting
    pub fn set_active(&self, active: bool) {
        self.subscription.set_active(active);
    }

    /// Whether this controller still receives ticks
    ///
    /// `false` once paused, or once another subscription took over its id.
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HotspotEntry;
    use crate::model::{MeshModel, MeshPart};
    use anatomia_animation::{FrameScheduler, SharedMotionState};
    use anatomia_core::{ManualClock, Vec3};

    fn catalog() -> HotspotCatalog {
        HotspotCatalog::new(vec![
            HotspotEntry::new("knee", "Genu", Vec3::new(5.0, 15.0, 0.0), 10.0, 20.0),
            HotspotEntry::new("head", "Caput", Vec3::new(0.0, 170.0, 0.0), 150.0, 180.0),
        ])
        .unwrap()
    }

    fn three_parts() -> (MeshModel, [PartId; 3]) {
        let mut model = MeshModel::new();
        let low = model.add_part(MeshPart::slab("low", 0.0, 10.0));
        let mid = model.add_part(MeshPart::slab("mid", 10.0, 20.0));
        let high = model.add_part(MeshPart::slab("high", 20.0, 30.0));
        (model, [low, mid, high])
    }

    #[test]
    fn test_band_selects_only_inner_part() {
        let (mut model, [low, mid, high]) = three_parts();
        let index = SpatialHighlightIndex::build(&model);
        assert_eq!(index.center(low), Some(5.0));
        assert_eq!(index.center(mid), Some(15.0));
        assert_eq!(index.center(high), Some(25.0));
        assert_eq!(index.parts_in_band(10.0, 20.0), vec![mid]);

        let style = HighlightStyle::default();
        let motion = MotionSnapshot::default();
        let outcome = index
            .apply(&mut model, &catalog(), Some("knee"), &style, &motion)
            .unwrap();

        assert_eq!(outcome.highlighted, 1);
        assert_eq!(outcome.writes, 1);
        assert_eq!(model.tint(mid), Some(style.tint(&motion)));
        assert!(model.tint(low).unwrap().is_neutral());
        assert!(model.tint(high).unwrap().is_neutral());
    }

    #[test]
    fn test_no_redundant_writes() {
        let (mut model, [_, mid, _]) = three_parts();
        let index = SpatialHighlightIndex::build(&model);
        let style = HighlightStyle::default();
        let motion = MotionSnapshot::default();

        // Already neutral: nothing to write
        let outcome = index
            .apply(&mut model, &catalog(), None, &style, &motion)
            .unwrap();
        assert_eq!(outcome.writes, 0);
        assert_eq!(model.tint_writes(), 0);

        index.apply(&mut model, &catalog(), Some("knee"), &style, &motion);
        let outcome = index
            .apply(&mut model, &catalog(), Some("knee"), &style, &motion)
            .unwrap();
        assert_eq!(outcome.writes, 0);
        assert_eq!(model.tint_writes(), 1);

        // Clearing the hover resets only the one lit part
        let outcome = index
            .apply(&mut model, &catalog(), None, &style, &motion)
            .unwrap();
        assert_eq!(outcome.writes, 1);
        assert!(model.tint(mid).unwrap().is_neutral());
    }

    #[test]
    fn test_unknown_hotspot_changes_nothing() {
        let (mut model, [_, mid, _]) = three_parts();
        let index = SpatialHighlightIndex::build(&model);
        let style = HighlightStyle::default();
        let motion = MotionSnapshot::default();

        index.apply(&mut model, &catalog(), Some("knee"), &style, &motion);
        let lit = model.tint(mid);

        assert!(index
            .apply(&mut model, &catalog(), Some("pancreas"), &style, &motion)
            .is_none());
        assert_eq!(model.tint(mid), lit);
        assert_eq!(model.tint_writes(), 1);
    }

    #[test]
    fn test_uncached_parts_are_skipped() {
        let (mut model, [_, mid, _]) = three_parts();
        let index = SpatialHighlightIndex::build(&model);

        // Added after the index was built, and also inside the band
        let late = model.add_part(MeshPart::slab("late", 12.0, 18.0));
        let outcome = index
            .apply(
                &mut model,
                &catalog(),
                Some("knee"),
                &HighlightStyle::default(),
                &MotionSnapshot::default(),
            )
            .unwrap();

        assert_eq!(outcome.skipped, 1);
        assert!(model.tint(late).unwrap().is_neutral());
        assert!(!model.tint(mid).unwrap().is_neutral());
    }

    #[test]
    fn test_geometry_less_parts_are_not_cached() {
        let mut model = MeshModel::new();
        model.add_part(MeshPart::new("empty", Vec::new()));
        model.add_part(MeshPart::slab("hidden", 0.0, 1.0).non_renderable());
        let index = SpatialHighlightIndex::build(&model);
        assert!(index.is_empty());
    }

    #[test]
    fn test_highlight_pulses_with_color_phase() {
        let style = HighlightStyle::default();
        let mut low = MotionSnapshot::default();
        low.color_phase = 0.0;
        let mut high = low;
        high.color_phase = 1.0;

        assert!((style.tint(&low).intensity - style.min_intensity).abs() < 1e-6);
        assert!((style.tint(&high).intensity - style.max_intensity).abs() < 1e-6);
    }

    #[test]
    fn test_controller_follows_ticks_and_remounts() {
        let clock = ManualClock::shared();
        let scheduler = FrameScheduler::new(clock.clone());
        let motion = SharedMotionState::attach(&scheduler);
        let (model, [_, mid, _]) = three_parts();

        let controller = HighlightController::attach(
            &scheduler.handle(),
            model,
            catalog(),
            motion.reader(),
            HighlightStyle::default(),
        )
        .unwrap();
        assert_eq!(controller.cached_parts(), 3);

        controller.set_hovered(Some("knee"));
        clock.advance_secs(0.016);
        scheduler.tick();
        assert_eq!(controller.last_outcome().unwrap().highlighted, 1);
        assert!(controller.with_model(|m| !m.tint(mid).unwrap().is_neutral()));

        // Fresh instance: cache rebuilt, tints start neutral
        let mut replacement = MeshModel::new();
        replacement.add_part(MeshPart::slab("only", 100.0, 110.0));
        controller.remount(replacement);
        assert_eq!(controller.cached_parts(), 1);
        assert!(controller.last_outcome().is_none());

        scheduler.tick();
        assert_eq!(controller.last_outcome().unwrap().highlighted, 0);

        controller.set_hovered(None);
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn test_controller_pauses_without_unsubscribing() {
        let scheduler = FrameScheduler::new(ManualClock::shared());
        let (model, _) = three_parts();
        let controller = HighlightController::attach(
            &scheduler.handle(),
            model,
            catalog(),
            MotionReader::default(),
            HighlightStyle::default(),
        )
        .unwrap();

        controller.set_active(false);
        controller.set_hovered(Some("knee"));
        scheduler.tick();
        assert!(controller.last_outcome().is_none());
        assert_eq!(scheduler.subscriber_count(), 1);

        controller.set_active(true);
        scheduler.tick();
        assert!(controller.last_outcome().is_some());
    }

    #[test]
    fn test_attach_to_dropped_scheduler() {
        let handle = FrameScheduler::new(ManualClock::shared()).handle();
        let (model, _) = three_parts();
        assert!(HighlightController::attach(
            &handle,
            model,
            catalog(),
            MotionReader::default(),
            HighlightStyle::default(),
        )
        .is_none());
    }

    #[test]
    fn test_controllers_with_distinct_ids_coexist() {
        let scheduler = FrameScheduler::new(ManualClock::shared());
        let handle = scheduler.handle();
        let mount = |id: &str| {
            let (model, _) = three_parts();
            HighlightController::attach_with_id(
                &handle,
                id,
                model,
                catalog(),
                MotionReader::default(),
                HighlightStyle::default(),
            )
            .unwrap()
        };

        let left = mount("highlight-left");
        let right = mount("highlight-right");
        left.set_hovered(Some("knee"));
        right.set_hovered(Some("knee"));
        scheduler.tick();

        assert!(left.is_active() && right.is_active());
        assert_eq!(left.last_outcome().unwrap().highlighted, 1);
        assert_eq!(right.last_outcome().unwrap().highlighted, 1);
    }

    #[test]
    fn test_default_id_replaces_previous_controller() {
        let scheduler = FrameScheduler::new(ManualClock::shared());
        let attach = || {
            let (model, _) = three_parts();
            HighlightController::attach(
                &scheduler.handle(),
                model,
                catalog(),
                MotionReader::default(),
                HighlightStyle::default(),
            )
            .unwrap()
        };

        let first = attach();
        let second = attach();
        assert!(!first.is_active());
        assert!(second.is_active());

        // The stale controller does not unregister its replacement
        drop(first);
        scheduler.tick();
        assert!(second.last_outcome().is_some());
    }
}
