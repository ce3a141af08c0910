//! Dictation mode
//!
//! Each round highlights one hotspot and the player types its name. The
//! camera is pointed at the part's region, answers are compared trimmed and
//! case-folded, and after a short pause the next round begins. Side effects
//! the host has to perform (focusing the text field, moving the camera) are
//! queued as [`DictationEffect`]s and drained with
//! [`DictationSession::take_effects`].

use crate::config::DictationConfig;
use crate::deferred::DeferredQueue;
use crate::sampler::pick_unused;
use crate::score::ScoreBand;
use anatomia_3d::{CameraRegion, HotspotCatalog, HotspotEntry};
use anatomia_core::SharedClock;
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lifecycle of a dictation session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DictationPhase {
    #[default]
    Idle,
    Playing,
    Finished,
}

/// Verdict on a submitted answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Wrong,
}

/// Work the host performs on behalf of the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DictationEffect {
    /// Give the answer field keyboard focus
    FocusInput,
    /// Frame the camera on a body region
    MoveCamera(CameraRegion),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DictationAction {
    FocusInput,
    Advance,
}

/// Type-the-name game state machine
pub struct DictationSession<R: Rng = StdRng> {
    catalog: HotspotCatalog,
    config: DictationConfig,
    clock: SharedClock,
    rng: R,
    phase: DictationPhase,
    round: u32,
    total_rounds: u32,
    score: u32,
    target: Option<String>,
    used: IndexSet<String>,
    input: String,
    feedback: Option<Feedback>,
    camera_region: Option<CameraRegion>,
    effects: Vec<DictationEffect>,
    generation: u64,
    deferred: DeferredQueue<DictationAction>,
}

impl DictationSession<StdRng> {
    /// Session drawing targets from an OS-seeded generator
    pub fn new(catalog: HotspotCatalog, config: DictationConfig, clock: SharedClock) -> Self {
        Self::with_rng(catalog, config, clock, StdRng::from_os_rng())
    }
}

impl<R: Rng> DictationSession<R> {
    pub fn with_rng(
        catalog: HotspotCatalog,
        config: DictationConfig,
        clock: SharedClock,
        rng: R,
    ) -> Self {
        Self {
            catalog,
            config,
            clock,
            rng,
            phase: DictationPhase::Idle,
            round: 0,
            total_rounds: 0,
            score: 0,
            target: None,
            used: IndexSet::new(),
            input: String::new(),
            feedback: None,
            camera_region: None,
            effects: Vec::new(),
            generation: 0,
            deferred: DeferredQueue::new(),
        }
    }

    /// Begin round one
    ///
    /// The round count is the configured total clamped to the catalog size,
    /// so no target repeats. An empty catalog leaves the session idle.
    pub fn start(&mut self) {
        self.reset();
        if self.catalog.is_empty() {
            tracing::warn!("DictationSession: empty catalog, not starting");
            return;
        }

        let available = u32::try_from(self.catalog.len()).unwrap_or(u32::MAX);
        self.total_rounds = self.config.total_rounds.max(1).min(available);
        self.phase = DictationPhase::Playing;
        self.round = 1;
        self.pick_target();

        let due = self.clock.now() + self.config.focus_delay();
        self.deferred
            .schedule(due, self.generation, DictationAction::FocusInput);

        tracing::debug!(
            "DictationSession: started {} rounds (generation {}), target {:?}",
            self.total_rounds,
            self.generation,
            self.target
        );
    }

    /// Leave the game and clear all session state
    pub fn exit(&mut self) {
        self.reset();
        tracing::debug!("DictationSession: exited");
    }

    /// Record the text currently typed in the answer field
    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.phase == DictationPhase::Playing && self.feedback.is_none() {
            self.input = text.into();
        }
    }

    /// Submit the typed input
    pub fn submit_input(&mut self) -> Option<Feedback> {
        let text = std::mem::take(&mut self.input);
        let feedback = self.submit(&text);
        if feedback.is_none() {
            self.input = text;
        }
        feedback
    }

    /// Judge an answer for the current round
    ///
    /// Returns `None` outside a round, for blank input, or when the round has
    /// already been answered and is waiting to advance.
    pub fn submit(&mut self, text: &str) -> Option<Feedback> {
        if self.phase != DictationPhase::Playing || self.feedback.is_some() {
            return None;
        }
        let answer = text.trim();
        if answer.is_empty() {
            return None;
        }
        let target = self.target.clone()?;
        let entry = self.catalog.get(&target)?;

        let feedback = if answers_match(answer, &entry.label) {
            self.score += 1;
            Feedback::Correct
        } else {
            Feedback::Wrong
        };
        tracing::debug!(
            "DictationSession: round {}/{} answered {:?} for {:?}: {:?}",
            self.round,
            self.total_rounds,
            answer,
            target,
            feedback
        );

        self.input = text.to_owned();
        self.feedback = Some(feedback);
        self.used.insert(target);

        let due = self.clock.now() + self.config.advance_delay();
        self.deferred
            .schedule(due, self.generation, DictationAction::Advance);
        Some(feedback)
    }

    /// Apply every deferred continuation that has come due
    ///
    /// Returns how many were applied; stale entries are dropped uncounted.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        for (generation, action) in self.deferred.take_due(self.clock.now()) {
            if generation != self.generation || self.phase != DictationPhase::Playing {
                tracing::trace!(
                    "DictationSession: dropping {:?} from generation {}",
                    action,
                    generation
                );
                continue;
            }
            match action {
                DictationAction::FocusInput => self.effects.push(DictationEffect::FocusInput),
                DictationAction::Advance => self.advance(),
            }
            applied += 1;
        }
        applied
    }

    /// Drain queued host effects in the order they were raised
    pub fn take_effects(&mut self) -> Vec<DictationEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Final tier, available once the session has finished
    pub fn score_band(&self) -> Option<ScoreBand> {
        (self.phase == DictationPhase::Finished)
            .then(|| ScoreBand::for_score(self.score, self.total_rounds))
    }

    /// Correct answers as a whole percentage of the session's rounds
    pub fn percentage(&self) -> u32 {
        ScoreBand::percentage(self.score, self.total_rounds)
    }

    pub fn phase(&self) -> DictationPhase {
        self.phase
    }

    /// Current round, 1-based; 0 when idle
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn target_entry(&self) -> Option<&HotspotEntry> {
        self.target.as_deref().and_then(|id| self.catalog.get(id))
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Region the camera was last pointed at
    pub fn camera_region(&self) -> Option<CameraRegion> {
        self.camera_region
    }

    /// Ids already asked this session, in order
    pub fn used(&self) -> impl Iterator<Item = &str> {
        self.used.iter().map(String::as_str)
    }

    fn advance(&mut self) {
        self.input.clear();
        self.feedback = None;

        if self.round >= self.total_rounds {
            self.phase = DictationPhase::Finished;
            self.target = None;
            tracing::debug!(
                "DictationSession: finished {}/{} ({}%, {})",
                self.score,
                self.total_rounds,
                self.percentage(),
                ScoreBand::for_score(self.score, self.total_rounds)
            );
            return;
        }

        self.round += 1;
        self.pick_target();
        self.effects.push(DictationEffect::FocusInput);
        tracing::debug!(
            "DictationSession: round {}/{}, target {:?}",
            self.round,
            self.total_rounds,
            self.target
        );
    }

    fn pick_target(&mut self) {
        let used = &self.used;
        let entry = pick_unused(&mut self.rng, &self.catalog, |id| used.contains(id));
        self.camera_region = entry.map(CameraRegion::for_hotspot);
        self.target = entry.map(|e| e.id.clone());
        if let Some(region) = self.camera_region {
            self.effects.push(DictationEffect::MoveCamera(region));
        }
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.phase = DictationPhase::Idle;
        self.round = 0;
        self.total_rounds = 0;
        self.score = 0;
        self.target = None;
        self.used.clear();
        self.input.clear();
        self.feedback = None;
        self.camera_region = None;
        self.effects.clear();
    }
}

/// Trimmed, case-folded comparison
fn answers_match(answer: &str, label: &str) -> bool {
    answer.trim().to_lowercase() == label.trim().to_lowercase()
}
