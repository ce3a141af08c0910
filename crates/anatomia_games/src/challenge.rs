//! Challenge mode
//!
//! The player is shown a part name and must click the matching hotspot.
//! Targets are drawn without replacement, so a flawless run ends in
//! [`ChallengePhase::Won`] after exactly one correct click per catalog entry.
//! A single wrong click loses the run and briefly reveals the answer.

use crate::config::ChallengeConfig;
use crate::deferred::DeferredQueue;
use crate::sampler::pick_unused;
use anatomia_3d::{HotspotCatalog, HotspotEntry};
use anatomia_core::SharedClock;
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Lifecycle of a challenge run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChallengePhase {
    #[default]
    Idle,
    Playing,
    Won,
    Lost,
}

/// Result of a click that was judged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Right part, more to find
    Correct,
    /// Right part, catalog exhausted
    Won,
    /// Wrong part, run over
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChallengeAction {
    HideReveal,
}

/// Find-the-part game state machine
pub struct ChallengeSession<R: Rng = StdRng> {
    catalog: HotspotCatalog,
    config: ChallengeConfig,
    clock: SharedClock,
    rng: R,
    phase: ChallengePhase,
    target: Option<String>,
    score: u32,
    completed: IndexSet<String>,
    revealing: bool,
    started_at: Option<Duration>,
    won_at: Option<Duration>,
    generation: u64,
    deferred: DeferredQueue<ChallengeAction>,
}

impl ChallengeSession<StdRng> {
    /// Session drawing targets from an OS-seeded generator
    pub fn new(catalog: HotspotCatalog, config: ChallengeConfig, clock: SharedClock) -> Self {
        Self::with_rng(catalog, config, clock, StdRng::from_os_rng())
    }
}

impl<R: Rng> ChallengeSession<R> {
    pub fn with_rng(
        catalog: HotspotCatalog,
        config: ChallengeConfig,
        clock: SharedClock,
        rng: R,
    ) -> Self {
        Self {
            catalog,
            config,
            clock,
            rng,
            phase: ChallengePhase::Idle,
            target: None,
            score: 0,
            completed: IndexSet::new(),
            revealing: false,
            started_at: None,
            won_at: None,
            generation: 0,
            deferred: DeferredQueue::new(),
        }
    }

    /// Begin a fresh run
    ///
    /// With an empty catalog there is nothing to find; the session stays
    /// idle.
    pub fn start(&mut self) {
        self.reset();
        if self.catalog.is_empty() {
            tracing::warn!("ChallengeSession: empty catalog, not starting");
            return;
        }

        self.phase = ChallengePhase::Playing;
        self.started_at = Some(self.clock.now());
        self.pick_next();
        tracing::debug!(
            "ChallengeSession: started (generation {}), target {:?}",
            self.generation,
            self.target
        );
    }

    /// Same as [`start`](Self::start); valid from any phase
    pub fn restart(&mut self) {
        self.start();
    }

    /// Leave the game and clear all run state
    pub fn exit(&mut self) {
        self.reset();
        tracing::debug!("ChallengeSession: exited");
    }

    /// Judge a click on hotspot `id`
    ///
    /// Returns `None` when no run is in progress.
    pub fn click(&mut self, id: &str) -> Option<ClickOutcome> {
        if self.phase != ChallengePhase::Playing {
            return None;
        }
        let target = self.target.take()?;

        if id != target {
            let now = self.clock.now();
            self.phase = ChallengePhase::Lost;
            self.revealing = true;
            self.deferred.schedule(
                now + self.config.reveal_delay(),
                self.generation,
                ChallengeAction::HideReveal,
            );
            tracing::debug!(
                "ChallengeSession: clicked {:?}, wanted {:?}; lost at score {}",
                id,
                target,
                self.score
            );
            self.target = Some(target);
            return Some(ClickOutcome::Wrong);
        }

        self.completed.insert(target);
        self.score += 1;

        if self.completed.len() >= self.catalog.len() {
            self.phase = ChallengePhase::Won;
            self.won_at = Some(self.clock.now());
            tracing::debug!(
                "ChallengeSession: won with {} in {}",
                self.score,
                self.elapsed_display()
            );
            return Some(ClickOutcome::Won);
        }

        self.pick_next();
        Some(ClickOutcome::Correct)
    }

    /// Apply every deferred continuation that has come due
    ///
    /// Returns how many were applied; stale entries are dropped uncounted.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        for (generation, action) in self.deferred.take_due(self.clock.now()) {
            if generation != self.generation {
                tracing::trace!(
                    "ChallengeSession: dropping {:?} from generation {}",
                    action,
                    generation
                );
                continue;
            }
            match action {
                ChallengeAction::HideReveal => self.revealing = false,
            }
            applied += 1;
        }
        applied
    }

    /// Run time: start to win, or start to now otherwise
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(start) => self
                .won_at
                .unwrap_or_else(|| self.clock.now())
                .saturating_sub(start),
            None => Duration::ZERO,
        }
    }

    /// [`elapsed`](Self::elapsed) as `m:ss`
    pub fn elapsed_display(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Id of the part to find; kept after a loss so it can be revealed
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn target_entry(&self) -> Option<&HotspotEntry> {
        self.target.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// Found ids in the order they were found
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.completed.iter().map(String::as_str)
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Whether the correct answer is currently being shown after a loss
    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    /// Parts still to find in this run
    pub fn remaining(&self) -> usize {
        self.catalog.len().saturating_sub(self.completed.len())
    }

    pub fn catalog(&self) -> &HotspotCatalog {
        &self.catalog
    }

    fn pick_next(&mut self) {
        let completed = &self.completed;
        self.target = pick_unused(&mut self.rng, &self.catalog, |id| completed.contains(id))
            .map(|entry| entry.id.clone());
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.phase = ChallengePhase::Idle;
        self.target = None;
        self.score = 0;
        self.completed.clear();
        self.revealing = false;
        self.started_at = None;
        self.won_at = None;
    }
}
