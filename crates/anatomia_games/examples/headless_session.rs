//! Headless Session Demo
//!
//! Drives the whole engine without a window:
//! - a frame scheduler ticked from a manual clock at 60 Hz
//! - shared motion state and a highlighted in-memory body model
//! - one challenge run and one dictation run polled from the frame loop
//!
//! Run with: RUST_LOG=debug cargo run -p anatomia_games --example headless_session

use anatomia_3d::{
    HighlightController, HighlightStyle, HotspotCatalog, MeshModel, MeshPart, SceneModel,
};
use anatomia_animation::{FrameScheduler, FrameTime, SharedMotionState};
use anatomia_core::ManualClock;
use anatomia_games::{
    ChallengePhase, ChallengeSession, DictationEffect, DictationPhase, DictationSession, GameConfig,
};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const CATALOG: &str = r#"[
    { "id": "caput",  "label": "Caput",  "position": { "x": 0.0,  "y": 165.0, "z": 8.0 }, "y_min": 150.0, "y_max": 180.0 },
    { "id": "thorax", "label": "Thorax", "position": { "x": 0.0,  "y": 125.0, "z": 10.0 }, "y_min": 105.0, "y_max": 145.0, "kind": "area" },
    { "id": "manus",  "label": "Manus",  "position": { "x": 40.0, "y": 85.0,  "z": 0.0 }, "y_min": 75.0,  "y_max": 95.0 },
    { "id": "genu",   "label": "Genu",   "position": { "x": 10.0, "y": 50.0,  "z": 5.0 }, "y_min": 40.0,  "y_max": 60.0 }
]"#;

const CONFIG: &str = r#"
[challenge]
reveal_delay_ms = 1000

[dictation]
total_rounds = 3
"#;

const FRAME: Duration = Duration::from_micros(16_667);

fn body_model() -> MeshModel {
    let mut model = MeshModel::new();
    model.add_part(MeshPart::slab("head", 150.0, 180.0));
    model.add_part(MeshPart::slab("chest", 105.0, 145.0));
    model.add_part(MeshPart::slab("pelvis", 85.0, 105.0));
    model.add_part(MeshPart::slab("thigh", 55.0, 85.0));
    model.add_part(MeshPart::slab("shin", 0.0, 45.0));
    model
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = GameConfig::from_toml_str(CONFIG).context("demo config")?;
    let catalog = HotspotCatalog::from_json(CATALOG).context("demo catalog")?;

    let clock = ManualClock::shared();
    let scheduler = FrameScheduler::new(clock.clone());
    let motion = SharedMotionState::attach(&scheduler);
    let highlight = HighlightController::attach(
        &scheduler.handle(),
        body_model(),
        catalog.clone(),
        motion.reader(),
        HighlightStyle::default(),
    )
    .context("scheduler dropped before mount")?;

    let challenge = Arc::new(Mutex::new(ChallengeSession::new(
        catalog.clone(),
        config.challenge.clone(),
        clock.clone(),
    )));
    let dictation = Arc::new(Mutex::new(DictationSession::new(
        catalog.clone(),
        config.dictation.clone(),
        clock.clone(),
    )));

    // Sessions advance their timers from the frame loop
    let poll_challenge = Arc::clone(&challenge);
    let poll_dictation = Arc::clone(&dictation);
    let _games = scheduler.subscribe("game-timers", move |_time: FrameTime| {
        lock(&poll_challenge).poll();
        lock(&poll_dictation).poll();
    });

    let run_frames = |frames: u32| {
        for _ in 0..frames {
            clock.advance(FRAME);
            scheduler.tick();
        }
    };

    // Explore: hover the thorax for half a second
    highlight.set_hovered(Some("thorax"));
    run_frames(30);
    let outcome = highlight.last_outcome().unwrap_or_default();
    tracing::info!(
        "hovering thorax: {} part(s) lit, pulse {:.3}",
        outcome.highlighted,
        motion.snapshot().pulse_scale
    );
    highlight.set_hovered(None);
    run_frames(1);
    let lit = highlight.with_model(|model| {
        let mut lit = 0;
        model.for_each_part(&mut |part| {
            if model.tint(part).is_some_and(|t| !t.is_neutral()) {
                lit += 1;
            }
        });
        lit
    });
    tracing::info!("hover cleared: {} part(s) lit", lit);

    // Challenge: find two parts, then miss one
    {
        let mut session = lock(&challenge);
        session.start();
        for _ in 0..2 {
            let target = session.target().context("no target")?.to_owned();
            tracing::info!("challenge: clicking {}", target);
            session.click(&target);
        }
        let wrong = catalog
            .iter()
            .map(|e| e.id.as_str())
            .find(|id| Some(*id) != session.target())
            .context("catalog too small")?
            .to_owned();
        let outcome = session.click(&wrong);
        tracing::info!(
            "challenge: clicked {} -> {:?}, score {}, {}",
            wrong,
            outcome,
            session.score(),
            session.elapsed_display()
        );
    }
    run_frames(90);
    {
        let session = lock(&challenge);
        tracing::info!(
            "challenge: phase {:?}, revealing {}",
            session.phase(),
            session.is_revealing()
        );
        debug_assert_eq!(session.phase(), ChallengePhase::Lost);
    }

    // Dictation: answer every round, misspelling the second one
    lock(&dictation).start();
    let mut round = 0;
    loop {
        run_frames(10);
        let mut session = lock(&dictation);
        for effect in session.take_effects() {
            match effect {
                DictationEffect::MoveCamera(region) => tracing::info!("camera -> {}", region),
                DictationEffect::FocusInput => tracing::debug!("focus answer field"),
            }
        }
        if session.phase() == DictationPhase::Finished {
            let band = session.score_band().context("finished without a band")?;
            tracing::info!(
                "dictation: {}/{} ({}%) - {}: {}",
                session.score(),
                session.total_rounds(),
                session.percentage(),
                band.label(),
                band.message()
            );
            break;
        }
        if session.feedback().is_none() {
            round += 1;
            let label = session.target_entry().context("no target")?.label.clone();
            let typed = if round == 2 {
                format!("{label}x")
            } else {
                format!("  {}  ", label.to_lowercase())
            };
            session.set_input(typed);
            let feedback = session.submit_input();
            tracing::info!("dictation round {}: {:?}", session.round(), feedback);
        }
        drop(session);
        run_frames(90);
    }

    tracing::info!("{} frames ticked", scheduler.frame_count());
    Ok(())
}
