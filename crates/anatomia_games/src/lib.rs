//! Anatomia Games
//!
//! Two mutually exclusive timed game modes over the hotspot catalog:
//!
//! - **Challenge**: find the named part on the model; one mistake ends the run
//! - **Dictation**: type the name of the highlighted part over a fixed number
//!   of rounds
//!
//! Both sessions are plain state machines driven by discrete calls
//! (`start`, `click`/`submit`, `exit`). Timed follow-ups such as hiding the
//! revealed answer or advancing a round are queued as deferred continuations
//! and applied by `poll()`; each carries the session generation it was
//! scheduled under, so a reset session never sees stale effects.

pub mod challenge;
pub mod config;
pub mod deferred;
pub mod dictation;
pub mod error;
pub mod sampler;
pub mod score;

pub use challenge::{ChallengePhase, ChallengeSession, ClickOutcome};
pub use config::{ChallengeConfig, DictationConfig, GameConfig};
pub use deferred::DeferredQueue;
pub use dictation::{DictationEffect, DictationPhase, DictationSession, Feedback};
pub use error::{ConfigError, Result};
pub use score::ScoreBand;
