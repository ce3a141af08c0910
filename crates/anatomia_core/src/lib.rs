//! Anatomia Core
//!
//! Foundational primitives shared by every Anatomia crate:
//!
//! - **Math**: `Vec3` anchor positions and linear `Color` values
//! - **Clock**: monotonic time source, injectable so schedulers and game
//!   sessions can be driven deterministically in tests

pub mod clock;
pub mod math;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use math::{Color, Vec3};
