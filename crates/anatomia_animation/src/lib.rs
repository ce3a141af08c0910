//! Anatomia Animation System
//!
//! One shared frame loop for every animated consumer in a scene.
//!
//! # Features
//!
//! - **FrameScheduler**: a single tick source multiplexing many named,
//!   independently toggleable callbacks
//! - **Lazy Tick Source**: the host loop runs only while something is subscribed
//! - **Failure Isolation**: a panicking subscriber never stalls the others
//! - **SharedMotionState**: pulse, color and ring oscillations computed once
//!   per tick and read by every hotspot marker

pub mod motion;
pub mod scheduler;

pub use motion::{MotionReader, MotionSnapshot, SharedMotionState};
pub use scheduler::{
    FrameScheduler, FrameTime, ManualTickSource, NullTickSource, SchedulerHandle, Subscription,
    TickCallback, TickSource,
};
