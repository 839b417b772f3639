//! Frame timing.
//!
//! The application owns one `FrameClock` and ticks it once per loop
//! iteration, paused or not.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
