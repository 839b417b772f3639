//! Frame presentation.
//!
//! [`Renderer`] is the module that opens, clears and presents each frame.
//! The GPU work sits behind [`RenderContext`] so the lifecycle can run
//! against any backend, including a headless one in tests.

mod context;
mod renderer;

pub use context::{FrameStatus, RenderContext};
pub use renderer::Renderer;
