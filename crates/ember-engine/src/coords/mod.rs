//! Geometry shared by windows, input events and the renderer.
//!
//! Logical pixels, origin top-left, +X right, +Y down.

mod vec2;

pub use vec2::Vec2;
