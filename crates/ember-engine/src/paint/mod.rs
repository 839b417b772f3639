//! Color model used by the renderer.

pub mod color;

pub use color::Color;
