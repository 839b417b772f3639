//! Platform seam: the native window and the runner that owns it.
//!
//! The lifecycle core only sees the [`Window`] and [`Runner`] traits.
//! [`WinitRunner`] is the desktop implementation.

mod runner;
mod runtime;

use std::fmt;

use crate::coords::Vec2;

pub use runner::{Runner, RunnerControl, RunnerRef};
pub use runtime::{NativeWindow, WinitRunner};
pub use winit::window::CursorIcon;

/// Native window as seen by engine code.
pub trait Window: fmt::Debug {
    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    /// Client area in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Physical pixels per logical pixel.
    fn scale_factor(&self) -> f64 {
        1.0
    }

    /// Client area in logical pixels.
    fn logical_size(&self) -> Vec2 {
        let (w, h) = self.size();
        let scale = self.scale_factor();
        Vec2::new((w as f64 / scale) as f32, (h as f64 / scale) as f32)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        let _ = fullscreen;
    }

    fn set_cursor(&self, cursor: CursorIcon) {
        let _ = cursor;
    }
}
