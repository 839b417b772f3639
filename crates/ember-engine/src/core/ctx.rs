use std::rc::Rc;

use crate::event::Event;
use crate::window::{Runner, Window};

use super::application::AppHandle;

/// Passed to [`Module::setup`](super::Module::setup).
pub struct SetupCtx<'a> {
    pub app: &'a AppHandle,
    /// Runner of the current run; its window and render context are ready.
    pub runner: &'a mut dyn Runner,
}

impl<'a> SetupCtx<'a> {
    pub fn window(&self) -> Option<Rc<dyn Window>> {
        self.runner.window()
    }
}

/// Passed to [`Module::update`](super::Module::update).
pub struct UpdateCtx<'a> {
    pub app: &'a AppHandle,
    /// Frame delta in seconds, already multiplied by the time scale.
    ///
    /// Negative when the time scale is negative.
    pub dt: f32,
    pub frame_index: u64,
}

/// Passed to the three render hooks.
pub struct RenderCtx<'a> {
    pub app: &'a AppHandle,
    pub frame_index: u64,
}

/// Passed to [`Module::handle_event`](super::Module::handle_event).
pub struct EventCtx<'a> {
    pub app: &'a AppHandle,
    pub event: &'a dyn Event,
}
