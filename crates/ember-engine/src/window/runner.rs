use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::event::EventRef;
use crate::render::RenderContext;

use super::Window;

/// What the loop should do after a pump.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunnerControl {
    Continue,
    Exit,
}

/// Owns the native window and its render context for one run.
///
/// The application calls `on_ready` once, `pump_events` once per frame and
/// `on_destroy` once during teardown.
pub trait Runner {
    /// Creates the window. Called before any module is set up.
    fn on_ready(&mut self) -> Result<()>;

    /// The window, once `on_ready` succeeded and until `on_destroy`.
    fn window(&self) -> Option<Rc<dyn Window>>;

    /// Builds a render context bound to the window.
    fn create_render_context(&mut self) -> Result<Box<dyn RenderContext>>;

    /// Collects pending platform events into `events`.
    ///
    /// Returns `Exit` once the platform asks the application to stop (for
    /// example after the window was closed).
    fn pump_events(&mut self, events: &mut Vec<EventRef>) -> RunnerControl;

    /// Releases the window. Must tolerate repeated calls.
    fn on_destroy(&mut self);
}

/// Shared handle to the runner of the current run.
pub type RunnerRef = Rc<RefCell<dyn Runner>>;
