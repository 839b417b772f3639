use std::rc::Rc;

use crate::window::Window;

/// The window's client area changed size.
///
/// `width`/`height` are physical pixels as reported by the platform; the
/// logical size is read from `window`.
#[derive(Debug, Clone)]
pub struct WindowResizedEvent {
    pub window: Rc<dyn Window>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct WindowMovedEvent {
    pub window: Rc<dyn Window>,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone)]
pub struct WindowFocusChangedEvent {
    pub window: Rc<dyn Window>,
    pub focus: bool,
}

/// The user asked to close the window. The runner stops the loop after it
/// has been dispatched.
#[derive(Debug, Clone)]
pub struct WindowClosedEvent {
    pub window: Rc<dyn Window>,
}

crate::impl_event!(
    WindowResizedEvent,
    WindowMovedEvent,
    WindowFocusChangedEvent,
    WindowClosedEvent,
);
