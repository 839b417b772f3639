use std::fmt;

use crate::coords::Vec2;

/// Keyboard key, independent of the windowing backend.
///
/// Keys without a variant arrive as `Unknown` carrying the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    Delete,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unknown(code) => write!(f, "Unknown({code:#x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys held when the event fired.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Scroll amount; `Line` for notched wheels, `Pixel` for touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyDownEvent {
    pub key: Key,
    /// Platform key code, stable across layouts.
    pub code: u32,
    pub modifiers: Modifiers,
    pub repeat: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyUpEvent {
    pub key: Key,
    pub code: u32,
    pub modifiers: Modifiers,
}

/// Committed text input.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCharEvent {
    pub text: String,
}

/// Pointer moved; position in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseMoveEvent {
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseDownEvent {
    pub button: MouseButton,
    pub pos: Vec2,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseUpEvent {
    pub button: MouseButton,
    pub pos: Vec2,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseWheelEvent {
    pub delta: WheelDelta,
    pub modifiers: Modifiers,
}

crate::impl_event!(
    KeyDownEvent,
    KeyUpEvent,
    KeyCharEvent,
    MouseMoveEvent,
    MouseDownEvent,
    MouseUpEvent,
    MouseWheelEvent,
);
