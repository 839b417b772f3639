use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorIcon, Fullscreen, Window as WinitWindow, WindowId};

use crate::coords::Vec2;
use crate::core::{Settings, WindowConfig};
use crate::device::{GpuInit, WgpuContext};
use crate::event::{
    EventRef, Key, KeyCharEvent, KeyDownEvent, KeyUpEvent, Modifiers, MouseButton,
    MouseDownEvent, MouseMoveEvent, MouseUpEvent, MouseWheelEvent, WheelDelta,
    WindowClosedEvent, WindowFocusChangedEvent, WindowMovedEvent, WindowResizedEvent,
};
use crate::render::RenderContext;

use super::{Runner, RunnerControl, Window};

// Desktop platforms deliver `resumed` on the first pump; this only bounds a
// misbehaving backend.
const READY_PUMP_LIMIT: usize = 64;
const READY_PUMP_TIMEOUT: Duration = Duration::from_millis(10);

/// `winit` window exposed through the engine's [`Window`] trait.
pub struct NativeWindow {
    inner: Arc<WinitWindow>,
}

impl NativeWindow {
    pub fn id(&self) -> WindowId {
        self.inner.id()
    }

    /// The underlying `winit` window, shared with the render context.
    pub fn raw(&self) -> &Arc<WinitWindow> {
        &self.inner
    }
}

impl fmt::Debug for NativeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeWindow").field("id", &self.inner.id()).finish()
    }
}

impl Window for NativeWindow {
    fn title(&self) -> String {
        self.inner.title()
    }

    fn set_title(&self, title: &str) {
        self.inner.set_title(title);
    }

    fn size(&self) -> (u32, u32) {
        let size = self.inner.inner_size();
        (size.width, size.height)
    }

    fn scale_factor(&self) -> f64 {
        self.inner.scale_factor()
    }

    fn logical_size(&self) -> Vec2 {
        let logical: LogicalSize<f64> = self.inner.inner_size().to_logical(self.inner.scale_factor());
        Vec2::new(logical.width as f32, logical.height as f32)
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.inner
            .set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
    }

    fn set_cursor(&self, cursor: CursorIcon) {
        self.inner.set_cursor(cursor);
    }
}

/// Desktop runner built on `winit`.
///
/// Uses `pump_app_events` so the application, not `winit`, owns the loop:
/// every frame pumps whatever the OS has queued and returns immediately.
/// `winit` allows one event loop per process, so a process can only create
/// one `WinitRunner`.
pub struct WinitRunner {
    event_loop: EventLoop<()>,
    state: NativeState,
    gpu: GpuInit,
}

impl WinitRunner {
    pub fn new(settings: &Settings) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        Ok(Self {
            event_loop,
            state: NativeState::new(settings.window.clone()),
            gpu: settings.gpu.clone(),
        })
    }
}

impl Runner for WinitRunner {
    fn on_ready(&mut self) -> Result<()> {
        for _ in 0..READY_PUMP_LIMIT {
            let status = self
                .event_loop
                .pump_app_events(Some(READY_PUMP_TIMEOUT), &mut self.state);

            if let Some(err) = self.state.create_error.take() {
                return Err(err);
            }
            if self.state.window.is_some() {
                return Ok(());
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited with code {code} before the window was created");
            }
        }
        bail!("no window after {READY_PUMP_LIMIT} event pumps")
    }

    fn window(&self) -> Option<Rc<dyn Window>> {
        self.state
            .window
            .as_ref()
            .map(|w| Rc::clone(w) as Rc<dyn Window>)
    }

    fn create_render_context(&mut self) -> Result<Box<dyn RenderContext>> {
        let window = self
            .state
            .window
            .as_ref()
            .ok_or_else(|| anyhow!("render context requested before the window exists"))?;

        let context = pollster::block_on(WgpuContext::new(Arc::clone(window.raw()), self.gpu.clone()))?;
        Ok(Box::new(context))
    }

    fn pump_events(&mut self, events: &mut Vec<EventRef>) -> RunnerControl {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);

        events.append(&mut self.state.events);

        if matches!(status, PumpStatus::Exit(_)) || self.state.close_requested {
            RunnerControl::Exit
        } else {
            RunnerControl::Continue
        }
    }

    fn on_destroy(&mut self) {
        self.state.events.clear();
        if self.state.window.take().is_some() {
            log::debug!("native window released");
        }
    }
}

/// `winit` callback target; buffers translated events between pumps.
struct NativeState {
    config: WindowConfig,
    window: Option<Rc<NativeWindow>>,
    events: Vec<EventRef>,
    modifiers: Modifiers,
    pointer: Vec2,
    close_requested: bool,
    create_error: Option<anyhow::Error>,
}

impl NativeState {
    fn new(config: WindowConfig) -> Self {
        Self {
            config,
            window: None,
            events: Vec::new(),
            modifiers: Modifiers::default(),
            pointer: Vec2::zero(),
            close_requested: false,
            create_error: None,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Rc<NativeWindow>> {
        let mut attrs = WinitWindow::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable);
        if self.config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        Ok(Rc::new(NativeWindow {
            inner: Arc::new(window),
        }))
    }

    fn push(&mut self, event: EventRef) {
        self.events.push(event);
    }

    fn translate(&mut self, window: &Rc<NativeWindow>, event: &WindowEvent) {
        let handle: Rc<dyn Window> = Rc::clone(window) as Rc<dyn Window>;

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
                self.push(Rc::new(WindowClosedEvent { window: handle }));
            }

            WindowEvent::Resized(size) => {
                self.push(Rc::new(WindowResizedEvent {
                    window: handle,
                    width: size.width,
                    height: size.height,
                }));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner.inner_size();
                self.push(Rc::new(WindowResizedEvent {
                    window: handle,
                    width: size.width,
                    height: size.height,
                }));
            }

            WindowEvent::Moved(pos) => {
                self.push(Rc::new(WindowMovedEvent {
                    window: handle,
                    x: pos.x,
                    y: pos.y,
                }));
            }

            WindowEvent::Focused(focus) => {
                self.push(Rc::new(WindowFocusChangedEvent {
                    window: handle,
                    focus: *focus,
                }));
            }

            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = to_logical(&window.inner, *position);
                self.push(Rc::new(MouseMoveEvent { pos: self.pointer }));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button);
                let (pos, modifiers) = (self.pointer, self.modifiers);
                match state {
                    ElementState::Pressed => self.push(Rc::new(MouseDownEvent { button, pos, modifiers })),
                    ElementState::Released => self.push(Rc::new(MouseUpEvent { button, pos, modifiers })),
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => WheelDelta::Line { x: *x, y: *y },
                    MouseScrollDelta::PixelDelta(p) => {
                        let v = to_logical(&window.inner, *p);
                        WheelDelta::Pixel { x: v.x, y: v.y }
                    }
                };
                self.push(Rc::new(MouseWheelEvent {
                    delta,
                    modifiers: self.modifiers,
                }));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let (key, code) = map_key(event.physical_key);
                let modifiers = self.modifiers;
                match event.state {
                    ElementState::Pressed => {
                        self.push(Rc::new(KeyDownEvent {
                            key,
                            code,
                            modifiers,
                            repeat: event.repeat,
                        }));
                        if let Some(text) = event.text.as_ref() {
                            if !text.is_empty() && !text.chars().any(char::is_control) {
                                self.push(Rc::new(KeyCharEvent { text: text.to_string() }));
                            }
                        }
                    }
                    ElementState::Released => {
                        self.push(Rc::new(KeyUpEvent { key, code, modifiers }));
                    }
                }
            }

            WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => {
                self.push(Rc::new(KeyCharEvent { text: text.clone() }));
            }

            _ => {}
        }
    }
}

impl ApplicationHandler for NativeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window(event_loop) {
            Ok(window) => {
                log::info!(
                    "window created: \"{}\" {}x{}",
                    self.config.title,
                    self.config.width,
                    self.config.height
                );
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("failed to create initial window: {e:#}");
                self.create_error = Some(e);
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        self.translate(&window, &event);
    }
}

fn to_logical(window: &WinitWindow, pos: PhysicalPosition<f64>) -> Vec2 {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    Vec2::new(logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> (Key, u32) {
    let PhysicalKey::Code(code) = pk else {
        return (Key::Unknown(0), 0);
    };

    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::Delete => Key::Delete,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit0,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit3,
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit4,
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit5,
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit6,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    };

    (key, code as u32)
}
