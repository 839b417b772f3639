use std::cell::RefCell;
use std::rc::Rc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use ember_engine::core::{Application, EventCtx, Module, ModuleRef, Settings, SetupCtx, UpdateCtx};
use ember_engine::event::{Key, KeyDownEvent};
use ember_engine::impl_event;
use ember_engine::logging::{LoggingConfig, init_logging};
use ember_engine::paint::Color;
use ember_engine::render::Renderer;
use ember_engine::window::Window;

const PALETTE: [u32; 4] = [0x1e1e2e, 0x313244, 0x45475a, 0x585b70];

/// Posted from the worker thread through the main-thread queue.
#[derive(Debug)]
struct ClearColorEvent(Color);

impl_event!(ClearColorEvent);

struct Sandbox {
    renderer: Rc<RefCell<Renderer>>,
    window: Option<Rc<dyn Window>>,
    base_title: String,
    frames: u32,
    elapsed: f32,
}

impl Sandbox {
    fn new(renderer: Rc<RefCell<Renderer>>) -> Self {
        Self {
            renderer,
            window: None,
            base_title: String::new(),
            frames: 0,
            elapsed: 0.0,
        }
    }
}

impl Module for Sandbox {
    fn setup(&mut self, ctx: &mut SetupCtx<'_>) -> Result<()> {
        self.window = ctx.window();
        if let Some(window) = &self.window {
            self.base_title = window.title();
            let (w, h) = window.size();
            log::info!("sandbox ready: {w}x{h} @ {:.2}x", window.scale_factor());
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>) {
        self.frames += 1;
        self.elapsed += ctx.dt;
        if self.elapsed < 1.0 {
            return;
        }

        let fps = self.frames as f32 / self.elapsed;
        if let Some(window) = &self.window {
            window.set_title(&format!("{} ({fps:.0} fps)", self.base_title));
        }
        self.frames = 0;
        self.elapsed = 0.0;
    }

    fn handle_event(&mut self, ctx: &mut EventCtx<'_>) {
        if let Some(evt) = ctx.event.cast::<ClearColorEvent>() {
            self.renderer.borrow_mut().set_clear_color(evt.0);
            return;
        }

        let Some(key) = ctx.event.cast::<KeyDownEvent>() else {
            return;
        };
        if key.repeat {
            return;
        }
        match key.key {
            Key::Escape => ctx.app.quit(),
            Key::P => ctx.app.perform_in_main_thread(|app| {
                if app.is_paused() {
                    app.resume();
                } else {
                    app.pause();
                }
            }),
            _ => {}
        }
    }

    fn destroy(&mut self) {
        self.window = None;
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("ember {}", ember_engine::core::version());

    let renderer = Rc::new(RefCell::new(Renderer::new()));
    renderer
        .borrow_mut()
        .set_clear_color(Color::from_hex(PALETTE[0]));
    let sandbox = Rc::new(RefCell::new(Sandbox::new(Rc::clone(&renderer))));

    let settings = Settings::new()
        .with_title("ember sandbox")
        .with_size(960.0, 540.0)
        .with_frame_limit(144);

    let mut worker = None;
    let mut app = Application::new();
    app.run(
        settings,
        |app| {
            let handle = app.handle();
            worker = Some(thread::spawn(move || {
                let mut next = 1;
                while handle.is_running() {
                    thread::sleep(Duration::from_secs(1));
                    let color = Color::from_hex(PALETTE[next % PALETTE.len()]);
                    handle.perform_in_main_thread(move |app| {
                        app.post_event(Rc::new(ClearColorEvent(color)));
                    });
                    next += 1;
                }
            }));
            Ok(())
        },
        vec![renderer as ModuleRef, sandbox as ModuleRef],
    )?;

    if let Some(worker) = worker {
        join_worker(worker);
    }
    Ok(())
}

/// Waits for the color worker. Returns `false` if it panicked.
fn join_worker(worker: JoinHandle<()>) -> bool {
    match worker.join() {
        Ok(()) => true,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::warn!("color worker panicked: {reason}");
            false
        }
    }
}
