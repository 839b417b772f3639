//! Headless doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::coords::Vec2;
use crate::core::{EventCtx, Module, RenderCtx, SetupCtx, UpdateCtx};
use crate::event::{EventRef, WindowClosedEvent};
use crate::paint::Color;
use crate::render::{FrameStatus, RenderContext};
use crate::window::{Runner, RunnerControl, RunnerRef, Window};

pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

pub(crate) fn count(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|e| *e == entry).count()
}

/// Module that records every hook it receives as `"<name>:<hook>"`.
pub(crate) struct Recorder {
    name: String,
    journal: Journal,
    quit_on_frame: Option<u64>,
    fail_setup: bool,
    pub dts: Vec<f32>,
}

impl Recorder {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Rc::clone(journal),
            quit_on_frame: None,
            fail_setup: false,
            dts: Vec::new(),
        }
    }

    /// Calls `quit` from `update` on frame `frame`.
    pub fn quit_on_frame(mut self, frame: u64) -> Self {
        self.quit_on_frame = Some(frame);
        self
    }

    /// Makes `setup` record itself and then fail.
    pub fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    pub fn into_ref(self) -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(self))
    }

    fn record(&self, hook: &str) {
        self.journal.borrow_mut().push(format!("{}:{hook}", self.name));
    }
}

impl Module for Recorder {
    fn setup(&mut self, _ctx: &mut SetupCtx<'_>) -> Result<()> {
        self.record("setup");
        if self.fail_setup {
            bail!("{} refused to start", self.name);
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.record("destroy");
    }

    fn update(&mut self, ctx: &mut UpdateCtx<'_>) {
        self.record("update");
        self.dts.push(ctx.dt);
        if self.quit_on_frame == Some(ctx.frame_index) {
            ctx.app.quit();
        }
    }

    fn before_render(&mut self, _ctx: &mut RenderCtx<'_>) {
        self.record("before_render");
    }

    fn render(&mut self, _ctx: &mut RenderCtx<'_>) {
        self.record("render");
    }

    fn after_render(&mut self, _ctx: &mut RenderCtx<'_>) {
        self.record("after_render");
    }

    fn handle_event(&mut self, ctx: &mut EventCtx<'_>) {
        self.record(&format!("event:{}", ctx.event.name()));
    }
}

/// Window with a settable logical size and scale factor (1 by default).
#[derive(Debug)]
pub(crate) struct StubWindow {
    title: RefCell<String>,
    logical: Cell<Vec2>,
    scale: Cell<f64>,
}

impl StubWindow {
    pub fn new(width: f32, height: f32) -> Rc<Self> {
        Rc::new(Self {
            title: RefCell::new("stub".to_string()),
            logical: Cell::new(Vec2::new(width, height)),
            scale: Cell::new(1.0),
        })
    }

    pub fn set_logical_size(&self, width: f32, height: f32) {
        self.logical.set(Vec2::new(width, height));
    }

    pub fn set_scale_factor(&self, scale: f64) {
        self.scale.set(scale);
    }
}

impl Window for StubWindow {
    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
    }

    fn size(&self) -> (u32, u32) {
        let scale = self.scale.get() as f32;
        (self.logical.get() * scale).to_pixel_size()
    }

    fn scale_factor(&self) -> f64 {
        self.scale.get()
    }

    fn logical_size(&self) -> Vec2 {
        self.logical.get()
    }
}

/// Everything a [`RecordingContext`] was asked to do.
#[derive(Debug)]
pub(crate) struct RenderLog {
    pub resizes: Vec<(u32, u32)>,
    pub vsync: Vec<bool>,
    pub clears: Vec<Color>,
    pub presented: usize,
    /// Returned by every `begin_frame` until changed.
    pub status: FrameStatus,
    pub dropped: bool,
}

impl Default for RenderLog {
    fn default() -> Self {
        Self {
            resizes: Vec::new(),
            vsync: Vec::new(),
            clears: Vec::new(),
            presented: 0,
            status: FrameStatus::Ready,
            dropped: false,
        }
    }
}

pub(crate) struct RecordingContext {
    log: Rc<RefCell<RenderLog>>,
}

impl RecordingContext {
    pub fn new(log: &Rc<RefCell<RenderLog>>) -> Box<Self> {
        Box::new(Self { log: Rc::clone(log) })
    }
}

impl RenderContext for RecordingContext {
    fn resize(&mut self, width: u32, height: u32) {
        self.log.borrow_mut().resizes.push((width, height));
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.log.borrow_mut().vsync.push(enabled);
    }

    fn begin_frame(&mut self, clear: Color) -> FrameStatus {
        let mut log = self.log.borrow_mut();
        log.clears.push(clear);
        log.status
    }

    fn present(&mut self) {
        self.log.borrow_mut().presented += 1;
    }
}

impl Drop for RecordingContext {
    fn drop(&mut self) {
        self.log.borrow_mut().dropped = true;
    }
}

#[derive(Debug, Default)]
pub(crate) struct RunnerLog {
    pub ready: usize,
    pub pumps: u64,
    pub destroyed: usize,
}

/// Scripted runner: delivers queued event batches, one per pump, and asks to
/// exit once `exit_after` pumps have completed.
pub(crate) struct StubRunner {
    log: Rc<RefCell<RunnerLog>>,
    render_log: Rc<RefCell<RenderLog>>,
    window: Rc<StubWindow>,
    exit_after: Option<u64>,
    close_on_exit: bool,
    batches: VecDeque<Vec<EventRef>>,
    failing: bool,
}

impl StubRunner {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(RunnerLog::default())),
            render_log: Rc::new(RefCell::new(RenderLog::default())),
            window: StubWindow::new(640.0, 480.0),
            exit_after: None,
            close_on_exit: false,
            batches: VecDeque::new(),
            failing: false,
        }
    }

    pub fn log(&self) -> Rc<RefCell<RunnerLog>> {
        Rc::clone(&self.log)
    }

    pub fn render_log(&self) -> Rc<RefCell<RenderLog>> {
        Rc::clone(&self.render_log)
    }

    pub fn stub_window(&self) -> Rc<StubWindow> {
        Rc::clone(&self.window)
    }

    pub fn exit_after(mut self, pumps: u64) -> Self {
        self.exit_after = Some(pumps);
        self
    }

    /// Emits a `WindowClosedEvent` with the exit request.
    pub fn close_on_exit(mut self) -> Self {
        self.close_on_exit = true;
        self
    }

    pub fn with_events(mut self, batches: Vec<Vec<EventRef>>) -> Self {
        self.batches = batches.into();
        self
    }

    /// Makes `on_ready` fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn into_ref(self) -> RunnerRef {
        Rc::new(RefCell::new(self))
    }
}

impl Runner for StubRunner {
    fn on_ready(&mut self) -> Result<()> {
        if self.failing {
            bail!("no display available");
        }
        self.log.borrow_mut().ready += 1;
        Ok(())
    }

    fn window(&self) -> Option<Rc<dyn Window>> {
        Some(Rc::clone(&self.window) as Rc<dyn Window>)
    }

    fn create_render_context(&mut self) -> Result<Box<dyn RenderContext>> {
        Ok(RecordingContext::new(&self.render_log))
    }

    fn pump_events(&mut self, events: &mut Vec<EventRef>) -> RunnerControl {
        let pumps = {
            let mut log = self.log.borrow_mut();
            log.pumps += 1;
            log.pumps
        };

        if self.exit_after.is_some_and(|n| pumps > n) {
            if self.close_on_exit {
                events.push(Rc::new(WindowClosedEvent {
                    window: Rc::clone(&self.window) as Rc<dyn Window>,
                }));
            }
            return RunnerControl::Exit;
        }

        if let Some(batch) = self.batches.pop_front() {
            events.extend(batch);
        }
        RunnerControl::Continue
    }

    fn on_destroy(&mut self) {
        self.log.borrow_mut().destroyed += 1;
    }
}
