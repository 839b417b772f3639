use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use crate::event::{Event, EventRef};
use crate::time::FrameClock;
use crate::window::{RunnerControl, RunnerRef, Window, WinitRunner};

use super::ctx::{EventCtx, RenderCtx, SetupCtx, UpdateCtx};
use super::main_thread::MainThreadQueue;
use super::module::{ModuleList, ModuleRef};
use super::settings::Settings;

/// Closure queued with [`AppHandle::perform_in_main_thread`].
pub type MainThreadJob = Box<dyn FnOnce(&mut Application) + Send + 'static>;

/// Engine version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Where the application is in its lifecycle.
///
/// `Idle -> Running <-> Paused`, then `quit` moves to `Stopping` and
/// `destroy` back to `Idle`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    Idle,
    Running,
    Paused,
    Stopping,
}

struct Shared {
    running: AtomicBool,
    jobs: MainThreadQueue<MainThreadJob>,
}

/// Thread-safe handle to a running [`Application`].
///
/// Module hooks get one through their context; worker threads keep a clone
/// to request a quit or to schedule work on the main thread.
#[derive(Clone)]
pub struct AppHandle {
    shared: Arc<Shared>,
}

impl AppHandle {
    /// Stops the loop at the top of its next iteration. Idempotent.
    pub fn quit(&self) {
        if self.shared.running.swap(false, Ordering::AcqRel) {
            log::info!("quit requested");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Schedules `f` to run on the main thread at the start of the next
    /// frame.
    ///
    /// Callable from any thread. Jobs from one thread run in the order they
    /// were queued; each queued job runs exactly once.
    pub fn perform_in_main_thread<F>(&self, f: F)
    where
        F: FnOnce(&mut Application) + Send + 'static,
    {
        self.shared.jobs.push(Box::new(f));
    }

    /// Number of jobs waiting for the next drain.
    pub fn pending_jobs(&self) -> usize {
        self.shared.jobs.len()
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHandle")
            .field("running", &self.is_running())
            .field("pending_jobs", &self.pending_jobs())
            .finish()
    }
}

/// Owns the game loop.
///
/// Construct one in `main` and pass it where it is needed; nothing in the
/// engine reaches it through global state. [`run`](Self::run) blocks until
/// [`quit`](Self::quit) is observed, then tears everything down.
///
/// Each frame:
/// 1. tick the clock (also while paused)
/// 2. pump the runner for window and input events
/// 3. run queued main-thread jobs
/// 4. `update` every module unless paused
/// 5. dispatch the pumped events
/// 6. render, unless a quit arrived during this frame
pub struct Application {
    handle: AppHandle,
    is_paused: bool,
    time_scale: f32,
    runner: Option<RunnerRef>,
    clock: FrameClock,
    modules: ModuleList,
    modules_ready: bool,
    /// Length of the module-list prefix whose `setup` succeeded.
    modules_set_up: usize,
    pending_events: Vec<EventRef>,
    frame_interval: Option<Duration>,
    frame_index: u64,
}

impl Application {
    pub fn new() -> Self {
        Self {
            handle: AppHandle {
                shared: Arc::new(Shared {
                    running: AtomicBool::new(false),
                    jobs: MainThreadQueue::new(),
                }),
            },
            is_paused: false,
            time_scale: 1.0,
            runner: None,
            clock: FrameClock::new(),
            modules: ModuleList::new(),
            modules_ready: false,
            modules_set_up: 0,
            pending_events: Vec::new(),
            frame_interval: None,
            frame_index: 0,
        }
    }

    /// Opens a native window from `settings`, registers `modules`, calls
    /// `setup` once and runs the loop until quit.
    ///
    /// Fails without side effects when the application is not idle.
    pub fn run<F, I>(&mut self, settings: Settings, setup: F, modules: I) -> Result<()>
    where
        F: FnOnce(&mut Application) -> Result<()>,
        I: IntoIterator<Item = ModuleRef>,
    {
        self.ensure_idle()?;

        let runner = WinitRunner::new(&settings)?;
        self.frame_interval = settings.frame_interval;
        for module in modules {
            self.use_module(module)?;
        }

        self.run_with_runner(Rc::new(RefCell::new(runner)), setup)
    }

    /// Runs the loop on a runner built by the caller.
    pub fn run_with_runner<F>(&mut self, runner: RunnerRef, setup: F) -> Result<()>
    where
        F: FnOnce(&mut Application) -> Result<()>,
    {
        self.ensure_idle()?;

        self.handle.shared.running.store(true, Ordering::Release);
        self.runner = Some(Rc::clone(&runner));
        log::info!("application started (ember {})", version());

        let result = self.startup(&runner, setup).map(|()| self.main_loop(&runner));
        if let Err(e) = &result {
            log::error!("application aborted: {e:#}");
        }

        self.destroy();
        log::info!("application stopped after {} frames", self.frame_index);
        result
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.state() {
            LifecycleState::Idle => Ok(()),
            state => {
                log::warn!("run rejected: application is {state:?}");
                bail!("application is already running ({state:?})")
            }
        }
    }

    fn startup<F>(&mut self, runner: &RunnerRef, setup: F) -> Result<()>
    where
        F: FnOnce(&mut Application) -> Result<()>,
    {
        runner
            .borrow_mut()
            .on_ready()
            .context("runner failed to start")?;

        self.modules_ready = true;
        {
            let mut runner = runner.borrow_mut();
            for module in &self.modules {
                let mut ctx = SetupCtx {
                    app: &self.handle,
                    runner: &mut *runner,
                };
                module
                    .borrow_mut()
                    .setup(&mut ctx)
                    .context("module setup failed")?;
                self.modules_set_up += 1;
            }
        }

        setup(self).context("application setup failed")?;

        self.clock.reset();
        self.frame_index = 0;
        Ok(())
    }

    fn main_loop(&mut self, runner: &RunnerRef) {
        while self.is_running() {
            let time = self.clock.tick();

            let control = runner.borrow_mut().pump_events(&mut self.pending_events);
            if control == RunnerControl::Exit {
                log::info!("runner requested exit");
                self.dispatch_pending_events();
                self.quit();
                break;
            }

            self.update_frame(time.delta);
            self.pace(time.now);
        }
    }

    fn pace(&self, frame_start: Instant) {
        let Some(interval) = self.frame_interval else {
            return;
        };
        let spent = frame_start.elapsed();
        if spent < interval {
            thread::sleep(interval - spent);
        }
    }

    /// Runs one frame with a raw delta of `dt`.
    ///
    /// Drains main-thread jobs, updates modules unless paused, dispatches
    /// queued events and renders if the application is still running.
    pub fn update_frame(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32() * self.time_scale;

        self.perform_main_thread_work();

        if !self.is_paused {
            self.update(dt);
        }

        self.dispatch_pending_events();

        if self.is_running() {
            self.render();
        }

        self.frame_index = self.frame_index.wrapping_add(1);
    }

    fn perform_main_thread_work(&mut self) {
        // The queue lock is released once the batch is taken.
        let jobs = self.handle.shared.jobs.take();
        if jobs.is_empty() {
            return;
        }

        log::trace!("running {} main-thread jobs", jobs.len());
        for job in jobs {
            job(self);
        }
    }

    fn update(&mut self, dt: f32) {
        let mut ctx = UpdateCtx {
            app: &self.handle,
            dt,
            frame_index: self.frame_index,
        };
        for module in &self.modules {
            module.borrow_mut().update(&mut ctx);
        }
    }

    fn render(&mut self) {
        let mut ctx = RenderCtx {
            app: &self.handle,
            frame_index: self.frame_index,
        };
        for module in &self.modules {
            module.borrow_mut().before_render(&mut ctx);
        }
        for module in &self.modules {
            module.borrow_mut().render(&mut ctx);
        }
        for module in &self.modules {
            module.borrow_mut().after_render(&mut ctx);
        }
    }

    fn dispatch_pending_events(&mut self) {
        if self.pending_events.is_empty() {
            return;
        }
        let mut events = std::mem::take(&mut self.pending_events);
        for event in events.drain(..) {
            self.dispatch_event(event);
        }
        // Keep the allocation for the next pump.
        self.pending_events = events;
    }

    /// Delivers `event` to every module's `handle_event`, in registration
    /// order, before returning.
    ///
    /// A panicking handler unwinds through the dispatcher.
    pub fn dispatch_event(&self, event: EventRef) {
        self.dispatch_event_ref(event.as_ref());
    }

    /// Like [`dispatch_event`](Self::dispatch_event) for a borrowed event.
    pub fn dispatch_event_ref(&self, event: &dyn Event) {
        log::trace!("dispatching {}", event.name());
        let mut ctx = EventCtx {
            app: &self.handle,
            event,
        };
        for module in &self.modules {
            module.borrow_mut().handle_event(&mut ctx);
        }
    }

    /// Queues `event` for dispatch during the next frame.
    pub fn post_event(&mut self, event: EventRef) {
        self.pending_events.push(event);
    }

    /// Registers `module` at the end of the module list.
    ///
    /// Registering the same module twice is a no-op. While running, the
    /// module is set up right away and joins the next frame; if that setup
    /// fails the module is unregistered again. Call from the main thread,
    /// outside of module hooks.
    pub fn use_module(&mut self, module: ModuleRef) -> Result<()> {
        if !self.modules.push(Rc::clone(&module)) {
            log::debug!("module already registered; ignored");
            return Ok(());
        }
        log::debug!("module registered ({} total)", self.modules.len());

        if !self.modules_ready {
            return Ok(());
        }
        let Some(runner) = self.runner.clone() else {
            return Ok(());
        };
        let result = {
            let mut runner = runner.borrow_mut();
            let mut ctx = SetupCtx {
                app: &self.handle,
                runner: &mut *runner,
            };
            module.borrow_mut().setup(&mut ctx)
        };

        match result {
            Ok(()) => {
                self.modules_set_up += 1;
                Ok(())
            }
            Err(e) => {
                self.modules.remove(&module);
                log::warn!("module setup failed; module unregistered: {e:#}");
                Err(e.context("module setup failed"))
            }
        }
    }

    pub fn modules(&self) -> &ModuleList {
        &self.modules
    }

    /// Suspends module updates. Rendering and job draining continue.
    ///
    /// Ignored unless running.
    pub fn pause(&mut self) {
        if !self.is_running() {
            log::debug!("pause ignored: application is not running");
            return;
        }
        if !self.is_paused {
            log::debug!("paused");
            self.is_paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.is_paused {
            log::debug!("resumed");
            self.is_paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Stops the loop at the top of its next iteration. Idempotent.
    pub fn quit(&self) {
        self.handle.quit();
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn state(&self) -> LifecycleState {
        match (self.is_running(), self.is_paused) {
            (true, true) => LifecycleState::Paused,
            (true, false) => LifecycleState::Running,
            (false, _) if self.runner.is_some() => LifecycleState::Stopping,
            (false, _) => LifecycleState::Idle,
        }
    }

    /// Multiplies every subsequent frame delta by `scale`.
    ///
    /// Not validated: zero freezes update time, and a negative scale hands
    /// negative deltas to modules, which most animation code does not expect.
    pub fn set_time_scale(&mut self, scale: f32) {
        if scale < 0.0 {
            log::warn!("negative time scale {scale}; module deltas will run backwards");
        }
        self.time_scale = scale;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Minimum wall time per frame; `None` disables the cap.
    pub fn set_frame_interval(&mut self, interval: Option<Duration>) {
        self.frame_interval = interval;
    }

    /// Frames completed in the current run.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn handle(&self) -> AppHandle {
        self.handle.clone()
    }

    /// See [`AppHandle::perform_in_main_thread`].
    pub fn perform_in_main_thread<F>(&self, f: F)
    where
        F: FnOnce(&mut Application) + Send + 'static,
    {
        self.handle.perform_in_main_thread(f);
    }

    /// Runner of the current run; `None` before `run` and after `destroy`.
    pub fn runner(&self) -> Option<RunnerRef> {
        self.runner.clone()
    }

    /// Window of the current run; `None` before `run` and after `destroy`.
    pub fn window(&self) -> Option<Rc<dyn Window>> {
        self.runner.as_ref().and_then(|r| r.borrow().window())
    }

    /// Releases everything the run acquired.
    ///
    /// Module `destroy` hooks run in reverse registration order for the
    /// modules whose `setup` succeeded, then the runner is torn down and the
    /// module list emptied. Safe to call at any time and any number of times;
    /// `run` calls it on exit.
    pub fn destroy(&mut self) {
        self.quit();
        self.is_paused = false;

        self.modules_ready = false;
        let set_up = std::mem::take(&mut self.modules_set_up);
        for module in self.modules.iter().take(set_up).rev() {
            module.borrow_mut().destroy();
        }
        self.modules.clear();

        if let Some(runner) = self.runner.take() {
            runner.borrow_mut().on_destroy();
        }
        self.pending_events.clear();
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.destroy();
    }
}
