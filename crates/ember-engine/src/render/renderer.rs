use anyhow::{Context, Result};

use crate::core::{EventCtx, Module, RenderCtx, SetupCtx};
use crate::event::WindowResizedEvent;
use crate::paint::Color;
use crate::text::FontCache;

use super::{FrameStatus, RenderContext};

/// Module that clears and presents one frame per application frame.
///
/// Opens the frame in `before_render` and presents it in `after_render`, so
/// every other module's `render` hook draws into an open frame. Configuration
/// setters only store values; they take effect at the next frame or resize.
pub struct Renderer {
    vsync_enabled: bool,
    auto_reset_resolution: bool,
    clear_color: Color,
    context: Option<Box<dyn RenderContext>>,
    /// Last vsync value pushed to the context.
    applied_vsync: Option<bool>,
    frame_open: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            vsync_enabled: true,
            auto_reset_resolution: true,
            clear_color: Color::BLACK,
            context: None,
            applied_vsync: None,
            frame_open: false,
        }
    }

    /// Uses `context` instead of asking the runner for one during setup.
    pub fn with_context(context: Box<dyn RenderContext>) -> Self {
        Self {
            context: Some(context),
            ..Self::new()
        }
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_vsync_enabled(&mut self, enabled: bool) {
        self.vsync_enabled = enabled;
    }

    pub fn vsync_enabled(&self) -> bool {
        self.vsync_enabled
    }

    /// Whether window resize events resize the render target.
    pub fn reset_resolution_when_window_resized(&mut self, enabled: bool) {
        self.auto_reset_resolution = enabled;
    }

    pub fn auto_reset_resolution(&self) -> bool {
        self.auto_reset_resolution
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Resizes the render target to `width` x `height` logical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        match self.context.as_mut() {
            Some(ctx) => {
                log::debug!("render target resized to {width}x{height}");
                ctx.resize(width, height);
            }
            None => log::trace!("resize to {width}x{height} ignored: no render context"),
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Renderer {
    fn setup(&mut self, ctx: &mut SetupCtx<'_>) -> Result<()> {
        if self.context.is_none() {
            let context = ctx
                .runner
                .create_render_context()
                .context("failed to create render context")?;
            self.context = Some(context);
        }
        self.applied_vsync = None;
        Ok(())
    }

    fn before_render(&mut self, ctx: &mut RenderCtx<'_>) {
        let Some(context) = self.context.as_mut() else {
            return;
        };

        if self.applied_vsync != Some(self.vsync_enabled) {
            context.set_vsync(self.vsync_enabled);
            self.applied_vsync = Some(self.vsync_enabled);
        }

        match context.begin_frame(self.clear_color) {
            FrameStatus::Ready => self.frame_open = true,
            FrameStatus::Skipped => self.frame_open = false,
            FrameStatus::Fatal => {
                self.frame_open = false;
                log::error!("fatal render surface error; quitting");
                ctx.app.quit();
            }
        }
    }

    fn after_render(&mut self, _ctx: &mut RenderCtx<'_>) {
        if !std::mem::take(&mut self.frame_open) {
            return;
        }
        if let Some(context) = self.context.as_mut() {
            context.present();
        }
    }

    fn handle_event(&mut self, ctx: &mut EventCtx<'_>) {
        if !self.auto_reset_resolution {
            return;
        }
        let Some(resized) = ctx.event.cast::<WindowResizedEvent>() else {
            return;
        };
        let (width, height) = resized.window.logical_size().to_pixel_size();
        self.resize(width, height);
    }

    /// Clears the global font cache, then drops the render context.
    fn destroy(&mut self) {
        FontCache::clear_global();
        self.frame_open = false;
        self.applied_vsync = None;
        if self.context.take().is_some() {
            log::debug!("render context released");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::{AppHandle, Application};
    use crate::event::{EventRef, KeyCharEvent};
    use crate::testing::{RecordingContext, RenderLog, StubRunner, StubWindow};
    use crate::window::Window;

    fn recording() -> (Renderer, Rc<RefCell<RenderLog>>) {
        let log = Rc::new(RefCell::new(RenderLog::default()));
        (Renderer::with_context(RecordingContext::new(&log)), log)
    }

    fn resized(window: Rc<StubWindow>) -> WindowResizedEvent {
        let (width, height) = window.size();
        WindowResizedEvent {
            window: window as Rc<dyn Window>,
            width,
            height,
        }
    }

    fn send(renderer: &mut Renderer, app: &AppHandle, event: &dyn crate::event::Event) {
        let mut ctx = EventCtx { app, event };
        renderer.handle_event(&mut ctx);
    }

    fn frame(renderer: &mut Renderer, app: &AppHandle) {
        let mut ctx = RenderCtx { app, frame_index: 0 };
        renderer.before_render(&mut ctx);
        renderer.render(&mut ctx);
        renderer.after_render(&mut ctx);
    }

    #[test]
    fn resize_event_truncates_logical_size() {
        let (mut renderer, log) = recording();
        let app = Application::new().handle();

        send(&mut renderer, &app, &resized(StubWindow::new(800.6, 600.2)));

        assert_eq!(log.borrow().resizes, vec![(800, 600)]);
    }

    #[test]
    fn resize_uses_logical_size_on_scaled_windows() {
        let (mut renderer, log) = recording();
        let app = Application::new().handle();
        let window = StubWindow::new(400.5, 300.0);
        window.set_scale_factor(2.0);

        let event = resized(window);
        assert_eq!((event.width, event.height), (801, 600));
        send(&mut renderer, &app, &event);

        assert_eq!(log.borrow().resizes, vec![(400, 300)]);
    }

    #[test]
    fn resize_event_ignored_when_auto_reset_disabled() {
        let (mut renderer, log) = recording();
        renderer.reset_resolution_when_window_resized(false);
        let app = Application::new().handle();

        send(&mut renderer, &app, &resized(StubWindow::new(800.6, 600.2)));

        assert!(log.borrow().resizes.is_empty());
    }

    #[test]
    fn other_events_do_not_resize() {
        let (mut renderer, log) = recording();
        let app = Application::new().handle();

        send(&mut renderer, &app, &KeyCharEvent { text: "a".into() });

        assert!(log.borrow().resizes.is_empty());
    }

    #[test]
    fn setters_only_store_until_next_frame() {
        let (mut renderer, log) = recording();
        let app = Application::new().handle();

        renderer.set_vsync_enabled(false);
        renderer.set_clear_color(Color::RED);
        assert!(log.borrow().vsync.is_empty());
        assert!(log.borrow().clears.is_empty());

        frame(&mut renderer, &app);
        frame(&mut renderer, &app);
        renderer.set_vsync_enabled(true);
        frame(&mut renderer, &app);

        let log = log.borrow();
        assert_eq!(log.vsync, vec![false, true]);
        assert_eq!(log.clears, vec![Color::RED; 3]);
        assert_eq!(log.presented, 3);
    }

    #[test]
    fn skipped_frame_is_not_presented() {
        let (mut renderer, log) = recording();
        let app = Application::new().handle();
        log.borrow_mut().status = FrameStatus::Skipped;

        frame(&mut renderer, &app);

        assert_eq!(log.borrow().clears.len(), 1);
        assert_eq!(log.borrow().presented, 0);
    }

    #[test]
    fn destroy_clears_fonts_and_drops_context() {
        let (mut renderer, log) = recording();
        let before = FontCache::global().generation();

        renderer.destroy();

        assert!(FontCache::global().generation() > before);
        assert!(log.borrow().dropped);
        assert!(!renderer.has_context());

        renderer.destroy();
        assert!(!renderer.has_context());
    }

    #[test]
    fn renderer_in_a_run_presents_every_frame_and_follows_resizes() {
        let runner = StubRunner::new().exit_after(3);
        let window = runner.stub_window();
        window.set_logical_size(1024.9, 768.0);
        let resize: EventRef = Rc::new(resized(Rc::clone(&window)));
        let runner = runner.with_events(vec![vec![], vec![resize]]);
        let render_log = runner.render_log();

        let renderer = Rc::new(RefCell::new(Renderer::new()));
        let mut app = Application::new();
        app.use_module(renderer.clone()).expect("register");
        app.run_with_runner(runner.into_ref(), |_| Ok(())).expect("run");

        let log = render_log.borrow();
        assert_eq!(log.presented, 3);
        assert_eq!(log.resizes, vec![(1024, 768)]);
        assert_eq!(log.vsync, vec![true]);
        assert!(log.dropped);
        assert!(!renderer.borrow().has_context());
    }

    #[test]
    fn fatal_surface_error_quits_the_run() {
        let runner = StubRunner::new().exit_after(10);
        let render_log = runner.render_log();
        render_log.borrow_mut().status = FrameStatus::Fatal;

        let mut app = Application::new();
        app.use_module(Rc::new(RefCell::new(Renderer::new())))
            .expect("register");
        app.run_with_runner(runner.into_ref(), |_| Ok(())).expect("run");

        assert_eq!(app.frame_index(), 1);
        assert_eq!(render_log.borrow().presented, 0);
    }
}
