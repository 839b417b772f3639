use std::time::Duration;

use crate::device::GpuInit;

/// Native window parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Initial client width in logical pixels.
    pub width: f64,
    /// Initial client height in logical pixels.
    pub height: f64,
    pub resizable: bool,
    /// Borderless fullscreen on the current monitor.
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            width: 1280.0,
            height: 720.0,
            resizable: true,
            fullscreen: false,
        }
    }
}

/// Startup parameters for [`Application::run`](super::Application::run).
///
/// Opaque to the lifecycle core; forwarded to the platform runner.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub window: WindowConfig,

    /// Minimum wall time per frame. `None` runs uncapped and leaves pacing
    /// to vsync.
    pub frame_interval: Option<Duration>,

    pub gpu: GpuInit,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.window.resizable = resizable;
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.window.fullscreen = fullscreen;
        self
    }

    /// Caps the frame rate at `fps` frames per second. `0` removes the cap.
    pub fn with_frame_limit(mut self, fps: u32) -> Self {
        self.frame_interval = (fps > 0).then(|| Duration::from_secs(1) / fps);
        self
    }

    pub fn with_gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_limit_converts_to_interval() {
        let s = Settings::new().with_frame_limit(50);
        assert_eq!(s.frame_interval, Some(Duration::from_millis(20)));
        assert_eq!(s.with_frame_limit(0).frame_interval, None);
    }

    #[test]
    fn builder_overrides_window_defaults() {
        let s = Settings::new().with_title("demo").with_size(640.0, 480.0).with_fullscreen(true);
        assert_eq!(s.window.title, "demo");
        assert_eq!((s.window.width, s.window.height), (640.0, 480.0));
        assert!(s.window.fullscreen);
        assert!(s.window.resizable);
    }
}
