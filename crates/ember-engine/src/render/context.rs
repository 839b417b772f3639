use crate::paint::Color;

/// Outcome of [`RenderContext::begin_frame`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// A frame is open and must be finished with `present`.
    Ready,
    /// Nothing was acquired this frame; try again next frame.
    Skipped,
    /// The backend cannot continue (commonly out of memory).
    Fatal,
}

/// Backend-facing render surface owned by the [`Renderer`](super::Renderer).
///
/// Created by the platform runner for its window and dropped by the renderer
/// on teardown.
pub trait RenderContext {
    /// Reconfigures the drawable for a window of `width` x `height` logical
    /// pixels. Backends apply the window's scale factor themselves.
    fn resize(&mut self, width: u32, height: u32);

    fn set_vsync(&mut self, enabled: bool);

    /// Acquires the next drawable and clears it to `clear`.
    fn begin_frame(&mut self, clear: Color) -> FrameStatus;

    /// Submits and presents the frame opened by `begin_frame`.
    fn present(&mut self);
}
