//! wgpu device and surface management.
//!
//! [`WgpuContext`] is the desktop [`RenderContext`](crate::render::RenderContext):
//! it owns the instance, adapter, device, queue and the window surface, and
//! opens one cleared frame at a time.

mod gpu;
mod init;

pub use gpu::WgpuContext;
pub use init::GpuInit;
