use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::window::Window;

use crate::paint::Color;
use crate::render::{FrameStatus, RenderContext};

use super::GpuInit;

/// Frame acquired by `begin_frame` and waiting for `present`.
///
/// Holding the surface texture blocks acquisition of the next one.
struct OpenFrame {
    surface_texture: wgpu::SurfaceTexture,
    encoder: wgpu::CommandEncoder,
}

/// wgpu objects bound to one window.
///
/// The surface borrows from a shared handle to the window, so the context
/// keeps the window alive for as long as it exists.
pub struct WgpuContext {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    window: Arc<Window>,
    frame: Option<OpenFrame>,
}

impl WgpuContext {
    /// Creates a context for `window`. Adapter and device requests are async.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("ember device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = init
            .alpha_mode
            .filter(|m| caps.alpha_modes.contains(m))
            .unwrap_or_else(|| {
                caps.alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
            });

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(true),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        let info = adapter.get_info();
        log::info!(
            "wgpu context ready: {} ({:?}), surface {:?} {}x{}",
            info.name,
            info.backend,
            format,
            config.width,
            config.height
        );

        Ok(Self {
            _instance: instance,
            surface,
            adapter,
            device,
            queue,
            config,
            window,
            frame: None,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    fn configure(&self) {
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn handle_surface_error(&mut self, err: SurfaceError) -> FrameStatus {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                log::debug!("surface {err:?}; reconfiguring");
                self.configure();
                FrameStatus::Skipped
            }
            SurfaceError::OutOfMemory => {
                log::error!("surface out of memory");
                FrameStatus::Fatal
            }
            SurfaceError::Timeout | SurfaceError::Other => {
                log::warn!("surface {err:?}; skipping frame");
                FrameStatus::Skipped
            }
        }
    }
}

impl RenderContext for WgpuContext {
    /// `width` and `height` are logical; the surface is configured in
    /// physical pixels using the window's current scale factor.
    fn resize(&mut self, width: u32, height: u32) {
        let scale = self.window.scale_factor();
        let physical_w = (f64::from(width) * scale).round() as u32;
        let physical_h = (f64::from(height) * scale).round() as u32;

        if physical_w == 0 || physical_h == 0 {
            return;
        }
        if physical_w == self.config.width && physical_h == self.config.height {
            return;
        }

        self.config.width = physical_w;
        self.config.height = physical_h;
        self.configure();
    }

    fn set_vsync(&mut self, enabled: bool) {
        let mode = present_mode(enabled);
        if self.config.present_mode == mode {
            return;
        }
        self.config.present_mode = mode;
        self.configure();
        log::debug!("present mode set to {mode:?}");
    }

    fn begin_frame(&mut self, clear: Color) -> FrameStatus {
        // A frame left open by a skipped present is dropped unpresented.
        self.frame = None;

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => return self.handle_surface_error(e),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ember frame encoder"),
            });

        let [r, g, b, a] = clear.to_premul_f64();
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ember clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.frame = Some(OpenFrame {
            surface_texture,
            encoder,
        });
        FrameStatus::Ready
    }

    fn present(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.surface_texture.present();
    }
}

impl Drop for WgpuContext {
    fn drop(&mut self) {
        self.frame = None;
        log::debug!("wgpu context dropped");
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        let srgb = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = srgb.into_iter().find(|f| caps.formats.contains(f)) {
            return Some(f);
        }
    }

    Some(first)
}
