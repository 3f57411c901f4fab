//! Core GPU context and device management.
//!
//! [`GpuContext`] holds the wgpu objects every other part of Horizon renders
//! through: the surface presenting to the window, the device, the queue and
//! the surface configuration. It is created once during the load phase and
//! dropped last at unload, after every buffer and pipeline made from it.
//!
//! [`Window`]: winit::window::Window

use std::sync::Arc;
use winit::window::Window;

use crate::camera::Viewport;
use crate::error::{GpuError, RenderError};

/// What to do after a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
}

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// 1. Creates a wgpu instance with primary backends (Vulkan, Metal, DX12)
    /// 2. Creates a surface for the window
    /// 3. Requests a suitable GPU adapter
    /// 4. Creates the logical device and command queue
    /// 5. Configures the surface with an sRGB format; `vsync` selects Fifo,
    ///    otherwise the fastest non-blocking present mode available
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!(
            "GPU: {} ({:?}, {} backend, driver {} {})",
            info.name,
            info.device_type,
            info.backend.to_str(),
            info.driver,
            info.driver_info
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Horizon Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let viewport = Viewport::new(size.width, size.height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: viewport.width(),
            height: viewport.height(),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "Surface configured: {}x{} {:?}, {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            viewport,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions (window minimize) and sizes equal to the
    /// current one, so repeated resize events reconfigure at most once.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport.resize(width, height) {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            log::debug!("Surface resized to {width}x{height}");
        }
    }

    /// Re-applies the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Current drawable size.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Acquires the next surface texture.
    ///
    /// `Ok(None)` means the frame should be skipped; the surface has already
    /// been reconfigured if that was needed.
    pub fn acquire_frame(&self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(err) => match self.handle_surface_error(err)? {
                SurfaceErrorAction::Reconfigured => {
                    log::debug!("Surface reconfigured, skipping frame");
                    Ok(None)
                }
                SurfaceErrorAction::SkipFrame => Ok(None),
            },
        }
    }

    fn handle_surface_error(
        &self,
        err: wgpu::SurfaceError,
    ) -> Result<SurfaceErrorAction, RenderError> {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.reconfigure();
                Ok(SurfaceErrorAction::Reconfigured)
            }
            wgpu::SurfaceError::OutOfMemory => Err(RenderError::SurfaceOutOfMemory),
            wgpu::SurfaceError::Timeout => {
                log::warn!("Timed out acquiring surface texture");
                Ok(SurfaceErrorAction::SkipFrame)
            }
            wgpu::SurfaceError::Other => Ok(SurfaceErrorAction::SkipFrame),
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        log::debug!("GPU context released");
    }
}
