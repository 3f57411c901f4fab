//! The engine context: everything the load, update, render and unload phases
//! share, owned in one place instead of process-wide state.

use std::sync::Arc;

use winit::window::Window;

use crate::camera::RenderSettings;
use crate::config::AppConfig;
use crate::error::{EngineError, RenderError};
use crate::fps::FpsCounter;
use crate::gpu::GpuContext;
use crate::mesh::cube_vertices;
use crate::registry::SceneRegistry;
use crate::renderer::FrameRenderer;
use crate::shader::{ShaderProgram, ShaderProgramManager};

/// Loaded engine state.
///
/// Field order is drop order: the renderer's buffers go first, then the
/// shader program, then the meshes, and the GPU device last.
pub struct Engine {
    renderer: FrameRenderer,
    program: ShaderProgram,
    registry: SceneRegistry,
    settings: RenderSettings,
    fps: FpsCounter,
    /// Simulated seconds advanced by [`update`](Self::update).
    sim_time: f64,
    gpu: GpuContext,
}

impl Engine {
    /// Load phase.
    ///
    /// Brings up the GPU, compiles and links the scene program from the
    /// configured WGSL files, fills the registry with the cube grid and
    /// allocates the renderer's buffers.
    pub fn load(window: Arc<Window>, config: &AppConfig) -> Result<Self, EngineError> {
        let gpu = GpuContext::new(window, config.window.vsync)?;

        let mut shaders = ShaderProgramManager::new();
        let program =
            shaders.load_program(&gpu, &config.shaders.vertex, &config.shaders.fragment)?;

        let mut registry = SceneRegistry::new();
        registry.populate_grid(&config.scene, cube_vertices())?;
        log::info!(
            "Scene loaded: {} meshes, {} vertices, {} triangles",
            registry.len(),
            registry.total_vertex_count(),
            registry.total_triangle_count()
        );

        let renderer = FrameRenderer::new(&gpu, &program, &registry);

        Ok(Self {
            renderer,
            program,
            registry,
            settings: config.render,
            fps: FpsCounter::new(config.timing.fps_report_interval),
            sim_time: 0.0,
            gpu,
        })
    }

    /// Fixed-step update. The demo scene is static, so this only advances
    /// simulated time.
    pub fn update(&mut self, dt: f32) {
        self.sim_time += dt as f64;
    }

    /// Render phase. `dt` is the time since the previous render, in seconds.
    ///
    /// Skipped frames (surface lost or timed out) are not counted towards
    /// the FPS average.
    pub fn render(&mut self, dt: f32) -> Result<(), RenderError> {
        let stats = self
            .renderer
            .render(&self.gpu, &self.program, &self.registry, &self.settings)?;

        if let Some(stats) = stats {
            log::trace!("Drew {} meshes, {} triangles", stats.meshes, stats.triangles);
            if let Some(report) = self.fps.record(dt as f64) {
                log::info!("Average FPS: {} ({} frames)", report.average_fps, report.frames);
            }
        }
        Ok(())
    }

    /// Resize phase. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// Unload phase.
    ///
    /// Releases GPU resources in dependency order before the device.
    pub fn unload(self) {
        log::info!("Unloading after {:.1}s of simulated time", self.sim_time);
        let Self {
            renderer,
            program,
            registry,
            gpu,
            ..
        } = self;

        drop(renderer);
        drop(program);
        drop(registry);
        drop(gpu);
        log::info!("Engine unloaded");
    }
}
