//! # Horizon
//!
//! **A minimal real-time 3D render loop.**
//!
//! Horizon opens a window, compiles and links a WGSL shader program, fills a
//! scene with cube instances and redraws every mesh every frame under a
//! shared projection and view.
//!
//! ## Quick Start
//!
//! ```no_run
//! use horizon::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut config = AppConfig::new().title("Cubes");
//!     config.render.use_perspective = true;
//!     config.render.camera_position = Vec3::new(0.0, 0.0, 150.0);
//!
//!     init_logging(&config.logging);
//!     run(config)
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`Transform`] / [`create_transform`] build world matrices from position,
//!   Euler rotation in degrees, and scale.
//! - [`Mesh`] pairs a flat vertex array with a transform.
//! - [`ShaderProgramManager`] compiles, links and reflects WGSL programs.
//! - [`SceneRegistry`] is the ordered list of meshes drawn each frame.
//! - [`FrameRenderer`] draws the registry; [`Engine`] owns everything and
//!   runs the load, update, render and unload phases.

mod app;
mod camera;
mod config;
mod engine;
mod error;
mod fps;
mod gpu;
mod logging;
mod mesh;
mod registry;
mod renderer;
mod scheduler;
mod shader;
mod transform;
pub mod ui;

pub use app::run;
pub use camera::{CAMERA_FORWARD, CAMERA_UP, FrameMatrices, RenderSettings, Viewport};
pub use config::{AppConfig, ShaderPaths, TimingConfig, WindowConfig};
pub use engine::Engine;
pub use error::{
    ConfigError, EngineError, GpuError, MeshError, ProgramLinkError, RenderError,
    ShaderCompileError, ShaderError,
};
pub use fps::{FpsCounter, FpsReport};
pub use gpu::{GpuContext, SurfaceErrorAction};
pub use logging::{LoggingConfig, init_logging};
pub use mesh::{Mesh, VERTEX_STRIDE, cube_vertices};
pub use registry::{GridConfig, SceneRegistry};
pub use renderer::{FrameRenderer, FrameStats, FrameTarget, draw_scene};
pub use scheduler::{FrameScheduler, FrameTick};
pub use shader::{
    CompiledShader, ProgramId, ProgramInterface, ShaderId, ShaderProgram, ShaderProgramManager,
    ShaderStage, UniformBinding, UniformLocation,
};
pub use transform::{Transform, create_transform};

// Re-export glam math types for convenience
pub use glam::{IVec2, Mat4, Vec2, Vec3};
