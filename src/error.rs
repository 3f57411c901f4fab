//! Error types for every fallible Horizon operation.
//!
//! Startup failures (shader compile/link, GPU initialisation, configuration)
//! are all fatal: they propagate out of [`Engine::load`](crate::Engine::load)
//! and abort initialisation. Nothing in Horizon retries.

use std::path::PathBuf;

use thiserror::Error;

use crate::shader::{ProgramId, ShaderId, ShaderStage};

/// A shader stage failed to parse or validate.
#[derive(Debug, Error)]
#[error("{stage} shader {id} failed to compile:\n{log}")]
pub struct ShaderCompileError {
    pub id: ShaderId,
    pub stage: ShaderStage,
    /// Diagnostic text reported by the shader front end.
    pub log: String,
}

/// Two compiled stages could not be linked into a program.
#[derive(Debug, Error)]
#[error("shader program {id} failed to link:\n{log}")]
pub struct ProgramLinkError {
    pub id: ProgramId,
    /// Diagnostic text describing the interface mismatch or driver error.
    pub log: String,
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Compile(#[from] ShaderCompileError),
    #[error(transparent)]
    Link(#[from] ProgramLinkError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    /// Vertex data must be a flat list of `x, y, z` triples.
    #[error("vertex data has {len} floats, which is not a multiple of 3")]
    InvalidVertexStride { len: usize },
}

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create window surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
}

/// Unrecoverable failure inside the per-frame loop.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface ran out of memory while acquiring a frame")]
    SurfaceOutOfMemory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Everything that can abort [`Engine::load`](crate::Engine::load).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
