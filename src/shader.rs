//! Shader program lifecycle: compile, link, uniform lookup, release.
//!
//! Horizon shaders are WGSL. A program is built from two separately compiled
//! stages, the same way a classic GL program is:
//!
//! 1. [`ShaderProgramManager::compile`] parses and validates one stage with
//!    naga and hands back a [`CompiledShader`] with a fresh [`ShaderId`].
//! 2. [`ShaderProgramManager::link`] consumes a vertex and a fragment stage,
//!    checks that their interfaces fit together, and creates the GPU render
//!    pipeline. The per-stage GPU modules only live for the duration of the
//!    call, so nothing intermediate outlives linking.
//! 3. [`ShaderProgram::uniform_location`] maps a uniform name to the
//!    `@group`/`@binding` slot it was declared at. Uniforms the entry points
//!    never touch are treated as optimised away and report `None`.
//!
//! Compile and link failures carry the front end's diagnostic text and are
//! fatal at startup.
//!
//! # Example
//!
//! ```ignore
//! let mut shaders = ShaderProgramManager::new();
//! let vertex = shaders.compile(&vertex_src, ShaderStage::Vertex)?;
//! let fragment = shaders.compile(&fragment_src, ShaderStage::Fragment)?;
//! let program = shaders.link(&gpu, vertex, fragment)?;
//!
//! let model = program.uniform_location("model");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{ProgramLinkError, ShaderCompileError, ShaderError};
use crate::gpu::GpuContext;
use crate::mesh::{VERTEX_LAYOUT, VERTEX_LOCATIONS};
use crate::renderer::{MATRIX_UNIFORMS, MATRIX_UNIFORM_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Handle of a compiled shader stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a uniform lives in the pipeline's bind groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// A uniform used by a linked program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformBinding {
    pub location: UniformLocation,
    /// Size in bytes of the uniform's type.
    pub size: u64,
}

/// One validated shader stage, ready to be linked.
pub struct CompiledShader {
    id: ShaderId,
    stage: ShaderStage,
    source: String,
    module: naga::Module,
    info: naga::valid::ModuleInfo,
    entry_index: usize,
}

impl CompiledShader {
    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.module.entry_points[self.entry_index].name
    }

    fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }

    /// Locations of the entry point's `@location` inputs.
    fn input_locations(&self) -> Vec<u32> {
        let mut out = Vec::new();
        for argument in &self.entry().function.arguments {
            collect_locations(&self.module, argument.ty, argument.binding.as_ref(), &mut out);
        }
        out.sort_unstable();
        out
    }

    /// Locations of the entry point's `@location` outputs.
    fn output_locations(&self) -> Vec<u32> {
        let mut out = Vec::new();
        if let Some(result) = &self.entry().function.result {
            collect_locations(&self.module, result.ty, result.binding.as_ref(), &mut out);
        }
        out.sort_unstable();
        out
    }

    /// Resources the entry point actually touches, with their names.
    fn used_resources(&self) -> Vec<(String, UniformLocation, naga::AddressSpace, u64)> {
        let uses = self.info.get_entry_point(self.entry_index);
        self.module
            .global_variables
            .iter()
            .filter(|(handle, _)| !uses[*handle].is_empty())
            .filter_map(|(_, var)| {
                let binding = var.binding.as_ref()?;
                let location = UniformLocation {
                    group: binding.group,
                    binding: binding.binding,
                };
                let name = var.name.clone().unwrap_or_else(|| {
                    format!("_group{}_binding{}", binding.group, binding.binding)
                });
                let size = self.module.types[var.ty].inner.size(self.module.to_ctx()) as u64;
                Some((name, location, var.space, size))
            })
            .collect()
    }
}

impl fmt::Debug for CompiledShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("entry_point", &self.entry_point())
            .finish()
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(*location),
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// The linked interface of a program: which uniforms it uses and where.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramInterface {
    id: ProgramId,
    uniforms: BTreeMap<String, UniformBinding>,
    vertex_entry: String,
    fragment_entry: String,
}

impl ProgramInterface {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Location of `name`, or `None` if the program does not use it.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).map(|u| u.location)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformBinding> {
        self.uniforms.get(name)
    }

    /// All used uniforms, sorted by name.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformBinding)> {
        self.uniforms.iter().map(|(name, u)| (name.as_str(), u))
    }

    /// Number of bind groups the pipeline layout spans.
    pub fn bind_group_count(&self) -> u32 {
        self.uniforms
            .values()
            .map(|u| u.location.group + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}

/// A linked program: render pipeline plus its reflected interface.
///
/// Released when dropped.
pub struct ShaderProgram {
    interface: ProgramInterface,
    pipeline: wgpu::RenderPipeline,
}

impl ShaderProgram {
    pub fn id(&self) -> ProgramId {
        self.interface.id
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.interface.uniform_location(name)
    }

    /// Layout of bind group `group`, derived from the shaders at link time.
    pub fn bind_group_layout(&self, group: u32) -> wgpu::BindGroupLayout {
        self.pipeline.get_bind_group_layout(group)
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        log::info!("Shader program {} released", self.interface.id);
    }
}

/// Compiles shader stages and links them into programs.
///
/// Hands out shader and program handles from one counter starting at 1, so
/// a handle never collides with another object from the same manager.
#[derive(Debug)]
pub struct ShaderProgramManager {
    next_id: u32,
}

impl Default for ShaderProgramManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgramManager {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reads shader source text from disk.
    pub fn load_source(path: impl AsRef<Path>) -> Result<String, ShaderError> {
        let path = path.as_ref();
        std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses and validates one shader stage.
    ///
    /// The source must contain an entry point for `stage`; the first one found
    /// is used.
    pub fn compile(
        &mut self,
        source: &str,
        stage: ShaderStage,
    ) -> Result<CompiledShader, ShaderCompileError> {
        let id = ShaderId(self.allocate_id());

        match compile_stage(source, stage) {
            Ok((module, info, entry_index)) => {
                let shader = CompiledShader {
                    id,
                    stage,
                    source: source.to_owned(),
                    module,
                    info,
                    entry_index,
                };
                log::info!(
                    "Shader {id} ({stage}, entry point `{}`) compiled successfully",
                    shader.entry_point()
                );
                Ok(shader)
            }
            Err(log) => {
                log::error!("Shader {id} ({stage}) failed to compile");
                Err(ShaderCompileError { id, stage, log })
            }
        }
    }

    /// Checks that a vertex and a fragment stage fit together, without
    /// touching the GPU.
    ///
    /// Allocates the program handle, so a later [`link`](Self::link) of the
    /// same stages reports under the same id.
    pub fn link_interface(
        &mut self,
        vertex: &CompiledShader,
        fragment: &CompiledShader,
    ) -> Result<ProgramInterface, ProgramLinkError> {
        let id = ProgramId(self.allocate_id());

        check_interface(id, vertex, fragment).map_err(|log| {
            log::error!("Shader program {id} failed to link");
            ProgramLinkError { id, log }
        })
    }

    /// Links two compiled stages into a program.
    ///
    /// Both stages are consumed. Their GPU modules are created only for
    /// pipeline creation and released before this returns.
    pub fn link(
        &mut self,
        gpu: &GpuContext,
        vertex: CompiledShader,
        fragment: CompiledShader,
    ) -> Result<ShaderProgram, ProgramLinkError> {
        let interface = self.link_interface(&vertex, &fragment)?;
        let id = interface.id;
        let device = &gpu.device;

        let vertex_label = format!("Shader {}", vertex.id);
        let fragment_label = format!("Shader {}", fragment.id);
        let program_label = format!("Shader Program {id}");

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&vertex_label),
            source: wgpu::ShaderSource::Wgsl(vertex.source.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&fragment_label),
            source: wgpu::ShaderSource::Wgsl(fragment.source.as_str().into()),
        });

        // Layout is derived from the shaders, matching the reflected interface
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&program_label),
            layout: None,
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(interface.vertex_entry()),
                buffers: &[VERTEX_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(interface.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let error = pollster::block_on(device.pop_error_scope());

        drop(vertex_module);
        drop(fragment_module);
        log::debug!("Shaders {} and {} released after linking", vertex.id, fragment.id);

        if let Some(error) = error {
            log::error!("Shader program {id} failed to link");
            return Err(ProgramLinkError {
                id,
                log: error.to_string(),
            });
        }

        log::info!("Shader program {id} linked successfully");
        Ok(ShaderProgram {
            interface,
            pipeline,
        })
    }

    /// Loads, compiles and links a program from two WGSL files.
    pub fn load_program(
        &mut self,
        gpu: &GpuContext,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<ShaderProgram, ShaderError> {
        let vertex_source = Self::load_source(vertex_path)?;
        let fragment_source = Self::load_source(fragment_path)?;

        let vertex = self.compile(&vertex_source, ShaderStage::Vertex)?;
        let fragment = self.compile(&fragment_source, ShaderStage::Fragment)?;
        Ok(self.link(gpu, vertex, fragment)?)
    }

    /// Location of `name` in `program`, or `None` if the program does not use it.
    pub fn uniform_location(program: &ShaderProgram, name: &str) -> Option<UniformLocation> {
        program.uniform_location(name)
    }
}

fn compile_stage(
    source: &str,
    stage: ShaderStage,
) -> Result<(naga::Module, naga::valid::ModuleInfo, usize), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let info = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| e.emit_to_string(source))?;

    let entry_index = module
        .entry_points
        .iter()
        .position(|ep| ep.stage == stage.naga())
        .ok_or_else(|| format!("no @{stage} entry point found"))?;

    Ok((module, info, entry_index))
}

fn check_interface(
    id: ProgramId,
    vertex: &CompiledShader,
    fragment: &CompiledShader,
) -> Result<ProgramInterface, String> {
    for (shader, expected) in [
        (vertex, ShaderStage::Vertex),
        (fragment, ShaderStage::Fragment),
    ] {
        if shader.stage != expected {
            return Err(format!(
                "expected a {expected} shader, got {} shader {}",
                shader.stage, shader.id
            ));
        }
    }

    for location in vertex.input_locations() {
        if !VERTEX_LOCATIONS.contains(&location) {
            return Err(format!(
                "vertex input @location({location}) is not provided by the vertex layout \
                 (provides {VERTEX_LOCATIONS:?})"
            ));
        }
    }

    let written = vertex.output_locations();
    for location in fragment.input_locations() {
        if !written.contains(&location) {
            return Err(format!(
                "fragment input @location({location}) is not written by the vertex stage"
            ));
        }
    }

    let mut by_location: BTreeMap<UniformLocation, (String, u64)> = BTreeMap::new();
    for shader in [vertex, fragment] {
        for (name, location, space, size) in shader.used_resources() {
            if space != naga::AddressSpace::Uniform {
                return Err(format!(
                    "`{name}` at @group({}) @binding({}) in {} shader {} is a {space:?} \
                     resource; only uniform buffers are supported",
                    location.group, location.binding, shader.stage, shader.id
                ));
            }

            match by_location.get(&location) {
                Some((existing, existing_size)) if *existing != name || *existing_size != size => {
                    return Err(format!(
                        "stages disagree on @group({}) @binding({}): `{existing}` \
                         ({existing_size} bytes) vs `{name}` ({size} bytes)",
                        location.group, location.binding
                    ));
                }
                Some(_) => {}
                None => {
                    by_location.insert(location, (name, size));
                }
            }
        }
    }

    let mut uniforms = BTreeMap::new();
    for (location, (name, size)) in by_location {
        if let Some(other) = uniforms.insert(name.clone(), UniformBinding { location, size }) {
            return Err(format!(
                "uniform `{name}` is bound at both @group({}) @binding({}) and \
                 @group({}) @binding({})",
                other.location.group, other.location.binding, location.group, location.binding
            ));
        }
    }

    // The renderer writes these as mat4x4<f32> every frame
    for name in MATRIX_UNIFORMS {
        if let Some(binding) = uniforms.get(name) {
            if binding.size != MATRIX_UNIFORM_SIZE {
                return Err(format!(
                    "uniform `{name}` is {} bytes; it must be a mat4x4<f32> ({MATRIX_UNIFORM_SIZE} bytes)",
                    binding.size
                ));
            }
        }
    }

    Ok(ProgramInterface {
        id,
        uniforms,
        vertex_entry: vertex.entry_point().to_owned(),
        fragment_entry: fragment.entry_point().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_VERTEX: &str = include_str!("../shaders/base_vertex.wgsl");
    const BASE_FRAGMENT: &str = include_str!("../shaders/base_fragment.wgsl");

    fn base_stages(manager: &mut ShaderProgramManager) -> (CompiledShader, CompiledShader) {
        let vertex = manager.compile(BASE_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(BASE_FRAGMENT, ShaderStage::Fragment).unwrap();
        (vertex, fragment)
    }

    #[test]
    fn compiles_base_shaders_with_sequential_handles() {
        let mut manager = ShaderProgramManager::new();
        let (vertex, fragment) = base_stages(&mut manager);

        assert_eq!(vertex.id(), ShaderId(1));
        assert_eq!(vertex.stage(), ShaderStage::Vertex);
        assert_eq!(vertex.entry_point(), "vs_main");
        assert_eq!(fragment.id(), ShaderId(2));
        assert_eq!(fragment.entry_point(), "fs_main");
    }

    #[test]
    fn syntax_error_carries_diagnostic() {
        let mut manager = ShaderProgramManager::new();
        let err = manager
            .compile("@vertex fn vs_main( -> {", ShaderStage::Vertex)
            .unwrap_err();

        assert_eq!(err.id, ShaderId(1));
        assert_eq!(err.stage, ShaderStage::Vertex);
        assert!(!err.log.is_empty());
        assert!(err.to_string().contains("vertex shader 1 failed to compile"));
    }

    #[test]
    fn validation_error_is_a_compile_error() {
        let source = r#"
            @vertex
            fn vs_main() -> @builtin(position) vec4<f32> {
                let x: f32 = true;
                return vec4<f32>(x);
            }
        "#;
        let mut manager = ShaderProgramManager::new();
        let err = manager.compile(source, ShaderStage::Vertex).unwrap_err();
        assert!(!err.log.is_empty());
    }

    #[test]
    fn missing_entry_point_for_stage() {
        let mut manager = ShaderProgramManager::new();
        let err = manager
            .compile(BASE_FRAGMENT, ShaderStage::Vertex)
            .unwrap_err();
        assert!(err.log.contains("no @vertex entry point"), "{}", err.log);
    }

    #[test]
    fn base_program_uniform_locations() {
        let mut manager = ShaderProgramManager::new();
        let (vertex, fragment) = base_stages(&mut manager);
        let interface = manager.link_interface(&vertex, &fragment).unwrap();

        assert_eq!(interface.id(), ProgramId(3));
        assert_eq!(
            interface.uniform_location("projection"),
            Some(UniformLocation { group: 0, binding: 0 })
        );
        assert_eq!(
            interface.uniform_location("view"),
            Some(UniformLocation { group: 0, binding: 1 })
        );
        assert_eq!(
            interface.uniform_location("model"),
            Some(UniformLocation { group: 1, binding: 0 })
        );
        assert_eq!(interface.uniform("model").unwrap().size, 64);
        assert_eq!(interface.uniform_location("saturation"), None);
        assert_eq!(interface.bind_group_count(), 2);
        assert_eq!(interface.vertex_entry(), "vs_main");
        assert_eq!(interface.fragment_entry(), "fs_main");
    }

    #[test]
    fn unused_uniform_is_optimised_away() {
        let vertex_source = r#"
            @group(0) @binding(0) var<uniform> projection: mat4x4<f32>;
            @group(0) @binding(1) var<uniform> unused: vec4<f32>;

            @vertex
            fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return projection * vec4<f32>(position, 1.0);
            }
        "#;
        let fragment_source = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 1.0, 1.0, 1.0);
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(vertex_source, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(fragment_source, ShaderStage::Fragment).unwrap();
        let interface = manager.link_interface(&vertex, &fragment).unwrap();

        assert!(interface.uniform_location("projection").is_some());
        assert_eq!(interface.uniform_location("unused"), None);
    }

    #[test]
    fn fragment_input_must_be_written_by_vertex_stage() {
        let fragment_source = r#"
            @fragment
            fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(BASE_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(fragment_source, ShaderStage::Fragment).unwrap();
        let err = manager.link_interface(&vertex, &fragment).unwrap_err();

        assert_eq!(err.id, ProgramId(3));
        assert!(err.log.contains("@location(3)"), "{}", err.log);
    }

    #[test]
    fn vertex_input_must_come_from_layout() {
        let vertex_source = r#"
            @vertex
            fn vs_main(
                @location(0) position: vec3<f32>,
                @location(1) normal: vec3<f32>,
            ) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position + normal, 1.0);
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(vertex_source, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(BASE_FRAGMENT, ShaderStage::Fragment).unwrap();
        let err = manager.link_interface(&vertex, &fragment).unwrap_err();
        assert!(err.log.contains("vertex input @location(1)"), "{}", err.log);
    }

    #[test]
    fn non_uniform_resources_are_rejected() {
        let fragment_source = r#"
            @group(2) @binding(0) var albedo: texture_2d<f32>;

            struct FragmentInput {
                @location(0) local_position: vec3<f32>,
            };

            @fragment
            fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
                return textureLoad(albedo, vec2<i32>(0, 0), 0) + vec4<f32>(in.local_position, 0.0);
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(BASE_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(fragment_source, ShaderStage::Fragment).unwrap();
        let err = manager.link_interface(&vertex, &fragment).unwrap_err();
        assert!(err.log.contains("`albedo`"), "{}", err.log);
    }

    #[test]
    fn stages_must_agree_on_shared_bindings() {
        let fragment_source = r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(BASE_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(fragment_source, ShaderStage::Fragment).unwrap();
        let err = manager.link_interface(&vertex, &fragment).unwrap_err();
        assert!(err.log.contains("stages disagree"), "{}", err.log);
    }

    #[test]
    fn renderer_uniforms_must_be_matrices() {
        let vertex_source = r#"
            @group(1) @binding(0) var<uniform> model: vec4<f32>;

            @vertex
            fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 1.0) + model;
            }
        "#;
        let fragment_source = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 1.0, 1.0, 1.0);
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(vertex_source, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(fragment_source, ShaderStage::Fragment).unwrap();
        let err = manager.link_interface(&vertex, &fragment).unwrap_err();

        assert_eq!(err.id, ProgramId(3));
        assert!(err.log.contains("uniform `model` is 16 bytes"), "{}", err.log);
    }

    #[test]
    fn other_uniforms_may_have_any_type() {
        let fragment_source = r#"
            @group(2) @binding(0) var<uniform> tint: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#;

        let mut manager = ShaderProgramManager::new();
        let vertex = manager.compile(BASE_VERTEX, ShaderStage::Vertex).unwrap();
        let fragment = manager.compile(fragment_source, ShaderStage::Fragment).unwrap();
        let interface = manager.link_interface(&vertex, &fragment).unwrap();
        assert_eq!(interface.uniform("tint").unwrap().size, 16);
    }

    #[test]
    fn swapped_stages_fail_to_link() {
        let mut manager = ShaderProgramManager::new();
        let (vertex, fragment) = base_stages(&mut manager);
        let err = manager.link_interface(&fragment, &vertex).unwrap_err();
        assert!(err.log.contains("expected a vertex shader"), "{}", err.log);
    }

    #[test]
    fn missing_source_file_is_io_error() {
        let err = ShaderProgramManager::load_source("does/not/exist.wgsl").unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }

    #[test]
    fn shipped_shader_files_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
        let source = ShaderProgramManager::load_source(dir.join("base_vertex.wgsl")).unwrap();
        assert_eq!(source, BASE_VERTEX);
    }
}
