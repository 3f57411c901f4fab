//! Per-frame rendering of the scene registry.
//!
//! Each frame runs the same fixed sequence:
//!
//! 1. **Begin**: acquire the surface texture; the first pass clears it.
//! 2. **Frame uniforms**: projection and view are computed once and written
//!    to their uniforms once, shared by every draw.
//! 3. **Per mesh**, in registry order: write the mesh's world matrix to the
//!    `model` uniform, overwrite the shared vertex buffer with the mesh's
//!    vertices, draw `vertex_count / 3` triangles.
//! 4. **End**: present.
//!
//! The sequence lives in [`draw_scene`] and talks to the GPU only through the
//! [`FrameTarget`] trait. [`WgpuFrame`] is the real implementation.
//!
//! # Buffer reuse
//!
//! One vertex buffer and one uniform buffer per uniform are allocated at load
//! time and reused every frame. Queue writes only land at the next submit, so
//! every mesh's writes are submitted together with its own render pass; that
//! way the buffer holds exactly one mesh's geometry during that mesh's draw.
//!
//! Re-uploading every mesh every frame favours simplicity over throughput.
//! Static per-mesh buffers or instancing are the obvious next step once the
//! scene grows beyond what this can sustain.

use std::collections::BTreeMap;

use glam::Mat4;

use crate::camera::{FrameMatrices, RenderSettings};
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::mesh::VERTEX_STRIDE;
use crate::registry::SceneRegistry;
use crate::shader::ShaderProgram;

/// Uniform names the renderer writes.
pub const PROJECTION_UNIFORM: &str = "projection";
pub const VIEW_UNIFORM: &str = "view";
pub const MODEL_UNIFORM: &str = "model";
/// Every uniform the renderer writes, each as a [`MatrixUniform`].
pub const MATRIX_UNIFORMS: [&str; 3] = [PROJECTION_UNIFORM, VIEW_UNIFORM, MODEL_UNIFORM];
/// Byte size of a `mat4x4<f32>` uniform.
pub const MATRIX_UNIFORM_SIZE: u64 = std::mem::size_of::<MatrixUniform>() as u64;

/// A 4×4 matrix in the layout WGSL `mat4x4<f32>` expects.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixUniform {
    pub matrix: [[f32; 4]; 4],
}

impl From<Mat4> for MatrixUniform {
    fn from(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }
}

/// Counters for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: u32,
    pub triangles: u64,
}

/// The GPU-facing operations of one frame, in the order [`draw_scene`] issues them.
pub trait FrameTarget {
    /// Writes the frame-global projection and view matrices.
    fn set_frame_uniforms(&mut self, matrices: &FrameMatrices);
    /// Writes one mesh's world matrix.
    fn set_model(&mut self, transform: Mat4);
    /// Replaces the contents of the shared vertex buffer.
    fn upload_vertices(&mut self, vertices: &[f32]);
    /// Draws `triangles` triangles from the start of the vertex buffer.
    fn draw_triangles(&mut self, triangles: u32);
}

/// Issues the frame's uniform writes and per-mesh draws in order.
pub fn draw_scene<T: FrameTarget>(
    target: &mut T,
    scene: &SceneRegistry,
    matrices: &FrameMatrices,
) -> FrameStats {
    target.set_frame_uniforms(matrices);

    let mut stats = FrameStats::default();
    for mesh in scene {
        target.set_model(mesh.transform());
        target.upload_vertices(mesh.vertices());

        let triangles = mesh.triangle_count();
        target.draw_triangles(triangles);

        stats.meshes += 1;
        stats.triangles += triangles as u64;
    }
    stats
}

struct UniformSlot {
    buffer: wgpu::Buffer,
}

/// GPU buffers owned by the renderer, allocated once at load time.
struct FrameResources {
    vertex_buffer: wgpu::Buffer,
    /// Vertex buffer capacity in floats.
    vertex_capacity: usize,
    uniforms: BTreeMap<String, UniformSlot>,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl FrameResources {
    fn new(gpu: &GpuContext, program: &ShaderProgram, vertex_capacity: usize) -> Self {
        let device = &gpu.device;
        let interface = program.interface();

        let vertex_buffer = create_vertex_buffer(device, vertex_capacity);

        let mut uniforms = BTreeMap::new();
        for (name, binding) in interface.uniforms() {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("Uniform `{name}`")),
                size: uniform_buffer_size(binding.size),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            uniforms.insert(name.to_owned(), UniformSlot { buffer });
        }

        let bind_groups = (0..interface.bind_group_count())
            .map(|group| {
                let entries: Vec<wgpu::BindGroupEntry> = interface
                    .uniforms()
                    .filter(|(_, binding)| binding.location.group == group)
                    .map(|(name, binding)| wgpu::BindGroupEntry {
                        binding: binding.location.binding,
                        resource: uniforms[name].buffer.as_entire_binding(),
                    })
                    .collect();

                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Bind Group {group}")),
                    layout: &program.bind_group_layout(group),
                    entries: &entries,
                })
            })
            .collect();

        Self {
            vertex_buffer,
            vertex_capacity,
            uniforms,
            bind_groups,
        }
    }

    fn write_uniform(&self, queue: &wgpu::Queue, name: &str, matrix: Mat4) {
        // Uniforms the program does not use were optimised away; skip them
        if let Some(slot) = self.uniforms.get(name) {
            queue.write_buffer(
                &slot.buffer,
                0,
                bytemuck::cast_slice(&[MatrixUniform::from(matrix)]),
            );
        }
    }

    fn ensure_vertex_capacity(&mut self, device: &wgpu::Device, len: usize) {
        if len > self.vertex_capacity {
            log::warn!(
                "Mesh with {len} floats exceeds vertex buffer capacity of {}, growing",
                self.vertex_capacity
            );
            self.vertex_buffer.destroy();
            self.vertex_buffer = create_vertex_buffer(device, len);
            self.vertex_capacity = len;
        }
    }

    fn destroy(&self) {
        self.vertex_buffer.destroy();
        for slot in self.uniforms.values() {
            slot.buffer.destroy();
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    let size = (capacity.max(VERTEX_STRIDE) * std::mem::size_of::<f32>()) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Shared Vertex Buffer"),
        size: size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Uniform buffers are padded to a 16-byte multiple.
fn uniform_buffer_size(type_size: u64) -> u64 {
    type_size.max(16).next_multiple_of(16)
}

/// Owns the renderer's GPU buffers and draws the scene each frame.
///
/// Buffers are destroyed when the renderer is dropped, which the engine does
/// before releasing the shader program and the device.
pub struct FrameRenderer {
    resources: FrameResources,
}

impl FrameRenderer {
    /// Allocates the shared vertex buffer (sized for the largest mesh in
    /// `scene`) and one uniform buffer per uniform the program uses.
    pub fn new(gpu: &GpuContext, program: &ShaderProgram, scene: &SceneRegistry) -> Self {
        let resources = FrameResources::new(gpu, program, scene.max_vertex_len());

        log::debug!(
            "Renderer allocated {} floats of vertex storage and {} uniform buffers",
            resources.vertex_capacity,
            resources.uniforms.len()
        );

        for name in MATRIX_UNIFORMS {
            if program.uniform_location(name).is_none() {
                log::warn!("Shader program {} does not use uniform `{name}`", program.id());
            }
        }

        Self { resources }
    }

    /// Renders one frame.
    ///
    /// Returns `Ok(None)` when the frame was skipped because the surface was
    /// not available (resized, lost, timed out).
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        program: &ShaderProgram,
        scene: &SceneRegistry,
        settings: &RenderSettings,
    ) -> Result<Option<FrameStats>, RenderError> {
        let Some(output) = gpu.acquire_frame()? else {
            return Ok(None);
        };

        // Aspect always comes from the current viewport
        let matrices = settings.frame_matrices(gpu.viewport());

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let stats = {
            let mut frame = WgpuFrame {
                gpu,
                program,
                resources: &mut self.resources,
                view: &view,
                clear_color: settings.clear_color,
                clear_pending: true,
                vertex_len: 0,
            };
            let stats = draw_scene(&mut frame, scene, &matrices);
            frame.finish();
            stats
        };

        output.present();
        Ok(Some(stats))
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        self.resources.destroy();
        log::info!("Renderer buffers released");
    }
}

/// [`FrameTarget`] recording into the current surface texture.
///
/// Every draw is its own render pass and its own submit, which is what makes
/// the shared vertex buffer safe to overwrite between meshes.
pub struct WgpuFrame<'a> {
    gpu: &'a GpuContext,
    program: &'a ShaderProgram,
    resources: &'a mut FrameResources,
    view: &'a wgpu::TextureView,
    clear_color: [f64; 4],
    clear_pending: bool,
    /// Floats currently in the vertex buffer.
    vertex_len: usize,
}

impl WgpuFrame<'_> {
    fn load_op(&mut self) -> wgpu::LoadOp<wgpu::Color> {
        if std::mem::take(&mut self.clear_pending) {
            let [r, g, b, a] = self.clear_color;
            wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a })
        } else {
            wgpu::LoadOp::Load
        }
    }

    fn submit_pass(&mut self, triangles: u32) {
        let load = self.load_op();
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mesh Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if triangles > 0 {
                render_pass.set_pipeline(self.program.pipeline());
                for (group, bind_group) in self.resources.bind_groups.iter().enumerate() {
                    render_pass.set_bind_group(group as u32, bind_group, &[]);
                }

                let bytes = (self.vertex_len * std::mem::size_of::<f32>()) as u64;
                render_pass.set_vertex_buffer(0, self.resources.vertex_buffer.slice(..bytes));
                render_pass.draw(0..triangles * 3, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Clears the target if no mesh was drawn this frame.
    fn finish(mut self) {
        if self.clear_pending {
            self.submit_pass(0);
        }
    }
}

impl FrameTarget for WgpuFrame<'_> {
    fn set_frame_uniforms(&mut self, matrices: &FrameMatrices) {
        let queue = &self.gpu.queue;
        self.resources
            .write_uniform(queue, PROJECTION_UNIFORM, matrices.projection);
        self.resources.write_uniform(queue, VIEW_UNIFORM, matrices.view);
    }

    fn set_model(&mut self, transform: Mat4) {
        self.resources
            .write_uniform(&self.gpu.queue, MODEL_UNIFORM, transform);
    }

    fn upload_vertices(&mut self, vertices: &[f32]) {
        self.resources
            .ensure_vertex_capacity(&self.gpu.device, vertices.len());
        if !vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.resources.vertex_buffer,
                0,
                bytemuck::cast_slice(vertices),
            );
        }
        self.vertex_len = vertices.len();
    }

    fn draw_triangles(&mut self, triangles: u32) {
        if triangles > 0 {
            self.submit_pass(triangles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::mesh::{Mesh, cube_vertices};
    use crate::registry::GridConfig;
    use glam::Vec3;

    #[derive(Debug, PartialEq)]
    enum Call {
        FrameUniforms(FrameMatrices),
        Model(Mat4),
        Vertices(usize),
        Draw(u32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl FrameTarget for Recorder {
        fn set_frame_uniforms(&mut self, matrices: &FrameMatrices) {
            self.calls.push(Call::FrameUniforms(*matrices));
        }

        fn set_model(&mut self, transform: Mat4) {
            self.calls.push(Call::Model(transform));
        }

        fn upload_vertices(&mut self, vertices: &[f32]) {
            self.calls.push(Call::Vertices(vertices.len()));
        }

        fn draw_triangles(&mut self, triangles: u32) {
            self.calls.push(Call::Draw(triangles));
        }
    }

    fn matrices() -> FrameMatrices {
        RenderSettings::default().frame_matrices(&Viewport::new(1280, 720))
    }

    #[test]
    fn frame_uniforms_are_written_once_before_any_draw() {
        let mut scene = SceneRegistry::new();
        let grid = GridConfig {
            columns: 4,
            rows: 3,
            ..Default::default()
        };
        scene.populate_grid(&grid, cube_vertices()).unwrap();

        let mut recorder = Recorder::default();
        let stats = draw_scene(&mut recorder, &scene, &matrices());

        let frame_uniform_writes = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::FrameUniforms(_)))
            .count();
        assert_eq!(frame_uniform_writes, 1);
        assert_eq!(recorder.calls[0], Call::FrameUniforms(matrices()));
        assert_eq!(stats.meshes, 12);
        assert_eq!(stats.triangles, 12 * 12);
    }

    #[test]
    fn each_mesh_binds_uploads_then_draws_in_registry_order() {
        let mut scene = SceneRegistry::new();
        let triangle = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let a = Mesh::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, Vec3::ONE, triangle).unwrap();
        let b = Mesh::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::ONE, cube_vertices()).unwrap();
        scene.push(a.clone());
        scene.push(b.clone());

        let mut recorder = Recorder::default();
        draw_scene(&mut recorder, &scene, &matrices());

        assert_eq!(
            recorder.calls,
            vec![
                Call::FrameUniforms(matrices()),
                Call::Model(a.transform()),
                Call::Vertices(9),
                Call::Draw(1),
                Call::Model(b.transform()),
                Call::Vertices(108),
                Call::Draw(12),
            ]
        );
    }

    #[test]
    fn empty_scene_only_writes_frame_uniforms() {
        let mut recorder = Recorder::default();
        let stats = draw_scene(&mut recorder, &SceneRegistry::new(), &matrices());
        assert_eq!(recorder.calls, vec![Call::FrameUniforms(matrices())]);
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn matrix_uniform_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniform = MatrixUniform::from(m);
        assert_eq!(uniform.matrix[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(MATRIX_UNIFORM_SIZE, 64);
    }

    #[test]
    fn uniform_buffers_are_padded() {
        assert_eq!(uniform_buffer_size(4), 16);
        assert_eq!(uniform_buffer_size(64), 64);
        assert_eq!(uniform_buffer_size(68), 80);
    }
}
