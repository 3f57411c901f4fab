//! Positioned mesh instances and the built-in cube primitive.
//!
//! A [`Mesh`] pairs a [`Transform`] with a flat list of vertex positions
//! (`x, y, z` triples, three vertices per triangle). The world matrix is
//! derived from the transform and cached; every setter recomputes it, so the
//! cached matrix can never drift from the position/rotation/scale it was
//! built from.
//!
//! Vertex data is immutable and shared behind an [`Arc`], so ten thousand
//! cubes cost one vertex array.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//!
//! This layout is exposed via [`VERTEX_LAYOUT`] for pipeline creation.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::error::MeshError;
use crate::transform::Transform;

/// Number of floats per vertex.
pub const VERTEX_STRIDE: usize = 3;

/// The wgpu vertex buffer layout matching [`Mesh::vertices`].
pub const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: (VERTEX_STRIDE * std::mem::size_of::<f32>()) as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

/// Vertex locations provided by [`VERTEX_LAYOUT`].
pub const VERTEX_LOCATIONS: &[u32] = &[0];

/// A mesh instance placed in the world.
#[derive(Clone, Debug)]
pub struct Mesh {
    transform: Transform,
    matrix: Mat4,
    vertices: Arc<[f32]>,
}

impl Mesh {
    /// Creates a mesh from position, rotation (degrees), scale and vertex data.
    ///
    /// Fails if `vertices` is not a whole number of `x, y, z` triples.
    pub fn new(
        position: Vec3,
        rotation: Vec3,
        scale: Vec3,
        vertices: impl Into<Arc<[f32]>>,
    ) -> Result<Self, MeshError> {
        let transform = Transform {
            position,
            rotation,
            scale,
        };
        Self::with_transform(transform, vertices)
    }

    pub fn with_transform(
        transform: Transform,
        vertices: impl Into<Arc<[f32]>>,
    ) -> Result<Self, MeshError> {
        let vertices = vertices.into();
        if vertices.len() % VERTEX_STRIDE != 0 {
            return Err(MeshError::InvalidVertexStride {
                len: vertices.len(),
            });
        }

        Ok(Self {
            matrix: transform.matrix(),
            transform,
            vertices,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Rotation in degrees around X, Y and Z.
    pub fn rotation(&self) -> Vec3 {
        self.transform.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// The cached world matrix.
    pub fn transform(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.regenerate();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
        self.regenerate();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.regenerate();
    }

    /// Flat vertex positions, three floats per vertex.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / VERTEX_STRIDE) as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.vertex_count() / 3
    }

    fn regenerate(&mut self) {
        self.matrix = self.transform.matrix();
    }
}

/// Vertex positions of a unit cube centered at the origin.
///
/// 6 faces × 2 triangles × 3 vertices, counter-clockwise front faces, no
/// index buffer: every triangle lists its own corners.
pub fn cube_vertices() -> Vec<f32> {
    // Each face as a quad, corners in CCW order seen from outside
    #[rustfmt::skip]
    let faces: [[[f32; 3]; 4]; 6] = [
        // Front face (Z+)
        [[-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5]],
        // Back face (Z-)
        [[ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5]],
        // Top face (Y+)
        [[-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5]],
        // Bottom face (Y-)
        [[-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5]],
        // Right face (X+)
        [[ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5]],
        // Left face (X-)
        [[-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5]],
    ];

    const QUAD: [usize; 6] = [0, 1, 2, 2, 3, 0];

    faces
        .iter()
        .flat_map(|face| QUAD.iter().flat_map(move |&i| face[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_vertices() {
        let cube = cube_vertices();
        assert_eq!(cube.len(), 36 * VERTEX_STRIDE);

        let mesh = Mesh::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, cube).unwrap();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn cube_triangles_face_outward() {
        let cube = cube_vertices();
        for tri in cube.chunks(9) {
            let a = Vec3::from_slice(&tri[0..3]);
            let b = Vec3::from_slice(&tri[3..6]);
            let c = Vec3::from_slice(&tri[6..9]);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {a} {b} {c} faces inward");
        }
    }

    #[test]
    fn rejects_partial_vertex() {
        let err = Mesh::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, vec![0.0, 1.0]).unwrap_err();
        assert_eq!(err, MeshError::InvalidVertexStride { len: 2 });
    }

    #[test]
    fn transform_follows_setters() {
        let mut mesh = Mesh::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, cube_vertices()).unwrap();
        assert_eq!(mesh.transform(), Mat4::IDENTITY);

        mesh.set_position(Vec3::new(2.0, 4.0, 0.0));
        mesh.set_rotation(Vec3::new(0.0, 90.0, 0.0));
        mesh.set_scale(Vec3::splat(3.0));

        let expected = Transform::new()
            .position(Vec3::new(2.0, 4.0, 0.0))
            .rotation(Vec3::new(0.0, 90.0, 0.0))
            .uniform_scale(3.0)
            .matrix();
        assert_eq!(mesh.transform(), expected);
    }

    #[test]
    fn instances_share_vertex_data() {
        let shared: Arc<[f32]> = cube_vertices().into();
        let a = Mesh::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, Arc::clone(&shared)).unwrap();
        let b = Mesh::new(Vec3::X, Vec3::ZERO, Vec3::ONE, Arc::clone(&shared)).unwrap();
        assert_eq!(a.vertices().as_ptr(), b.vertices().as_ptr());
    }
}
