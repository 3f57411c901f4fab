//! The ordered collection of mesh instances drawn every frame.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Layout of the load-time instance grid.
///
/// Instances are placed on the XY plane at
/// `origin + (column * spacing, row * spacing)`, row by row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    pub spacing: f32,
    pub origin: Vec2,
    /// Rotation in degrees applied to every instance.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 100,
            rows: 100,
            spacing: 2.0,
            origin: Vec2::new(-100.0, -100.0),
            rotation: Vec3::new(35.0, 45.0, 0.0),
            scale: Vec3::ONE,
        }
    }
}

/// Ordered mesh storage. Insertion order is draw order.
///
/// Populated once at load time and then only read by the renderer. The
/// renderer borrows it immutably for the whole frame, so the borrow checker
/// rules out mutation mid-iteration.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    meshes: Vec<Mesh>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mesh and returns its draw index.
    pub fn push(&mut self, mesh: Mesh) -> usize {
        let index = self.meshes.len();
        self.meshes.push(mesh);
        index
    }

    /// Fills the registry with one instance of `vertices` per grid cell.
    ///
    /// All instances share the same vertex data. Returns the number of meshes
    /// added.
    pub fn populate_grid(
        &mut self,
        grid: &GridConfig,
        vertices: impl Into<Arc<[f32]>>,
    ) -> Result<usize, MeshError> {
        let vertices: Arc<[f32]> = vertices.into();
        let count = grid.columns as usize * grid.rows as usize;
        self.meshes.reserve(count);

        for row in 0..grid.rows {
            for column in 0..grid.columns {
                let position = Vec3::new(
                    grid.origin.x + column as f32 * grid.spacing,
                    grid.origin.y + row as f32 * grid.spacing,
                    0.0,
                );
                let mesh = Mesh::new(position, grid.rotation, grid.scale, Arc::clone(&vertices))?;
                self.meshes.push(mesh);
            }
        }

        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    /// Meshes in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Mesh> {
        self.meshes.iter()
    }

    /// Sum of the vertex array lengths of every mesh.
    pub fn total_vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices().len()).sum()
    }

    /// Sum of triangles drawn per frame.
    pub fn total_triangle_count(&self) -> u64 {
        self.meshes.iter().map(|m| m.triangle_count() as u64).sum()
    }

    /// Length of the largest vertex array, used to size the GPU vertex buffer.
    pub fn max_vertex_len(&self) -> usize {
        self.meshes
            .iter()
            .map(|m| m.vertices().len())
            .max()
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

impl<'a> IntoIterator for &'a SceneRegistry {
    type Item = &'a Mesh;
    type IntoIter = std::slice::Iter<'a, Mesh>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube_vertices;

    #[test]
    fn default_grid_holds_ten_thousand_cubes() {
        let cube = cube_vertices();
        let mut registry = SceneRegistry::new();
        let added = registry
            .populate_grid(&GridConfig::default(), cube.clone())
            .unwrap();

        assert_eq!(added, 10_000);
        assert_eq!(registry.len(), 10_000);
        assert_eq!(registry.total_vertex_count(), 10_000 * cube.len());
        assert_eq!(registry.total_triangle_count(), 10_000 * 12);
        assert_eq!(registry.max_vertex_len(), cube.len());
    }

    #[test]
    fn grid_is_row_major_from_origin() {
        let grid = GridConfig {
            columns: 3,
            rows: 2,
            rotation: Vec3::ZERO,
            ..Default::default()
        };
        let mut registry = SceneRegistry::new();
        registry.populate_grid(&grid, cube_vertices()).unwrap();

        let positions: Vec<Vec3> = registry.iter().map(|m| m.position()).collect();
        assert_eq!(
            positions,
            vec![
                Vec3::new(-100.0, -100.0, 0.0),
                Vec3::new(-98.0, -100.0, 0.0),
                Vec3::new(-96.0, -100.0, 0.0),
                Vec3::new(-100.0, -98.0, 0.0),
                Vec3::new(-98.0, -98.0, 0.0),
                Vec3::new(-96.0, -98.0, 0.0),
            ]
        );
    }

    #[test]
    fn last_cell_of_default_grid() {
        let mut registry = SceneRegistry::new();
        registry
            .populate_grid(&GridConfig::default(), cube_vertices())
            .unwrap();
        let last = registry.get(registry.len() - 1).unwrap();
        assert_eq!(last.position(), Vec3::new(98.0, 98.0, 0.0));
    }

    #[test]
    fn push_preserves_insertion_order() {
        let mut registry = SceneRegistry::new();
        for x in [5.0, -1.0, 3.0] {
            let mesh = Mesh::new(Vec3::new(x, 0.0, 0.0), Vec3::ZERO, Vec3::ONE, cube_vertices())
                .unwrap();
            registry.push(mesh);
        }
        let xs: Vec<f32> = (&registry).into_iter().map(|m| m.position().x).collect();
        assert_eq!(xs, vec![5.0, -1.0, 3.0]);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.max_vertex_len(), 0);
    }

    #[test]
    fn invalid_vertices_abort_population() {
        let mut registry = SceneRegistry::new();
        let err = registry
            .populate_grid(&GridConfig::default(), vec![0.0; 4])
            .unwrap_err();
        assert_eq!(err, MeshError::InvalidVertexStride { len: 4 });
    }
}
