//! World-matrix construction from position, Euler rotation and scale.
//!
//! Every mesh in Horizon is placed with a [`Transform`]: a translation, an
//! Euler rotation given in **degrees** and a per-axis scale. The resulting
//! matrix is always composed in the same fixed order:
//!
//! ```text
//! M = Translate(P) · RotateX(R.x) · RotateY(R.y) · RotateZ(R.z) · Scale(S)
//! ```
//!
//! Applied right-to-left to a vertex this scales first, then rotates about Z,
//! Y and X, and finally translates. Rotations do not commute, so the X → Y → Z
//! order is part of the contract.
//!
//! # Example
//!
//! ```
//! use horizon::{Transform, Vec3};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(4.0, 0.0, -2.0))
//!     .rotation(Vec3::new(0.0, 45.0, 0.0))
//!     .uniform_scale(2.0);
//!
//! let world = transform.matrix();
//! assert_eq!(world.w_axis.truncate(), Vec3::new(4.0, 0.0, -2.0));
//! ```

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Composes a world matrix from translation, Euler rotation (degrees) and scale.
///
/// Pure and infallible.
pub fn create_transform(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    let rotation = Mat4::from_rotation_x(rotation_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotation_degrees.y.to_radians())
        * Mat4::from_rotation_z(rotation_degrees.z.to_radians());

    Mat4::from_translation(position) * rotation * Mat4::from_scale(scale)
}

/// Position, rotation and scale for placing a mesh in 3D space.
///
/// Unlike a quaternion-based transform, the rotation here is kept as Euler
/// angles in degrees so that it round-trips through configuration files
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// World-space position (translation).
    pub position: Vec3,
    /// Rotation around X, Y and Z in degrees.
    pub rotation: Vec3,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform positioned at the given location.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the Euler rotation in degrees.
    pub fn rotation(mut self, rotation_degrees: Vec3) -> Self {
        self.rotation = rotation_degrees;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Converts this transform to a 4×4 world matrix via [`create_transform`].
    pub fn matrix(&self) -> Mat4 {
        create_transform(self.position, self.rotation, self.scale)
    }
}
