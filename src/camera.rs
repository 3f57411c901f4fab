//! Camera settings and the per-frame projection and view matrices.
//!
//! The camera sits at a configurable position looking down -Z. Both matrices
//! are recomputed each frame from [`RenderSettings`] and the current
//! [`Viewport`].

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Direction the camera looks along. Fixed; only the position moves.
pub const CAMERA_FORWARD: Vec3 = Vec3::NEG_Z;
/// Camera up axis.
pub const CAMERA_UP: Vec3 = Vec3::Y;

/// Camera and projection settings.
///
/// Recomputed into a projection and view matrix every frame, so changes take
/// effect on the next frame. The perspective aspect ratio always comes from
/// the current [`Viewport`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Perspective projection when `true`, orthographic when `false`.
    pub use_perspective: bool,
    /// Vertical field of view in degrees (perspective only).
    pub fov_degrees: f32,
    /// Near plane distance (perspective only; orthographic uses 0).
    pub near_clip: f32,
    pub far_clip: f32,
    /// Height of the orthographic view volume in world units.
    pub orthographic_scale: f32,
    pub camera_position: Vec3,
    /// Linear RGBA clear color.
    pub clear_color: [f64; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            use_perspective: false,
            fov_degrees: 90.0,
            near_clip: 0.1,
            far_clip: 10_000.0,
            orthographic_scale: 5.0,
            camera_position: Vec3::new(0.0, 0.0, 10.0),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RenderSettings {
    /// Projection matrix for the given aspect ratio (width / height).
    ///
    /// The orthographic volume is a square `orthographic_scale` on each side,
    /// spanning depth `0..far_clip`. It depends on neither the field of view
    /// nor the aspect ratio, so a non-square window stretches it.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        if self.use_perspective {
            Mat4::perspective_rh(
                self.fov_degrees.to_radians(),
                aspect,
                self.near_clip,
                self.far_clip,
            )
        } else {
            let half = self.orthographic_scale * 0.5;
            Mat4::orthographic_rh(-half, half, -half, half, 0.0, self.far_clip)
        }
    }

    /// World-to-view matrix for a camera at `camera_position` looking along
    /// [`CAMERA_FORWARD`].
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.camera_position, CAMERA_FORWARD, CAMERA_UP)
    }

    pub fn frame_matrices(&self, viewport: &Viewport) -> FrameMatrices {
        FrameMatrices {
            projection: self.projection_matrix(viewport.aspect()),
            view: self.view_matrix(),
        }
    }
}

/// Matrices shared by every draw in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMatrices {
    pub projection: Mat4,
    pub view: Mat4,
}

/// Current drawable size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Creates a viewport, clamping each dimension to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Resynchronises to a new window size.
    ///
    /// Zero-sized dimensions (a minimised window) are ignored and the previous
    /// size is kept. Returns `true` if the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let changed = (self.width, self.height) != (width, height);
        self.width = width;
        self.height = height;
        changed
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width / height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
