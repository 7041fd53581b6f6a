use glam::{Mat4, Vec3};

use crate::color::Color;

use super::Placement;

/// Perspective camera.
///
/// Only the rigid part of `placement` is used for the view matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub placement: Placement,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(placement: Placement) -> Self {
        Self { placement, ..Self::default() }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.placement.position
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            fov_y_degrees: 60.0,
            near: 0.3,
            far: 1000.0,
        }
    }
}

/// The single directional light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, in host space.
    pub forward: Vec3,
    pub color: Color,
}

impl DirectionalLight {
    /// A light pointing along the placement's local +Z.
    pub fn from_placement(placement: &Placement, color: Color) -> Self {
        Self { forward: placement.forward(), color }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self { forward: Vec3::new(0.0, -1.0, 1.0).normalize(), color: Color::WHITE }
    }
}

/// Computes `(view, projection)` for `camera` at the given aspect ratio.
///
/// The view matrix maps host space into a right-handed eye space looking down
/// -Z. The projection is OpenGL-style (clip z in `[-w, w]`). A non-positive
/// aspect (zero-sized screen) yields an all-zero projection so nothing is
/// rasterized.
pub fn view_projection(camera: &Camera, aspect: f32) -> (Mat4, Mat4) {
    let flip_z = Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0));
    let view = flip_z * camera.placement.rigid_matrix().inverse();

    let projection = if aspect > 0.0 {
        Mat4::perspective_rh_gl(camera.fov_y_degrees.to_radians(), aspect, camera.near, camera.far)
    } else {
        Mat4::ZERO
    };

    (view, projection)
}
