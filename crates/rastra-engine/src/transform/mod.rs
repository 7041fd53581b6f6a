//! Transform stage: camera, light and object matrices.
//!
//! Host-side placements use a left-handed frame (+Z forward). The kernels work
//! in a right-handed frame, so positions and directions handed to them have Z
//! negated (see [`to_kernel_space`]) and the view matrix carries a Z flip.
//!
//! Everything here is pure; nothing touches the GPU.

mod camera;
mod placement;

pub use camera::{view_projection, Camera, DirectionalLight};
pub use placement::Placement;

use glam::{Mat4, Vec3};

/// Converts a host-space position or direction into kernel space (Z negated).
#[inline]
pub fn to_kernel_space(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

/// Per-object matrices uploaded before the vertex transform kernel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjectTransforms {
    pub model: Mat4,
    /// `inverse(model)ᵀ`, used to transform normals under non-uniform scale.
    ///
    /// A singular model matrix yields non-finite values here; this is not checked.
    pub model_inverse_transpose: Mat4,
    /// `projection × view × model`.
    pub mvp: Mat4,
}

impl ObjectTransforms {
    pub fn new(view: Mat4, projection: Mat4, model: Mat4) -> Self {
        Self {
            model,
            model_inverse_transpose: model.inverse().transpose(),
            mvp: projection * view * model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec4};

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn kernel_space_negates_z_only() {
        assert_eq!(to_kernel_space(Vec3::new(1.0, -2.0, 3.0)), Vec3::new(1.0, -2.0, -3.0));
    }

    #[test]
    fn mvp_is_projection_view_model() {
        let camera = Camera::new(Placement::from_position(Vec3::new(0.0, 1.0, -10.0)));
        let (view, projection) = view_projection(&camera, 4.0 / 3.0);
        let model = Placement::from_position(Vec3::new(2.0, 0.0, 0.0))
            .with_rotation(Quat::from_rotation_y(0.7))
            .with_scale(Vec3::new(1.0, 2.0, 3.0))
            .model_matrix();

        let t = ObjectTransforms::new(view, projection, model);
        assert!(approx(t.mvp, projection * view * model));
        assert_eq!(t.model, model);
    }

    #[test]
    fn inverse_transpose_keeps_normals_perpendicular_under_non_uniform_scale() {
        let model = Placement::default()
            .with_scale(Vec3::new(4.0, 1.0, 1.0))
            .model_matrix();
        let t = ObjectTransforms::new(Mat4::IDENTITY, Mat4::IDENTITY, model);

        // Plane x = y, tangent (1, 1, 0), normal (1, -1, 0).
        let tangent = (model * Vec4::new(1.0, 1.0, 0.0, 0.0)).truncate();
        let normal = (t.model_inverse_transpose * Vec4::new(1.0, -1.0, 0.0, 0.0)).truncate();
        assert!(tangent.dot(normal).abs() < 1e-5);

        // The plain model matrix would not.
        let skewed = (model * Vec4::new(1.0, -1.0, 0.0, 0.0)).truncate();
        assert!(tangent.dot(skewed).abs() > 1.0);
    }

    #[test]
    fn transforms_are_recomputed_per_object() {
        let (view, projection) = view_projection(&Camera::default(), 1.0);
        let a = ObjectTransforms::new(view, projection, Mat4::from_translation(Vec3::X));
        let b = ObjectTransforms::new(view, projection, Mat4::from_translation(Vec3::Y));
        assert!(!approx(a.mvp, b.mvp));
    }
}
