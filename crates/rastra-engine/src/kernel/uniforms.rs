use bytemuck::{Pod, Zeroable};

use crate::transform::ObjectTransforms;

/// Size in bytes of one vertex's entry in the varyings scratch buffer.
///
/// Matches `struct Varyings` in the kernel program: clip position, world
/// position, world normal and uv, each padded to a `vec4<f32>`.
pub const VARYINGS_STRIDE: u64 = 64;

/// Frame-wide scalar bindings (`var<uniform> globals` in the kernel program).
///
/// The rasterizer keeps this CPU-side mirror and re-uploads it whenever a
/// field changes, so the values the kernels see always match what the host
/// last set.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct KernelGlobals {
    pub clear_color: [f32; 4],
    /// Camera position, kernel space, `w` unused.
    pub camera_ws: [f32; 4],
    /// Light travel direction, kernel space, `w` unused.
    pub light_dir_ws: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
    /// `(width, height, 0, 0)` in pixels.
    pub screen_size: [u32; 4],
}

/// Per-draw bindings (`var<uniform> object` in the kernel program).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub model_inverse_transpose: [[f32; 4]; 4],
    /// `(vertex_count, triangle_count, 0, 0)`; kernels bound their loops with it.
    pub counts: [u32; 4],
}

impl ObjectUniforms {
    pub fn new(transforms: &ObjectTransforms, vertex_count: u32, triangle_count: u32) -> Self {
        Self {
            mvp: transforms.mvp.to_cols_array_2d(),
            model: transforms.model.to_cols_array_2d(),
            model_inverse_transpose: transforms.model_inverse_transpose.to_cols_array_2d(),
            counts: [vertex_count, triangle_count, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn uniform_blocks_have_wgsl_sizes() {
        // Six vec4 slots / three mat4x4 plus one vec4.
        assert_eq!(std::mem::size_of::<KernelGlobals>(), 96);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 208);
    }

    #[test]
    fn object_uniforms_are_column_major() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let t = ObjectTransforms::new(Mat4::IDENTITY, Mat4::IDENTITY, model);
        let u = ObjectUniforms::new(&t, 3, 1);
        assert_eq!(u.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.counts, [3, 1, 0, 0]);
    }
}
