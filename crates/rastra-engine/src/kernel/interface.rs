//! Resource interface shared by the kernel program and the backend layouts.
//!
//! group(0) holds the frame globals, group(1) the per-kernel resources and
//! group(2) the object uniforms. A kernel may only use the slots listed for it
//! in [`expected_resource`].

use super::KernelKind;

pub const GLOBALS_GROUP: u32 = 0;
pub const RESOURCES_GROUP: u32 = 1;
pub const OBJECT_GROUP: u32 = 2;

// group(1) binding slots, shared by all kernels.
pub const COLOR_IMAGE: u32 = 0;
pub const DEPTH_IMAGE: u32 = 1;
pub const POSITIONS: u32 = 2;
pub const NORMALS: u32 = 3;
pub const UVS: u32 = 4;
pub const VARYINGS: u32 = 5;
pub const INDICES: u32 = 6;
pub const DIFFUSE_IMAGE: u32 = 7;

/// What kind of resource a binding slot holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceClass {
    Uniform,
    ReadOnlyStorage,
    ReadWriteStorage,
    /// RGBA8 unorm, write-only.
    ColorImage,
    /// R32 float, read-write.
    DepthImage,
    /// Float texture read with `textureLoad`.
    SampledImage,
}

/// The resource `kind` finds at `@group(group) @binding(binding)`, if any.
pub fn expected_resource(kind: KernelKind, group: u32, binding: u32) -> Option<ResourceClass> {
    use KernelKind::*;
    use ResourceClass::*;

    match (group, binding, kind) {
        (GLOBALS_GROUP, 0, _) => Some(Uniform),
        (OBJECT_GROUP, 0, VertexTransform | Rasterize) => Some(Uniform),
        (RESOURCES_GROUP, COLOR_IMAGE, Clear | Rasterize) => Some(ColorImage),
        (RESOURCES_GROUP, DEPTH_IMAGE, Clear | Rasterize) => Some(DepthImage),
        (RESOURCES_GROUP, POSITIONS | NORMALS | UVS, VertexTransform) => Some(ReadOnlyStorage),
        (RESOURCES_GROUP, VARYINGS, VertexTransform | Rasterize) => Some(ReadWriteStorage),
        (RESOURCES_GROUP, INDICES, Rasterize) => Some(ReadOnlyStorage),
        (RESOURCES_GROUP, DIFFUSE_IMAGE, Rasterize) => Some(SampledImage),
        _ => None,
    }
}

/// Classifies a global as declared in WGSL. `None` for resources the backend
/// never provides (samplers, depth, arrayed or multisampled textures, other
/// formats or dimensions).
pub(super) fn classify(module: &naga::Module, var: &naga::GlobalVariable) -> Option<ResourceClass> {
    use naga::{AddressSpace, ImageClass, ImageDimension, ScalarKind, StorageAccess, StorageFormat, TypeInner};

    match var.space {
        AddressSpace::Uniform => Some(ResourceClass::Uniform),
        AddressSpace::Storage { access } if access.contains(StorageAccess::STORE) => {
            Some(ResourceClass::ReadWriteStorage)
        }
        AddressSpace::Storage { .. } => Some(ResourceClass::ReadOnlyStorage),
        AddressSpace::Handle => match module.types[var.ty].inner {
            TypeInner::Image {
                dim: ImageDimension::D2,
                arrayed: false,
                class: ImageClass::Storage { format, access },
            } => {
                let read_write = StorageAccess::LOAD | StorageAccess::STORE;
                match format {
                    StorageFormat::Rgba8Unorm if access == StorageAccess::STORE => Some(ResourceClass::ColorImage),
                    StorageFormat::R32Float if access == read_write => Some(ResourceClass::DepthImage),
                    _ => None,
                }
            }
            TypeInner::Image {
                dim: ImageDimension::D2,
                arrayed: false,
                class: ImageClass::Sampled { kind: ScalarKind::Float, multi: false },
            } => Some(ResourceClass::SampledImage),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sees_only_globals_and_frame_images() {
        assert_eq!(expected_resource(KernelKind::Clear, 0, 0), Some(ResourceClass::Uniform));
        assert_eq!(expected_resource(KernelKind::Clear, 1, COLOR_IMAGE), Some(ResourceClass::ColorImage));
        assert_eq!(expected_resource(KernelKind::Clear, 1, POSITIONS), None);
        assert_eq!(expected_resource(KernelKind::Clear, OBJECT_GROUP, 0), None);
    }

    #[test]
    fn varyings_are_read_write_for_both_draw_kernels() {
        for kind in [KernelKind::VertexTransform, KernelKind::Rasterize] {
            assert_eq!(expected_resource(kind, 1, VARYINGS), Some(ResourceClass::ReadWriteStorage));
        }
    }

    #[test]
    fn classify_reads_wgsl_declarations() {
        let module = naga::front::wgsl::parse_str(
            r#"
            @group(0) @binding(0) var<uniform> u: vec4<f32>;
            @group(1) @binding(0) var color: texture_storage_2d<rgba8unorm, write>;
            @group(1) @binding(1) var depth: texture_storage_2d<r32float, read_write>;
            @group(1) @binding(2) var<storage, read> ro: array<f32>;
            @group(1) @binding(5) var<storage, read_write> rw: array<f32>;
            @group(1) @binding(7) var diffuse: texture_2d<f32>;
            @group(1) @binding(8) var color_rw: texture_storage_2d<rgba8unorm, read_write>;
            @group(1) @binding(9) var color_3d: texture_storage_3d<rgba8unorm, write>;
            @group(1) @binding(10) var layers: texture_2d_array<f32>;
            "#,
        )
        .unwrap();

        let classes: Vec<_> = module
            .global_variables
            .iter()
            .map(|(_, var)| (var.name.clone().unwrap(), classify(&module, var)))
            .collect();

        assert_eq!(
            classes,
            vec![
                ("u".to_owned(), Some(ResourceClass::Uniform)),
                ("color".to_owned(), Some(ResourceClass::ColorImage)),
                ("depth".to_owned(), Some(ResourceClass::DepthImage)),
                ("ro".to_owned(), Some(ResourceClass::ReadOnlyStorage)),
                ("rw".to_owned(), Some(ResourceClass::ReadWriteStorage)),
                ("diffuse".to_owned(), Some(ResourceClass::SampledImage)),
                ("color_rw".to_owned(), None),
                ("color_3d".to_owned(), None),
                ("layers".to_owned(), None),
            ]
        );
    }
}
