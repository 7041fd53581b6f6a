//! Bind group layouts mirroring the kernel program's resource declarations.

use crate::kernel::interface::{
    COLOR_IMAGE, DEPTH_IMAGE, DIFFUSE_IMAGE, INDICES, NORMALS, POSITIONS, UVS, VARYINGS,
};
use crate::kernel::{KernelGlobals, KernelKind, ObjectUniforms};

pub(super) struct Layouts {
    pub globals: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub clear: wgpu::BindGroupLayout,
    pub vertex_transform: wgpu::BindGroupLayout,
    pub rasterize: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rastra globals bgl"),
            entries: &[uniform(0, std::mem::size_of::<KernelGlobals>() as u64)],
        });

        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rastra object bgl"),
            entries: &[uniform(0, std::mem::size_of::<ObjectUniforms>() as u64)],
        });

        let clear = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rastra clear bgl"),
            entries: &[color_image(), depth_image()],
        });

        let vertex_transform = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rastra vertex transform bgl"),
            entries: &[
                storage_buffer(POSITIONS, true),
                storage_buffer(NORMALS, true),
                storage_buffer(UVS, true),
                storage_buffer(VARYINGS, false),
            ],
        });

        let rasterize = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rastra rasterize bgl"),
            entries: &[
                color_image(),
                depth_image(),
                storage_buffer(VARYINGS, false),
                storage_buffer(INDICES, true),
                wgpu::BindGroupLayoutEntry {
                    binding: DIFFUSE_IMAGE,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        // Texels are fetched with textureLoad; no sampler is bound.
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        Self { globals, object, clear, vertex_transform, rasterize }
    }

    /// Layouts for group(0..) of `kind`'s pipeline.
    ///
    /// The clear kernel does not read object uniforms, so its pipeline stops at group(1).
    pub fn pipeline_groups(&self, kind: KernelKind) -> Vec<&wgpu::BindGroupLayout> {
        match kind {
            KernelKind::Clear => vec![&self.globals, &self.clear],
            KernelKind::VertexTransform => vec![&self.globals, &self.vertex_transform, &self.object],
            KernelKind::Rasterize => vec![&self.globals, &self.rasterize, &self.object],
        }
    }
}

fn uniform(binding: u32, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn storage_buffer(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn color_image() -> wgpu::BindGroupLayoutEntry {
    storage_texture(COLOR_IMAGE, wgpu::StorageTextureAccess::WriteOnly, super::COLOR_FORMAT)
}

fn depth_image() -> wgpu::BindGroupLayoutEntry {
    storage_texture(DEPTH_IMAGE, wgpu::StorageTextureAccess::ReadWrite, super::DEPTH_FORMAT)
}

fn storage_texture(
    binding: u32,
    access: wgpu::StorageTextureAccess,
    format: wgpu::TextureFormat,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access,
            format,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}
