//! Uploading host meshes and textures into kernel-ready GPU resources.

use wgpu::util::DeviceExt;

use crate::color::Color;
use crate::error::RasterError;
use crate::object::{MeshData, RenderObjectData};

use super::{WgpuBackend, WgpuImage};

/// Storage bindings may not be empty; empty arrays get this many zero bytes.
const MIN_STORAGE_BYTES: usize = 16;

impl WgpuBackend {
    /// Uploads `mesh` into storage buffers and pairs it with `diffuse`.
    pub fn upload_mesh(
        &self,
        label: &str,
        mesh: &MeshData,
        diffuse: WgpuImage,
    ) -> RenderObjectData<WgpuImage, wgpu::Buffer> {
        debug_assert!(mesh.is_consistent(), "{label}: mesh attribute/index mismatch");

        RenderObjectData {
            positions: self.storage_init(&format!("{label} positions"), bytemuck::cast_slice(&mesh.positions)),
            normals: self.storage_init(&format!("{label} normals"), bytemuck::cast_slice(&mesh.normals)),
            uvs: self.storage_init(&format!("{label} uvs"), bytemuck::cast_slice(&mesh.uvs)),
            indices: self.storage_init(&format!("{label} indices"), bytemuck::cast_slice(&mesh.indices)),
            diffuse,
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
        }
    }

    /// Uploads tightly packed RGBA8 texels as a diffuse image.
    pub fn upload_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<WgpuImage, RasterError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RasterError::allocation(label, format!("extent {width}x{height} is out of range")));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RasterError::allocation(
                label,
                format!("expected {expected} bytes of RGBA8, got {}", rgba.len()),
            ));
        }

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        Ok(WgpuImage::new(texture))
    }

    /// A 1×1 diffuse image of a single color.
    pub fn solid_texture(&self, label: &str, color: Color) -> Result<WgpuImage, RasterError> {
        let texel = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        self.upload_texture(label, 1, 1, &texel)
    }

    fn storage_init(&self, label: &str, bytes: &[u8]) -> wgpu::Buffer {
        let zeros = [0u8; MIN_STORAGE_BYTES];
        let contents = if bytes.is_empty() { &zeros[..] } else { bytes };

        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::STORAGE,
        })
    }
}
