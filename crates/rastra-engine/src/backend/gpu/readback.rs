//! Copying frame images back to host memory.

use anyhow::{Context, Result};

use super::{WgpuBackend, WgpuImage};

impl WgpuBackend {
    /// Reads `image` into tightly packed rows.
    ///
    /// Blocks until every previously submitted dispatch has finished.
    pub fn read_image(&self, image: &WgpuImage) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());
        let texel_size = image
            .format()
            .block_copy_size(None)
            .with_context(|| format!("{:?} cannot be copied", image.format()))?;

        let row_bytes = width * texel_size;
        let padded_row_bytes = row_bytes.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rastra readback"),
            size: u64::from(padded_row_bytes) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("rastra readback"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: image.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: None,
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        staging
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("failed to wait for readback")?;
        rx.recv()
            .context("readback callback was dropped")?
            .context("failed to map readback buffer")?;

        let mut pixels = Vec::with_capacity(row_bytes as usize * height as usize);
        {
            let mapped = staging.slice(..).get_mapped_range();
            for row in mapped.chunks_exact(padded_row_bytes as usize) {
                pixels.extend_from_slice(&row[..row_bytes as usize]);
            }
        }
        staging.unmap();

        Ok(pixels)
    }

    /// Reads a depth image as one `f32` per texel.
    pub fn read_depth_image(&self, image: &WgpuImage) -> Result<Vec<f32>> {
        anyhow::ensure!(
            image.format() == super::DEPTH_FORMAT,
            "expected a {:?} image, got {:?}",
            super::DEPTH_FORMAT,
            image.format()
        );
        let bytes = self.read_image(image)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}
