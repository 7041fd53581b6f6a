//! Compute backend seam.
//!
//! The rasterizer only talks to the GPU through [`ComputeBackend`]: it
//! allocates images and scratch buffers, loads the kernel program once,
//! uploads uniforms, and issues dispatches in program order. [`WgpuBackend`]
//! is the production implementation.

pub mod gpu;

#[cfg(test)]
pub(crate) mod recording;

pub use gpu::{WgpuBackend, WgpuImage};

use crate::dispatch::GroupCount;
use crate::error::RasterError;
use crate::kernel::{KernelBinding, KernelGlobals, KernelProgram, ObjectUniforms};

/// Texel format of a frame image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ImageFormat {
    /// 4 × 8-bit unorm color.
    Color,
    /// 32-bit float depth, single channel.
    Depth,
}

impl ImageFormat {
    #[inline]
    pub const fn bytes_per_texel(self) -> u32 {
        match self {
            Self::Color | Self::Depth => 4,
        }
    }
}

/// Request for a random-write 2D image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageDesc<'a> {
    pub label: &'a str,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageDesc<'_> {
    /// Rejects empty extents and extents above `max_dimension`.
    pub fn validate(&self, max_dimension: u32) -> Result<(), RasterError> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::allocation(
                self.label,
                format!("extent {}x{} is empty", self.width, self.height),
            ));
        }
        if self.width > max_dimension || self.height > max_dimension {
            return Err(RasterError::allocation(
                self.label,
                format!(
                    "extent {}x{} exceeds the device limit of {max_dimension}",
                    self.width, self.height
                ),
            ));
        }
        Ok(())
    }
}

/// GPU operations the rasterizer depends on.
///
/// Implementations must execute dispatches, and the uniform writes preceding
/// them, in the order they are issued. No other synchronization is performed:
/// the varyings scratch buffer written by one dispatch is read by the next.
pub trait ComputeBackend {
    /// Opaque handle to a 2D image.
    type Image;
    /// Opaque handle to a storage buffer.
    type Buffer;

    /// Allocates a random-write image.
    fn create_image(&mut self, desc: &ImageDesc<'_>) -> Result<Self::Image, RasterError>;

    /// Frees an image's GPU memory. The handle must not be dispatched afterwards.
    fn release_image(&mut self, image: &Self::Image);

    /// Allocates a read/write storage buffer of `size` bytes.
    fn create_storage_buffer(&mut self, label: &str, size: u64) -> Result<Self::Buffer, RasterError>;

    /// Builds whatever per-kernel state the backend needs from a resolved program.
    fn load_program(&mut self, program: &KernelProgram) -> Result<(), RasterError>;

    /// Uploads frame-wide scalars; visible to every later dispatch.
    fn write_globals(&mut self, globals: &KernelGlobals);

    /// Uploads per-draw uniforms; visible to every later dispatch.
    fn write_object(&mut self, object: &ObjectUniforms);

    /// Binds `binding` and dispatches its kernel with `groups` workgroups.
    fn dispatch(&mut self, binding: &KernelBinding<'_, Self::Image, Self::Buffer>, groups: GroupCount);
}
