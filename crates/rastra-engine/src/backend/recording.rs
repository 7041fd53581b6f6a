//! Test double that records every backend call instead of touching a GPU.

use crate::dispatch::GroupCount;
use crate::error::RasterError;
use crate::kernel::{KernelBinding, KernelGlobals, KernelKind, KernelProgram, ObjectUniforms};

use super::{ComputeBackend, ImageDesc, ImageFormat};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeImage {
    pub id: u32,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeBuffer {
    pub id: u32,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateImage { id: u32, format: ImageFormat, width: u32, height: u32 },
    ReleaseImage { id: u32 },
    CreateBuffer { id: u32, size: u64 },
    LoadProgram { label: String },
    WriteGlobals(KernelGlobals),
    WriteObject(ObjectUniforms),
    Dispatch { kind: KernelKind, groups: GroupCount, images: Vec<u32>, buffers: Vec<u32> },
}

#[derive(Debug)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    pub max_dimension: u32,
    pub fail_program: bool,
    /// Largest storage buffer, in bytes, this backend hands out.
    pub max_buffer_size: u64,
    next_id: u32,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            max_dimension: 8192,
            fail_program: false,
            max_buffer_size: u64::MAX,
            next_id: 0,
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Dispatches in issue order.
    pub fn dispatches(&self) -> Vec<(KernelKind, GroupCount)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Dispatch { kind, groups, .. } => Some((*kind, *groups)),
                _ => None,
            })
            .collect()
    }

    pub fn released_images(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::ReleaseImage { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn last_globals(&self) -> Option<KernelGlobals> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::WriteGlobals(g) => Some(*g),
            _ => None,
        })
    }

    pub fn objects(&self) -> Vec<ObjectUniforms> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::WriteObject(o) => Some(*o),
                _ => None,
            })
            .collect()
    }
}

impl ComputeBackend for RecordingBackend {
    type Image = FakeImage;
    type Buffer = FakeBuffer;

    fn create_image(&mut self, desc: &ImageDesc<'_>) -> Result<FakeImage, RasterError> {
        desc.validate(self.max_dimension)?;
        let id = self.next_id();
        self.calls.push(Call::CreateImage {
            id,
            format: desc.format,
            width: desc.width,
            height: desc.height,
        });
        Ok(FakeImage { id, format: desc.format, width: desc.width, height: desc.height })
    }

    fn release_image(&mut self, image: &FakeImage) {
        self.calls.push(Call::ReleaseImage { id: image.id });
    }

    fn create_storage_buffer(&mut self, label: &str, size: u64) -> Result<FakeBuffer, RasterError> {
        if size == 0 {
            return Err(RasterError::allocation(label, "zero-sized buffer"));
        }
        if size > self.max_buffer_size {
            return Err(RasterError::allocation(
                label,
                format!("{size} bytes exceeds the {} byte limit", self.max_buffer_size),
            ));
        }
        let id = self.next_id();
        self.calls.push(Call::CreateBuffer { id, size });
        Ok(FakeBuffer { id, size })
    }

    fn load_program(&mut self, program: &KernelProgram) -> Result<(), RasterError> {
        if self.fail_program {
            return Err(RasterError::kernel(program.label(), "rejected by test backend"));
        }
        self.calls.push(Call::LoadProgram { label: program.label().to_owned() });
        Ok(())
    }

    fn write_globals(&mut self, globals: &KernelGlobals) {
        self.calls.push(Call::WriteGlobals(*globals));
    }

    fn write_object(&mut self, object: &ObjectUniforms) {
        self.calls.push(Call::WriteObject(*object));
    }

    fn dispatch(&mut self, binding: &KernelBinding<'_, FakeImage, FakeBuffer>, groups: GroupCount) {
        let (images, buffers) = match binding {
            KernelBinding::Clear { color, depth } => (vec![color.id, depth.id], vec![]),
            KernelBinding::VertexTransform { positions, normals, uvs, varyings } => {
                (vec![], vec![positions.id, normals.id, uvs.id, varyings.id])
            }
            KernelBinding::Rasterize { indices, varyings, color, depth, diffuse } => {
                (vec![color.id, depth.id, diffuse.id], vec![indices.id, varyings.id])
            }
        };
        self.calls.push(Call::Dispatch { kind: binding.kind(), groups, images, buffers });
    }
}

/// Lets a test keep the log when the rasterizer that borrowed the backend is
/// gone, or was never built.
impl ComputeBackend for &mut RecordingBackend {
    type Image = FakeImage;
    type Buffer = FakeBuffer;

    fn create_image(&mut self, desc: &ImageDesc<'_>) -> Result<FakeImage, RasterError> {
        (**self).create_image(desc)
    }

    fn release_image(&mut self, image: &FakeImage) {
        (**self).release_image(image)
    }

    fn create_storage_buffer(&mut self, label: &str, size: u64) -> Result<FakeBuffer, RasterError> {
        (**self).create_storage_buffer(label, size)
    }

    fn load_program(&mut self, program: &KernelProgram) -> Result<(), RasterError> {
        (**self).load_program(program)
    }

    fn write_globals(&mut self, globals: &KernelGlobals) {
        (**self).write_globals(globals)
    }

    fn write_object(&mut self, object: &ObjectUniforms) {
        (**self).write_object(object)
    }

    fn dispatch(&mut self, binding: &KernelBinding<'_, FakeImage, FakeBuffer>, groups: GroupCount) {
        (**self).dispatch(binding, groups)
    }
}
