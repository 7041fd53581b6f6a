//! wgpu implementation of [`ComputeBackend`].
//!
//! Every dispatch is recorded into its own command encoder and submitted right
//! away. Uniform uploads go through `Queue::write_buffer`, which lands before
//! the next submission, so each dispatch observes exactly the globals and
//! object uniforms written before it was issued.

mod layouts;
mod readback;
mod upload;

use crate::device::Gpu;
use crate::dispatch::GroupCount;
use crate::error::RasterError;
use crate::kernel::interface::{GLOBALS_GROUP, OBJECT_GROUP, RESOURCES_GROUP};
use crate::kernel::{KernelBinding, KernelGlobals, KernelKind, KernelProgram, ObjectUniforms};

use super::{ComputeBackend, ImageDesc, ImageFormat};

use layouts::Layouts;

pub(crate) const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// A GPU image together with the view bound to kernels.
#[derive(Debug, Clone)]
pub struct WgpuImage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl WgpuImage {
    fn new(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }
}

struct KernelPipelines {
    clear: wgpu::ComputePipeline,
    vertex_transform: wgpu::ComputePipeline,
    rasterize: wgpu::ComputePipeline,
}

impl KernelPipelines {
    fn get(&self, kind: KernelKind) -> &wgpu::ComputePipeline {
        match kind {
            KernelKind::Clear => &self.clear,
            KernelKind::VertexTransform => &self.vertex_transform,
            KernelKind::Rasterize => &self.rasterize,
        }
    }
}

/// Compute backend driving a wgpu device and its single queue.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,

    layouts: Layouts,
    pipelines: Option<KernelPipelines>,

    globals_ubo: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_ubo: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,

    dispatch_count: u64,
}

impl WgpuBackend {
    pub fn new(gpu: &Gpu) -> Self {
        Self::from_device(gpu.device().clone(), gpu.queue().clone())
    }

    /// Builds a backend on an existing device, e.g. one shared with a presenter.
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let layouts = Layouts::new(&device);

        let globals_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rastra globals ubo"),
            size: std::mem::size_of::<KernelGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rastra globals bind group"),
            layout: &layouts.globals,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_ubo.as_entire_binding(),
            }],
        });

        let object_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rastra object ubo"),
            size: std::mem::size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rastra object bind group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_ubo.as_entire_binding(),
            }],
        });

        Self {
            device,
            queue,
            layouts,
            pipelines: None,
            globals_ubo,
            globals_bind_group,
            object_ubo,
            object_bind_group,
            dispatch_count: 0,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Number of dispatches submitted so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count
    }

    /// Runs `f` inside validation and out-of-memory error scopes and returns
    /// the first error either one caught.
    fn capture<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        let oom = self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let value = f();

        let validation = pollster::block_on(validation.pop());
        let oom = pollster::block_on(oom.pop());
        (value, validation.or(oom))
    }

    fn resource_bind_group(
        &self,
        binding: &KernelBinding<'_, WgpuImage, wgpu::Buffer>,
    ) -> wgpu::BindGroup {
        use crate::kernel::interface::{
            COLOR_IMAGE, DEPTH_IMAGE, DIFFUSE_IMAGE, INDICES, NORMALS, POSITIONS, UVS, VARYINGS,
        };

        fn image(slot: u32, image: &WgpuImage) -> wgpu::BindGroupEntry<'_> {
            wgpu::BindGroupEntry {
                binding: slot,
                resource: wgpu::BindingResource::TextureView(image.view()),
            }
        }

        fn buffer(slot: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
            wgpu::BindGroupEntry {
                binding: slot,
                resource: buffer.as_entire_binding(),
            }
        }

        let (layout, entries) = match binding {
            KernelBinding::Clear { color, depth } => (
                &self.layouts.clear,
                vec![image(COLOR_IMAGE, color), image(DEPTH_IMAGE, depth)],
            ),
            KernelBinding::VertexTransform { positions, normals, uvs, varyings } => (
                &self.layouts.vertex_transform,
                vec![
                    buffer(POSITIONS, positions),
                    buffer(NORMALS, normals),
                    buffer(UVS, uvs),
                    buffer(VARYINGS, varyings),
                ],
            ),
            KernelBinding::Rasterize { indices, varyings, color, depth, diffuse } => (
                &self.layouts.rasterize,
                vec![
                    image(COLOR_IMAGE, color),
                    image(DEPTH_IMAGE, depth),
                    buffer(VARYINGS, varyings),
                    buffer(INDICES, indices),
                    image(DIFFUSE_IMAGE, diffuse),
                ],
            ),
        };

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rastra kernel resources"),
            layout,
            entries: &entries,
        })
    }
}

impl ComputeBackend for WgpuBackend {
    type Image = WgpuImage;
    type Buffer = wgpu::Buffer;

    fn create_image(&mut self, desc: &ImageDesc<'_>) -> Result<WgpuImage, RasterError> {
        desc.validate(self.device.limits().max_texture_dimension_2d)?;

        let format = match desc.format {
            ImageFormat::Color => COLOR_FORMAT,
            ImageFormat::Depth => DEPTH_FORMAT,
        };

        let (texture, error) = self.capture(|| {
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(desc.label),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::STORAGE_BINDING
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        });
        if let Some(error) = error {
            return Err(RasterError::allocation(desc.label, error.to_string()));
        }

        log::debug!("created {} ({}x{} {format:?})", desc.label, desc.width, desc.height);
        Ok(WgpuImage::new(texture))
    }

    fn release_image(&mut self, image: &WgpuImage) {
        image.texture.destroy();
    }

    fn create_storage_buffer(&mut self, label: &str, size: u64) -> Result<wgpu::Buffer, RasterError> {
        let max = self.device.limits().max_storage_buffer_binding_size as u64;
        if size == 0 || size > max {
            return Err(RasterError::allocation(
                label,
                format!("size {size} is outside 1..={max} bytes"),
            ));
        }

        let (buffer, error) = self.capture(|| {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::STORAGE,
                mapped_at_creation: false,
            })
        });
        match error {
            Some(error) => Err(RasterError::allocation(label, error.to_string())),
            None => Ok(buffer),
        }
    }

    fn load_program(&mut self, program: &KernelProgram) -> Result<(), RasterError> {
        // Pipeline creation is where wgpu checks the program against the layouts.
        let (pipelines, error) = self.capture(|| {
            let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(program.label()),
                source: wgpu::ShaderSource::Wgsl(program.source().into()),
            });

            let build = |kind: KernelKind| {
                let groups = self.layouts.pipeline_groups(kind);
                let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(kind.label()),
                    bind_group_layouts: &groups,
                    immediate_size: 0,
                });

                self.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some(kind.label()),
                    layout: Some(&layout),
                    module: &module,
                    entry_point: Some(program.entry(kind).name.as_str()),
                    compilation_options: Default::default(),
                    cache: None,
                })
            };

            KernelPipelines {
                clear: build(KernelKind::Clear),
                vertex_transform: build(KernelKind::VertexTransform),
                rasterize: build(KernelKind::Rasterize),
            }
        });

        if let Some(error) = error {
            return Err(RasterError::kernel(program.label(), error.to_string()));
        }
        self.pipelines = Some(pipelines);
        Ok(())
    }

    fn write_globals(&mut self, globals: &KernelGlobals) {
        self.queue.write_buffer(&self.globals_ubo, 0, bytemuck::bytes_of(globals));
    }

    fn write_object(&mut self, object: &ObjectUniforms) {
        self.queue.write_buffer(&self.object_ubo, 0, bytemuck::bytes_of(object));
    }

    fn dispatch(&mut self, binding: &KernelBinding<'_, WgpuImage, wgpu::Buffer>, groups: GroupCount) {
        let kind = binding.kind();
        let Some(pipelines) = self.pipelines.as_ref() else {
            log::warn!("{} dispatch issued before a kernel program was loaded; skipped", kind.label());
            return;
        };
        let resources = self.resource_bind_group(binding);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(kind.label()),
            });

        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(kind.label()),
                timestamp_writes: None,
            });
            cpass.push_debug_group(kind.label());
            cpass.set_pipeline(pipelines.get(kind));
            cpass.set_bind_group(GLOBALS_GROUP, &self.globals_bind_group, &[]);
            cpass.set_bind_group(RESOURCES_GROUP, &resources, &[]);
            if kind != KernelKind::Clear {
                cpass.set_bind_group(OBJECT_GROUP, &self.object_bind_group, &[]);
            }
            cpass.dispatch_workgroups(groups.x, groups.y, groups.z);
            cpass.pop_debug_group();
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.dispatch_count += 1;
        log::trace!("submitted {} dispatch {:?}", kind.label(), groups);
    }
}
