//! Frame orchestrator.
//!
//! A [`Rasterizer`] owns the frame images, the varyings scratch buffer and the
//! CPU mirror of the kernel globals. Per frame the host calls
//! [`clear`](Rasterizer::clear), [`set_attributes`](Rasterizer::set_attributes),
//! any number of [`draw_call`](Rasterizer::draw_call)s and finally
//! [`update_frame`](Rasterizer::update_frame). Every operation turns into
//! uniform writes and dispatches on the backend, in call order.

use std::borrow::Cow;

use glam::Mat4;

use crate::backend::ComputeBackend;
use crate::color::Color;
use crate::dispatch::{self, GroupCount, RasterizeSizing};
use crate::error::RasterError;
use crate::frame::{FrameImages, FrameOp, FrameState, FrameStats};
use crate::kernel::{
    BUILTIN_SOURCE, KernelBinding, KernelGlobals, KernelNames, KernelProgram, ObjectUniforms,
    VARYINGS_STRIDE,
};
use crate::object::RenderObject;
use crate::transform::{Camera, DirectionalLight, ObjectTransforms, to_kernel_space, view_projection};

/// Colors the host may change between frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RasterizerSettings {
    pub clear_color: Color,
    /// Only RGB is used.
    pub ambient_color: Color,
}

impl Default for RasterizerSettings {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            ambient_color: Color::rgb(0.2, 0.2, 0.2),
        }
    }
}

/// Construction-time options.
#[derive(Debug, Clone)]
pub struct RasterizerInit {
    /// WGSL kernel program. `None` uses the bundled program.
    pub source: Option<Cow<'static, str>>,
    pub kernel_names: KernelNames,
    pub rasterize_sizing: RasterizeSizing,
    /// Initial varyings capacity, in vertices.
    pub varyings_capacity: u32,
}

impl Default for RasterizerInit {
    fn default() -> Self {
        Self {
            source: None,
            kernel_names: KernelNames::default(),
            rasterize_sizing: RasterizeSizing::PerObject,
            varyings_capacity: 1 << 16,
        }
    }
}

type FrameListener = Box<dyn FnMut(u32, u32)>;

/// Drives the clear, vertex transform and rasterize kernels for one screen.
pub struct Rasterizer<B: ComputeBackend> {
    backend: B,
    program: KernelProgram,
    images: FrameImages<B::Image>,

    // Shared by every draw call; each VertexTransform overwrites it before the
    // matching Rasterize reads it.
    varyings: B::Buffer,
    varyings_capacity: u32,

    width: u32,
    height: u32,
    aspect: f32,

    settings: RasterizerSettings,
    sizing: RasterizeSizing,
    globals: KernelGlobals,

    view: Mat4,
    projection: Mat4,
    last_object: Option<ObjectTransforms>,

    stats: FrameStats,
    state: FrameState,
    listener: Option<FrameListener>,
}

impl<B: ComputeBackend> Rasterizer<B> {
    /// Resolves the kernel program and allocates the frame images and the
    /// varyings buffer.
    ///
    /// A zero `width` or `height` is accepted: images are allocated at least
    /// 1×1, nothing is ever covered, and `aspect` is 0.
    pub fn new(
        mut backend: B,
        width: u32,
        height: u32,
        settings: RasterizerSettings,
        init: RasterizerInit,
    ) -> Result<Self, RasterError> {
        let RasterizerInit { source, kernel_names, rasterize_sizing, varyings_capacity } = init;

        let program = match source {
            Some(source) => KernelProgram::from_wgsl("rastra custom kernels", source, &kernel_names)?,
            None => KernelProgram::from_wgsl("rastra kernels", BUILTIN_SOURCE, &kernel_names)?,
        };
        backend.load_program(&program)?;

        let images = FrameImages::create(&mut backend, width.max(1), height.max(1))?;

        let varyings_capacity = varyings_capacity.max(1);
        let varyings = match backend.create_storage_buffer("rastra varyings", varyings_bytes(varyings_capacity)) {
            Ok(buffer) => buffer,
            Err(e) => {
                let mut images = images;
                images.release(&mut backend);
                return Err(e);
            }
        };

        let aspect = if height == 0 { 0.0 } else { width as f32 / height as f32 };

        let globals = KernelGlobals {
            clear_color: settings.clear_color.to_array(),
            ambient_color: settings.ambient_color.to_rgb_padded(),
            screen_size: [width, height, 0, 0],
            ..KernelGlobals::default()
        };
        backend.write_globals(&globals);

        log::debug!(
            "rasterizer ready: {width}x{height}, program `{}`, {rasterize_sizing:?} sizing, varyings for {varyings_capacity} vertices",
            program.label(),
        );

        Ok(Self {
            backend,
            program,
            images,
            varyings,
            varyings_capacity,
            width,
            height,
            aspect,
            settings,
            sizing: rasterize_sizing,
            globals,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            last_object: None,
            stats: FrameStats::default(),
            state: FrameState::Ready,
            listener: None,
        })
    }

    /// Starts a frame: clears both images and resets the counters.
    pub fn clear(&mut self) -> Result<(), RasterError> {
        let next = self.state.advance(FrameOp::Clear)?;

        self.globals.clear_color = self.settings.clear_color.to_array();
        self.globals.ambient_color = self.settings.ambient_color.to_rgb_padded();
        self.backend.write_globals(&self.globals);

        issue(
            &mut self.backend,
            &KernelBinding::Clear { color: self.images.color(), depth: self.images.depth() },
            dispatch::clear_groups(self.width, self.height),
        );

        self.stats.reset();
        self.last_object = None;
        self.state = next;
        Ok(())
    }

    /// Computes view/projection for `camera` and pushes camera, light,
    /// ambient and screen size into the kernel globals.
    pub fn set_attributes(&mut self, camera: &Camera, light: &DirectionalLight) -> Result<(), RasterError> {
        let next = self.state.advance(FrameOp::SetAttributes)?;

        let (view, projection) = view_projection(camera, self.aspect);
        self.view = view;
        self.projection = projection;

        self.globals.camera_ws = to_kernel_space(camera.position()).extend(1.0).to_array();
        self.globals.light_dir_ws = to_kernel_space(light.forward).extend(0.0).to_array();
        self.globals.light_color = light.color.to_rgb_padded();
        self.globals.ambient_color = self.settings.ambient_color.to_rgb_padded();
        self.globals.screen_size = [self.width, self.height, 0, 0];
        self.backend.write_globals(&self.globals);

        self.state = next;
        Ok(())
    }

    /// Transforms and rasterizes one object into the frame images.
    pub fn draw_call(&mut self, object: &RenderObject<'_, B::Image, B::Buffer>) -> Result<(), RasterError> {
        let next = self.state.advance(FrameOp::DrawCall)?;
        let data = object.data;

        self.ensure_varyings_capacity(data.vertex_count)?;

        let transforms = ObjectTransforms::new(self.view, self.projection, object.placement.model_matrix());
        self.stats.record_draw(data.vertex_count, data.triangle_count);

        self.backend
            .write_object(&ObjectUniforms::new(&transforms, data.vertex_count, data.triangle_count));

        issue(
            &mut self.backend,
            &KernelBinding::VertexTransform {
                positions: &data.positions,
                normals: &data.normals,
                uvs: &data.uvs,
                varyings: &self.varyings,
            },
            dispatch::vertex_groups(data.vertex_count),
        );

        let workload = self.sizing.workload(data.triangle_count, self.stats.triangles);
        issue(
            &mut self.backend,
            &KernelBinding::Rasterize {
                indices: &data.indices,
                varyings: &self.varyings,
                color: self.images.color(),
                depth: self.images.depth(),
                diffuse: &data.diffuse,
            },
            dispatch::rasterize_groups(workload),
        );

        self.last_object = Some(transforms);
        self.state = next;
        Ok(())
    }

    /// Ends the frame and reports `(vertices, triangles)` to the listener, if any.
    pub fn update_frame(&mut self) -> Result<(), RasterError> {
        let next = self.state.advance(FrameOp::UpdateFrame)?;

        if let Some(listener) = self.listener.as_mut() {
            listener(self.stats.vertices, self.stats.triangles);
        }

        self.state = next;
        Ok(())
    }

    /// Frees the frame images. Valid from any state; repeated calls do nothing.
    pub fn release(&mut self) -> Result<(), RasterError> {
        if !self.images.release(&mut self.backend) {
            log::warn!("rasterizer released twice; ignoring");
            return Ok(());
        }
        self.state = FrameState::Released;
        log::debug!("rasterizer released ({}x{})", self.width, self.height);
        Ok(())
    }

    pub fn set_frame_listener(&mut self, listener: impl FnMut(u32, u32) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_frame_listener(&mut self) {
        self.listener = None;
    }

    fn ensure_varyings_capacity(&mut self, vertices: u32) -> Result<(), RasterError> {
        if vertices <= self.varyings_capacity {
            return Ok(());
        }

        let capacity = vertices.checked_next_power_of_two().unwrap_or(vertices);
        self.varyings = self
            .backend
            .create_storage_buffer("rastra varyings", varyings_bytes(capacity))?;
        self.varyings_capacity = capacity;

        log::debug!("grew varyings buffer to {capacity} vertices");
        Ok(())
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn color_image(&self) -> &B::Image {
        self.images.color()
    }

    #[inline]
    pub fn depth_image(&self) -> &B::Image {
        self.images.depth()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width / height`, or 0 when `height` is 0.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn vertices(&self) -> u32 {
        self.stats.vertices
    }

    #[inline]
    pub fn triangles(&self) -> u32 {
        self.stats.triangles
    }

    #[inline]
    pub fn triangles_visible(&self) -> u32 {
        self.stats.triangles_visible
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn settings(&self) -> &RasterizerSettings {
        &self.settings
    }

    /// Takes effect from the next `clear` (clear color) or `set_attributes` (ambient).
    pub fn set_settings(&mut self, settings: RasterizerSettings) {
        self.settings = settings;
    }

    #[inline]
    pub fn rasterize_sizing(&self) -> RasterizeSizing {
        self.sizing
    }

    #[inline]
    pub fn program(&self) -> &KernelProgram {
        &self.program
    }

    /// Last values written to the kernel globals.
    #[inline]
    pub fn globals(&self) -> &KernelGlobals {
        &self.globals
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Matrices of the most recent draw call this frame.
    #[inline]
    pub fn last_object_transforms(&self) -> Option<&ObjectTransforms> {
        self.last_object.as_ref()
    }

    #[inline]
    pub fn varyings_capacity(&self) -> u32 {
        self.varyings_capacity
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: ComputeBackend> Drop for Rasterizer<B> {
    fn drop(&mut self) {
        if !self.images.is_released() {
            self.images.release(&mut self.backend);
        }
    }
}

fn varyings_bytes(vertices: u32) -> u64 {
    vertices as u64 * VARYINGS_STRIDE
}

/// Dispatches unless the workload is empty.
fn issue<B: ComputeBackend>(
    backend: &mut B,
    binding: &KernelBinding<'_, B::Image, B::Buffer>,
    groups: GroupCount,
) {
    if groups.is_empty() {
        log::trace!("skipping empty {} dispatch", binding.kind().label());
        return;
    }
    backend.dispatch(binding, groups);
}
