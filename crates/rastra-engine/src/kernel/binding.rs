/// Which of the three kernels a dispatch targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KernelKind {
    Clear,
    VertexTransform,
    Rasterize,
}

impl KernelKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::VertexTransform => "vertex transform",
            Self::Rasterize => "rasterize",
        }
    }
}

/// Resources bound for a single kernel dispatch.
///
/// Bindings are rebuilt for every dispatch; nothing is assumed to persist
/// between dispatches of different kernels. Frame globals and per-object
/// uniforms travel separately through
/// [`ComputeBackend::write_globals`](crate::backend::ComputeBackend::write_globals) and
/// [`ComputeBackend::write_object`](crate::backend::ComputeBackend::write_object).
#[derive(Debug)]
pub enum KernelBinding<'a, I, B> {
    /// Writes the clear color to every pixel and far depth to the depth image.
    Clear { color: &'a I, depth: &'a I },
    /// Transforms one object's vertices into the varyings scratch buffer.
    VertexTransform {
        positions: &'a B,
        normals: &'a B,
        uvs: &'a B,
        varyings: &'a B,
    },
    /// Rasterizes one object's triangles from the varyings into the frame images.
    Rasterize {
        indices: &'a B,
        varyings: &'a B,
        color: &'a I,
        depth: &'a I,
        diffuse: &'a I,
    },
}

impl<I, B> KernelBinding<'_, I, B> {
    pub fn kind(&self) -> KernelKind {
        match self {
            Self::Clear { .. } => KernelKind::Clear,
            Self::VertexTransform { .. } => KernelKind::VertexTransform,
            Self::Rasterize { .. } => KernelKind::Rasterize,
        }
    }
}
