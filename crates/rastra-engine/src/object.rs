//! Render objects as consumed by draw calls.

use crate::transform::Placement;

/// CPU-side mesh arrays, laid out the way the vertex kernel reads them.
///
/// `positions`, `normals` and `uvs` are per-vertex and must have the same
/// length; every index must be below the vertex count. The rasterizer does not
/// check this on the hot path; [`MeshData::is_consistent`] is available to
/// hosts that want to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<[u32; 3]>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Returns `true` if attribute lengths agree and all indices are in range.
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n
            && self.uvs.len() == n
            && self.indices.iter().flatten().all(|&i| (i as usize) < n)
    }
}

/// GPU-resident data of one render object.
///
/// `vertex_count` and `triangle_count` drive dispatch sizing and must match the
/// buffer contents.
#[derive(Debug)]
pub struct RenderObjectData<I, B> {
    /// `3 × f32` per vertex.
    pub positions: B,
    /// `3 × f32` per vertex.
    pub normals: B,
    /// `2 × f32` per vertex.
    pub uvs: B,
    /// `3 × u32` per triangle.
    pub indices: B,
    pub diffuse: I,
    pub vertex_count: u32,
    pub triangle_count: u32,
}

/// A placed instance of [`RenderObjectData`] submitted to a draw call.
#[derive(Debug)]
pub struct RenderObject<'a, I, B> {
    pub placement: Placement,
    pub data: &'a RenderObjectData<I, B>,
}

impl<'a, I, B> RenderObject<'a, I, B> {
    #[inline]
    pub fn new(placement: Placement, data: &'a RenderObjectData<I, B>) -> Self {
        Self { placement, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, -1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn counts_follow_arrays() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.is_consistent());
    }

    #[test]
    fn out_of_range_index_is_inconsistent() {
        let mut mesh = triangle();
        mesh.indices.push([0, 2, 3]);
        assert!(!mesh.is_consistent());
    }

    #[test]
    fn missing_normals_are_inconsistent() {
        let mut mesh = triangle();
        mesh.normals.pop();
        assert!(!mesh.is_consistent());
    }
}
