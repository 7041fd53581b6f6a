//! Dispatch sizing.
//!
//! Every kernel runs with a fixed workgroup size; the number of groups is the
//! workload divided by that size, rounded up, with unused axes fixed at 1.

/// Workgroup size of the clear kernel (2D, over screen pixels).
pub const CLEAR_GROUP_SIZE: [u32; 3] = [8, 8, 1];

/// Workgroup size of the vertex transform kernel (1D, over vertices).
pub const VERTEX_GROUP_SIZE: [u32; 3] = [16, 1, 1];

/// Workgroup size of the rasterize kernel (1D, over triangles).
pub const RASTERIZE_GROUP_SIZE: [u32; 3] = [16, 1, 1];

/// Number of workgroups along each axis of a dispatch.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GroupCount {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GroupCount {
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` if the dispatch would launch no workgroups.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    /// Total number of workgroups.
    #[inline]
    pub const fn total(self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }
}

/// How the rasterize dispatch of a draw call is sized.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RasterizeSizing {
    /// Size from the current object's triangle count.
    #[default]
    PerObject,
    /// Size from the triangles accumulated so far in the frame, including the
    /// current object. Over-dispatches on every draw after the first; kept for
    /// compatibility with hosts that size their kernels this way.
    Cumulative,
}

/// `ceil(workload / group_size)`.
///
/// `group_size` must be non-zero.
#[inline]
pub const fn group_count(workload: u32, group_size: u32) -> u32 {
    workload.div_ceil(group_size)
}

/// Groups for the clear kernel over a `width × height` screen.
pub fn clear_groups(width: u32, height: u32) -> GroupCount {
    GroupCount::new(
        group_count(width, CLEAR_GROUP_SIZE[0]),
        group_count(height, CLEAR_GROUP_SIZE[1]),
        1,
    )
}

/// Groups for the vertex transform kernel over `vertices` vertices.
pub fn vertex_groups(vertices: u32) -> GroupCount {
    GroupCount::new(group_count(vertices, VERTEX_GROUP_SIZE[0]), 1, 1)
}

/// Groups for the rasterize kernel over `triangles` triangles.
pub fn rasterize_groups(triangles: u32) -> GroupCount {
    GroupCount::new(group_count(triangles, RASTERIZE_GROUP_SIZE[0]), 1, 1)
}

impl RasterizeSizing {
    /// Picks the triangle workload for one draw call.
    ///
    /// `frame_triangles` must already include `object_triangles`.
    #[inline]
    pub fn workload(self, object_triangles: u32, frame_triangles: u32) -> u32 {
        match self {
            Self::PerObject => object_triangles,
            Self::Cumulative => frame_triangles,
        }
    }
}
