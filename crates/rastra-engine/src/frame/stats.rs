/// Counters accumulated since the last clear.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub vertices: u32,
    pub triangles: u32,
    /// Reserved for a visibility count reported by the rasterize kernel; the
    /// host cannot observe visibility, so this only ever resets.
    pub triangles_visible: u32,
}

impl FrameStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds one draw call's counts. Saturates instead of wrapping.
    #[inline]
    pub fn record_draw(&mut self, vertices: u32, triangles: u32) {
        self.vertices = self.vertices.saturating_add(vertices);
        self.triangles = self.triangles.saturating_add(triangles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates_and_reset_zeroes() {
        let mut s = FrameStats::default();
        s.record_draw(3, 1);
        s.record_draw(5, 2);
        assert_eq!((s.vertices, s.triangles), (8, 3));
        s.triangles_visible = 2;
        s.reset();
        assert_eq!(s, FrameStats::default());
    }

    #[test]
    fn record_saturates() {
        let mut s = FrameStats { vertices: u32::MAX - 1, ..FrameStats::default() };
        s.record_draw(10, 0);
        assert_eq!(s.vertices, u32::MAX);
    }
}
