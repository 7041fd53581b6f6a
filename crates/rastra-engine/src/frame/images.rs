use crate::backend::{ComputeBackend, ImageDesc, ImageFormat};
use crate::error::RasterError;

/// The color and depth images a frame renders into.
///
/// Both images always share the same extent. They are released exactly once;
/// further [`FrameImages::release`] calls are no-ops.
#[derive(Debug)]
pub struct FrameImages<I> {
    color: I,
    depth: I,
    width: u32,
    height: u32,
    released: bool,
}

impl<I> FrameImages<I> {
    /// Allocates a `width × height` color (RGBA8) and depth (R32F) image.
    pub fn create<B>(backend: &mut B, width: u32, height: u32) -> Result<Self, RasterError>
    where
        B: ComputeBackend<Image = I>,
    {
        let color = backend.create_image(&ImageDesc {
            label: "rastra color image",
            format: ImageFormat::Color,
            width,
            height,
        })?;

        let depth = match backend.create_image(&ImageDesc {
            label: "rastra depth image",
            format: ImageFormat::Depth,
            width,
            height,
        }) {
            Ok(depth) => depth,
            Err(e) => {
                backend.release_image(&color);
                return Err(e);
            }
        };

        Ok(Self { color, depth, width, height, released: false })
    }

    /// Frees both images. Returns `false` if they were already released.
    pub fn release<B>(&mut self, backend: &mut B) -> bool
    where
        B: ComputeBackend<Image = I>,
    {
        if self.released {
            return false;
        }
        backend.release_image(&self.color);
        backend.release_image(&self.depth);
        self.released = true;
        true
    }

    #[inline]
    pub fn color(&self) -> &I {
        &self.color
    }

    #[inline]
    pub fn depth(&self) -> &I {
        &self.depth
    }

    #[inline]
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend};

    #[test]
    fn create_allocates_matching_pair() {
        let mut backend = RecordingBackend::new();
        let images = FrameImages::create(&mut backend, 64, 32).unwrap();
        assert_eq!(images.extent(), (64, 32));
        assert_eq!(images.color().format, ImageFormat::Color);
        assert_eq!(images.depth().format, ImageFormat::Depth);
        assert_eq!((images.depth().width, images.depth().height), (64, 32));
    }

    #[test]
    fn create_rejects_empty_extent() {
        let mut backend = RecordingBackend::new();
        let err = FrameImages::create(&mut backend, 0, 32).unwrap_err();
        assert!(matches!(err, RasterError::ResourceAllocation { .. }));
    }

    #[test]
    fn release_is_guarded() {
        let mut backend = RecordingBackend::new();
        let mut images = FrameImages::create(&mut backend, 8, 8).unwrap();
        assert!(images.release(&mut backend));
        assert!(!images.release(&mut backend));
        assert!(images.is_released());
        assert_eq!(backend.released_images(), vec![images.color().id, images.depth().id]);
    }

    #[test]
    fn oversized_extent_allocates_nothing() {
        let mut backend = RecordingBackend::new();
        backend.max_dimension = 16;
        assert!(FrameImages::create(&mut backend, 32, 8).is_err());
        assert!(!backend.calls.iter().any(|c| matches!(c, Call::CreateImage { .. })));
    }
}
