use std::fmt;

use crate::frame::FrameState;

/// Errors raised by the rasterizer and its compute backend.
///
/// `ResourceAllocation` and `KernelResolution` are only produced while a
/// [`Rasterizer`](crate::Rasterizer) is being built and are not recoverable.
/// `FrameOrder` reports a frame operation issued in a state where it is not
/// valid; nothing is dispatched in that case.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterError {
    /// An image or buffer allocation was rejected (invalid extent or device limit).
    ResourceAllocation { label: String, reason: String },
    /// A kernel entry point could not be resolved in the loaded program.
    KernelResolution { entry_point: String, reason: String },
    /// A frame operation was called from a state that does not allow it.
    FrameOrder { operation: &'static str, state: FrameState },
}

impl RasterError {
    pub(crate) fn allocation(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceAllocation { label: label.into(), reason: reason.into() }
    }

    pub(crate) fn kernel(entry_point: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KernelResolution { entry_point: entry_point.into(), reason: reason.into() }
    }

    /// Returns `true` for the construction-time failures that abort pipeline creation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::FrameOrder { .. })
    }
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceAllocation { label, reason } => {
                write!(f, "failed to allocate `{label}`: {reason}")
            }
            Self::KernelResolution { entry_point, reason } => {
                write!(f, "failed to resolve kernel `{entry_point}`: {reason}")
            }
            Self::FrameOrder { operation, state } => {
                write!(f, "`{operation}` is not valid in frame state {state:?}")
            }
        }
    }
}

impl std::error::Error for RasterError {}
