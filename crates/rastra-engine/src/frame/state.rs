use crate::error::RasterError;

/// Where the rasterizer is in its frame cycle.
///
/// ```text
/// Ready ─clear→ Cleared ─set_attributes→ AttributesSet ─draw_call→ Drawing ⟲
///   ▲                                                                  │
///   └──────────────── FrameUpdated ←──────── update_frame ─────────────┘
///                     (clear starts the next frame)
/// any state ─release→ Released (terminal)
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameState {
    /// Constructed; no frame started yet.
    Ready,
    Cleared,
    AttributesSet,
    Drawing,
    FrameUpdated,
    Released,
}

/// Frame operations subject to ordering checks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOp {
    Clear,
    SetAttributes,
    DrawCall,
    UpdateFrame,
}

impl FrameOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::SetAttributes => "set_attributes",
            Self::DrawCall => "draw_call",
            Self::UpdateFrame => "update_frame",
        }
    }
}

impl FrameState {
    /// Returns the state reached by applying `op`, or a `FrameOrder` error if
    /// `op` is not valid here.
    pub fn advance(self, op: FrameOp) -> Result<FrameState, RasterError> {
        use FrameState::*;

        let next = match (op, self) {
            (FrameOp::Clear, Ready | FrameUpdated) => Some(Cleared),
            (FrameOp::SetAttributes, Cleared) => Some(AttributesSet),
            (FrameOp::DrawCall, AttributesSet | Drawing) => Some(Drawing),
            (FrameOp::UpdateFrame, Cleared | AttributesSet | Drawing) => Some(FrameUpdated),
            _ => None,
        };

        next.ok_or(RasterError::FrameOrder { operation: op.name(), state: self })
    }

    #[inline]
    pub fn is_released(self) -> bool {
        self == FrameState::Released
    }
}
