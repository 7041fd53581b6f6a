//! Per-frame resources and bookkeeping owned by the rasterizer.

mod images;
mod state;
mod stats;

pub use images::FrameImages;
pub use state::{FrameOp, FrameState};
pub use stats::FrameStats;
