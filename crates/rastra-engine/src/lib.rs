//! Rastra engine crate.
//!
//! CPU-side orchestration of a compute-shader rasterizer: frame image
//! lifecycle, transform matrices and the clear / vertex transform / rasterize
//! dispatch sequence. The GPU work itself lives in the WGSL kernel program.

pub mod backend;
pub mod color;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod kernel;
pub mod logging;
pub mod object;
pub mod rasterizer;
pub mod transform;

pub use error::RasterError;
pub use rasterizer::{Rasterizer, RasterizerInit, RasterizerSettings};
