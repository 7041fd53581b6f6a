//! Headless GPU device management.
//!
//! The rasterizer never presents; it only needs an adapter, a device and the
//! single queue every dispatch is submitted to.

mod gpu;

pub use gpu::{Gpu, GpuInit};
