//! Kernel program binding.
//!
//! The kernel program is a WGSL module exposing three compute entry points
//! (clear, vertex transform, rasterize). Entry points are resolved once into an
//! immutable [`KernelTable`]; each dispatch then carries its full set of
//! resources in a [`KernelBinding`]. Which bindings each kernel may use is
//! fixed by [`interface`].

pub mod interface;

mod binding;
mod program;
mod uniforms;

pub use binding::{KernelBinding, KernelKind};
pub use program::{BUILTIN_SOURCE, KernelEntry, KernelNames, KernelProgram, KernelTable};
pub use uniforms::{KernelGlobals, ObjectUniforms, VARYINGS_STRIDE};
