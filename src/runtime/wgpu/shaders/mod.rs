//! WGSL compute shaders and their launchers
//!
//! Each submodule generates the WGSL source for one kernel family and
//! exposes `launch_*` functions that bind buffers and dispatch. Shader
//! sources are generated in Rust so that entry points stay in sync with the
//! operation enums in [`crate::ops`], and so convolution kernels can be
//! specialized on kernel size and padding.
//!
//! Binding convention: storage buffers first (declared `read_write`), then a
//! single uniform params struct padded to 16 bytes.

pub mod conv;
pub mod elementwise;
pub mod pipeline;
pub mod proximal;
pub mod reduce;
pub mod stencil;

pub use pipeline::{Dispatch, LayoutKey, PipelineCache, WORKGROUP_SIZE, grid_1d, launch, workgroup_count};
