//! WebGPU implementations of the operation traits.
//!
//! Each impl validates on the host, allocates outputs, packs a params struct
//! and hands the buffers to a launcher in `runtime::wgpu::shaders`. Kernels
//! are enqueued without waiting; reductions read back their partials.

mod binary;
mod conv;
pub(crate) mod helpers;
mod proximal;
mod reduce;
mod scalar;
mod stencil;
mod unary;
