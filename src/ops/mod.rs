//! Tensor operations
//!
//! This module defines operation traits and their backend implementations.
//!
//! # Design
//!
//! Operations are defined as traits that are implemented by each runtime's
//! client. This gives operations access to the device and its queue for
//! creating output tensors and launching kernels.
//!
//! ```text
//! RuntimeClient<R>
//!   ├── BinaryOps<R>    add, sub, mul, ... and their in-place forms
//!   ├── ScalarOps<R>    tensor-scalar arithmetic, axpy
//!   ├── UnaryOps<R>     neg, abs, sqrt, sign, is_zero
//!   ├── ReduceOps<R>    sum, sum_sq, abs_sum, min, max, dot (host f64)
//!   ├── ConvOps<R>      2D convolution, kernel transposes
//!   ├── StencilOps<R>   gradient, divergence, magnitude
//!   └── ProximalOps<R>  soft threshold, isotropic shrinkage
//! ```
//!
//! Solvers in [`crate::algorithm`] are written once against these traits and
//! run unchanged on every backend.

pub mod arithmetic;
pub mod conv_common;
mod traits;

mod cpu;
#[cfg(feature = "wgpu")]
mod wgpu;

pub use arithmetic::{BinaryOp, ReduceOp, ScalarOp, UnaryOp};
pub use conv_common::{CONV_TILE, Conv2dParams, ConvStrategy, Padding};
pub use traits::{
    BinaryOps, ConvOps, ProximalOps, ReduceOps, ScalarOps, StencilOps, Threshold, UnaryOps,
};

pub(crate) use traits::{kick_step, shrink2d_scalar, soft_shrink_scalar};

#[cfg(feature = "wgpu")]
pub(crate) use traits::KICK_SENTINEL;
