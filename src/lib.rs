//! # proxr
//!
//! **Proximal and iterative solvers for imaging inverse problems, on CPU and WebGPU.**
//!
//! proxr deblurs, inpaints and denoises images by composing first-order
//! solvers with device-resident linear operators built from 2D convolution
//! and finite-difference stencils. The same solver code runs on every
//! backend.
//!
//! ## Features
//!
//! - **Operators**: 2D convolution with zero/same/wrap padding, tiled
//!   local-memory path, kernel transposes, spatially-varying convolution,
//!   gradient, divergence
//! - **Proximal maps**: soft threshold, isotropic shrinkage, TV denoising
//! - **Solvers**: CG, FBS, FISTA (with restart), greedy FISTA, fast
//!   linearized Bregman
//! - **Drivers**: TV deconvolution (spatially invariant and varying),
//!   harmonic and TV inpainting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use proxr::prelude::*;
//! use proxr::algorithm::imaging::{DeconvOptions, deconv_fista_tv};
//!
//! let device = CpuRuntime::default_device();
//! let client = CpuRuntime::default_client(&device);
//!
//! let blurry = Tensor::<CpuRuntime>::from_slice(&pixels, &[h, w], &device);
//! let psf = Tensor::<CpuRuntime>::from_slice(&[1.0 / 9.0; 9], &[3, 3], &device);
//!
//! let result = deconv_fista_tv(&client, &blurry, &psf, &DeconvOptions::fista())?;
//! let sharp: Vec<f32> = result.image.to_vec();
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded CPU kernels
//! - `wgpu`: Cross-platform GPU via WebGPU
//! - `serde`: `Serialize`/`Deserialize` for options and enums

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{
        ConvergenceReason, IterativeSolvers, LinearOperator, ProximalOperator,
    };
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        BinaryOps, ConvOps, ConvStrategy, Padding, ProximalOps, ReduceOps, ScalarOps, StencilOps,
        Threshold, UnaryOps,
    };
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::Tensor;

    pub use crate::runtime::cpu::CpuRuntime;

    #[cfg(feature = "wgpu")]
    pub use crate::runtime::wgpu::WgpuRuntime;
}

/// Default runtime based on enabled features
///
/// Priority: WGPU > CPU
#[cfg(feature = "wgpu")]
pub type DefaultRuntime = runtime::wgpu::WgpuRuntime;

/// Default runtime based on enabled features
///
/// Priority: WGPU > CPU
#[cfg(not(feature = "wgpu"))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
