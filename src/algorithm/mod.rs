//! Solvers for linear inverse problems
//!
//! Everything here is written once against the operation traits in
//! [`crate::ops`] and runs unchanged on every backend:
//!
//! ```text
//! imaging      deconvolution and inpainting drivers
//!    │
//!    ├── iterative    CG, FBS, FISTA, greedy FISTA, FLB
//!    ├── proximal     TV denoising
//!    └── operator     LinearOperator / ProximalOperator seams
//!           │
//!          ops        element-wise, reductions, convolution, stencils
//! ```
//!
//! Solvers only download scalar reductions to the host to evaluate their
//! stopping tests; bulk arithmetic never leaves the device.

pub mod imaging;
pub mod iterative;
pub mod operator;
pub mod proximal;

pub use iterative::{ConvergenceReason, IterativeSolvers};
pub use operator::{
    ConvolutionOperator, HarmonicInpaintOperator, IdentityProx, LinearOperator,
    NormalConvolutionOperator, ProximalOperator, SoftThreshold, SvNormalConvolutionOperator,
    TvProx,
};
