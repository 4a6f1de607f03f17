//! Composite imaging solvers
//!
//! Each driver wires a fixed operator composition and regularizer into one
//! of the generic solvers in [`crate::algorithm::iterative`]:
//!
//! | Driver | Operator | Solver |
//! |--------|----------|--------|
//! | [`deconv_fbs_tv`] | `conv(conv(x, kernel), psf)` | FBS + TV prox |
//! | [`deconv_fista_tv`] | `conv(conv(x, kernel), psf)` | FISTA + TV prox |
//! | [`deconv_sv_fbs_tv`] | spatially-varying blur | FBS + TV prox |
//! | [`inpaint_h1`] | `(1 - mask)·x + mu·masked_laplacian(x)` | CG |
//! | [`inpaint_tv`] | same, with `gamma` | split Bregman over CG |

mod deconv;
mod inpaint;
pub mod stencils;

pub use deconv::{
    DeconvMethod, DeconvOptions, DeconvResult, deconv_fbs_tv, deconv_fista_tv, deconv_sv_fbs_tv,
    deconvolve,
};
pub use inpaint::{H1InpaintOptions, TvInpaintOptions, inpaint_h1, inpaint_tv};
pub use stencils::{DifferenceStencils, MaskedLaplacianOperator};
