//! Operation traits implemented by every runtime client.

mod binary;
mod conv;
mod proximal;
mod reduce;
mod scalar;
mod stencil;
mod unary;

pub use binary::BinaryOps;
pub use conv::ConvOps;
pub use proximal::{ProximalOps, Threshold};
pub use reduce::ReduceOps;
pub use scalar::ScalarOps;
pub use stencil::StencilOps;
pub use unary::UnaryOps;

pub(crate) use proximal::{kick_step, shrink2d_scalar, soft_shrink_scalar};
#[cfg(feature = "wgpu")]
pub(crate) use proximal::KICK_SENTINEL;
