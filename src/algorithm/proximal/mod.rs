//! Proximal library
//!
//! Closed-form shrinkage lives on [`ProximalOps`](crate::ops::ProximalOps)
//! because each backend runs it as a single kernel. This module holds the
//! iterative proximal maps built on top of the primitive ops.

mod tv;

pub use tv::{TvOptions, denoise_tv};
