//! CPU implementations of the operation traits.

mod binary;
mod conv;
mod proximal;
mod reduce;
mod scalar;
mod stencil;
mod unary;
