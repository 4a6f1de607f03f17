//! Generic implementations of iterative solvers
//!
//! These implementations use primitive operations (BinaryOps, ScalarOps,
//! ReduceOps, ProximalOps) and run on any backend that implements them.

mod cg;
mod fbs;
mod fista;
mod flb;
mod greedy_fista;

pub use cg::cg_impl;
pub use fbs::fbs_impl;
pub use fista::fista_impl;
pub use flb::flb_impl;
pub use greedy_fista::greedy_fista_impl;
