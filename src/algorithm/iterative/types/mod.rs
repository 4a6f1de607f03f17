//! Types for iterative solvers

mod common;
mod solvers;

pub use common::{ConvergenceReason, Momentum};
pub use solvers::{
    CgOptions, CgResult, FbsOptions, FbsResult, FistaOptions, FistaResult, FlbOptions, FlbResult,
    GreedyFistaOptions, GreedyFistaResult,
};
