//! Iterative solver trait
//!
//! Defines the contract for the first-order solvers.

use crate::algorithm::operator::{LinearOperator, ProximalOperator};
use crate::error::Result;
use crate::ops::{BinaryOps, ProximalOps, ReduceOps, ScalarOps, UnaryOps};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

use super::impl_generic::{cg_impl, fbs_impl, fista_impl, flb_impl, greedy_fista_impl};
use super::types::{
    CgOptions, CgResult, FbsOptions, FbsResult, FistaOptions, FistaResult, FlbOptions, FlbResult,
    GreedyFistaOptions, GreedyFistaResult,
};

/// First-order iterative solvers over opaque operators
///
/// Every client that implements the element-wise, reduction and shrinkage
/// traits gets these methods through a blanket impl, so all backends run the
/// same algorithm with the same stopping rules.
///
/// Each iteration downloads one or two scalar reductions to the host to
/// evaluate its stopping test; bulk arithmetic stays on the device.
pub trait IterativeSolvers<R: Runtime>:
    BinaryOps<R> + ScalarOps<R> + UnaryOps<R> + ReduceOps<R> + ProximalOps<R> + Sized
{
    /// Conjugate gradient for symmetric positive definite `A`.
    ///
    /// `x0` defaults to zeros.
    fn cg<A>(
        &self,
        a: &A,
        b: &Tensor<R>,
        x0: Option<&Tensor<R>>,
        options: CgOptions,
    ) -> Result<CgResult<R>>
    where
        A: LinearOperator<R> + ?Sized,
    {
        cg_impl(self, a, b, x0, options)
    }

    /// Forward-backward splitting on `½||Ax - b||² + mu·R(x)`.
    fn fbs<A, P>(
        &self,
        ata: &A,
        atb: &Tensor<R>,
        x0: Option<&Tensor<R>>,
        prox: &P,
        options: FbsOptions,
    ) -> Result<FbsResult<R>>
    where
        A: LinearOperator<R> + ?Sized,
        P: ProximalOperator<R> + ?Sized,
    {
        fbs_impl(self, ata, atb, x0, prox, options)
    }

    /// FISTA with optional adaptive restart.
    fn fista<A, P>(
        &self,
        ata: &A,
        atb: &Tensor<R>,
        x0: Option<&Tensor<R>>,
        prox: &P,
        options: FistaOptions,
    ) -> Result<FistaResult<R>>
    where
        A: LinearOperator<R> + ?Sized,
        P: ProximalOperator<R> + ?Sized,
    {
        fista_impl(self, ata, atb, x0, prox, options)
    }

    /// Greedy FISTA with step-size safeguard.
    fn greedy_fista<A, P>(
        &self,
        ata: &A,
        atb: &Tensor<R>,
        x0: Option<&Tensor<R>>,
        prox: &P,
        options: GreedyFistaOptions,
    ) -> Result<GreedyFistaResult<R>>
    where
        A: LinearOperator<R> + ?Sized,
        P: ProximalOperator<R> + ?Sized,
    {
        greedy_fista_impl(self, ata, atb, x0, prox, options)
    }

    /// Fast linearized Bregman for `min ||x||₁ s.t. Ax = b`.
    fn flb<A, AT>(&self, a: &A, at: &AT, b: &Tensor<R>, options: FlbOptions) -> Result<FlbResult<R>>
    where
        A: LinearOperator<R> + ?Sized,
        AT: LinearOperator<R> + ?Sized,
    {
        flb_impl(self, a, at, b, options)
    }
}

impl<R, C> IterativeSolvers<R> for C
where
    R: Runtime,
    C: BinaryOps<R> + ScalarOps<R> + UnaryOps<R> + ReduceOps<R> + ProximalOps<R>,
{
}
