//! Integration tests for the iterative solvers.

mod common;

use common::{assert_allclose_f32, create_cpu_client, init_tracing, random_vec};
use proxr::algorithm::iterative::{
    CgOptions, ConvergenceReason, FbsOptions, FistaOptions, FlbOptions, GreedyFistaOptions,
    IterativeSolvers,
};
use proxr::algorithm::{IdentityProx, SoftThreshold};
use proxr::error::{Error, Result};
use proxr::ops::{BinaryOps, ScalarOps};
use proxr::runtime::cpu::{CpuDevice, CpuRuntime};
use proxr::tensor::Tensor;

/// Dense row-major host matrix-vector product
fn matvec(a: &[f32], x: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| a[i * cols + j] as f64 * x[j] as f64)
                .sum::<f64>() as f32
        })
        .collect()
}

/// Random SPD matrix `B Bᵀ / n + I`
fn random_spd(n: usize, seed: u64) -> Vec<f32> {
    let b = random_vec(seed, n * n, -1.0, 1.0);
    let mut a = vec![0.0f32; n * n];
    for i in 0..n {
        for j in 0..n {
            let s: f64 = (0..n).map(|k| b[i * n + k] as f64 * b[j * n + k] as f64).sum();
            a[i * n + j] = (s / n as f64) as f32 + if i == j { 1.0 } else { 0.0 };
        }
    }
    a
}

fn soft(v: f32, mu: f32) -> f32 {
    v.signum() * (v.abs() - mu).max(0.0)
}

// =============================================================================
// CG
// =============================================================================

#[test]
fn test_cg_spd_system() {
    init_tracing();
    let (client, device) = create_cpu_client();
    let n = 50;
    let a = random_spd(n, 31);
    let bs = random_vec(32, n, -1.0, 1.0);
    let b = Tensor::<CpuRuntime>::from_slice(&bs, &[n], &device);

    let op = |x: &Tensor<CpuRuntime>| -> Result<Tensor<CpuRuntime>> {
        Tensor::try_from_slice(&matvec(&a, &x.try_to_vec()?, n, n), &[n], x.device())
    };
    let opts = CgOptions {
        tol: 1e-5,
        max_iter: None,
    };
    let res = client.cg(&op, &b, None, opts).unwrap();

    assert_eq!(res.reason, ConvergenceReason::Tolerance);
    assert!(res.iterations <= n);
    assert!(res.residual_norm < 1e-5);

    let ax = matvec(&a, &res.solution.to_vec(), n, n);
    let num: f64 = ax.iter().zip(&bs).map(|(p, q)| ((p - q) as f64).powi(2)).sum();
    let den: f64 = bs.iter().map(|q| (*q as f64).powi(2)).sum();
    assert!((num / den).sqrt() < 5e-5);
}

#[test]
fn test_cg_iteration_cap() {
    let (client, device) = create_cpu_client();
    let n = 50;
    let a = random_spd(n, 33);
    let b = Tensor::<CpuRuntime>::from_slice(&random_vec(34, n, -1.0, 1.0), &[n], &device);
    let op = |x: &Tensor<CpuRuntime>| -> Result<Tensor<CpuRuntime>> {
        Tensor::try_from_slice(&matvec(&a, &x.try_to_vec()?, n, n), &[n], x.device())
    };
    let opts = CgOptions {
        tol: 1e-12,
        max_iter: Some(3),
    };
    let res = client.cg(&op, &b, None, opts).unwrap();
    assert_eq!(res.iterations, 3);
    assert_eq!(res.reason, ConvergenceReason::MaxIterations);
}

#[test]
fn test_cg_zero_rhs_returns_zeros() {
    let (client, device) = create_cpu_client();
    let b = Tensor::<CpuRuntime>::zeros(&[16], &device);
    let x0 = Tensor::<CpuRuntime>::full(&[16], 3.0, &device);
    let op = |x: &Tensor<CpuRuntime>| client.mul_scalar(x, 2.0);
    let res = client.cg(&op, &b, Some(&x0), CgOptions::default()).unwrap();
    assert_eq!(res.iterations, 0);
    assert!(res.reason.is_converged());
    assert_eq!(res.solution.to_vec(), vec![0.0; 16]);
}

#[test]
fn test_cg_singular_operator_diverges() {
    let (client, device) = create_cpu_client();
    let b = Tensor::<CpuRuntime>::full(&[8], 1.0, &device);
    let zero = |x: &Tensor<CpuRuntime>| client.mul_scalar(x, 0.0);
    let res = client.cg(&zero, &b, None, CgOptions::default()).unwrap();
    assert_eq!(res.reason, ConvergenceReason::Diverged);
    assert_eq!(res.iterations, 0);
    assert!(res.solution.to_vec().iter().all(|v| v.is_finite()));
}

#[test]
fn test_operator_changing_shape_is_rejected() {
    let (client, device) = create_cpu_client();
    let b = Tensor::<CpuRuntime>::full(&[2, 3], 1.0, &device);
    let bad = |x: &Tensor<CpuRuntime>| x.reshape(&[3, 2]);
    assert!(matches!(
        client.cg(&bad, &b, None, CgOptions::default()),
        Err(Error::ShapeMismatch { .. })
    ));
}

// =============================================================================
// FBS / FISTA / Greedy FISTA
// =============================================================================

fn identity(x: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
    Ok(x.clone())
}

#[test]
fn test_fbs_identity_lasso_one_step() {
    let (client, device) = create_cpu_client();
    let bs = random_vec(41, 64, -1.0, 1.0);
    let atb = Tensor::<CpuRuntime>::from_slice(&bs, &[8, 8], &device);
    let opts = FbsOptions {
        delta: 1.0,
        mu: 0.2,
        ..Default::default()
    };
    let res = client
        .fbs(&identity, &atb, None, &SoftThreshold::new(&client), opts)
        .unwrap();

    // the first step lands on the minimizer, the second confirms it
    assert_eq!(res.iterations, 2);
    assert_eq!(res.reason, ConvergenceReason::Tolerance);
    let expected: Vec<f32> = bs.iter().map(|&b| soft(b, 0.2)).collect();
    assert_allclose_f32(&res.solution.to_vec(), &expected, 0.0, 1e-6, "fbs lasso");
}

#[test]
fn test_fbs_divergence_returns_last_finite_iterate() {
    let (client, device) = create_cpu_client();
    let atb = Tensor::<CpuRuntime>::full(&[4, 4], 1.0, &device);
    // delta = 1 on AᵀA = 3I multiplies the error by -2 per step
    let ata = |x: &Tensor<CpuRuntime>| client.mul_scalar(x, 3.0);
    let opts = FbsOptions {
        delta: 1.0,
        mu: 0.0,
        tol: 0.0,
        max_iter: 1000,
    };
    let res = client.fbs(&ata, &atb, None, &IdentityProx, opts).unwrap();
    assert_eq!(res.reason, ConvergenceReason::Diverged);
    assert!(res.iterations < 1000);
    assert!(res.solution.to_vec().iter().all(|v| v.is_finite()));
}

fn lasso_objective(x: &[f32], b: &[f32], mu: f32) -> f64 {
    x.iter()
        .zip(b)
        .map(|(&xi, &bi)| 0.5 * ((xi - bi) as f64).powi(2) + mu as f64 * xi.abs() as f64)
        .sum()
}

#[test]
fn test_fista_matches_closed_form() {
    let (client, device) = create_cpu_client();
    let bs = random_vec(42, 100, -1.0, 1.0);
    let atb = Tensor::<CpuRuntime>::from_slice(&bs, &[10, 10], &device);
    let mu = 0.1f32;
    let prox = SoftThreshold::new(&client);

    let run = |max_iter: usize| {
        let opts = FistaOptions {
            delta: 0.5,
            mu: mu as f64,
            tol: 0.0,
            max_iter,
            ..Default::default()
        };
        client.fista(&identity, &atb, None, &prox, opts).unwrap()
    };

    let res = run(200);
    assert_eq!(res.iterations, 200);
    assert_eq!(res.restarts, 0);
    let x = res.solution.to_vec();
    for (xi, bi) in x.iter().zip(&bs) {
        assert!((xi - soft(*bi, mu)).abs() < 1e-3);
    }

    // FISTA is not monotone step to step; only compare the limit to early iterates
    let final_obj = lasso_objective(&x, &bs, mu);
    assert!(final_obj <= lasso_objective(&vec![0.0; 100], &bs, mu));
    for k in [1, 5, 20] {
        let xk = run(k).solution.to_vec();
        assert!(final_obj <= lasso_objective(&xk, &bs, mu) + 1e-6);
    }
}

#[test]
fn test_fista_restart_on_ill_conditioned_problem() {
    let (client, device) = create_cpu_client();
    let n = 64;
    let ds: Vec<f32> = (0..n).map(|i| 0.05 + 0.95 * i as f32 / (n - 1) as f32).collect();
    let bs = random_vec(43, n, -1.0, 1.0);
    let d = Tensor::<CpuRuntime>::from_slice(&ds, &[n], &device);
    let atb = Tensor::<CpuRuntime>::from_slice(&bs, &[n], &device);
    let ata = |x: &Tensor<CpuRuntime>| client.mul(&d, x);
    let mu = 0.05f32;

    let opts = FistaOptions {
        delta: 1.0,
        mu: mu as f64,
        tol: 1e-7,
        restart: true,
        max_iter: 2000,
        ..Default::default()
    };
    let res = client
        .fista(&ata, &atb, None, &SoftThreshold::new(&client), opts)
        .unwrap();

    assert!(res.restarts > 0);
    let x = res.solution.to_vec();
    for i in 0..n {
        let expected = soft(bs[i], mu) / ds[i];
        assert!(
            (x[i] - expected).abs() < 1e-2,
            "x[{i}] = {}, expected {expected}",
            x[i]
        );
    }
}

#[test]
fn test_greedy_fista_identity_lasso() {
    let (client, device) = create_cpu_client();
    let bs = random_vec(44, 64, -1.0, 1.0);
    let atb = Tensor::<CpuRuntime>::from_slice(&bs, &[8, 8], &device);
    let mu = 0.1f32;
    let opts = GreedyFistaOptions {
        l_inv: 1.0 / 1.3,
        delta: 1.3,
        mu: mu as f64,
        tol: 1e-6,
        max_iter: 500,
        ..Default::default()
    };
    let res = client
        .greedy_fista(&identity, &atb, None, &SoftThreshold::new(&client), opts)
        .unwrap();

    assert!(res.final_step >= 1.0 - 1e-9 && res.final_step <= 1.3);
    for (xi, bi) in res.solution.to_vec().iter().zip(&bs) {
        assert!((xi - soft(*bi, mu)).abs() < 1e-3);
    }
}

#[test]
fn test_greedy_fista_safeguard_and_restart() {
    init_tracing();
    let (client, device) = create_cpu_client();
    let n = 64;
    let ds: Vec<f32> = (0..n).map(|i| 0.05 + 0.95 * i as f32 / (n - 1) as f32).collect();
    let bs = random_vec(45, n, -1.0, 1.0);
    let d = Tensor::<CpuRuntime>::from_slice(&ds, &[n], &device);
    let atb = Tensor::<CpuRuntime>::from_slice(&bs, &[n], &device);
    let ata = |x: &Tensor<CpuRuntime>| client.mul(&d, x);
    let mu = 0.05f32;

    // delta near 2/L: the safeguard has to shrink the step
    let delta = 1.9;
    let opts = GreedyFistaOptions {
        l_inv: 1.0 / delta,
        delta,
        mu: mu as f64,
        tol: 1e-6,
        max_iter: 2000,
        ..Default::default()
    };
    let res = client
        .greedy_fista(&ata, &atb, None, &SoftThreshold::new(&client), opts)
        .unwrap();

    assert!(res.final_step < delta, "final_step = {}", res.final_step);
    assert!(res.final_step >= 1.0 - 1e-9, "step fell below its floor");
    assert!(res.restarts > 0);
    let x = res.solution.to_vec();
    for i in 0..n {
        let expected = soft(bs[i], mu) / ds[i];
        assert!(
            (x[i] - expected).abs() < 1e-3,
            "x[{i}] = {}, expected {expected}",
            x[i]
        );
    }
}

#[test]
fn test_greedy_fista_divergence_returns_last_finite_iterate() {
    let (client, device) = create_cpu_client();
    let bs = random_vec(46, 16, -1.0, 1.0);
    let atb = Tensor::<CpuRuntime>::from_slice(&bs, &[16], &device);
    let ata = |x: &Tensor<CpuRuntime>| client.mul_scalar(x, 3.0);

    // Step floor delta·l_inv = 1 is above 2/L
    let opts = GreedyFistaOptions {
        l_inv: 1.0,
        delta: 1.0,
        mu: 0.0,
        tol: 1e-6,
        max_iter: 500,
        ..Default::default()
    };
    let res = client
        .greedy_fista(&ata, &atb, None, &IdentityProx, opts)
        .unwrap();

    assert_eq!(res.reason, ConvergenceReason::Diverged);
    assert!(res.iterations < 500);
    assert_eq!(res.final_step, 1.0);
    assert!(res.solution.to_vec().iter().all(|v| v.is_finite()));
}

#[test]
fn test_solver_options_are_validated() {
    let (client, device) = create_cpu_client();
    let atb = Tensor::<CpuRuntime>::zeros(&[4], &device);
    let opts = FistaOptions {
        delta: -1.0,
        ..Default::default()
    };
    assert!(matches!(
        client.fista(&identity, &atb, None, &IdentityProx, opts),
        Err(Error::InvalidArgument { arg: "delta", .. })
    ));
}

// =============================================================================
// FLB
// =============================================================================

#[test]
fn test_flb_kick_on_stalled_instance() {
    init_tracing();
    let (client, device) = create_cpu_client();
    let mut bs = vec![0.0f32; 64];
    for i in [3, 20, 50] {
        bs[i] = 1.0;
    }
    let b = Tensor::<CpuRuntime>::from_slice(&bs, &[8, 8], &device);
    let opts = FlbOptions {
        delta: 1.0,
        mu: 10.5,
        max_iter: 100,
        ..Default::default()
    };
    let res = client.flb(&identity, &identity, &b, opts).unwrap();

    // five flat log-residuals trigger one kick at iteration 5, which costs
    // an extra count; v then crosses the threshold within two iterations
    assert_eq!(res.kicks, 1);
    assert_eq!(res.iterations, 8);
    assert_eq!(res.reason, ConvergenceReason::Tolerance);
    assert_eq!(res.solution.to_vec(), bs);
}

fn select_first(device: &CpuDevice, x: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
    let v = x.try_to_vec()?;
    Tensor::try_from_slice(&v[..4], &[4], device)
}

fn pad_zeros(device: &CpuDevice, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
    let mut v = b.try_to_vec()?;
    v.resize(8, 0.0);
    Tensor::try_from_slice(&v, &[8], device)
}

#[test]
fn test_flb_underdetermined_selection() {
    let (client, device) = create_cpu_client();
    let b = Tensor::<CpuRuntime>::from_slice(&[2.0, 0.0, 0.0, -3.0], &[4], &device);
    let a = |x: &Tensor<CpuRuntime>| select_first(&device, x);
    let at = |b: &Tensor<CpuRuntime>| pad_zeros(&device, b);
    let opts = FlbOptions {
        delta: 1.0,
        mu: 1.0,
        max_iter: 50,
        ..Default::default()
    };
    let res = client.flb(&a, &at, &b, opts).unwrap();

    assert_eq!(res.kicks, 0);
    assert_eq!(res.iterations, 2);
    assert_eq!(
        res.solution.to_vec(),
        vec![2.0, 0.0, 0.0, -3.0, 0.0, 0.0, 0.0, 0.0]
    );
}
