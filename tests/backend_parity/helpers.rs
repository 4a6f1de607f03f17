//! Shared helpers for backend parity tests: assertion utilities, backend lock, client creation.

use crate::common::create_wgpu_client;
use proxr::runtime::wgpu::{WgpuClient, WgpuDevice};
use std::sync::{Mutex, OnceLock};

static WGPU_BACKEND_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Element-wise parity: `|a - b| <= atol + rtol·|b|`
pub fn assert_parity_f32(cpu: &[f32], got: &[f32], rtol: f32, atol: f32, op: &str) {
    assert_eq!(
        cpu.len(),
        got.len(),
        "parity_f32[{}]: length mismatch: {} vs {}",
        op,
        cpu.len(),
        got.len()
    );

    for (i, (x, y)) in got.iter().zip(cpu.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();

        if diff > tol {
            panic!(
                "parity_f32[{}] at index {}: {} vs {} (diff={}, tol={})",
                op, i, x, y, diff, tol
            );
        }
    }
}

/// Scalar parity with a relative tolerance
pub fn assert_parity_f64(cpu: f64, got: f64, rtol: f64, op: &str) {
    let tol = rtol * cpu.abs().max(1.0);
    assert!(
        (cpu - got).abs() <= tol,
        "parity_f64[{}]: {} vs {} (tol={})",
        op,
        cpu,
        got,
        tol
    );
}

/// Run `f` with exclusive access to the WebGPU device.
///
/// Does nothing when no adapter is available.
pub fn with_wgpu_backend<F>(mut f: F)
where
    F: FnMut(WgpuClient, WgpuDevice),
{
    let _guard = WGPU_BACKEND_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    match create_wgpu_client() {
        Some((client, device)) => f(client, device),
        None => eprintln!("skipping: no WebGPU adapter available"),
    }
}
