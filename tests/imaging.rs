//! End-to-end tests for the deconvolution and inpainting drivers.

mod common;

use common::{assert_allclose_f32, create_cpu_client, init_tracing, relative_error};
use proxr::algorithm::ConvergenceReason;
use proxr::algorithm::imaging::{
    DeconvMethod, DeconvOptions, H1InpaintOptions, TvInpaintOptions, deconv_fbs_tv,
    deconv_fista_tv, deconv_sv_fbs_tv, deconvolve, inpaint_h1, inpaint_tv,
};
use proxr::algorithm::proximal::TvOptions;
use proxr::algorithm::{SoftThreshold, TvProx};
use proxr::error::Error;
use proxr::ops::{ConvOps, Padding};
use proxr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use proxr::tensor::Tensor;

const N: usize = 32;

/// Smooth test image in `[0.25, 0.75]`
fn smooth_image() -> Vec<f32> {
    let tau = std::f32::consts::TAU;
    (0..N * N)
        .map(|i| {
            let (r, c) = ((i / N) as f32, (i % N) as f32);
            0.5 + 0.25 * (tau * r / 16.0).sin() * (tau * c / 16.0).cos()
        })
        .collect()
}

fn box_psf(device: &CpuDevice) -> Tensor<CpuRuntime> {
    Tensor::<CpuRuntime>::full(&[3, 3], 1.0 / 9.0, device)
}

fn blur(client: &CpuClient, truth: &[f32], psf: &Tensor<CpuRuntime>, padding: Padding) -> Vec<f32> {
    let x = Tensor::<CpuRuntime>::from_slice(truth, &[N, N], psf.device());
    client.convolve2d(&x, psf, padding).unwrap().to_vec()
}

// =============================================================================
// Deconvolution
// =============================================================================

#[test]
fn test_fista_tv_deblurs_box_blur() {
    init_tracing();
    let (client, device) = create_cpu_client();
    let truth = smooth_image();
    let psf = box_psf(&device);
    let blurry_data = blur(&client, &truth, &psf, Padding::Wrap);
    let blurry = Tensor::<CpuRuntime>::from_slice(&blurry_data, &[N, N], &device);

    let options = DeconvOptions {
        padding: Padding::Wrap,
        mu: 1e-4,
        tol: 1e-5,
        max_iter: 200,
        ..DeconvOptions::fista()
    };
    let res = deconv_fista_tv(&client, &blurry, &psf, &options).unwrap();

    assert!(res.iterations <= 200);
    let before = relative_error(&blurry_data, &truth);
    let after = relative_error(&res.image.to_vec(), &truth);
    assert!(after < 5e-2, "relative error {after}");
    assert!(after < 0.5 * before, "{after} is not below half of {before}");
}

#[test]
fn test_fbs_tv_reduces_error() {
    let (client, device) = create_cpu_client();
    let truth = smooth_image();
    let psf = box_psf(&device);
    let blurry_data = blur(&client, &truth, &psf, Padding::Wrap);
    let blurry = Tensor::<CpuRuntime>::from_slice(&blurry_data, &[N, N], &device);

    let options = DeconvOptions {
        padding: Padding::Wrap,
        mu: 1e-4,
        tol: 1e-5,
        max_iter: 100,
        ..Default::default()
    };
    let res = deconv_fbs_tv(&client, &blurry, &psf, &options).unwrap();
    let before = relative_error(&blurry_data, &truth);
    let after = relative_error(&res.image.to_vec(), &truth);
    assert!(after < before);
}

#[test]
fn test_deconvolve_with_soft_threshold_and_restart() {
    let (client, device) = create_cpu_client();
    let truth = smooth_image();
    let psf = box_psf(&device);
    let blurry_data = blur(&client, &truth, &psf, Padding::Wrap);
    let blurry = Tensor::<CpuRuntime>::from_slice(&blurry_data, &[N, N], &device);

    let options = DeconvOptions {
        padding: Padding::Wrap,
        mu: 1e-5,
        tol: 1e-5,
        max_iter: 100,
        ..DeconvOptions::fista()
    };
    let prox = SoftThreshold::new(&client);
    let res = deconvolve(
        &client,
        &blurry,
        &psf,
        &prox,
        DeconvMethod::Fista { restart: true },
        &options,
    )
    .unwrap();
    assert_ne!(res.reason, ConvergenceReason::Diverged);
    let after = relative_error(&res.image.to_vec(), &truth);
    assert!(after < relative_error(&blurry_data, &truth));
}

#[test]
fn test_sv_deconvolution_with_uniform_field_matches_2d() {
    let (client, device) = create_cpu_client();
    let truth = smooth_image();
    let psf = box_psf(&device);
    let blurry_data = blur(&client, &truth, &psf, Padding::Zero);
    let blurry = Tensor::<CpuRuntime>::from_slice(&blurry_data, &[N, N], &device);

    // [kh, kw, H, W] field holding the same kernel at every pixel
    let sv_psf = Tensor::<CpuRuntime>::full(&[3, 3, N, N], 1.0 / 9.0, &device);

    let options = DeconvOptions {
        mu: 1e-4,
        tol: 0.0,
        max_iter: 5,
        tv: TvOptions {
            eps: 0.0,
            max_iter: 10,
            ..Default::default()
        },
        ..Default::default()
    };
    let uniform = deconv_fbs_tv(&client, &blurry, &psf, &options).unwrap();
    let varying = deconv_sv_fbs_tv(&client, &blurry, &sv_psf, &options).unwrap();

    assert_eq!(uniform.iterations, varying.iterations);
    assert_allclose_f32(
        &varying.image.to_vec(),
        &uniform.image.to_vec(),
        1e-4,
        1e-4,
        "sv vs 2d deconvolution",
    );
}

#[test]
fn test_deconvolution_rejects_bad_inputs() {
    let (client, device) = create_cpu_client();
    let psf = box_psf(&device);
    let volume = Tensor::<CpuRuntime>::zeros(&[2, 8, 8], &device);
    assert!(matches!(
        deconv_fbs_tv(&client, &volume, &psf, &DeconvOptions::default()),
        Err(Error::InvalidArgument { .. })
    ));

    let img = Tensor::<CpuRuntime>::zeros(&[8, 8], &device);
    let options = DeconvOptions {
        delta: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        deconv_fbs_tv(&client, &img, &psf, &options),
        Err(Error::InvalidArgument { arg: "delta", .. })
    ));
}

#[test]
fn test_tv_prox_driver_accepts_custom_prox() {
    let (client, device) = create_cpu_client();
    let psf = box_psf(&device);
    let img = Tensor::<CpuRuntime>::full(&[8, 8], 0.5, &device);
    let prox = TvProx::new(&client);
    let res = deconvolve(
        &client,
        &img,
        &psf,
        &prox,
        DeconvMethod::Fbs,
        &DeconvOptions {
            padding: Padding::Wrap,
            ..Default::default()
        },
    )
    .unwrap();
    // a constant image is invariant under a normalized wrap blur
    assert_eq!(res.iterations, 1);
    for v in res.image.to_vec() {
        assert!((v - 0.5).abs() < 1e-5);
    }
}

// =============================================================================
// Inpainting
// =============================================================================

/// 1 inside the square `[lo, hi) x [lo, hi)`
fn square_mask(n: usize, lo: usize, hi: usize) -> Vec<f32> {
    (0..n * n)
        .map(|i| {
            let (r, c) = (i / n, i % n);
            if (lo..hi).contains(&r) && (lo..hi).contains(&c) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

fn punch_hole(img: &[f32], mask: &[f32]) -> Vec<f32> {
    img.iter()
        .zip(mask)
        .map(|(&v, &m)| if m == 1.0 { 0.0 } else { v })
        .collect()
}

#[test]
fn test_h1_inpaints_constant_image() {
    let (client, device) = create_cpu_client();
    let n = 16;
    let truth = vec![0.7f32; n * n];
    let mask_data = square_mask(n, 6, 10);
    let img = Tensor::<CpuRuntime>::from_slice(&punch_hole(&truth, &mask_data), &[n, n], &device);
    let mask = Tensor::<CpuRuntime>::from_slice(&mask_data, &[n, n], &device);

    let opts = H1InpaintOptions {
        tol: 1e-6,
        ..Default::default()
    };
    let res = inpaint_h1(&client, &img, &mask, opts).unwrap();
    assert!(res.iterations > 0);
    for (i, v) in res.solution.to_vec().iter().enumerate() {
        assert!((v - 0.7).abs() < 1e-3, "pixel {i} = {v}");
    }
}

#[test]
fn test_h1_ramp_stays_within_range() {
    let (client, device) = create_cpu_client();
    let n = 32;
    let truth: Vec<f32> = (0..n * n).map(|i| (i % n) as f32 / n as f32).collect();
    let mask_data = square_mask(n, 12, 16);
    let img = Tensor::<CpuRuntime>::from_slice(&punch_hole(&truth, &mask_data), &[n, n], &device);
    let mask = Tensor::<CpuRuntime>::from_slice(&mask_data, &[n, n], &device);

    let opts = H1InpaintOptions {
        tol: 1e-6,
        ..Default::default()
    };
    let out = inpaint_h1(&client, &img, &mask, opts).unwrap().solution.to_vec();
    for i in 0..n * n {
        let (r, c) = (i / n, i % n);
        let touches_hole =
            (c > 0 && mask_data[i - 1] == 1.0) || (r > 0 && mask_data[i - n] == 1.0);
        if mask_data[i] == 1.0 {
            // filled values respect the range of the surrounding data
            assert!(out[i] > 0.3 && out[i] < 0.6, "pixel {i} = {}", out[i]);
            assert!((out[i] - truth[i]).abs() < 0.15);
        } else if touches_hole {
            assert!((out[i] - truth[i]).abs() < 0.15);
        } else {
            assert!((out[i] - truth[i]).abs() < 1e-3, "pixel {i} = {}", out[i]);
        }
    }
}

#[test]
fn test_tv_inpaints_constant_image() {
    init_tracing();
    let (client, device) = create_cpu_client();
    let n = 16;
    let truth = vec![0.7f32; n * n];
    let mask_data = square_mask(n, 6, 10);
    let img = Tensor::<CpuRuntime>::from_slice(&punch_hole(&truth, &mask_data), &[n, n], &device);
    let mask = Tensor::<CpuRuntime>::from_slice(&mask_data, &[n, n], &device);

    let opts = TvInpaintOptions {
        tol: 1e-6,
        max_iter: 500,
        ..Default::default()
    };
    let (out, iterations) = inpaint_tv(&client, &img, &mask, opts).unwrap();
    assert!((1..=500).contains(&iterations));
    for (i, v) in out.to_vec().iter().enumerate() {
        assert!((v - 0.7).abs() < 5e-2, "pixel {i} = {v}");
    }
}

#[test]
fn test_tv_inpaint_zero_image() {
    let (client, device) = create_cpu_client();
    let img = Tensor::<CpuRuntime>::zeros(&[8, 8], &device);
    let mask = Tensor::<CpuRuntime>::from_slice(&square_mask(8, 2, 4), &[8, 8], &device);
    let (out, iterations) = inpaint_tv(&client, &img, &mask, TvInpaintOptions::default()).unwrap();
    assert_eq!(iterations, 0);
    assert_eq!(out.to_vec(), vec![0.0; 64]);
}

#[test]
fn test_tv_inpaint_rejects_bad_gamma() {
    let (client, device) = create_cpu_client();
    let img = Tensor::<CpuRuntime>::full(&[8, 8], 1.0, &device);
    let mask = Tensor::<CpuRuntime>::zeros(&[8, 8], &device);
    let opts = TvInpaintOptions {
        gamma: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        inpaint_tv(&client, &img, &mask, opts),
        Err(Error::InvalidArgument { arg: "gamma", .. })
    ));
}
