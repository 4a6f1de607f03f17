// Backend parity tests for the iterative solvers and imaging drivers

use proxr::algorithm::imaging::{DeconvOptions, H1InpaintOptions, deconv_fista_tv, inpaint_h1};
use proxr::algorithm::iterative::{CgOptions, FistaOptions, FlbOptions, IterativeSolvers};
use proxr::algorithm::{ConvergenceReason, SoftThreshold};
use proxr::error::Result;
use proxr::ops::{BinaryOps, ConvOps, Padding, ScalarOps};
use proxr::runtime::Runtime;
use proxr::runtime::cpu::CpuRuntime;
use proxr::runtime::wgpu::WgpuRuntime;
use proxr::tensor::Tensor;

use crate::common::{create_cpu_client, random_vec, relative_error};
use crate::helpers::{assert_parity_f32, with_wgpu_backend};

#[test]
fn test_cg_parity() {
    let n = 24;
    let diag: Vec<f32> = (0..n * n).map(|i| 1.0 + (i % 7) as f32).collect();
    let b = random_vec(31, n * n, -1.0, 1.0);
    let opts = CgOptions {
        tol: 1e-5,
        max_iter: None,
    };

    let (cpu_client, cpu_device) = create_cpu_client();
    let cd = Tensor::<CpuRuntime>::from_slice(&diag, &[n, n], &cpu_device);
    let cb = Tensor::<CpuRuntime>::from_slice(&b, &[n, n], &cpu_device);
    let op = |x: &Tensor<CpuRuntime>| cpu_client.mul(&cd, x);
    let cpu = cpu_client.cg(&op, &cb, None, opts).unwrap();
    assert_eq!(cpu.reason, ConvergenceReason::Tolerance);

    with_wgpu_backend(|client, device| {
        let gd = Tensor::<WgpuRuntime>::from_slice(&diag, &[n, n], &device);
        let gb = Tensor::<WgpuRuntime>::from_slice(&b, &[n, n], &device);
        let op = |x: &Tensor<WgpuRuntime>| client.mul(&gd, x);
        let got = client.cg(&op, &gb, None, opts).unwrap();
        assert_eq!(got.reason, ConvergenceReason::Tolerance);
        assert_parity_f32(
            &cpu.solution.to_vec(),
            &got.solution.to_vec(),
            1e-3,
            1e-4,
            "cg",
        );
    });
}

#[test]
fn test_fista_parity() {
    let n = 16;
    let atb = random_vec(32, n * n, -1.0, 1.0);
    let opts = FistaOptions {
        delta: 0.5,
        mu: 0.1,
        tol: 0.0,
        max_iter: 30,
        ..Default::default()
    };

    let (cpu_client, cpu_device) = create_cpu_client();
    let cb = Tensor::<CpuRuntime>::from_slice(&atb, &[n, n], &cpu_device);
    let op = |x: &Tensor<CpuRuntime>| cpu_client.mul_scalar(x, 1.5);
    let cpu = cpu_client
        .fista(&op, &cb, None, &SoftThreshold::new(&cpu_client), opts)
        .unwrap();

    with_wgpu_backend(|client, device| {
        let gb = Tensor::<WgpuRuntime>::from_slice(&atb, &[n, n], &device);
        let op = |x: &Tensor<WgpuRuntime>| -> Result<Tensor<WgpuRuntime>> {
            client.mul_scalar(x, 1.5)
        };
        let got = client
            .fista(&op, &gb, None, &SoftThreshold::new(&client), opts)
            .unwrap();
        assert_eq!(cpu.iterations, got.iterations);
        assert_parity_f32(
            &cpu.solution.to_vec(),
            &got.solution.to_vec(),
            1e-3,
            1e-4,
            "fista",
        );
    });
}

#[test]
fn test_flb_parity() {
    let mut b = vec![0.0f32; 64];
    for i in [3, 20, 50] {
        b[i] = 1.0;
    }
    let opts = FlbOptions {
        delta: 1.0,
        mu: 10.5,
        max_iter: 100,
        ..Default::default()
    };

    let (cpu_client, cpu_device) = create_cpu_client();
    let cb = Tensor::<CpuRuntime>::from_slice(&b, &[8, 8], &cpu_device);
    let id = |x: &Tensor<CpuRuntime>| -> Result<Tensor<CpuRuntime>> { Ok(x.clone()) };
    let cpu = cpu_client.flb(&id, &id, &cb, opts).unwrap();

    with_wgpu_backend(|client, device| {
        let gb = Tensor::<WgpuRuntime>::from_slice(&b, &[8, 8], &device);
        let id = |x: &Tensor<WgpuRuntime>| -> Result<Tensor<WgpuRuntime>> { Ok(x.clone()) };
        let got = client.flb(&id, &id, &gb, opts).unwrap();
        assert_eq!(cpu.kicks, got.kicks);
        assert_eq!(cpu.iterations, got.iterations);
        assert_eq!(cpu.solution.to_vec(), got.solution.to_vec());
    });
}

fn deconv_options<R: Runtime>(max_iter: usize) -> DeconvOptions<R> {
    DeconvOptions {
        padding: Padding::Wrap,
        mu: 1e-3,
        tol: 0.0,
        max_iter,
        ..DeconvOptions::fista()
    }
}

#[test]
fn test_imaging_parity() {
    let n = 24;
    let truth: Vec<f32> = (0..n * n)
        .map(|i| if (i / n) % 8 < 4 { 0.8 } else { 0.2 })
        .collect();
    let psf = vec![1.0 / 9.0; 9];
    let mask: Vec<f32> = (0..n * n)
        .map(|i| if (8..12).contains(&(i / n)) && (8..12).contains(&(i % n)) { 1.0 } else { 0.0 })
        .collect();

    let (cpu_client, cpu_device) = create_cpu_client();
    let cx = Tensor::<CpuRuntime>::from_slice(&truth, &[n, n], &cpu_device);
    let cpsf = Tensor::<CpuRuntime>::from_slice(&psf, &[3, 3], &cpu_device);
    let blurry = cpu_client.convolve2d(&cx, &cpsf, Padding::Wrap).unwrap().to_vec();
    let cblurry = Tensor::<CpuRuntime>::from_slice(&blurry, &[n, n], &cpu_device);
    let cmask = Tensor::<CpuRuntime>::from_slice(&mask, &[n, n], &cpu_device);
    let cpu_deconv = deconv_fista_tv(&cpu_client, &cblurry, &cpsf, &deconv_options(10))
        .unwrap()
        .image
        .to_vec();
    let cpu_inpaint = inpaint_h1(&cpu_client, &cx, &cmask, H1InpaintOptions::default())
        .unwrap()
        .solution
        .to_vec();

    with_wgpu_backend(|client, device| {
        let gblurry = Tensor::<WgpuRuntime>::from_slice(&blurry, &[n, n], &device);
        let gpsf = Tensor::<WgpuRuntime>::from_slice(&psf, &[3, 3], &device);
        let gx = Tensor::<WgpuRuntime>::from_slice(&truth, &[n, n], &device);
        let gmask = Tensor::<WgpuRuntime>::from_slice(&mask, &[n, n], &device);

        let deconv = deconv_fista_tv(&client, &gblurry, &gpsf, &deconv_options(10))
            .unwrap()
            .image
            .to_vec();
        assert!(relative_error(&deconv, &cpu_deconv) < 1e-3);

        let inpaint = inpaint_h1(&client, &gx, &gmask, H1InpaintOptions::default())
            .unwrap()
            .solution
            .to_vec();
        assert!(relative_error(&inpaint, &cpu_inpaint) < 1e-3);
    });
}
