// Backend parity tests for ConvOps and StencilOps

use proxr::ops::{ConvOps, ConvStrategy, Padding, StencilOps};
use proxr::runtime::cpu::CpuRuntime;
use proxr::runtime::wgpu::WgpuRuntime;
use proxr::tensor::Tensor;

use crate::common::{create_cpu_client, random_vec};
use crate::helpers::{assert_parity_f32, with_wgpu_backend};

const PADDINGS: [Padding; 3] = [Padding::Zero, Padding::Same, Padding::Wrap];

#[test]
fn test_conv2d_parity() {
    let (h, w) = (41, 35);
    let image = random_vec(11, h * w, 0.0, 1.0);
    let kernels = [(3, 3), (5, 3), (1, 7), (9, 9)];

    let (cpu_client, cpu_device) = create_cpu_client();
    let cx = Tensor::<CpuRuntime>::from_slice(&image, &[h, w], &cpu_device);
    let mut cases = Vec::new();
    for (i, &(kh, kw)) in kernels.iter().enumerate() {
        let k = random_vec(20 + i as u64, kh * kw, -1.0, 1.0);
        let ck = Tensor::<CpuRuntime>::from_slice(&k, &[kh, kw], &cpu_device);
        for padding in PADDINGS {
            let out = cpu_client.convolve2d(&cx, &ck, padding).unwrap().to_vec();
            cases.push((k.clone(), kh, kw, padding, out));
        }
    }

    with_wgpu_backend(|client, device| {
        let gx = Tensor::<WgpuRuntime>::from_slice(&image, &[h, w], &device);
        for (k, kh, kw, padding, cpu) in &cases {
            let gk = Tensor::<WgpuRuntime>::from_slice(k, &[*kh, *kw], &device);
            for strategy in [ConvStrategy::Naive, ConvStrategy::Auto] {
                let got = client
                    .convolve2d_with_strategy(&gx, &gk, *padding, strategy)
                    .unwrap()
                    .to_vec();
                assert_parity_f32(
                    cpu,
                    &got,
                    1e-5,
                    1e-5,
                    &format!("conv2d_{kh}x{kw}_{padding}_{strategy:?}"),
                );
            }
        }
    });
}

#[test]
fn test_conv2d_sv_parity() {
    let (h, w) = (19, 23);
    let image = random_vec(12, h * w, 0.0, 1.0);
    let kernel = random_vec(13, 3 * 5 * h * w, -1.0, 1.0);

    let (cpu_client, cpu_device) = create_cpu_client();
    let cx = Tensor::<CpuRuntime>::from_slice(&image, &[h, w], &cpu_device);
    let ck = Tensor::<CpuRuntime>::from_slice(&kernel, &[3, 5, h, w], &cpu_device);
    let cpu: Vec<Vec<f32>> = PADDINGS
        .iter()
        .map(|&p| cpu_client.convolve2d_sv(&cx, &ck, p).unwrap().to_vec())
        .collect();
    let cpu_t = cpu_client.transpose2d_sv(&ck).unwrap().to_vec();

    with_wgpu_backend(|client, device| {
        let gx = Tensor::<WgpuRuntime>::from_slice(&image, &[h, w], &device);
        let gk = Tensor::<WgpuRuntime>::from_slice(&kernel, &[3, 5, h, w], &device);
        for (p, expected) in PADDINGS.iter().zip(&cpu) {
            let got = client.convolve2d_sv(&gx, &gk, *p).unwrap().to_vec();
            assert_parity_f32(expected, &got, 1e-5, 1e-5, &format!("conv2d_sv_{p}"));
        }
        let got_t = client.transpose2d_sv(&gk).unwrap().to_vec();
        assert_eq!(cpu_t, got_t);
    });
}

#[test]
fn test_stencil_parity() {
    let (h, w) = (17, 26);
    let image = random_vec(14, h * w, 0.0, 1.0);
    let field = random_vec(15, h * w, -1.0, 1.0);

    let (cpu_client, cpu_device) = create_cpu_client();
    let cx = Tensor::<CpuRuntime>::from_slice(&image, &[h, w], &cpu_device);
    let cp = Tensor::<CpuRuntime>::from_slice(&field, &[h, w], &cpu_device);
    let (cgx, cgy) = cpu_client.grad2d(&cx).unwrap();
    let cdiv = cpu_client.divergence2d(&cgx, &cp).unwrap().to_vec();
    let cnorm = cpu_client.norm2d(&cgx, &cgy).unwrap().to_vec();
    let (cgx, cgy) = (cgx.to_vec(), cgy.to_vec());

    with_wgpu_backend(|client, device| {
        let gx = Tensor::<WgpuRuntime>::from_slice(&image, &[h, w], &device);
        let gp = Tensor::<WgpuRuntime>::from_slice(&field, &[h, w], &device);
        let (ggx, ggy) = client.grad2d(&gx).unwrap();
        assert_parity_f32(&cgx, &ggx.to_vec(), 1e-6, 1e-7, "grad2d_x");
        assert_parity_f32(&cgy, &ggy.to_vec(), 1e-6, 1e-7, "grad2d_y");
        let div = client.divergence2d(&ggx, &gp).unwrap().to_vec();
        assert_parity_f32(&cdiv, &div, 1e-6, 1e-6, "divergence2d");
        let norm = client.norm2d(&ggx, &ggy).unwrap().to_vec();
        assert_parity_f32(&cnorm, &norm, 1e-5, 1e-7, "norm2d");
    });
}
