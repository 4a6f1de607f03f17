// Backend parity tests for element-wise, reduction and shrinkage ops

use proxr::ops::{BinaryOps, ProximalOps, ReduceOps, ScalarOps, Threshold, UnaryOps};
use proxr::runtime::cpu::CpuRuntime;
use proxr::runtime::wgpu::WgpuRuntime;
use proxr::tensor::Tensor;

use crate::common::{create_cpu_client, random_vec};
use crate::helpers::{assert_parity_f32, assert_parity_f64, with_wgpu_backend};

const SHAPE: [usize; 2] = [37, 29];

fn inputs() -> (Vec<f32>, Vec<f32>) {
    let n = SHAPE[0] * SHAPE[1];
    (random_vec(1, n, -2.0, 2.0), random_vec(2, n, 0.5, 3.0))
}

#[test]
fn test_binary_parity() {
    let (a, b) = inputs();
    let (cpu_client, cpu_device) = create_cpu_client();
    let ca = Tensor::<CpuRuntime>::from_slice(&a, &SHAPE, &cpu_device);
    let cb = Tensor::<CpuRuntime>::from_slice(&b, &SHAPE, &cpu_device);
    let cpu: Vec<Vec<f32>> = vec![
        cpu_client.add(&ca, &cb).unwrap().to_vec(),
        cpu_client.sub(&ca, &cb).unwrap().to_vec(),
        cpu_client.mul(&ca, &cb).unwrap().to_vec(),
        cpu_client.div(&ca, &cb).unwrap().to_vec(),
        cpu_client.maximum(&ca, &cb).unwrap().to_vec(),
        cpu_client.minimum(&ca, &cb).unwrap().to_vec(),
    ];

    with_wgpu_backend(|client, device| {
        let ga = Tensor::<WgpuRuntime>::from_slice(&a, &SHAPE, &device);
        let gb = Tensor::<WgpuRuntime>::from_slice(&b, &SHAPE, &device);
        let got: Vec<Vec<f32>> = vec![
            client.add(&ga, &gb).unwrap().to_vec(),
            client.sub(&ga, &gb).unwrap().to_vec(),
            client.mul(&ga, &gb).unwrap().to_vec(),
            client.div(&ga, &gb).unwrap().to_vec(),
            client.maximum(&ga, &gb).unwrap().to_vec(),
            client.minimum(&ga, &gb).unwrap().to_vec(),
        ];
        for (i, (c, g)) in cpu.iter().zip(&got).enumerate() {
            assert_parity_f32(c, g, 1e-6, 1e-7, &format!("binary_case_{i}"));
        }

        let mut acc = ga.clone();
        client.axpy_assign(&mut acc, -0.5, &gb).unwrap();
        let expected = cpu_client.axpy(&ca, -0.5, &cb).unwrap().to_vec();
        assert_parity_f32(&expected, &acc.to_vec(), 1e-6, 1e-6, "axpy_assign");
        // the source handle is untouched
        assert_eq!(ga.to_vec(), a);
    });
}

#[test]
fn test_scalar_and_unary_parity() {
    let (a, b) = inputs();
    let (cpu_client, cpu_device) = create_cpu_client();
    let ca = Tensor::<CpuRuntime>::from_slice(&a, &SHAPE, &cpu_device);
    let cb = Tensor::<CpuRuntime>::from_slice(&b, &SHAPE, &cpu_device);
    let cpu: Vec<Vec<f32>> = vec![
        cpu_client.add_scalar(&ca, 0.25).unwrap().to_vec(),
        cpu_client.rsub_scalar(&ca, 1.0).unwrap().to_vec(),
        cpu_client.mul_scalar(&ca, -3.0).unwrap().to_vec(),
        cpu_client.div_scalar(&ca, 7.0).unwrap().to_vec(),
        cpu_client.pow_scalar(&cb, 1.5).unwrap().to_vec(),
        cpu_client.neg(&ca).unwrap().to_vec(),
        cpu_client.abs(&ca).unwrap().to_vec(),
        cpu_client.sqrt(&cb).unwrap().to_vec(),
        cpu_client.sign(&ca).unwrap().to_vec(),
    ];

    with_wgpu_backend(|client, device| {
        let ga = Tensor::<WgpuRuntime>::from_slice(&a, &SHAPE, &device);
        let gb = Tensor::<WgpuRuntime>::from_slice(&b, &SHAPE, &device);
        let got: Vec<Vec<f32>> = vec![
            client.add_scalar(&ga, 0.25).unwrap().to_vec(),
            client.rsub_scalar(&ga, 1.0).unwrap().to_vec(),
            client.mul_scalar(&ga, -3.0).unwrap().to_vec(),
            client.div_scalar(&ga, 7.0).unwrap().to_vec(),
            client.pow_scalar(&gb, 1.5).unwrap().to_vec(),
            client.neg(&ga).unwrap().to_vec(),
            client.abs(&ga).unwrap().to_vec(),
            client.sqrt(&gb).unwrap().to_vec(),
            client.sign(&ga).unwrap().to_vec(),
        ];
        for (i, (c, g)) in cpu.iter().zip(&got).enumerate() {
            assert_parity_f32(c, g, 1e-5, 1e-6, &format!("scalar_unary_case_{i}"));
        }
    });
}

#[test]
fn test_reduce_parity() {
    let (a, b) = inputs();
    let (cpu_client, cpu_device) = create_cpu_client();
    let ca = Tensor::<CpuRuntime>::from_slice(&a, &SHAPE, &cpu_device);
    let cb = Tensor::<CpuRuntime>::from_slice(&b, &SHAPE, &cpu_device);
    let cpu = [
        cpu_client.sum(&ca).unwrap(),
        cpu_client.sum_sq(&ca).unwrap(),
        cpu_client.abs_sum(&ca).unwrap(),
        cpu_client.min(&ca).unwrap(),
        cpu_client.max(&ca).unwrap(),
        cpu_client.dot(&ca, &cb).unwrap(),
    ];

    with_wgpu_backend(|client, device| {
        let ga = Tensor::<WgpuRuntime>::from_slice(&a, &SHAPE, &device);
        let gb = Tensor::<WgpuRuntime>::from_slice(&b, &SHAPE, &device);
        let got = [
            client.sum(&ga).unwrap(),
            client.sum_sq(&ga).unwrap(),
            client.abs_sum(&ga).unwrap(),
            client.min(&ga).unwrap(),
            client.max(&ga).unwrap(),
            client.dot(&ga, &gb).unwrap(),
        ];
        for (i, (c, g)) in cpu.iter().zip(&got).enumerate() {
            assert_parity_f64(*c, *g, 1e-4, &format!("reduce_case_{i}"));
        }
    });
}

#[test]
fn test_shrinkage_parity() {
    let (a, b) = inputs();
    let field: Vec<f32> = b.iter().map(|v| v * 0.5).collect();
    let (cpu_client, cpu_device) = create_cpu_client();
    let ca = Tensor::<CpuRuntime>::from_slice(&a, &SHAPE, &cpu_device);
    let cb = Tensor::<CpuRuntime>::from_slice(&b, &SHAPE, &cpu_device);
    let cf = Tensor::<CpuRuntime>::from_slice(&field, &SHAPE, &cpu_device);
    let soft = cpu_client.soft_shrink(&ca, 0.7).unwrap().to_vec();
    let (sx, sy) = cpu_client.shrink2d(&ca, &cb, Threshold::Scalar(0.9)).unwrap();
    let (fx, fy) = cpu_client.shrink2d(&ca, &cb, Threshold::Field(&cf)).unwrap();
    let x = cpu_client.soft_shrink(&cb, 2.0).unwrap();
    let kicks = cpu_client.bregman_kick_steps(&cb, &ca, &x, 4.0).unwrap().to_vec();

    with_wgpu_backend(|client, device| {
        let ga = Tensor::<WgpuRuntime>::from_slice(&a, &SHAPE, &device);
        let gb = Tensor::<WgpuRuntime>::from_slice(&b, &SHAPE, &device);
        let gf = Tensor::<WgpuRuntime>::from_slice(&field, &SHAPE, &device);
        assert_parity_f32(
            &soft,
            &client.soft_shrink(&ga, 0.7).unwrap().to_vec(),
            1e-6,
            1e-6,
            "soft_shrink",
        );

        let (gx, gy) = client.shrink2d(&ga, &gb, Threshold::Scalar(0.9)).unwrap();
        assert_parity_f32(&sx.to_vec(), &gx.to_vec(), 1e-5, 1e-6, "shrink2d_scalar_x");
        assert_parity_f32(&sy.to_vec(), &gy.to_vec(), 1e-5, 1e-6, "shrink2d_scalar_y");

        let (gx, gy) = client.shrink2d(&ga, &gb, Threshold::Field(&gf)).unwrap();
        assert_parity_f32(&fx.to_vec(), &gx.to_vec(), 1e-5, 1e-6, "shrink2d_field_x");
        assert_parity_f32(&fy.to_vec(), &gy.to_vec(), 1e-5, 1e-6, "shrink2d_field_y");

        let gxs = client.soft_shrink(&gb, 2.0).unwrap();
        let got = client.bregman_kick_steps(&gb, &ga, &gxs, 4.0).unwrap().to_vec();
        // steps are truncated quotients; allow a one-step disagreement at boundaries
        for (i, (c, g)) in kicks.iter().zip(&got).enumerate() {
            assert!((c - g).abs() <= 1.0, "kick step {i}: {c} vs {g}");
        }
    });
}
