//! Finite-difference stencil kernels: gradient, divergence, magnitude.
//!
//! All three entry points share one layout of three storage buffers.

use std::sync::OnceLock;
use wgpu::{Buffer, Queue};

use super::pipeline::{Dispatch, FLAT_INDEX, PipelineCache, grid_1d, launch};

fn stencil_source() -> String {
    format!(
        r#"
@group(0) @binding(0) var<storage, read_write> b0: array<f32>;
@group(0) @binding(1) var<storage, read_write> b1: array<f32>;
@group(0) @binding(2) var<storage, read_write> b2: array<f32>;

struct Params {{
    height: u32,
    width: u32,
    numel: u32,
    _pad0: u32,
}}
@group(0) @binding(3) var<uniform> params: Params;

// b0 = x, b1 = gx, b2 = gy
@compute @workgroup_size(256)
fn grad2d(@builtin(global_invocation_id) gid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    let i = idx / params.width;
    let j = idx % params.width;
    var gx: f32 = 0.0;
    var gy: f32 = 0.0;
    if (j + 1u < params.width) {{
        gx = b0[idx + 1u] - b0[idx];
    }}
    if (i + 1u < params.height) {{
        gy = b0[idx + params.width] - b0[idx];
    }}
    b1[idx] = gx;
    b2[idx] = gy;
}}

// b0 = px, b1 = py, b2 = div
@compute @workgroup_size(256)
fn divergence2d(@builtin(global_invocation_id) gid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    let i = idx / params.width;
    let j = idx % params.width;
    var d: f32 = 0.0;
    if (j + 1u < params.width) {{
        d = d + b0[idx];
    }}
    if (j > 0u) {{
        d = d - b0[idx - 1u];
    }}
    if (i + 1u < params.height) {{
        d = d + b1[idx];
    }}
    if (i > 0u) {{
        d = d - b1[idx - params.width];
    }}
    b2[idx] = d;
}}

// b0 = gx, b1 = gy, b2 = magnitude
@compute @workgroup_size(256)
fn norm2d(@builtin(global_invocation_id) gid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    let a = b0[idx];
    let b = b1[idx];
    b2[idx] = sqrt(a * a + b * b);
}}
"#
    )
}

/// Run one stencil entry point over `numel` pixels
pub fn launch_stencil(
    cache: &PipelineCache,
    queue: &Queue,
    entry_point: &'static str,
    buffers: [&Buffer; 3],
    params: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let [b0, b1, b2] = buffers;
    let dispatch = Dispatch {
        shader: "stencil",
        entry_point,
        buffers: &[b0, b1, b2, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(stencil_source).clone());
}
