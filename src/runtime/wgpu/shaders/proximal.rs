//! Shrinkage kernels: soft threshold, isotropic shrinkage, Bregman kick steps.

use std::sync::OnceLock;
use wgpu::{Buffer, Queue};

use super::pipeline::{Dispatch, FLAT_INDEX, PipelineCache, grid_1d, launch};
use crate::ops::KICK_SENTINEL;

const BUILTINS: &str =
    "@builtin(global_invocation_id) gid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>";

const PARAMS: &str = r#"
struct Params {
    numel: u32,
    mu: f32,
    use_field: u32,
    _pad0: u32,
}
"#;

fn soft_shrink_source() -> String {
    format!(
        r#"
@group(0) @binding(0) var<storage, read_write> x: array<f32>;
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<uniform> params: Params;
{PARAMS}
@compute @workgroup_size(256)
fn soft_shrink({BUILTINS}) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    let v = x[idx];
    let m = abs(v) - params.mu;
    if (m > 0.0) {{
        dst[idx] = select(-1.0, 1.0, v >= 0.0) * m;
    }} else {{
        dst[idx] = 0.0;
    }}
}}
"#
    )
}

fn shrink2d_source() -> String {
    format!(
        r#"
@group(0) @binding(0) var<storage, read_write> ax: array<f32>;
@group(0) @binding(1) var<storage, read_write> ay: array<f32>;
@group(0) @binding(2) var<storage, read_write> mu_field: array<f32>;
@group(0) @binding(3) var<storage, read_write> ox: array<f32>;
@group(0) @binding(4) var<storage, read_write> oy: array<f32>;
@group(0) @binding(5) var<uniform> params: Params;
{PARAMS}
const EPS: f32 = {eps:e};

@compute @workgroup_size(256)
fn shrink2d({BUILTINS}) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    var mu = params.mu;
    if (params.use_field != 0u) {{
        mu = mu_field[idx];
    }}
    let a = ax[idx];
    let b = ay[idx];
    let n = sqrt(a * a + b * b);
    let m = n - mu;
    if (m > 0.0) {{
        let scale = m / (n + EPS);
        ox[idx] = a * scale;
        oy[idx] = b * scale;
    }} else {{
        ox[idx] = 0.0;
        oy[idx] = 0.0;
    }}
}}
"#,
        eps = f32::EPSILON,
    )
}

fn kick_source() -> String {
    format!(
        r#"
@group(0) @binding(0) var<storage, read_write> v: array<f32>;
@group(0) @binding(1) var<storage, read_write> r: array<f32>;
@group(0) @binding(2) var<storage, read_write> x: array<f32>;
@group(0) @binding(3) var<storage, read_write> dst: array<f32>;
@group(0) @binding(4) var<uniform> params: Params;
{PARAMS}
const SENTINEL: f32 = {sentinel:e};
const F32_MAX: f32 = 3.40282347e+38;

@compute @workgroup_size(256)
fn bregman_kick_steps({BUILTINS}) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    let ri = r[idx];
    if (x[idx] != 0.0 || ri == 0.0) {{
        dst[idx] = SENTINEL;
        return;
    }}
    let sgn = select(-1.0, 1.0, ri >= 0.0);
    let s = trunc((params.mu * sgn - v[idx]) / ri);
    // false for inf and NaN
    if (abs(s) <= F32_MAX) {{
        dst[idx] = s;
    }} else {{
        dst[idx] = SENTINEL;
    }}
}}
"#,
        sentinel = KICK_SENTINEL,
    )
}

/// `out = soft_shrink(x, params.mu)`
pub fn launch_soft_shrink(
    cache: &PipelineCache,
    queue: &Queue,
    x: &Buffer,
    out: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "soft_shrink",
        entry_point: "soft_shrink",
        buffers: &[x, out, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(soft_shrink_source).clone());
}

/// Isotropic shrinkage of `(ax, ay)` into `(ox, oy)`
///
/// `mu_field` is read only when `params.use_field` is set.
#[allow(clippy::too_many_arguments)]
pub fn launch_shrink2d(
    cache: &PipelineCache,
    queue: &Queue,
    ax: &Buffer,
    ay: &Buffer,
    mu_field: &Buffer,
    ox: &Buffer,
    oy: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "shrink2d",
        entry_point: "shrink2d",
        buffers: &[ax, ay, mu_field, ox, oy, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(shrink2d_source).clone());
}

/// Kick step lengths for linearized Bregman
#[allow(clippy::too_many_arguments)]
pub fn launch_bregman_kick_steps(
    cache: &PipelineCache,
    queue: &Queue,
    v: &Buffer,
    r: &Buffer,
    x: &Buffer,
    out: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "bregman_kick_steps",
        entry_point: "bregman_kick_steps",
        buffers: &[v, r, x, out, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(kick_source).clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_valid_wgsl_floats() {
        let src = kick_source();
        assert!(src.contains("const SENTINEL: f32 = 1e7;"));
        assert!(shrink2d_source().contains("const EPS: f32 = 1.1920929e-7;"));
    }
}
