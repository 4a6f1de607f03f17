//! 2D convolution WGSL kernels
//!
//! - `conv2d_naive`: one invocation per output pixel, reading the image
//!   through the padding rule
//! - `conv2d_tiled`: 16x16 workgroups stage the tile plus halo in
//!   workgroup memory, specialized per kernel size
//! - `conv2d_sv`: spatially-varying kernel, one invocation per pixel
//! - `transpose2d` / `transpose2d_sv`: kernel adjoints
//!
//! Padding is compiled in as a `fetch(i, j)` function, so every
//! (kernel, padding) pair is its own shader module.

use std::sync::OnceLock;
use wgpu::{Buffer, Queue};

use super::pipeline::{Dispatch, FLAT_INDEX, PipelineCache, grid_1d, launch};
use crate::ops::{CONV_TILE, Conv2dParams, Padding};

const CONV_BINDINGS: &str = r#"
@group(0) @binding(0) var<storage, read_write> x: array<f32>;
@group(0) @binding(1) var<storage, read_write> k: array<f32>;
@group(0) @binding(2) var<storage, read_write> y: array<f32>;

struct Params {
    height: u32,
    width: u32,
    kh: u32,
    kw: u32,
}
@group(0) @binding(3) var<uniform> params: Params;
"#;

/// `fetch(i, j)`: image value at a possibly out-of-range pixel
fn fetch_fn(padding: Padding) -> String {
    let body = match padding {
        Padding::Zero => {
            r#"    if (i < 0 || i >= h || j < 0 || j >= w) {
        return 0.0;
    }
    let r = i;
    let c = j;"#
        }
        Padding::Same => {
            r#"    let r = clamp(i, 0, h - 1);
    let c = clamp(j, 0, w - 1);"#
        }
        Padding::Wrap => {
            r#"    let r = ((i % h) + h) % h;
    let c = ((j % w) + w) % w;"#
        }
    };
    format!(
        r#"
fn fetch(i: i32, j: i32) -> f32 {{
    let h = i32(params.height);
    let w = i32(params.width);
{body}
    return x[u32(r) * params.width + u32(c)];
}}
"#
    )
}

/// Pixel coordinates of the flat index, or early return when out of range
const PIXEL_PROLOGUE: &str = r#"
    let idx = FLAT;
    if (idx >= params.height * params.width) {
        return;
    }
    let i = i32(idx / params.width);
    let j = i32(idx % params.width);
    let ci = i32((params.kh - 1u) / 2u);
    let cj = i32((params.kw - 1u) / 2u);"#;

const ENTRY_BUILTINS: &str =
    "@builtin(global_invocation_id) gid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>";

fn naive_source(padding: Padding) -> String {
    format!(
        r#"{CONV_BINDINGS}{fetch}
@compute @workgroup_size(256)
fn conv2d_naive({ENTRY_BUILTINS}) {{{prologue}
    var acc: f32 = 0.0;
    for (var a = 0u; a < params.kh; a = a + 1u) {{
        for (var b = 0u; b < params.kw; b = b + 1u) {{
            acc = acc + k[a * params.kw + b] * fetch(i + i32(a) - ci, j + i32(b) - cj);
        }}
    }}
    y[idx] = acc;
}}
"#,
        fetch = fetch_fn(padding),
        prologue = PIXEL_PROLOGUE.replace("FLAT", FLAT_INDEX),
    )
}

fn tiled_source(kh: usize, kw: usize, padding: Padding) -> String {
    let sh = CONV_TILE + kh - 1;
    let sw = CONV_TILE + kw - 1;
    format!(
        r#"{CONV_BINDINGS}{fetch}
const TILE: u32 = {CONV_TILE}u;
const KH: u32 = {kh}u;
const KW: u32 = {kw}u;
const SH: u32 = {sh}u;
const SW: u32 = {sw}u;

var<workgroup> tile: array<f32, {staged}>;

@compute @workgroup_size({CONV_TILE}, {CONV_TILE})
fn conv2d_tiled(@builtin(workgroup_id) wid: vec3<u32>, @builtin(local_invocation_id) lid: vec3<u32>) {{
    let row0 = i32(wid.y * TILE) - i32((KH - 1u) / 2u);
    let col0 = i32(wid.x * TILE) - i32((KW - 1u) / 2u);
    let lane = lid.y * TILE + lid.x;

    for (var s = lane; s < SH * SW; s = s + TILE * TILE) {{
        tile[s] = fetch(row0 + i32(s / SW), col0 + i32(s % SW));
    }}
    workgroupBarrier();

    let i = wid.y * TILE + lid.y;
    let j = wid.x * TILE + lid.x;
    if (i >= params.height || j >= params.width) {{
        return;
    }}

    var acc: f32 = 0.0;
    for (var a = 0u; a < KH; a = a + 1u) {{
        for (var b = 0u; b < KW; b = b + 1u) {{
            acc = acc + k[a * KW + b] * tile[(lid.y + a) * SW + lid.x + b];
        }}
    }}
    y[i * params.width + j] = acc;
}}
"#,
        fetch = fetch_fn(padding),
        staged = sh * sw,
    )
}

fn sv_source(padding: Padding) -> String {
    format!(
        r#"{CONV_BINDINGS}{fetch}
@compute @workgroup_size(256)
fn conv2d_sv({ENTRY_BUILTINS}) {{{prologue}
    let plane = params.height * params.width;
    var acc: f32 = 0.0;
    for (var a = 0u; a < params.kh; a = a + 1u) {{
        for (var b = 0u; b < params.kw; b = b + 1u) {{
            let wgt = k[(a * params.kw + b) * plane + idx];
            acc = acc + wgt * fetch(i + i32(a) - ci, j + i32(b) - cj);
        }}
    }}
    y[idx] = acc;
}}
"#,
        fetch = fetch_fn(padding),
        prologue = PIXEL_PROLOGUE.replace("FLAT", FLAT_INDEX),
    )
}

fn transpose_source() -> String {
    format!(
        r#"
@group(0) @binding(0) var<storage, read_write> k: array<f32>;
@group(0) @binding(1) var<storage, read_write> kt: array<f32>;

struct Params {{
    numel: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}}
@group(0) @binding(2) var<uniform> params: Params;

@compute @workgroup_size(256)
fn transpose2d({ENTRY_BUILTINS}) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    kt[idx] = k[params.numel - 1u - idx];
}}
"#
    )
}

fn transpose_sv_source() -> String {
    format!(
        r#"
@group(0) @binding(0) var<storage, read_write> k: array<f32>;
@group(0) @binding(1) var<storage, read_write> kt: array<f32>;

struct Params {{
    height: u32,
    width: u32,
    kh: u32,
    kw: u32,
}}
@group(0) @binding(2) var<uniform> params: Params;

@compute @workgroup_size(256)
fn transpose2d_sv({ENTRY_BUILTINS}) {{
    let idx = {FLAT_INDEX};
    let plane = params.height * params.width;
    if (idx >= params.kh * params.kw * plane) {{
        return;
    }}
    let win = idx / plane;
    let pix = idx % plane;
    let wa = win / params.kw;
    let wb = win % params.kw;
    let src_window = (params.kh - 1u - wa) * params.kw + (params.kw - 1u - wb);

    let m = i32(pix / params.width) + i32(wa) - i32((params.kh - 1u) / 2u);
    let n = i32(pix % params.width) + i32(wb) - i32((params.kw - 1u) / 2u);
    if (m < 0 || m >= i32(params.height) || n < 0 || n >= i32(params.width)) {{
        kt[idx] = 0.0;
        return;
    }}
    kt[idx] = k[src_window * plane + u32(m) * params.width + u32(n)];
}}
"#
    )
}

// ============================================================================
// Launchers
// ============================================================================

/// Naive 2D convolution, one invocation per pixel
pub fn launch_conv2d_naive(
    cache: &PipelineCache,
    queue: &Queue,
    x: &Buffer,
    k: &Buffer,
    out: &Buffer,
    params_buffer: &Buffer,
    params: &Conv2dParams,
) {
    let shader = format!("conv2d_naive_{}", params.padding);
    let dispatch = Dispatch {
        shader: &shader,
        entry_point: "conv2d_naive",
        buffers: &[x, k, out, params_buffer],
        workgroups: grid_1d(params.height * params.width),
    };
    launch(cache, queue, dispatch, || naive_source(params.padding));
}

/// Tiled 2D convolution; the caller has checked the tile fits
pub fn launch_conv2d_tiled(
    cache: &PipelineCache,
    queue: &Queue,
    x: &Buffer,
    k: &Buffer,
    out: &Buffer,
    params_buffer: &Buffer,
    params: &Conv2dParams,
) {
    let shader = format!("conv2d_tiled_{}x{}_{}", params.kh, params.kw, params.padding);
    let tiles_x = params.width.div_ceil(CONV_TILE) as u32;
    let tiles_y = params.height.div_ceil(CONV_TILE) as u32;
    let dispatch = Dispatch {
        shader: &shader,
        entry_point: "conv2d_tiled",
        buffers: &[x, k, out, params_buffer],
        workgroups: (tiles_x, tiles_y, 1),
    };
    launch(cache, queue, dispatch, || {
        tiled_source(params.kh, params.kw, params.padding)
    });
}

/// Spatially-varying 2D convolution
pub fn launch_conv2d_sv(
    cache: &PipelineCache,
    queue: &Queue,
    x: &Buffer,
    k: &Buffer,
    out: &Buffer,
    params_buffer: &Buffer,
    params: &Conv2dParams,
) {
    let shader = format!("conv2d_sv_{}", params.padding);
    let dispatch = Dispatch {
        shader: &shader,
        entry_point: "conv2d_sv",
        buffers: &[x, k, out, params_buffer],
        workgroups: grid_1d(params.height * params.width),
    };
    launch(cache, queue, dispatch, || sv_source(params.padding));
}

/// 180° rotation of a kernel with `numel` taps
pub fn launch_transpose2d(
    cache: &PipelineCache,
    queue: &Queue,
    k: &Buffer,
    out: &Buffer,
    params_buffer: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "transpose2d",
        entry_point: "transpose2d",
        buffers: &[k, out, params_buffer],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(transpose_source).clone());
}

/// Adjoint of a spatially-varying kernel
pub fn launch_transpose2d_sv(
    cache: &PipelineCache,
    queue: &Queue,
    k: &Buffer,
    out: &Buffer,
    params_buffer: &Buffer,
    params: &Conv2dParams,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "transpose2d_sv",
        entry_point: "transpose2d_sv",
        buffers: &[k, out, params_buffer],
        workgroups: grid_1d(params.kh * params.kw * params.height * params.width),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(transpose_sv_source).clone());
}
