//! Element-wise WGSL kernels: binary, scalar, axpy and unary.

use std::sync::OnceLock;
use wgpu::{Buffer, Queue};

use super::pipeline::{Dispatch, FLAT_INDEX, PipelineCache, grid_1d, launch};
use crate::ops::{BinaryOp, ScalarOp, UnaryOp};

const BINARY_OPS: [BinaryOp; 7] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Pow,
    BinaryOp::Max,
    BinaryOp::Min,
];

const SCALAR_OPS: [ScalarOp; 6] = [
    ScalarOp::Add,
    ScalarOp::Sub,
    ScalarOp::RSub,
    ScalarOp::Mul,
    ScalarOp::Div,
    ScalarOp::Pow,
];

const UNARY_OPS: [UnaryOp; 5] = [
    UnaryOp::Neg,
    UnaryOp::Abs,
    UnaryOp::Sqrt,
    UnaryOp::Sign,
    UnaryOp::IsZero,
];

/// WGSL expression of `op` on `x` and `y`
fn binary_expr(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "x + y",
        BinaryOp::Sub => "x - y",
        BinaryOp::Mul => "x * y",
        BinaryOp::Div => "x / y",
        BinaryOp::Pow => "pow(x, y)",
        BinaryOp::Max => "select(y, x, x > y)",
        BinaryOp::Min => "select(y, x, x < y)",
    }
}

/// WGSL expression of `op` on `x` and the scalar `s`
fn scalar_expr(op: ScalarOp) -> &'static str {
    match op {
        ScalarOp::Add => "x + s",
        ScalarOp::Sub => "x - s",
        ScalarOp::RSub => "s - x",
        ScalarOp::Mul => "x * s",
        ScalarOp::Div => "x / s",
        ScalarOp::Pow => "pow(x, s)",
    }
}

/// WGSL expression of `op` on `x`
fn unary_expr(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-x",
        UnaryOp::Abs => "abs(x)",
        UnaryOp::Sqrt => "sqrt(x)",
        UnaryOp::Sign => "select(-1.0, 1.0, x >= 0.0)",
        UnaryOp::IsZero => "select(0.0, 1.0, x == 0.0)",
    }
}

/// Storage bindings followed by a `Params { numel, scalar }` uniform
fn header(storage: &[&str]) -> String {
    let mut src = String::new();
    for (i, name) in storage.iter().enumerate() {
        src.push_str(&format!(
            "@group(0) @binding({i}) var<storage, read_write> {name}: array<f32>;\n"
        ));
    }
    src.push_str(&format!(
        r#"
struct Params {{
    numel: u32,
    scalar: f32,
    _pad0: u32,
    _pad1: u32,
}}
@group(0) @binding({}) var<uniform> params: Params;
"#,
        storage.len()
    ));
    src
}

/// One 1D entry point running `body` for every in-range `idx`
fn entry(name: &str, body: &str) -> String {
    format!(
        r#"
@compute @workgroup_size(256)
fn {name}(@builtin(global_invocation_id) gid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>) {{
    let idx = {FLAT_INDEX};
    if (idx >= params.numel) {{
        return;
    }}
    {body}
}}
"#
    )
}

fn binary_source() -> String {
    let mut src = header(&["a", "b", "dst"]);
    for op in BINARY_OPS {
        let body = format!("let x = a[idx];\n    let y = b[idx];\n    dst[idx] = {};", binary_expr(op));
        src.push_str(&entry(op.name(), &body));
    }
    src
}

fn binary_assign_source() -> String {
    let mut src = header(&["a", "b"]);
    for op in BINARY_OPS {
        let body = format!("let x = a[idx];\n    let y = b[idx];\n    a[idx] = {};", binary_expr(op));
        src.push_str(&entry(op.name(), &body));
    }
    src
}

fn scalar_source() -> String {
    let mut src = header(&["a", "dst"]);
    for op in SCALAR_OPS {
        let body = format!("let x = a[idx];\n    let s = params.scalar;\n    dst[idx] = {};", scalar_expr(op));
        src.push_str(&entry(op.name(), &body));
    }
    src
}

fn scale_assign_source() -> String {
    let mut src = header(&["a"]);
    src.push_str(&entry("scale_assign", "a[idx] = a[idx] * params.scalar;"));
    src
}

fn axpy_source() -> String {
    let mut src = header(&["a", "b", "dst"]);
    src.push_str(&entry("axpy", "dst[idx] = a[idx] + params.scalar * b[idx];"));
    src
}

fn axpy_assign_source() -> String {
    let mut src = header(&["a", "b"]);
    src.push_str(&entry("axpy_assign", "a[idx] = a[idx] + params.scalar * b[idx];"));
    src
}

fn unary_source() -> String {
    let mut src = header(&["a", "dst"]);
    for op in UNARY_OPS {
        let body = format!("let x = a[idx];\n    dst[idx] = {};", unary_expr(op));
        src.push_str(&entry(op.name(), &body));
    }
    src
}

macro_rules! cached_source {
    ($fn_name:ident, $gen:ident) => {
        fn $fn_name() -> String {
            static SRC: OnceLock<String> = OnceLock::new();
            SRC.get_or_init($gen).clone()
        }
    };
}

cached_source!(binary_wgsl, binary_source);
cached_source!(binary_assign_wgsl, binary_assign_source);
cached_source!(scalar_wgsl, scalar_source);
cached_source!(scale_assign_wgsl, scale_assign_source);
cached_source!(axpy_wgsl, axpy_source);
cached_source!(axpy_assign_wgsl, axpy_assign_source);
cached_source!(unary_wgsl, unary_source);

// ============================================================================
// Launchers
// ============================================================================

/// `out = op(a, b)`
#[allow(clippy::too_many_arguments)]
pub fn launch_binary(
    cache: &PipelineCache,
    queue: &Queue,
    op: BinaryOp,
    a: &Buffer,
    b: &Buffer,
    out: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    let dispatch = Dispatch {
        shader: "binary",
        entry_point: op.name(),
        buffers: &[a, b, out, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, binary_wgsl);
}

/// `a = op(a, b)`
pub fn launch_binary_assign(
    cache: &PipelineCache,
    queue: &Queue,
    op: BinaryOp,
    a: &Buffer,
    b: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    let dispatch = Dispatch {
        shader: "binary_assign",
        entry_point: op.name(),
        buffers: &[a, b, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, binary_assign_wgsl);
}

/// `out = op(a, params.scalar)`
pub fn launch_scalar(
    cache: &PipelineCache,
    queue: &Queue,
    op: ScalarOp,
    a: &Buffer,
    out: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    let dispatch = Dispatch {
        shader: "scalar",
        entry_point: op.name(),
        buffers: &[a, out, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, scalar_wgsl);
}

/// `a *= params.scalar`
pub fn launch_scale_assign(cache: &PipelineCache, queue: &Queue, a: &Buffer, params: &Buffer, numel: usize) {
    let dispatch = Dispatch {
        shader: "scale_assign",
        entry_point: "scale_assign",
        buffers: &[a, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, scale_assign_wgsl);
}

/// `out = a + params.scalar * b`
pub fn launch_axpy(
    cache: &PipelineCache,
    queue: &Queue,
    a: &Buffer,
    b: &Buffer,
    out: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    let dispatch = Dispatch {
        shader: "axpy",
        entry_point: "axpy",
        buffers: &[a, b, out, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, axpy_wgsl);
}

/// `a += params.scalar * b`
pub fn launch_axpy_assign(
    cache: &PipelineCache,
    queue: &Queue,
    a: &Buffer,
    b: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    let dispatch = Dispatch {
        shader: "axpy_assign",
        entry_point: "axpy_assign",
        buffers: &[a, b, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, axpy_assign_wgsl);
}

/// `out = op(a)`
pub fn launch_unary(
    cache: &PipelineCache,
    queue: &Queue,
    op: UnaryOp,
    a: &Buffer,
    out: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    let dispatch = Dispatch {
        shader: "unary",
        entry_point: op.name(),
        buffers: &[a, out, params],
        workgroups: grid_1d(numel),
    };
    launch(cache, queue, dispatch, unary_wgsl);
}
