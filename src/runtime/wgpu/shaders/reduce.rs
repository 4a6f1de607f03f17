//! Full-tensor reduction kernels.
//!
//! Each workgroup folds a grid-stride slice of the input into one partial
//! value in workgroup memory; the partials are read back and combined on the
//! host in f64.

use std::sync::OnceLock;
use wgpu::{Buffer, Queue};

use super::pipeline::{Dispatch, PipelineCache, WORKGROUP_SIZE, launch, workgroup_count};
use crate::ops::ReduceOp;

/// Upper bound on partial results per reduction
pub const MAX_REDUCE_GROUPS: u32 = 1024;

const REDUCE_OPS: [ReduceOp; 5] = [
    ReduceOp::Sum,
    ReduceOp::SumSq,
    ReduceOp::AbsSum,
    ReduceOp::Min,
    ReduceOp::Max,
];

/// (identity, map of `v`, combine of `x` and `y`) for each reduction
fn reduce_parts(op: ReduceOp) -> (&'static str, &'static str, &'static str) {
    match op {
        ReduceOp::Sum => ("0.0", "v", "x + y"),
        ReduceOp::SumSq => ("0.0", "v * v", "x + y"),
        ReduceOp::AbsSum => ("0.0", "abs(v)", "x + y"),
        ReduceOp::Min => ("3.40282347e+38", "v", "min(x, y)"),
        ReduceOp::Max => ("-3.40282347e+38", "v", "max(x, y)"),
    }
}

/// Tree reduction of `scratch` ending in `partials[wid.x]`
fn tree(combine: &str) -> String {
    format!(
        r#"    scratch[lid.x] = acc;
    workgroupBarrier();
    for (var s = 128u; s > 0u; s = s >> 1u) {{
        if (lid.x < s) {{
            let x = scratch[lid.x];
            let y = scratch[lid.x + s];
            scratch[lid.x] = {combine};
        }}
        workgroupBarrier();
    }}
    if (lid.x == 0u) {{
        partials[wid.x] = scratch[0];
    }}"#
    )
}

const PARAMS: &str = r#"
struct Params {
    numel: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}
var<workgroup> scratch: array<f32, 256>;
"#;

const BUILTINS: &str = "@builtin(global_invocation_id) gid: vec3<u32>, @builtin(local_invocation_id) lid: vec3<u32>, @builtin(workgroup_id) wid: vec3<u32>, @builtin(num_workgroups) nwg: vec3<u32>";

fn reduce_source() -> String {
    let mut src = String::from(
        "@group(0) @binding(0) var<storage, read_write> values: array<f32>;\n\
         @group(0) @binding(1) var<storage, read_write> partials: array<f32>;\n\
         @group(0) @binding(2) var<uniform> params: Params;\n",
    );
    src.push_str(PARAMS);
    for op in REDUCE_OPS {
        let (identity, map, combine) = reduce_parts(op);
        src.push_str(&format!(
            r#"
@compute @workgroup_size(256)
fn {name}({BUILTINS}) {{
    let stride = nwg.x * 256u;
    var acc: f32 = {identity};
    for (var i = gid.x; i < params.numel; i = i + stride) {{
        let v = values[i];
        let x = acc;
        let y = {map};
        acc = {combine};
    }}
{tree}
}}
"#,
            name = op.name(),
            tree = tree(combine),
        ));
    }
    src
}

fn dot_source() -> String {
    let mut src = String::from(
        "@group(0) @binding(0) var<storage, read_write> a: array<f32>;\n\
         @group(0) @binding(1) var<storage, read_write> b: array<f32>;\n\
         @group(0) @binding(2) var<storage, read_write> partials: array<f32>;\n\
         @group(0) @binding(3) var<uniform> params: Params;\n",
    );
    src.push_str(PARAMS);
    src.push_str(&format!(
        r#"
@compute @workgroup_size(256)
fn reduce_dot({BUILTINS}) {{
    let stride = nwg.x * 256u;
    var acc: f32 = 0.0;
    for (var i = gid.x; i < params.numel; i = i + stride) {{
        acc = acc + a[i] * b[i];
    }}
{tree}
}}
"#,
        tree = tree("x + y"),
    ));
    src
}

/// Number of workgroups (and partials) used to reduce `numel` elements
#[inline]
pub fn reduce_groups(numel: usize) -> u32 {
    workgroup_count(numel).clamp(1, MAX_REDUCE_GROUPS)
}

/// Fold `input` into `reduce_groups(numel)` partials
pub fn launch_reduce(
    cache: &PipelineCache,
    queue: &Queue,
    op: ReduceOp,
    input: &Buffer,
    partials: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "reduce",
        entry_point: op.name(),
        buffers: &[input, partials, params],
        workgroups: (reduce_groups(numel), 1, 1),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(reduce_source).clone());
}

/// Fold `a · b` into `reduce_groups(numel)` partials
pub fn launch_dot(
    cache: &PipelineCache,
    queue: &Queue,
    a: &Buffer,
    b: &Buffer,
    partials: &Buffer,
    params: &Buffer,
    numel: usize,
) {
    static SRC: OnceLock<String> = OnceLock::new();
    let dispatch = Dispatch {
        shader: "reduce_dot",
        entry_point: "reduce_dot",
        buffers: &[a, b, partials, params],
        workgroups: (reduce_groups(numel), 1, 1),
    };
    launch(cache, queue, dispatch, || SRC.get_or_init(dot_source).clone());
}
