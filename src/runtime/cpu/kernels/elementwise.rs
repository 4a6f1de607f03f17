//! Element-wise kernels

use super::{PAR_CHUNK, for_each_chunk};
use crate::ops::{BinaryOp, ScalarOp, UnaryOp};

/// out = op(a, b)
pub(crate) fn binary_op(op: BinaryOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for ((o, &x), &y) in chunk.iter_mut().zip(&a[start..end]).zip(&b[start..end]) {
            *o = op.apply(x, y);
        }
    });
}

/// a = op(a, b)
pub(crate) fn binary_op_assign(op: BinaryOp, a: &mut [f32], b: &[f32]) {
    for_each_chunk(a, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for (x, &y) in chunk.iter_mut().zip(&b[start..end]) {
            *x = op.apply(*x, y);
        }
    });
}

/// out = op(a, s)
pub(crate) fn scalar_op(op: ScalarOp, a: &[f32], scalar: f32, out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for (o, &x) in chunk.iter_mut().zip(&a[start..end]) {
            *o = op.apply(x, scalar);
        }
    });
}

/// a = op(a, s)
pub(crate) fn scalar_op_assign(op: ScalarOp, a: &mut [f32], scalar: f32) {
    for_each_chunk(a, PAR_CHUNK, |_, chunk| {
        for x in chunk.iter_mut() {
            *x = op.apply(*x, scalar);
        }
    });
}

/// out = a + alpha * b
pub(crate) fn axpy(a: &[f32], alpha: f32, b: &[f32], out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for ((o, &x), &y) in chunk.iter_mut().zip(&a[start..end]).zip(&b[start..end]) {
            *o = x + alpha * y;
        }
    });
}

/// a += alpha * b
pub(crate) fn axpy_assign(a: &mut [f32], alpha: f32, b: &[f32]) {
    for_each_chunk(a, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for (x, &y) in chunk.iter_mut().zip(&b[start..end]) {
            *x += alpha * y;
        }
    });
}

/// out = op(a)
pub(crate) fn unary_op(op: UnaryOp, a: &[f32], out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for (o, &x) in chunk.iter_mut().zip(&a[start..end]) {
            *o = op.apply(x);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_large_is_chunked_correctly() {
        let n = 3 * PAR_CHUNK + 17;
        let a: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let b = vec![2.0f32; n];
        let mut out = vec![0.0f32; n];
        binary_op(BinaryOp::Mul, &a, &b, &mut out);
        assert!(out.iter().enumerate().all(|(i, &v)| v == 2.0 * i as f32));
    }

    #[test]
    fn test_axpy_assign() {
        let mut a = vec![1.0f32, 2.0, 3.0];
        axpy_assign(&mut a, -0.5, &[2.0, 2.0, 2.0]);
        assert_eq!(a, vec![0.0, 1.0, 2.0]);
    }
}
