//! Finite-difference stencil kernels

use super::{PAR_CHUNK, for_each_chunk, for_each_chunk_pair};

/// Forward-difference gradient with zero last column/row
pub(crate) fn grad2d(x: &[f32], gx: &mut [f32], gy: &mut [f32], height: usize, width: usize) {
    for_each_chunk_pair(gx, gy, width, |start, row_x, row_y| {
        let i = start / width;
        for j in 0..width {
            let idx = start + j;
            row_x[j] = if j + 1 < width { x[idx + 1] - x[idx] } else { 0.0 };
            row_y[j] = if i + 1 < height { x[idx + width] - x[idx] } else { 0.0 };
        }
    });
}

/// Backward-difference divergence, the negative adjoint of [`grad2d`]
pub(crate) fn divergence2d(px: &[f32], py: &[f32], out: &mut [f32], height: usize, width: usize) {
    for_each_chunk(out, width, |start, row| {
        let i = start / width;
        for (j, o) in row.iter_mut().enumerate() {
            let idx = start + j;
            let mut d = 0.0f32;
            if j + 1 < width {
                d += px[idx];
            }
            if j > 0 {
                d -= px[idx - 1];
            }
            if i + 1 < height {
                d += py[idx];
            }
            if i > 0 {
                d -= py[idx - width];
            }
            *o = d;
        }
    });
}

/// sqrt(gx² + gy²)
pub(crate) fn norm2d(gx: &[f32], gy: &[f32], out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for ((o, &a), &b) in chunk.iter_mut().zip(&gx[start..end]).zip(&gy[start..end]) {
            *o = (a * a + b * b).sqrt();
        }
    });
}
