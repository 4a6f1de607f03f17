//! Shrinkage kernels

use super::{PAR_CHUNK, for_each_chunk, for_each_chunk_pair};
use crate::ops::{kick_step, shrink2d_scalar, soft_shrink_scalar};

/// out = sign(x) * max(|x| - mu, 0)
pub(crate) fn soft_shrink(x: &[f32], mu: f32, out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        let end = start + chunk.len();
        for (o, &v) in chunk.iter_mut().zip(&x[start..end]) {
            *o = soft_shrink_scalar(v, mu);
        }
    });
}

/// Isotropic shrinkage with a per-element threshold `mu(i)`
pub(crate) fn shrink2d<M>(ax: &[f32], ay: &[f32], mu: M, out_x: &mut [f32], out_y: &mut [f32])
where
    M: Fn(usize) -> f32 + Send + Sync,
{
    for_each_chunk_pair(out_x, out_y, PAR_CHUNK, |start, cx, cy| {
        for (off, (ox, oy)) in cx.iter_mut().zip(cy.iter_mut()).enumerate() {
            let i = start + off;
            (*ox, *oy) = shrink2d_scalar(ax[i], ay[i], mu(i));
        }
    });
}

/// Per-entry kick step lengths for linearized Bregman
pub(crate) fn bregman_kick_steps(v: &[f32], r: &[f32], x: &[f32], mu: f32, out: &mut [f32]) {
    for_each_chunk(out, PAR_CHUNK, |start, chunk| {
        for (off, o) in chunk.iter_mut().enumerate() {
            let i = start + off;
            *o = kick_step(v[i], r[i], x[i], mu);
        }
    });
}
