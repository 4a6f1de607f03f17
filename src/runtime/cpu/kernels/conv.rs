//! CPU 2D convolution kernels
//!
//! Direct same-size convolution. Output rows are processed in parallel
//! bands; each output pixel accumulates its window in a fixed (a, b) order
//! so the naive and tiled paths agree to the last bit.

use super::for_each_chunk;
use crate::ops::{CONV_TILE, Conv2dParams, Padding};

#[inline]
fn fetch(x: &[f32], i: isize, j: isize, p: &Conv2dParams) -> f32 {
    match (p.padding.resolve(i, p.height), p.padding.resolve(j, p.width)) {
        (Some(r), Some(c)) => x[r * p.width + c],
        _ => 0.0,
    }
}

/// One invocation per output pixel, reading straight from the image
pub(crate) fn conv2d_naive(x: &[f32], k: &[f32], out: &mut [f32], p: Conv2dParams) {
    let (ca, cb) = (p.center_row(), p.center_col());
    for_each_chunk(out, p.width, |start, row| {
        let i = (start / p.width) as isize;
        for (j, o) in row.iter_mut().enumerate() {
            let j = j as isize;
            let mut acc = 0.0f32;
            for a in 0..p.kh {
                for b in 0..p.kw {
                    acc += k[a * p.kw + b] * fetch(x, i + a as isize - ca, j + b as isize - cb, &p);
                }
            }
            *o = acc;
        }
    });
}

/// Tiled convolution: stage each output tile plus halo, then accumulate
///
/// Each band covers `CONV_TILE` image rows. The staging buffer holds
/// `(TILE + kh - 1) x (TILE + kw - 1)` values with padding already applied.
pub(crate) fn conv2d_tiled(x: &[f32], k: &[f32], out: &mut [f32], p: Conv2dParams) {
    let (ca, cb) = (p.center_row(), p.center_col());
    let (sh, sw) = (p.tile_rows(), p.tile_cols());
    let tiles_x = p.width.div_ceil(CONV_TILE);

    for_each_chunk(out, CONV_TILE * p.width, |start, band| {
        let tile_row = start / p.width;
        let rows = band.len() / p.width;
        let mut tile = vec![0.0f32; sh * sw];

        for tx in 0..tiles_x {
            let col0 = tx * CONV_TILE;
            let cols = CONV_TILE.min(p.width - col0);
            let r0 = tile_row as isize - ca;
            let c0 = col0 as isize - cb;

            for sr in 0..sh {
                for sc in 0..sw {
                    tile[sr * sw + sc] = fetch(x, r0 + sr as isize, c0 + sc as isize, &p);
                }
            }

            for li in 0..rows {
                for lj in 0..cols {
                    let mut acc = 0.0f32;
                    for a in 0..p.kh {
                        for b in 0..p.kw {
                            acc += k[a * p.kw + b] * tile[(li + a) * sw + lj + b];
                        }
                    }
                    band[li * p.width + col0 + lj] = acc;
                }
            }
        }
    });
}

/// 180 degree rotation of a row-major kernel: reverse the element order
pub(crate) fn rotate180(k: &[f32], out: &mut [f32]) {
    for (o, &v) in out.iter_mut().zip(k.iter().rev()) {
        *o = v;
    }
}

/// Spatially-varying convolution with a `[kh, kw, H, W]` kernel
pub(crate) fn conv2d_sv(x: &[f32], k: &[f32], out: &mut [f32], p: Conv2dParams) {
    let (ca, cb) = (p.center_row(), p.center_col());
    let plane = p.height * p.width;
    for_each_chunk(out, p.width, |start, row| {
        let i = start / p.width;
        for (j, o) in row.iter_mut().enumerate() {
            let pix = i * p.width + j;
            let mut acc = 0.0f32;
            for a in 0..p.kh {
                for b in 0..p.kw {
                    let w = k[(a * p.kw + b) * plane + pix];
                    acc += w * fetch(
                        x,
                        i as isize + a as isize - ca,
                        j as isize + b as isize - cb,
                        &p,
                    );
                }
            }
            *o = acc;
        }
    });
}

/// Adjoint kernel of a spatially-varying kernel (zero padding)
///
/// `kt[a', b', m, n] = k[kh-1-a', kw-1-b', m + a' - ca, n + b' - cb]`.
pub(crate) fn transpose_sv(k: &[f32], out: &mut [f32], p: Conv2dParams) {
    let (ca, cb) = (p.center_row(), p.center_col());
    let plane = p.height * p.width;
    let zero = Conv2dParams {
        padding: Padding::Zero,
        ..p
    };
    for_each_chunk(out, plane, |start, slice| {
        let window = start / plane;
        let (a_t, b_t) = (window / p.kw, window % p.kw);
        let src_window = (p.kh - 1 - a_t) * p.kw + (p.kw - 1 - b_t);
        let src = &k[src_window * plane..(src_window + 1) * plane];
        for (pix, o) in slice.iter_mut().enumerate() {
            let (m, n) = ((pix / p.width) as isize, (pix % p.width) as isize);
            *o = fetch(src, m + a_t as isize - ca, n + b_t as isize - cb, &zero);
        }
    });
}
