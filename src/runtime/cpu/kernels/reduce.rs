//! Full reductions with f64 accumulation
//!
//! Partial results are computed per fixed-size chunk and combined in chunk
//! order, so the result is bitwise reproducible regardless of threading.

use super::PAR_CHUNK;
use crate::ops::ReduceOp;

fn chunk_partials<F>(len: usize, f: F) -> Vec<f64>
where
    F: Fn(usize, usize) -> f64 + Send + Sync,
{
    let chunks = len.div_ceil(PAR_CHUNK);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        if chunks > 1 {
            return (0..chunks)
                .into_par_iter()
                .map(|c| f(c * PAR_CHUNK, ((c + 1) * PAR_CHUNK).min(len)))
                .collect();
        }
    }

    (0..chunks)
        .map(|c| f(c * PAR_CHUNK, ((c + 1) * PAR_CHUNK).min(len)))
        .collect()
}

/// Reduce every element of `a`
pub(crate) fn reduce(op: ReduceOp, a: &[f32]) -> f64 {
    chunk_partials(a.len(), |start, end| {
        a[start..end]
            .iter()
            .fold(op.identity(), |acc, &x| op.combine(acc, op.map(x as f64)))
    })
    .into_iter()
    .fold(op.identity(), |acc, p| op.combine(acc, p))
}

/// Σ a * b
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f64 {
    chunk_partials(a.len(), |start, end| {
        a[start..end]
            .iter()
            .zip(&b[start..end])
            .map(|(&x, &y)| x as f64 * y as f64)
            .sum::<f64>()
    })
    .into_iter()
    .sum()
}
