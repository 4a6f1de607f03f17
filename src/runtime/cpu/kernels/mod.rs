//! CPU compute kernels
//!
//! Kernels operate on plain slices in row-major order. Work is split into
//! fixed-size chunks (or image row bands) so results do not depend on the
//! number of threads.

pub(crate) mod conv;
pub(crate) mod elementwise;
pub(crate) mod proximal;
pub(crate) mod reduce;
pub(crate) mod stencil;

/// Elements per parallel task for element-wise kernels
pub(crate) const PAR_CHUNK: usize = 1 << 14;

/// Run `f(start, chunk)` over consecutive chunks of `out`
///
/// `start` is the index of the chunk's first element in `out`.
#[inline]
pub(crate) fn for_each_chunk<F>(out: &mut [f32], chunk_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    let chunk_len = chunk_len.max(1);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        if out.len() > chunk_len {
            out.par_chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(c, chunk)| f(c * chunk_len, chunk));
            return;
        }
    }

    for (c, chunk) in out.chunks_mut(chunk_len).enumerate() {
        f(c * chunk_len, chunk);
    }
}

/// Run `f(start, a_chunk, b_chunk)` over matching chunks of two outputs
#[inline]
pub(crate) fn for_each_chunk_pair<F>(a: &mut [f32], b: &mut [f32], chunk_len: usize, f: F)
where
    F: Fn(usize, &mut [f32], &mut [f32]) + Send + Sync,
{
    debug_assert_eq!(a.len(), b.len());
    let chunk_len = chunk_len.max(1);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        if a.len() > chunk_len {
            a.par_chunks_mut(chunk_len)
                .zip(b.par_chunks_mut(chunk_len))
                .enumerate()
                .for_each(|(c, (ca, cb))| f(c * chunk_len, ca, cb));
            return;
        }
    }

    for (c, (ca, cb)) in a.chunks_mut(chunk_len).zip(b.chunks_mut(chunk_len)).enumerate() {
        f(c * chunk_len, ca, cb);
    }
}
