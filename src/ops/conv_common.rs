//! Shared configuration and validation for 2D convolution.
//!
//! Every backend runs the same checks and the same kernel-selection rule, so
//! a given image/kernel pair produces the same result class on CPU and GPU.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Edge length of the square output tile computed by one workgroup.
pub const CONV_TILE: usize = 16;

/// Boundary extension used when a kernel window leaves the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Padding {
    /// Out-of-range pixels read as 0.
    #[default]
    Zero,
    /// Out-of-range pixels replicate the nearest edge pixel.
    Same,
    /// Out-of-range pixels wrap around periodically.
    Wrap,
}

impl Padding {
    /// Map a possibly out-of-range index to a source index.
    ///
    /// Returns `None` when the pixel contributes zero.
    #[inline]
    pub fn resolve(self, i: isize, n: usize) -> Option<usize> {
        let n_i = n as isize;
        match self {
            Padding::Zero => (0..n_i).contains(&i).then_some(i as usize),
            Padding::Same => Some(i.clamp(0, n_i - 1) as usize),
            Padding::Wrap => Some(i.rem_euclid(n_i) as usize),
        }
    }

    /// Returns the name of the padding mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Padding::Zero => "zero",
            Padding::Same => "same",
            Padding::Wrap => "wrap",
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Padding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zero" => Ok(Padding::Zero),
            "same" => Ok(Padding::Same),
            "wrap" => Ok(Padding::Wrap),
            other => Err(Error::invalid_argument(
                "padding",
                format!("unknown padding mode '{other}' (expected zero, same or wrap)"),
            )),
        }
    }
}

/// Kernel selection for [`ConvOps::convolve2d_with_strategy`](crate::ops::ConvOps::convolve2d_with_strategy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvStrategy {
    /// Tiled when the tile fits the device limits, naive otherwise.
    #[default]
    Auto,
    /// One output pixel per invocation, reading straight from the image.
    Naive,
    /// Image tile plus halo staged in workgroup-local memory.
    Tiled,
}

/// Geometry of a 2D convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dParams {
    /// Image height
    pub height: usize,
    /// Image width
    pub width: usize,
    /// Kernel height (odd)
    pub kh: usize,
    /// Kernel width (odd)
    pub kw: usize,
    /// Boundary extension
    pub padding: Padding,
}

impl Conv2dParams {
    /// Row offset of the kernel centre.
    #[inline]
    pub fn center_row(&self) -> isize {
        ((self.kh - 1) / 2) as isize
    }

    /// Column offset of the kernel centre.
    #[inline]
    pub fn center_col(&self) -> isize {
        ((self.kw - 1) / 2) as isize
    }

    /// Height of the staged tile including its halo.
    #[inline]
    pub fn tile_rows(&self) -> usize {
        CONV_TILE + self.kh - 1
    }

    /// Width of the staged tile including its halo.
    #[inline]
    pub fn tile_cols(&self) -> usize {
        CONV_TILE + self.kw - 1
    }
}

/// Whether the tiled kernel can run for this kernel size on a device.
pub fn tiled_fits(kh: usize, kw: usize, local_mem_size: usize, max_workgroup_size: usize) -> bool {
    let staged = (CONV_TILE + kh - 1) * (CONV_TILE + kw - 1) * std::mem::size_of::<f32>();
    kh <= CONV_TILE
        && kw <= CONV_TILE
        && staged <= local_mem_size
        && CONV_TILE * CONV_TILE <= max_workgroup_size
}

/// Resolve a requested strategy against the device limits.
///
/// Never returns [`ConvStrategy::Auto`].
pub fn select_strategy(
    requested: ConvStrategy,
    params: &Conv2dParams,
    local_mem_size: usize,
    max_workgroup_size: usize,
    backend: &'static str,
) -> Result<ConvStrategy> {
    let fits = tiled_fits(params.kh, params.kw, local_mem_size, max_workgroup_size);
    match requested {
        ConvStrategy::Auto if fits => Ok(ConvStrategy::Tiled),
        ConvStrategy::Auto | ConvStrategy::Naive => Ok(ConvStrategy::Naive),
        ConvStrategy::Tiled if fits => Ok(ConvStrategy::Tiled),
        ConvStrategy::Tiled => Err(Error::backend_limitation(
            backend,
            "convolve2d",
            format!(
                "{}x{} kernel needs a {}x{} tile; device offers {} bytes of local memory and {} invocations per workgroup",
                params.kh,
                params.kw,
                params.tile_rows(),
                params.tile_cols(),
                local_mem_size,
                max_workgroup_size
            ),
        )),
    }
}

/// Validates a 2D kernel shape and returns `(kh, kw)`.
pub fn validate_kernel_2d(shape: &[usize]) -> Result<(usize, usize)> {
    match shape {
        [kh, kw] => validate_window(*kh, *kw),
        _ => Err(Error::invalid_argument(
            "kernel",
            format!("expected a 2D kernel, got shape {:?}", shape),
        )),
    }
}

/// Validates a spatially-varying kernel against an image of `height x width`.
///
/// The kernel layout is `[kh, kw, height, width]`.
pub fn validate_kernel_sv(shape: &[usize], height: usize, width: usize) -> Result<(usize, usize)> {
    match shape {
        [kh, kw, h, w] if *h == height && *w == width => validate_window(*kh, *kw),
        [kh, kw, h, w] => Err(Error::shape_mismatch(&[*kh, *kw, height, width], &[*kh, *kw, *h, *w])),
        _ => Err(Error::invalid_argument(
            "kernel",
            format!("expected a 4D spatially-varying kernel, got shape {:?}", shape),
        )),
    }
}

fn validate_window(kh: usize, kw: usize) -> Result<(usize, usize)> {
    if kh % 2 == 0 || kw % 2 == 0 {
        return Err(Error::invalid_argument(
            "kernel",
            format!("kernel dimensions must be odd, got {kh}x{kw}"),
        ));
    }
    Ok((kh, kw))
}
