//! Core Tensor type

use super::Storage;
use crate::error::{Error, Result};
use crate::runtime::{Device, Runtime};
use num_traits::ToPrimitive;
use std::fmt;

/// Dense f32 array stored on a compute device
///
/// `Tensor` is the fundamental data structure in proxr. It consists of:
/// - **Storage**: Reference-counted device memory
/// - **Shape**: Row-major dimensions; images are `[height, width]`
///
/// Cloning a tensor is zero-copy: both handles share one buffer. Operations
/// that mutate in place (`add_assign`, `axpy_assign`, ...) copy the buffer
/// first when it is shared, so a clone never observes a later mutation.
///
/// # Example
///
/// ```ignore
/// use proxr::prelude::*;
///
/// let device = CpuRuntime::default_device();
/// let img = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// assert_eq!(img.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
/// ```
pub struct Tensor<R: Runtime> {
    /// Device memory
    storage: Storage<R>,
    /// Row-major shape
    shape: Vec<usize>,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and shape
    pub fn from_parts(storage: Storage<R>, shape: &[usize]) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if numel != storage.len() {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![storage.len()],
            });
        }
        Ok(Self {
            storage,
            shape: shape.to_vec(),
        })
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice(data: &[f32], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions,
    /// or if memory allocation fails.
    pub fn try_from_slice(data: &[f32], shape: &[usize], device: &R::Device) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        Ok(Self {
            storage: Storage::from_slice(data, device)?,
            shape: shape.to_vec(),
        })
    }

    /// Upload host data of any numeric type, converting to f32
    ///
    /// Returns `InvalidArgument` if a value has no f32 representation.
    pub fn try_from_host<T: ToPrimitive + Copy>(
        data: &[T],
        shape: &[usize],
        device: &R::Device,
    ) -> Result<Self> {
        let converted = data
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.to_f32().ok_or_else(|| {
                    Error::invalid_argument("data", format!("element {i} is not representable as f32"))
                })
            })
            .collect::<Result<Vec<f32>>>()?;
        Self::try_from_slice(&converted, shape, device)
    }

    /// Upload host data of any numeric type, converting to f32
    ///
    /// # Panics
    ///
    /// Panics on a length mismatch or an unrepresentable value.
    /// For a fallible alternative, use [`Self::try_from_host`].
    pub fn from_host<T: ToPrimitive + Copy>(data: &[T], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_host(data, shape, device).expect("Tensor::from_host failed")
    }

    /// Create a tensor whose contents will be fully overwritten
    ///
    /// Device memory is zero-initialized on every backend, so this is
    /// equivalent to [`Self::zeros`].
    pub fn empty(shape: &[usize], device: &R::Device) -> Self {
        Self::try_empty(shape, device).expect("Tensor::empty failed")
    }

    /// Create a tensor whose contents will be fully overwritten (fallible version)
    pub fn try_empty(shape: &[usize], device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        Ok(Self {
            storage: Storage::new(len, device)?,
            shape: shape.to_vec(),
        })
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], device: &R::Device) -> Self {
        Self::try_zeros(shape, device).expect("Tensor::zeros failed")
    }

    /// Create a tensor filled with zeros (fallible version)
    pub fn try_zeros(shape: &[usize], device: &R::Device) -> Result<Self> {
        Self::try_empty(shape, device)
    }

    /// Create a zero tensor with the same shape and device as `self`
    pub fn try_zeros_like(&self) -> Result<Self> {
        Self::try_zeros(&self.shape, self.device())
    }

    /// Create a tensor filled with a constant
    pub fn full(shape: &[usize], value: f32, device: &R::Device) -> Self {
        Self::try_full(shape, value, device).expect("Tensor::full failed")
    }

    /// Create a tensor filled with a constant (fallible version)
    pub fn try_full(shape: &[usize], value: f32, device: &R::Device) -> Result<Self> {
        if value == 0.0 {
            return Self::try_zeros(shape, device);
        }
        let len: usize = shape.iter().product();
        Self::try_from_slice(&vec![value; len], shape, device)
    }

    // ===== Accessors =====

    /// Get the underlying storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Zero-copy reshape; the element count must be preserved
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        Self::from_parts(self.storage.clone(), shape)
    }

    /// Deep copy into a freshly allocated buffer on the same device
    pub fn try_copy(&self) -> Result<Self> {
        Ok(Self {
            storage: self.storage.duplicate()?,
            shape: self.shape.clone(),
        })
    }

    /// Ensure this tensor owns its buffer exclusively before a mutation
    pub(crate) fn make_unique(&mut self) -> Result<()> {
        if !self.storage.is_unique() {
            self.storage = self.storage.duplicate()?;
        }
        Ok(())
    }

    // ===== Data Access =====

    /// Copy tensor data to a Vec on the host
    ///
    /// # Panics
    ///
    /// Panics if the device transfer fails. Use [`Self::try_to_vec`] to handle it.
    pub fn to_vec(&self) -> Vec<f32> {
        self.try_to_vec().expect("copy_from_device failed in to_vec()")
    }

    /// Copy tensor data to a Vec on the host (fallible version)
    pub fn try_to_vec(&self) -> Result<Vec<f32>> {
        self.storage.to_vec()
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone creates a new tensor sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shape: self.shape.clone(),
        }
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("device", &self.device().name())
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, {})", self.shape, R::name())
    }
}
