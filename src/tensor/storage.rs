//! Storage: device memory management with Arc-based sharing

use crate::error::Result;
use crate::runtime::Runtime;
use std::sync::Arc;

/// Size of one stored element (f32)
pub(crate) const ELEM_SIZE: usize = std::mem::size_of::<f32>();

/// Storage for tensor data on a device
///
/// Storage wraps device memory with reference counting, so cloning a tensor
/// or reshaping it shares the underlying buffer.
///
/// Memory is automatically deallocated when the last reference is dropped.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Raw device handle (GPU buffer id or CPU ptr cast to u64)
    ptr: u64,
    /// Number of f32 elements (not bytes)
    len: usize,
    /// Device where memory is allocated
    device: R::Device,
}

impl<R: Runtime> Storage<R> {
    /// Create new zero-initialized storage
    ///
    /// Allocates `len` f32 elements on the specified device.
    pub fn new(len: usize, device: &R::Device) -> Result<Self> {
        let ptr = R::allocate(len * ELEM_SIZE, device)?;
        Ok(Self::wrap(ptr, len, device))
    }

    /// Create storage holding a copy of `data`
    pub fn from_slice(data: &[f32], device: &R::Device) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let ptr = R::allocate(bytes.len(), device)?;
        let storage = Self::wrap(ptr, data.len(), device);
        R::copy_to_device(bytes, ptr, device)?;
        Ok(storage)
    }

    fn wrap(ptr: u64, len: usize, device: &R::Device) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                device: device.clone(),
            }),
        }
    }

    /// Get the raw device handle
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.len * ELEM_SIZE
    }

    /// Check if this is the only reference
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Allocate new storage with identical contents (device-side copy)
    pub fn duplicate(&self) -> Result<Self> {
        let copy = Self::new(self.len(), self.device())?;
        if !self.is_empty() {
            R::copy_within_device(self.ptr(), copy.ptr(), self.size_in_bytes(), self.device())?;
        }
        Ok(copy)
    }

    /// Copy data from device to host
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        let mut result = vec![0.0f32; self.inner.len];
        if !result.is_empty() {
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
            R::copy_from_device(self.inner.ptr, bytes, &self.inner.device)?;
        }
        Ok(result)
    }
}

impl<R: Runtime> Clone for Storage<R> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for StorageInner<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            R::deallocate(self.ptr, self.len * ELEM_SIZE, &self.device);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}
