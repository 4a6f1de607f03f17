//! Trait for runtime clients that handle operation dispatch

use super::Runtime;

/// Trait for runtime clients that handle operation dispatch
///
/// A client is the compute session every operation runs against. Besides
/// synchronization it reports the two device limits that decide whether the
/// tiled convolution kernel can be used.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    fn synchronize(&self);

    /// Bytes of fast memory shared by one workgroup (tile staging area)
    fn local_mem_size(&self) -> usize;

    /// Maximum number of invocations in one workgroup
    fn max_workgroup_size(&self) -> usize;
}
