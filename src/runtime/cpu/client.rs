//! CPU client implementation

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::runtime::RuntimeClient;

/// Default tile staging budget in bytes (a typical L1 data cache)
pub const DEFAULT_LOCAL_MEM_SIZE: usize = 32 * 1024;

/// Default number of "invocations" a tile may cover
pub const DEFAULT_MAX_WORKGROUP_SIZE: usize = 1024;

/// CPU client for operation dispatch
#[derive(Clone, Debug)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    local_mem_size: usize,
    max_workgroup_size: usize,
}

impl CpuClient {
    /// Create a new CPU client
    pub fn new(device: CpuDevice) -> Self {
        Self::with_limits(device, DEFAULT_LOCAL_MEM_SIZE, DEFAULT_MAX_WORKGROUP_SIZE)
    }

    /// Create a CPU client with explicit tiling limits
    ///
    /// Useful to exercise the naive convolution fallback, or to mirror the
    /// limits of a GPU when comparing backends.
    pub fn with_limits(device: CpuDevice, local_mem_size: usize, max_workgroup_size: usize) -> Self {
        Self {
            device,
            local_mem_size,
            max_workgroup_size,
        }
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU operations are synchronous, nothing to do
    }

    fn local_mem_size(&self) -> usize {
        self.local_mem_size
    }

    fn max_workgroup_size(&self) -> usize {
        self.max_workgroup_size
    }
}
