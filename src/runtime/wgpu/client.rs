//! WebGPU client implementation.
//!
//! `WgpuClient` owns the WebGPU device and queue for operation dispatch.
//! It is `Clone`; clones share the device, queue and pipeline cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, Device, Queue};

use super::WgpuRuntime;
use super::cache::get_or_create_client;
use super::device::{WgpuDevice, WgpuError, query_adapter_info_blocking};
use super::shaders::PipelineCache;
use crate::error::{Error, Result};
use crate::runtime::RuntimeClient;

/// Upper bound on any single GPU wait
const POLL_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// WgpuClient
// ============================================================================

/// WebGPU runtime client.
///
/// All tensor operations are submitted through this client's queue. Kernels
/// are enqueued without waiting; host reads block until the queue drains.
#[derive(Clone)]
pub struct WgpuClient {
    /// GPU device identifier
    pub(crate) device_id: WgpuDevice,

    /// WebGPU device handle
    pub(crate) wgpu_device: Arc<Device>,

    /// WebGPU queue for command submission
    pub(crate) queue: Arc<Queue>,

    /// Pipeline cache for compute shaders
    pub(crate) pipeline_cache: Arc<PipelineCache>,
}

impl std::fmt::Debug for WgpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuClient")
            .field("device", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl WgpuClient {
    /// Get the client for a device, initializing the GPU on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if no suitable adapter is found or device creation
    /// fails.
    pub fn new(device: WgpuDevice) -> std::result::Result<Self, WgpuError> {
        get_or_create_client(&device)
    }

    /// Create a client bypassing the per-device cache.
    pub(super) fn new_uncached(device: WgpuDevice) -> std::result::Result<Self, WgpuError> {
        let (adapter, info) = query_adapter_info_blocking(device.index)?;

        // Ask for the adapter's own limits so large workgroup storage and
        // buffer sizes are usable
        let required_limits = adapter.limits();
        let (wgpu_device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("proxr WebGPU Device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            },
        ))
        .map_err(|e| WgpuError::DeviceError(format!("{:?}", e)))?;

        let wgpu_device = Arc::new(wgpu_device);
        let queue = Arc::new(queue);
        let pipeline_cache = Arc::new(PipelineCache::new(wgpu_device.clone()));

        tracing::debug!(
            adapter = %adapter.get_info().name,
            backend = ?adapter.get_info().backend,
            "created WebGPU device"
        );

        Ok(Self {
            device_id: WgpuDevice::with_info(device.index, info),
            wgpu_device,
            queue,
            pipeline_cache,
        })
    }

    /// Get reference to the WebGPU device.
    #[inline]
    pub fn wgpu_device(&self) -> &Device {
        &self.wgpu_device
    }

    /// Get reference to the WebGPU queue.
    #[inline]
    pub fn wgpu_queue(&self) -> &Queue {
        &self.queue
    }

    /// Get reference to the pipeline cache.
    #[inline]
    pub(crate) fn pipeline_cache(&self) -> &PipelineCache {
        &self.pipeline_cache
    }

    /// Create a storage buffer and register it, returning its handle.
    pub(crate) fn allocate_buffer(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        if size_bytes as u64 > self.wgpu_device.limits().max_buffer_size {
            return Err(Error::OutOfMemory { size: size_bytes });
        }

        // WebGPU requires buffer sizes to be aligned to 4 bytes
        let aligned_size = size_bytes.div_ceil(4) * 4;

        // New buffers are zero-initialized by wgpu
        let buffer = self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some("proxr tensor buffer"),
            size: aligned_size as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let id = BUFFER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        buffer_registry().lock().insert(id, Arc::new(buffer));
        Ok(id)
    }

    /// Create a staging buffer for CPU readback.
    pub(crate) fn create_staging_buffer(&self, label: &str, size: u64) -> Buffer {
        self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Submit commands and wait for completion.
    pub(crate) fn submit_and_wait(&self, encoder: wgpu::CommandEncoder) -> Result<()> {
        let submission = self.queue.submit(std::iter::once(encoder.finish()));
        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: Some(POLL_TIMEOUT),
            })
            .map_err(|e| Error::Backend(format!("GPU poll failed: {e}")))?;
        Ok(())
    }

    /// Read a mapped staging buffer back to the host (blocking).
    pub(crate) fn read_buffer(&self, staging: &Buffer, output: &mut [u8]) -> Result<()> {
        let slice = staging.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(POLL_TIMEOUT),
            })
            .map_err(|e| Error::Backend(format!("GPU poll failed during buffer read: {e}")))?;

        let map_result = receiver.recv().map_err(|_| {
            Error::Backend("map_async callback was not invoked during buffer read".into())
        })?;
        map_result
            .map_err(|e| Error::Backend(format!("map_async failed during buffer read: {e}")))?;

        {
            let data = slice.get_mapped_range();
            output.copy_from_slice(&data[..output.len()]);
        }

        staging.unmap();
        Ok(())
    }
}

impl RuntimeClient<WgpuRuntime> for WgpuClient {
    fn device(&self) -> &WgpuDevice {
        &self.device_id
    }

    fn synchronize(&self) {
        let _ = self.wgpu_device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(POLL_TIMEOUT),
        });
    }

    fn local_mem_size(&self) -> usize {
        self.wgpu_device.limits().max_compute_workgroup_storage_size as usize
    }

    fn max_workgroup_size(&self) -> usize {
        self.wgpu_device.limits().max_compute_invocations_per_workgroup as usize
    }
}

// ============================================================================
// Buffer registry
// ============================================================================

/// Global buffer registry mapping allocation ids to buffers.
///
/// WebGPU doesn't expose raw device pointers, so tensors carry an id that
/// resolves to a `wgpu::Buffer` here.
static BUFFER_REGISTRY: OnceLock<Mutex<HashMap<u64, Arc<Buffer>>>> = OnceLock::new();

/// Counter for generating unique buffer ids (0 is the null handle).
static BUFFER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn buffer_registry() -> &'static Mutex<HashMap<u64, Arc<Buffer>>> {
    BUFFER_REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Get a buffer by its id.
pub(crate) fn get_buffer(id: u64) -> Option<Arc<Buffer>> {
    if id == 0 {
        return None;
    }
    buffer_registry().lock().get(&id).cloned()
}

/// Drop a buffer from the registry; GPU memory is released with the last `Arc`.
pub(crate) fn release_buffer(id: u64) {
    if id == 0 {
        return;
    }
    buffer_registry().lock().remove(&id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device as _;

    #[test]
    fn test_wgpu_client_creation() {
        match WgpuClient::new(WgpuDevice::new(0)) {
            Ok(client) => {
                assert_eq!(client.device().id(), 0);
                assert!(client.max_workgroup_size() >= 256);
                assert!(client.local_mem_size() > 0);
            }
            Err(e) => {
                println!("No GPU available, skipping test: {}", e);
            }
        }
    }

    #[test]
    fn test_buffer_registry() {
        match WgpuClient::new(WgpuDevice::new(0)) {
            Ok(client) => {
                let id = client.allocate_buffer(1024).expect("allocation should succeed");
                assert_ne!(id, 0);
                assert!(get_buffer(id).is_some());

                release_buffer(id);
                assert!(get_buffer(id).is_none());
            }
            Err(e) => {
                println!("No GPU available, skipping test: {}", e);
            }
        }
    }
}
