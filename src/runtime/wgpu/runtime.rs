//! WebGPU runtime implementation

use super::cache::get_or_create_client;
use super::client::{WgpuClient, get_buffer, release_buffer};
use super::device::WgpuDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// WebGPU runtime adapter
///
/// Implements the generic Runtime trait for the WebGPU backend.
#[derive(Clone, Debug, Default)]
pub struct WgpuRuntime;

impl Runtime for WgpuRuntime {
    type Device = WgpuDevice;
    type Client = WgpuClient;

    fn name() -> &'static str {
        "wgpu"
    }

    /// Allocate a zero-initialized storage buffer.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        get_or_create_client(device)?.allocate_buffer(size_bytes)
    }

    fn deallocate(ptr: u64, _size_bytes: usize, _device: &Self::Device) {
        release_buffer(ptr);
    }

    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;
        let buffer = get_buffer(dst)
            .ok_or_else(|| Error::Backend("Buffer not found for copy_to_device".into()))?;

        // Queue writes are ordered before any later submission
        client.queue.write_buffer(&buffer, 0, src);
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;
        let buffer = get_buffer(src)
            .ok_or_else(|| Error::Backend("Buffer not found for copy_from_device".into()))?;

        let size = (dst.len() as u64).div_ceil(4) * 4;
        let staging = client.create_staging_buffer("copy_staging", size);

        let mut encoder = client
            .wgpu_device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("copy_from_device"),
            });
        encoder.copy_buffer_to_buffer(&buffer, 0, &staging, 0, size);
        client.submit_and_wait(encoder)?;

        client.read_buffer(&staging, dst)
    }

    fn copy_within_device(
        src: u64,
        dst: u64,
        size_bytes: usize,
        device: &Self::Device,
    ) -> Result<()> {
        if size_bytes == 0 || src == 0 || dst == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;
        let src_buffer =
            get_buffer(src).ok_or_else(|| Error::Backend("Source buffer not found".into()))?;
        let dst_buffer =
            get_buffer(dst).ok_or_else(|| Error::Backend("Destination buffer not found".into()))?;

        let mut encoder = client
            .wgpu_device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("copy_within_device"),
            });
        let size = (size_bytes as u64).div_ceil(4) * 4;
        encoder.copy_buffer_to_buffer(&src_buffer, 0, &dst_buffer, 0, size);
        client.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn default_device() -> Self::Device {
        WgpuDevice::new(0)
    }

    /// # Panics
    ///
    /// Panics if no WebGPU adapter is available. Check with
    /// [`is_wgpu_available`] or use [`WgpuClient::new`] to handle it.
    fn default_client(device: &Self::Device) -> Self::Client {
        match get_or_create_client(device) {
            Ok(client) => client,
            Err(e) => panic!("failed to create WebGPU client for {:?}: {}", device, e),
        }
    }
}

/// Whether a WebGPU adapter can be initialized on this machine.
pub fn is_wgpu_available() -> bool {
    get_or_create_client(&WgpuDevice::new(0)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    #[test]
    fn test_roundtrip_and_copy() {
        if !is_wgpu_available() {
            println!("No GPU available, skipping test");
            return;
        }
        let device = WgpuRuntime::default_device();
        let a = Tensor::<WgpuRuntime>::from_slice(&[1.0, 2.0, 3.0], &[3], &device);
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);

        let b = a.try_copy().unwrap();
        assert_ne!(a.storage().ptr(), b.storage().ptr());
        assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0]);

        let z = Tensor::<WgpuRuntime>::zeros(&[5], &device);
        assert_eq!(z.to_vec(), vec![0.0; 5]);
    }
}
