//! WGSL compute pipeline infrastructure
//!
//! Pipeline caching and dispatch utilities shared by every kernel launcher.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, ComputePipeline,
    ComputePipelineDescriptor, Device, PipelineLayoutDescriptor, Queue, ShaderModule,
    ShaderModuleDescriptor, ShaderSource, ShaderStages,
};

/// Workgroup size for one-dimensional kernels
pub const WORKGROUP_SIZE: u32 = 256;

/// Per-dimension dispatch limit guaranteed by WebGPU
const MAX_WORKGROUPS_PER_DIM: u32 = 65535;

// ============================================================================
// Pipeline Cache
// ============================================================================

/// Cache for shader modules, pipelines and bind group layouts.
///
/// Modules are keyed by name. Convolution shaders are specialized per kernel
/// size and padding, so names are owned strings.
pub struct PipelineCache {
    device: Arc<Device>,
    /// Cached shader modules by name
    modules: Mutex<HashMap<String, Arc<ShaderModule>>>,
    /// Cached pipelines by (shader_name, entry_point)
    pipelines: Mutex<HashMap<(String, &'static str), Arc<ComputePipeline>>>,
    /// Cached bind group layouts by layout key
    layouts: Mutex<HashMap<LayoutKey, Arc<BindGroupLayout>>>,
}

/// Key for bind group layout cache
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    /// Number of storage buffers in the layout
    pub num_storage_buffers: u32,
    /// Number of uniform buffers in the layout
    pub num_uniform_buffers: u32,
}

impl PipelineCache {
    /// Create a new pipeline cache
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            modules: Mutex::new(HashMap::new()),
            pipelines: Mutex::new(HashMap::new()),
            layouts: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create a shader module
    ///
    /// `source` only runs on a cache miss.
    pub fn get_or_create_module(
        &self,
        name: &str,
        source: impl FnOnce() -> String,
    ) -> Arc<ShaderModule> {
        let mut modules = self.modules.lock();
        if let Some(module) = modules.get(name) {
            return module.clone();
        }

        tracing::trace!(shader = name, "compiling WGSL module");
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source().into()),
        });

        let module = Arc::new(module);
        modules.insert(name.to_string(), module.clone());
        module
    }

    /// Get or create a compute pipeline
    pub fn get_or_create_pipeline(
        &self,
        shader_name: &str,
        entry_point: &'static str,
        module: &ShaderModule,
        layout: &BindGroupLayout,
    ) -> Arc<ComputePipeline> {
        let key = (shader_name.to_string(), entry_point);
        let mut pipelines = self.pipelines.lock();

        if let Some(pipeline) = pipelines.get(&key) {
            return pipeline.clone();
        }

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{}_layout", shader_name)),
                bind_group_layouts: &[layout],
                immediate_size: 0,
            });

        let pipeline = self
            .device
            .create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some(&format!("{}_{}", shader_name, entry_point)),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            });

        let pipeline = Arc::new(pipeline);
        pipelines.insert(key, pipeline.clone());
        pipeline
    }

    /// Get or create a bind group layout: storage buffers first, then uniforms
    pub fn get_or_create_layout(&self, key: LayoutKey) -> Arc<BindGroupLayout> {
        let mut layouts = self.layouts.lock();

        if let Some(layout) = layouts.get(&key) {
            return layout.clone();
        }

        let mut entries = Vec::new();

        for i in 0..key.num_storage_buffers {
            entries.push(BindGroupLayoutEntry {
                binding: i,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        for i in 0..key.num_uniform_buffers {
            entries.push(BindGroupLayoutEntry {
                binding: key.num_storage_buffers + i,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }

        let layout = self
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("proxr_layout"),
                entries: &entries,
            });

        let layout = Arc::new(layout);
        layouts.insert(key, layout.clone());
        layout
    }

    /// Create a bind group from buffers, bound in order
    pub fn create_bind_group(&self, layout: &BindGroupLayout, buffers: &[&Buffer]) -> BindGroup {
        let entries: Vec<BindGroupEntry> = buffers
            .iter()
            .enumerate()
            .map(|(i, buffer)| BindGroupEntry {
                binding: i as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("compute_bind_group"),
            layout,
            entries: &entries,
        })
    }

    /// Get device reference
    pub fn device(&self) -> &Device {
        &self.device
    }
}

// ============================================================================
// Dispatch Helpers
// ============================================================================

/// A compute dispatch: shader module, entry point, buffers and grid.
///
/// `buffers` holds the storage buffers followed by one uniform params buffer,
/// matching the binding order of every WGSL kernel in this crate.
pub struct Dispatch<'a> {
    /// Cache key of the shader module
    pub shader: &'a str,
    /// Entry point in the module
    pub entry_point: &'static str,
    /// Storage buffers, then the params buffer
    pub buffers: &'a [&'a Buffer],
    /// Workgroup grid
    pub workgroups: (u32, u32, u32),
}

/// Compile (or fetch) the pipeline for `dispatch` and submit it.
///
/// The submission is not awaited; host reads synchronize.
pub fn launch(
    cache: &PipelineCache,
    queue: &Queue,
    dispatch: Dispatch<'_>,
    source: impl FnOnce() -> String,
) {
    let module = cache.get_or_create_module(dispatch.shader, source);
    let layout = cache.get_or_create_layout(LayoutKey {
        num_storage_buffers: dispatch.buffers.len() as u32 - 1,
        num_uniform_buffers: 1,
    });
    let pipeline =
        cache.get_or_create_pipeline(dispatch.shader, dispatch.entry_point, &module, &layout);
    let bind_group = cache.create_bind_group(&layout, dispatch.buffers);

    let mut encoder = cache
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(dispatch.entry_point),
        });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(dispatch.entry_point),
            timestamp_writes: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, Some(&bind_group), &[]);
        let (x, y, z) = dispatch.workgroups;
        pass.dispatch_workgroups(x, y, z);
    }
    queue.submit(std::iter::once(encoder.finish()));
}

/// Compute number of workgroups for n elements
#[inline]
pub fn workgroup_count(n: usize) -> u32 {
    n.div_ceil(WORKGROUP_SIZE as usize) as u32
}

/// Workgroup grid covering `n` elements in a 1D kernel.
///
/// Grids wider than the per-dimension limit spill into y; kernels rebuild the
/// flat index with [`FLAT_INDEX`].
#[inline]
pub fn grid_1d(n: usize) -> (u32, u32, u32) {
    let groups = workgroup_count(n).max(1);
    if groups <= MAX_WORKGROUPS_PER_DIM {
        (groups, 1, 1)
    } else {
        let y = groups.div_ceil(MAX_WORKGROUPS_PER_DIM);
        (MAX_WORKGROUPS_PER_DIM, y, 1)
    }
}

/// WGSL expression for the flat invocation index under [`grid_1d`].
///
/// Expects `gid: vec3<u32>` (global id) and `nwg: vec3<u32>` (workgroup count).
pub const FLAT_INDEX: &str = "gid.x + gid.y * nwg.x * 256u";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(256), 1);
        assert_eq!(workgroup_count(257), 2);
    }

    #[test]
    fn test_grid_1d_spills_into_y() {
        assert_eq!(grid_1d(1000), (4, 1, 1));
        let n = 256 * 70_000;
        let (x, y, _) = grid_1d(n);
        assert_eq!(x, MAX_WORKGROUPS_PER_DIM);
        assert!((x as usize) * (y as usize) * 256 >= n);
    }
}
