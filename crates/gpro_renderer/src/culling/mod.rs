//! GPU frustum culling.
//!
//! One compute dispatch per frame tests every instance's world-space box
//! against the frustum, sets its indirect command's `instance_count` to 1 or
//! 0, and counts the survivors.  The stage blocks until the dispatch has
//! finished and the count has been read back, so the draws recorded after
//! it always see this frame's commands.

pub mod cpu;

pub use cpu::cull_on_cpu;

use crate::batch::GlobalInstanceBuffers;
use crate::error::RenderError;
use crate::pipeline::layout::storage_entry;
use crate::pipeline::ComputePipeline;
use crate::resources::buffer;

/// Invocations per workgroup; must match `@workgroup_size` in the shader.
pub const WORKGROUP_SIZE: u32 = 64;

/// Progress of the current frame's culling work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullState {
    Idle,
    Dispatched,
    AwaitingCompletion,
    Resolved,
}

/// Number of workgroups needed to cover `instances`.
#[inline]
pub fn workgroup_count(instances: u32) -> u32 {
    instances.div_ceil(WORKGROUP_SIZE)
}

pub struct CullingStage {
    pipeline: ComputePipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    /// Atomic visible counter written by the shader.
    counter: wgpu::Buffer,
    /// `MAP_READ` copy of `counter`.
    readback: wgpu::Buffer,
    instance_count: u32,
    state: CullState,
}

impl CullingStage {
    pub fn new(device: &wgpu::Device) -> Self {
        let compute = wgpu::ShaderStages::COMPUTE;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("layout: culling"),
            entries: &[
                storage_entry(0, compute, true),
                storage_entry(1, compute, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: compute,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(3, compute, true),
                storage_entry(4, compute, false),
                storage_entry(5, compute, false),
            ],
        });

        let pipeline = ComputePipeline::new(
            device,
            include_str!("../../../../assets/shaders/frustum_cull.wgsl"),
            &[&layout],
            "cs_main",
            "frustum cull",
        );

        let counter = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("visible counter"),
            size: 4,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("visible counter readback"),
            size: 4,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            bind_group: None,
            counter,
            readback,
            instance_count: 0,
            state: CullState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> CullState {
        self.state
    }

    fn set_state(&mut self, state: CullState) {
        log::trace!("culling: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Points the stage at a fresh set of global buffers.  Must be called
    /// after every flush, since the previous buffers have been destroyed.
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        globals: &GlobalInstanceBuffers,
        frustum: &wgpu::Buffer,
    ) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("culling bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals.transforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: globals.aabbs.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: frustum.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: globals.instance_map.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: self.counter.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: globals.commands.as_entire_binding(),
                },
            ],
        }));
        self.instance_count = globals.instance_count;
    }

    /// Runs one culling pass over every instance and returns how many are
    /// visible.  Blocks until the result is on the host.
    pub fn cull(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<u32, RenderError> {
        self.set_state(CullState::Idle);

        let Some(bind_group) = self.bind_group.as_ref().filter(|_| self.instance_count > 0) else {
            self.set_state(CullState::Resolved);
            return Ok(0);
        };

        queue.write_buffer(&self.counter, 0, bytemuck::bytes_of(&0u32));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("culling encoder"),
        });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("frustum cull"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline.inner);
            cpass.set_bind_group(0, bind_group, &[]);
            cpass.dispatch_workgroups(workgroup_count(self.instance_count), 1, 1);
        }
        let submission = queue.submit(std::iter::once(encoder.finish()));
        self.set_state(CullState::Dispatched);

        self.set_state(CullState::AwaitingCompletion);
        device.poll(wgpu::Maintain::wait_for(submission));

        let visible = self.read_counter(device, queue)?;
        self.set_state(CullState::Resolved);
        Ok(visible)
    }

    fn read_counter(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<u32, RenderError> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("culling readback encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.counter, 0, &self.readback, 0, 4);
        queue.submit(std::iter::once(encoder.finish()));

        let data = buffer::map_to_host(device, &self.readback)?;
        Ok(bytemuck::pod_read_unaligned::<u32>(&data[..4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_cover_every_instance() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(1000), 16);
    }
}
