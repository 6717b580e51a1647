/// Draws every batch with indirect commands produced by the culling stage.
///
/// One render pass per frame clears colour and depth once; each batch then
/// binds its own pipeline, material array and instance arrays and issues
/// one indirect draw per instance over its slice of the global command
/// buffer.  Culled instances have `instance_count == 0` and cost nothing.
use wgpu::{
    CommandEncoder, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, StoreOp, TextureView,
};

use crate::batch::{GlobalInstanceBuffers, GpuBatch};
use crate::pipeline::layout::{self, FrameLayouts};
use crate::pipeline::BatchPipeline;

/// Pipeline and bind groups of one batch.
pub struct BatchPass {
    pipeline: BatchPipeline,
    /// group(1)
    materials: wgpu::BindGroup,
    /// group(2); `None` until the first global buffers exist.
    instances: Option<wgpu::BindGroup>,
    material_count: u32,
}

pub struct SubmissionStage {
    shader: wgpu::ShaderModule,
    pub layouts: FrameLayouts,
    sampler: wgpu::Sampler,
    target_format: wgpu::TextureFormat,
    passes: Vec<BatchPass>,
    multi_draw: bool,
    pub clear_color: wgpu::Color,
}

impl SubmissionStage {
    /// `multi_draw` selects `multi_draw_indexed_indirect`; it requires the
    /// device feature `MULTI_DRAW_INDIRECT`.
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        multi_draw: bool,
        clear_color: wgpu::Color,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../../../assets/shaders/indirect_phong.wgsl"
        ));
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            shader,
            layouts: FrameLayouts::new(device),
            sampler,
            target_format,
            passes: Vec::new(),
            multi_draw,
            clear_color,
        }
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Creates the pass for a new batch, or refreshes an existing one.
    ///
    /// The pipeline and material bind group are rebuilt only when the
    /// batch's material count changed, since the count is baked into the
    /// material layout.  Instance bind groups are handled by
    /// [`SubmissionStage::rebind_instances`].
    pub fn update_batch(&mut self, device: &wgpu::Device, slot: usize, batch: &GpuBatch, is_new: bool) {
        let unchanged = !is_new
            && self
                .passes
                .get(slot)
                .is_some_and(|p| p.material_count == batch.material_count());
        if unchanged {
            return;
        }

        let count = batch.material_count();
        let material_layout = layout::material_layout(device, count);
        let pipeline = BatchPipeline::new(
            device,
            &self.shader,
            &self.layouts,
            &material_layout,
            self.target_format,
            &format!("batch {} pipeline", batch.index),
        );
        let materials = self.material_bind_group(device, &material_layout, batch);
        let instances = self.passes.get_mut(slot).and_then(|p| p.instances.take());

        let pass = BatchPass {
            pipeline,
            materials,
            instances,
            material_count: count,
        };
        if slot < self.passes.len() {
            self.passes[slot] = pass;
        } else {
            self.passes.push(pass);
        }
    }

    fn material_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        batch: &GpuBatch,
    ) -> wgpu::BindGroup {
        let views: Vec<&wgpu::TextureView> = batch.material_views.iter().collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("batch {} materials", batch.index)),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureViewArray(&views),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Rebuilds group(2) of every batch against freshly created globals.
    pub fn rebind_instances(&mut self, device: &wgpu::Device, globals: &GlobalInstanceBuffers) {
        for pass in &mut self.passes {
            pass.instances = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("instance bind group"),
                layout: &self.layouts.instances,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: globals.transforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: globals.instance_map.as_entire_binding(),
                    },
                ],
            }));
        }
    }

    /// Records the frame's render pass.  `batches` must be in slot order.
    pub fn record(
        &self,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: &TextureView,
        frame: &wgpu::BindGroup,
        batches: &[GpuBatch],
        globals: Option<&GlobalInstanceBuffers>,
    ) {
        let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("batched draw pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(globals) = globals else {
            return;
        };

        rpass.set_bind_group(0, frame, &[]);
        for (batch, pass) in batches.iter().zip(&self.passes) {
            let Some(instances) = &pass.instances else {
                continue;
            };
            if batch.instance_count == 0 {
                continue;
            }

            rpass.set_pipeline(&pass.pipeline.inner);
            rpass.set_bind_group(1, &pass.materials, &[]);
            rpass.set_bind_group(2, instances, &[]);
            rpass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
            rpass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            let base = batch.command_offset();
            if self.multi_draw {
                rpass.multi_draw_indexed_indirect(&globals.commands, base, batch.instance_count);
            } else {
                for i in 0..batch.instance_count as u64 {
                    rpass.draw_indexed_indirect(
                        &globals.commands,
                        base + i * crate::batch::IndirectDrawCommand::SIZE,
                    );
                }
            }
        }
    }
}
