//! Compute culling against a device created without any optional features.
//!
//! Only the batch renderer needs texture binding arrays; uploading batches
//! and culling them run on any adapter, including software ones.

use std::sync::Arc;

use glam::Vec3;
use gpro_core::{geometry::primitives, Camera, DrawableObject, EngineContext, Frustum, Material, Transform};
use gpro_renderer::batch::{
    BatchAccumulator, BatchLimits, BatchMaterializer, BatchSink, CpuBatch, FlushKind, InstanceData,
};
use gpro_renderer::culling::CullingStage;
use gpro_renderer::resources::buffer;
use gpro_renderer::{cull_on_cpu, CullState, FlushPolicy, RenderError};

/// Uploads every flushed batch, the way the renderer does.
struct Upload<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    materializer: BatchMaterializer,
}

impl BatchSink for Upload<'_> {
    fn flush(
        &mut self,
        batch: &CpuBatch,
        instances: &InstanceData,
        kind: FlushKind,
    ) -> Result<(), RenderError> {
        self.materializer
            .materialize(self.device, self.queue, batch, instances, kind)
            .map(|_| ())
    }
}

fn context() -> EngineContext {
    pollster::block_on(EngineContext::new(wgpu::Features::empty(), wgpu::Features::empty()))
        .expect("culling tests need a wgpu adapter; a software one is enough")
}

/// Twenty cubes scattered around the default camera, each rotated and
/// scaled differently.
fn scattered(k: u32) -> DrawableObject {
    let transforms = (0..20u32)
        .map(|j| {
            let i = k * 20 + j;
            let angle = i as f32 * 0.61;
            let radius = 4.0 + (i % 17) as f32 * 3.0;
            let position = Vec3::new(
                angle.cos() * radius,
                ((i % 7) as f32 - 3.0) * 2.0,
                angle.sin() * radius,
            );
            let rotation = Vec3::new(
                (i * 13 % 360) as f32,
                (i * 29 % 360) as f32,
                (i * 7 % 360) as f32,
            );
            Transform::new(position, rotation, Vec3::splat(0.5 + (i % 5) as f32 * 0.5))
        })
        .collect();
    let shade = (k * 25) as u8;
    DrawableObject::new(
        Arc::new(primitives::cube()),
        transforms,
        Material::solid(format!("shade {k}"), [shade, 128, 255 - shade, 255]),
    )
    .unwrap()
}

fn frustum() -> Frustum {
    Camera::default().frustum()
}

#[test]
fn gpu_commands_match_the_host_mirror() {
    let ctx = context();
    let device: &wgpu::Device = &ctx.device;
    let queue: &wgpu::Queue = &ctx.queue;

    let cube_bytes = primitives::cube().byte_size();
    let mut acc = BatchAccumulator::new(
        BatchLimits {
            byte_budget: cube_bytes * 3,
            max_materials: u32::MAX,
        },
        FlushPolicy::Deferred,
    );
    let mut upload = Upload {
        device,
        queue,
        materializer: BatchMaterializer::new(),
    };
    for k in 0..10 {
        acc.admit(&scattered(k), &mut upload).unwrap();
    }
    acc.flush(&mut upload).unwrap();
    assert_eq!(upload.materializer.batches().len(), 4);

    let globals = upload.materializer.globals().expect("globals exist after a flush");
    assert_eq!(globals.instance_count, 200);

    let frustum = frustum();
    let frustum_buffer = buffer::create_uniform(device, "frustum", &frustum.to_gpu());
    let mut stage = CullingStage::new(device);
    stage.rebind(device, globals, &frustum_buffer);

    let visible = stage.cull(device, queue).unwrap();
    assert_eq!(stage.state(), CullState::Resolved);
    let gpu_commands = globals.read_commands(device, queue).unwrap();

    let mut expected = acc.instances().clone();
    let host_visible = cull_on_cpu(&frustum, &mut expected);
    assert!(host_visible > 0 && host_visible < 200, "scene should be partly visible");
    assert_eq!(visible, host_visible);
    assert_eq!(gpu_commands, expected.commands);

    // unchanged inputs give the same verdicts
    let again = stage.cull(device, queue).unwrap();
    assert_eq!(again, visible);
    assert_eq!(globals.read_commands(device, queue).unwrap(), gpu_commands);
}

#[test]
fn unbound_stage_resolves_without_dispatch() {
    let ctx = context();
    let mut stage = CullingStage::new(&ctx.device);
    assert_eq!(stage.state(), CullState::Idle);
    assert_eq!(stage.cull(&ctx.device, &ctx.queue).unwrap(), 0);
    assert_eq!(stage.state(), CullState::Resolved);
}
