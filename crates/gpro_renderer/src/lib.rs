//! `gpro_renderer`: GPU-driven batched rendering with compute frustum
//! culling.
//!
//! # Module layout
//!
//! | Module          | Responsibility                                          |
//! |-----------------|---------------------------------------------------------|
//! | `batch`         | CPU accumulation into batches and their GPU buffers     |
//! | `culling`       | Compute culling stage and its host-side mirror          |
//! | `passes`        | Indirect render submission                              |
//! | `pipeline`      | Bind-group layouts, render and compute pipelines        |
//! | `frame`         | Camera, frustum, light and time uniforms                |
//! | `resources`     | Buffer and texture creation helpers                     |
//! | `render_target` | Depth attachment                                        |
//! | `config`        | `RendererConfig`, flush and camera-sync policies        |
//!
//! A frame runs: pending flush (deferred policy) → culling dispatch and
//! visible-count readback → one render pass drawing every batch from the
//! culled command buffer.
pub mod batch;
pub mod config;
pub mod culling;
pub mod error;
pub mod frame;
pub mod passes;
pub mod pipeline;
pub mod render_target;
pub mod resources;

pub use batch::{BatchAccumulator, BatchLimits, BatchSink, Batchable, BatchedObject, FlushKind};
pub use config::{CameraSync, FlushPolicy, RendererConfig};
pub use culling::{cull_on_cpu, CullState};
pub use error::RenderError;

use std::sync::Arc;

use gpro_core::{Camera, EngineContext, Light};

use batch::{BatchMaterializer, CpuBatch, InstanceData};
use culling::CullingStage;
use frame::FrameUniforms;
use passes::SubmissionStage;
use render_target::DepthTarget;

/// Device features the renderer cannot run without.
pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::INDIRECT_FIRST_INSTANCE
    .union(wgpu::Features::TEXTURE_BINDING_ARRAY)
    .union(wgpu::Features::SAMPLED_TEXTURE_AND_STORAGE_BUFFER_ARRAY_NON_UNIFORM_INDEXING);

/// Device features used when present.
pub const OPTIONAL_FEATURES: wgpu::Features = wgpu::Features::MULTI_DRAW_INDIRECT;

/// Per-frame diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub visible: u32,
    pub instances: u32,
    pub batches: u32,
}

/// The GPU half of the pipeline: everything a flush has to update.
struct GpuStages {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    materializer: BatchMaterializer,
    culling: CullingStage,
    submission: SubmissionStage,
    frame: FrameUniforms,
}

impl BatchSink for GpuStages {
    fn flush(
        &mut self,
        batch: &CpuBatch,
        instances: &InstanceData,
        kind: FlushKind,
    ) -> Result<(), RenderError> {
        let outcome = self
            .materializer
            .materialize(&self.device, &self.queue, batch, instances, kind)?;

        if outcome.is_new || outcome.materials_changed {
            let gpu = &self.materializer.batches()[outcome.batch];
            self.submission
                .update_batch(&self.device, outcome.batch, gpu, outcome.is_new);
        }
        if let Some(globals) = self.materializer.globals() {
            self.submission.rebind_instances(&self.device, globals);
            self.culling.rebind(&self.device, globals, &self.frame.frustum);
        }
        Ok(())
    }
}

/// Owns the whole batching and culling pipeline for one device.
///
/// Created once by the application loop and driven from a single thread.
pub struct Renderer {
    pub context: EngineContext,
    config: RendererConfig,
    accumulator: BatchAccumulator,
    stages: GpuStages,
    depth: DepthTarget,
    camera: Camera,
    lights: Vec<Light>,
    last_stats: FrameStats,
}

impl Renderer {
    /// Builds a renderer drawing into `format` targets of `width × height`.
    pub fn new(
        context: EngineContext,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        config: RendererConfig,
    ) -> Self {
        let device = context.device.clone();
        let queue = context.queue.clone();

        let max_materials = config.materials_per_batch(&context.limits);
        let multi_draw = context.supports(wgpu::Features::MULTI_DRAW_INDIRECT);
        log::info!(
            "renderer: budget {} bytes, {} materials per batch, multi-draw {}",
            config.batch_byte_budget,
            max_materials,
            if multi_draw { "on" } else { "off" }
        );

        let mut camera = Camera::default();
        camera.set_aspect(width.max(1) as f32 / height.max(1) as f32);
        let lights = vec![Light::default()];

        let submission = SubmissionStage::new(&device, format, multi_draw, config.clear_color());
        let frame = FrameUniforms::new(&device, &submission.layouts.frame, &camera, &lights);
        let stages = GpuStages {
            materializer: BatchMaterializer::new(),
            culling: CullingStage::new(&device),
            submission,
            frame,
            device: device.clone(),
            queue,
        };

        let accumulator = BatchAccumulator::new(
            BatchLimits {
                byte_budget: config.batch_byte_budget,
                max_materials,
            },
            config.flush_policy,
        );

        Self {
            depth: DepthTarget::new(&device, width, height),
            context,
            config,
            accumulator,
            stages,
            camera,
            lights,
            last_stats: FrameStats::default(),
        }
    }

    /// Adds a drawable to the batches.  Under the eager policy its batch is
    /// on the GPU when this returns.
    pub fn admit<B: Batchable + ?Sized>(&mut self, drawable: &B) -> Result<BatchedObject, RenderError> {
        self.accumulator.admit(drawable, &mut self.stages)
    }

    /// Uploads the current batch if it has unflushed admissions.
    pub fn flush_pending(&mut self) -> Result<(), RenderError> {
        self.accumulator.flush(&mut self.stages)
    }

    pub fn accumulator(&self) -> &BatchAccumulator {
        &self.accumulator
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_lights(&mut self, lights: &[Light]) {
        self.lights = lights.to_vec();
        self.stages.frame.sync_lights(&self.stages.queue, &self.lights);
    }

    /// Seconds fed to the shading pass.
    pub fn set_time(&mut self, seconds: f32) {
        self.stages.frame.sync_time(&self.stages.queue, seconds);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.depth.resize(&self.stages.device, width, height);
        self.camera.set_aspect(width as f32 / height as f32);
    }

    pub fn cull_state(&self) -> CullState {
        self.stages.culling.state()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Culls and draws every batch into `view`, then submits.
    ///
    /// `view` must match the format and size the renderer was created (or
    /// last resized) with.
    pub fn render_frame(&mut self, view: &wgpu::TextureView) -> Result<FrameStats, RenderError> {
        if self.config.flush_policy == FlushPolicy::Deferred {
            self.flush_pending()?;
        }

        let stages = &mut self.stages;
        let sync_before = self.config.camera_sync == CameraSync::BeforeCull;
        if sync_before {
            stages.frame.sync_camera(&stages.queue, &self.camera);
        }
        let visible = stages.culling.cull(&stages.device, &stages.queue)?;
        if !sync_before {
            stages.frame.sync_camera(&stages.queue, &self.camera);
        }

        let mut encoder = stages
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        stages.submission.record(
            &mut encoder,
            view,
            &self.depth.view,
            &stages.frame.bind_group,
            stages.materializer.batches(),
            stages.materializer.globals(),
        );
        stages.queue.submit(std::iter::once(encoder.finish()));

        let stats = FrameStats {
            visible,
            instances: self.accumulator.total_instances(),
            batches: stages.materializer.batches().len() as u32,
        };
        log::debug!(
            "frame: {} of {} instances visible across {} batches",
            stats.visible,
            stats.instances,
            stats.batches
        );
        self.last_stats = stats;
        Ok(stats)
    }
}
