//! Renderer tuning knobs, deserialisable from the `[renderer]` table of the
//! application config.

use serde::Deserialize;

/// When the accumulator hands a dirty batch to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Upload after every admission.
    #[default]
    Eager,
    /// Upload once per frame, right before culling.
    Deferred,
}

/// When the camera and frustum uniforms are written relative to culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSync {
    /// Culling sees this frame's camera.
    #[default]
    BeforeCull,
    /// Culling sees the previous frame's frustum (one frame of lag).
    AfterCull,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Upper bound on `vertex bytes + index bytes` per batch.
    pub batch_byte_budget: u64,
    pub flush_policy: FlushPolicy,
    pub camera_sync: CameraSync,
    /// Linear RGBA.
    pub clear_color: [f64; 4],
    /// Caps the distinct materials per batch.  `None` derives the cap from
    /// `max_sampled_textures_per_shader_stage`.
    pub max_materials_per_batch: Option<u32>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            batch_byte_budget: 10_000_000,
            flush_policy: FlushPolicy::Eager,
            camera_sync: CameraSync::BeforeCull,
            clear_color: [0.1, 0.2, 0.3, 1.0],
            max_materials_per_batch: None,
        }
    }
}

impl RendererConfig {
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }

    /// Resolves the per-batch material cap against the device limits.
    pub fn materials_per_batch(&self, limits: &wgpu::Limits) -> u32 {
        let device_max = limits.max_sampled_textures_per_shader_stage.max(1);
        self.max_materials_per_batch
            .map_or(device_max, |n| n.clamp(1, device_max))
    }
}
