use std::sync::Arc;

use anyhow::Context as _;
use thiserror::Error;

/// The wgpu objects shared between the renderer stages.
///
/// `Device` and `Queue` are wrapped in `Arc` so the surface owner and the
/// renderer can hold them at the same time.
pub struct EngineContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    /// Features actually enabled on `device` (required + supported optional).
    pub features: wgpu::Features,
    pub limits: wgpu::Limits,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no suitable graphics adapter found")]
    AdapterUnavailable,
    #[error("adapter lacks required features: {0:?}")]
    MissingFeatures(wgpu::Features),
    #[error("device request failed: {0}")]
    DeviceRequest(String),
}

impl EngineContext {
    /// Creates a headless context (no surface), for tests and offscreen use.
    pub async fn new(
        required: wgpu::Features,
        optional: wgpu::Features,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self::new_with_instance(instance, None, required, optional).await
    }

    /// Creates a context from an existing `Instance`, optionally constrained
    /// to adapters that can present to `compatible_surface`.
    ///
    /// Every feature in `required` must be supported or the call fails with
    /// [`ContextError::MissingFeatures`]; features in `optional` are enabled
    /// only when the adapter has them.
    pub async fn new_with_instance(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        required: wgpu::Features,
        optional: wgpu::Features,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .context(ContextError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!("selected adapter: {} ({:?})", info.name, info.backend);

        let available = adapter.features();
        let missing = required.difference(available);
        if !missing.is_empty() {
            return Err(ContextError::MissingFeatures(missing).into());
        }
        let features = required | (optional & available);
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gpro device"),
                    required_features: features,
                    required_limits: limits.clone(),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| ContextError::DeviceRequest(e.to_string()))?;

        log::debug!("device features: {features:?}");

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            features,
            limits,
        })
    }

    #[inline]
    pub fn supports(&self, feature: wgpu::Features) -> bool {
        self.features.contains(feature)
    }
}
