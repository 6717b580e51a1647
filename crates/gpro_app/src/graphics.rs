use std::sync::Arc;

use anyhow::Context as _;
use gpro_core::EngineContext;
use gpro_renderer::{Renderer, RendererConfig, OPTIONAL_FEATURES, REQUIRED_FEATURES};
use winit::window::Window;

use crate::config::WindowConfig;

/// The presentation surface and the renderer drawing into it.
pub struct GraphicsState {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub renderer: Renderer,
}

impl GraphicsState {
    pub async fn new(
        window: Arc<Window>,
        window_config: &WindowConfig,
        renderer_config: RendererConfig,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let size = window.inner_size();
        // an owned Arc gives the surface a 'static lifetime
        let surface = instance
            .create_surface(window)
            .context("creating window surface")?;
        let context = EngineContext::new_with_instance(
            instance,
            Some(&surface),
            REQUIRED_FEATURES,
            OPTIONAL_FEATURES,
        )
        .await?;

        let caps = surface.get_capabilities(&context.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let present_mode = if window_config.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&context.device, &config);
        log::info!(
            "surface: {:?} {}x{} {:?}",
            format,
            config.width,
            config.height,
            present_mode
        );

        let renderer = Renderer::new(context, config.width, config.height, config.format, renderer_config);

        Ok(Self {
            surface,
            config,
            renderer,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
            self.renderer.resize(width, height);
        }
    }

    /// Re-applies the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface
            .configure(&self.renderer.context.device, &self.config);
    }
}
