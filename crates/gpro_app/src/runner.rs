use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use gpro_core::{FlyController, InputState, Scene, TimeClock};
use gpro_renderer::RenderError;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::AppConfig;
use crate::graphics::GraphicsState;

struct Runner {
    config: AppConfig,
    window: Option<Arc<Window>>,
    graphics: Option<GraphicsState>,
    scene: Scene,
    input: InputState,
    controller: FlyController,
    clock: TimeClock,
    /// First fatal error; ends the event loop.
    error: Option<anyhow::Error>,
}

impl Runner {
    fn new(config: AppConfig, scene: Scene) -> Self {
        Self {
            config,
            window: None,
            graphics: None,
            scene,
            input: InputState::new(),
            controller: FlyController::new(),
            clock: TimeClock::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(&window_config.title)
            .with_resizable(window_config.resizable)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                window_config.width,
                window_config.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("creating window")?,
        );

        let gfx = pollster::block_on(GraphicsState::new(
            window.clone(),
            window_config,
            self.config.renderer.clone(),
        ))?;

        self.window = Some(window);
        self.graphics = Some(gfx);
        Ok(())
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let pressed = event.state == ElementState::Pressed;
        if code == KeyCode::Escape && pressed {
            event_loop.exit();
            return;
        }
        self.input.update_key(code, pressed);
    }

    /// Admit → update → cull → draw → present.
    fn frame(&mut self) -> Result<(), RenderError> {
        let Some(gfx) = &mut self.graphics else {
            return Ok(());
        };
        let time = self.clock.tick();

        for (_, drawable) in self.scene.drain_pending() {
            gfx.renderer.admit(drawable)?;
        }

        self.controller
            .update(gfx.renderer.camera_mut(), &self.input, time.delta);
        gfx.renderer.set_time(time.elapsed as f32);

        let frame = match gfx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                gfx.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gfx.renderer.render_frame(&view)?;
        frame.present();
        Ok(())
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        if let Err(err) = self.init_graphics(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gfx) = &mut self.graphics {
                    gfx.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, &event),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_none() {
            return;
        }
        if let Err(err) = self.frame() {
            self.fail(event_loop, anyhow::Error::new(err).context("rendering frame"));
            return;
        }

        if self.config.frame_sleep_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.frame_sleep_ms));
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

pub(crate) fn run_internal(config: AppConfig, scene: Scene) -> anyhow::Result<()> {
    let mut runner = Runner::new(config, scene);
    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut runner)
        .context("running event loop")?;
    match runner.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
