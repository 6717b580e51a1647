use gpro_core::{DrawableObject, Scene};

use crate::config::AppConfig;
use crate::scene::SceneDescription;

/// Entry point: configure the window and scene, then `run`.
pub struct App {
    config: AppConfig,
    /// Drawables added in code, on top of the configured scene.
    extra: Vec<(String, DrawableObject)>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            extra: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.window.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.window.width = width;
        self.config.window.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.window.vsync = vsync;
        self
    }

    /// Replaces the configured scene description.
    pub fn with_scene(mut self, scene: SceneDescription) -> Self {
        self.config.scene = scene;
        self
    }

    /// Adds a hand-built drawable under a unique name.
    pub fn with_object(mut self, name: impl Into<String>, object: DrawableObject) -> Self {
        self.extra.push((name.into(), object));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds the scene this app starts with.
    pub fn build_scene(&self) -> Scene {
        let mut scene = Scene::new();
        let described = self.config.scene.populate(&mut scene);
        for (name, object) in &self.extra {
            if scene.add_named(name.as_str(), object.clone()).is_none() {
                log::warn!("scene: skipping duplicate name {name:?}");
            }
        }
        log::info!(
            "scene: {} described objects, {} total",
            described,
            scene.len()
        );
        scene
    }

    /// Runs the main loop until the window is closed.
    pub fn run(self) -> anyhow::Result<()> {
        let scene = self.build_scene();
        crate::runner::run_internal(self.config, scene)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
