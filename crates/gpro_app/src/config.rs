//! On-disk application configuration.
//!
//! Every section and field is optional; anything left out falls back to its
//! default, and a missing file means "all defaults".

use std::path::Path;

use anyhow::Context as _;
use gpro_renderer::RendererConfig;
use serde::Deserialize;

use crate::scene::SceneDescription;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "gpro".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            resizable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A `log::LevelFilter` name.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Initial configuration of the window, logger, renderer and scene.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub logging: LoggingConfig,
    pub renderer: RendererConfig,
    pub scene: SceneDescription,
    /// Fixed sleep after each presented frame; 0 disables it.
    pub frame_sleep_ms: u64,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("malformed configuration")
    }

    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                Self::from_toml(&text).with_context(|| format!("loading {}", path.display()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use gpro_renderer::FlushPolicy;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.frame_sleep_ms, 0);
    }

    #[test]
    fn sections_override_independently() {
        let config = AppConfig::from_toml(
            r#"
            frame_sleep_ms = 10

            [window]
            title = "demo"
            vsync = false

            [renderer]
            flush_policy = "deferred"

            [[scene.objects]]
            name = "floor"
            primitive = "plane"
            "#,
        )
        .unwrap();
        assert_eq!(config.window.title, "demo");
        assert!(!config.window.vsync);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.renderer.flush_policy, FlushPolicy::Deferred);
        assert_eq!(config.scene.objects.len(), 1);
        assert_eq!(config.frame_sleep_ms, 10);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = AppConfig::load("/nonexistent/gpro.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(AppConfig::from_toml("[window]\nwidth = \"wide\"").is_err());
    }
}
