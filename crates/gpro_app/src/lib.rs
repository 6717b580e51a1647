//! Desktop front end for `gpro_renderer`: window, surface, input, config
//! and the frame loop.
//!
//! ```rust,ignore
//! use gpro_app::{App, AppConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load("gpro.toml")?;
//!     gpro_app::logging::init(&config.logging.level)?;
//!     App::new(config).with_title("demo").run()
//! }
//! ```

pub mod builder;
pub mod config;
mod graphics;
pub mod logging;
mod runner;
pub mod scene;

pub use builder::App;
pub use config::{AppConfig, LoggingConfig, WindowConfig};
pub use scene::{ObjectDesc, Primitive, SceneDescription};

pub use gpro_core::{glam::Vec3, DrawableObject, InputState, KeyCode, Material, Time, Transform};
pub use gpro_renderer::{RendererConfig, FrameStats};
