use anyhow::Context as _;
use gpro_app::{App, AppConfig};

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "gpro.toml".to_string());
    let config = AppConfig::load(&path)?;
    gpro_app::logging::init(&config.logging.level).context("initialising logging")?;
    log::info!("config: {path}");
    App::new(config).run()
}
