use std::time::Instant;

use anyhow::Context as _;

/// Installs the global logger: stdout, `[seconds LEVEL target] message`.
///
/// `level` is a `log::LevelFilter` name (`off`, `error`, ... `trace`).
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log level {level:?}"))?;
    let start = Instant::now();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>9.3} {:<5} {}] {}",
                start.elapsed().as_secs_f32(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(filter)
        // wgpu internals are chatty below warn
        .level_for("wgpu_core", log::LevelFilter::Warn)
        .level_for("wgpu_hal", log::LevelFilter::Warn)
        .level_for("naga", log::LevelFilter::Warn)
        .chain(std::io::stdout())
        .apply()
        .context("a logger is already installed")?;
    Ok(())
}
