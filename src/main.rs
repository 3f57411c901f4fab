use anyhow::Context;

use horizon::{AppConfig, init_logging};

fn main() -> anyhow::Result<()> {
    let path = AppConfig::default_path();
    let config = AppConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    init_logging(&config.logging);
    log::info!("Horizon Engine - No Limits");

    let result = horizon::run(config);
    if let Err(err) = &result {
        log::error!("Horizon stopped: {err:#}");
    }
    result
}
