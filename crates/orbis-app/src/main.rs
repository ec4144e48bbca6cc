//! The binary entry point for Orbis.

use clap::Parser;
use orbis_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let (mut config, config_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs::cache_dir().map(|dir| dir.join("orbis").join("logs"));
    orbis_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));
    if let Some(e) = config_error {
        error!("Using default config: {e}");
    }

    info!(
        "Orbis {} | window {}x{} | config {}",
        env!("CARGO_PKG_VERSION"),
        config.window.width,
        config.window.height,
        config_dir.display()
    );

    if let Err(e) = orbis_app::app::run(config, config_dir, &args) {
        error!("{e}");
        std::process::exit(1);
    }
}
