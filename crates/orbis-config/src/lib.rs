//! Configuration system for the Orbis globe.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! CLI overrides via clap, and the render quality tier together with its
//! persisted preference.

mod cli;
mod config;
mod error;
mod quality;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, GlobeConfig, InputConfig, RenderConfig, WindowConfig, default_config_dir,
};
pub use error::ConfigError;
pub use quality::{DeviceClass, Quality, QualityStore};
