//! Command-line argument parsing for Orbis.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, Quality};

/// Orbis command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orbis", about = "Interactive country globe")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Force a render quality tier (ultra-low, low, mid, high).
    #[arg(long)]
    pub quality: Option<Quality>,

    /// Force touch-style interaction.
    #[arg(long)]
    pub touch: Option<bool>,

    /// Country geometry JSON file.
    #[arg(long)]
    pub countries: Option<PathBuf>,

    /// Chart JSON file mapping country names to track image URLs.
    #[arg(long)]
    pub charts: Option<PathBuf>,

    /// Directory that image URLs are resolved against.
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(touch) = args.touch {
            self.input.touch_mode = Some(touch);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
