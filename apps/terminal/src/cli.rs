//! Command line flags. Each one overrides the matching config value.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;
use crate::render::RenderMode;

#[derive(Debug, Parser)]
#[command(
    name = "selfcounter",
    version,
    about = "Self-checkout counter: scan items, review them, build a cart"
)]
pub struct Cli {
    /// Config file (default: platform config dir / config.toml)
    #[arg(short, long, env = "SELFCOUNTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Catalog service base URL
    #[arg(long)]
    pub catalog_url: Option<String>,

    /// Lookup timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Line-oriented scanner device (serial port, FIFO, file)
    #[arg(short, long)]
    pub scanner: Option<PathBuf>,

    /// Do not beep on scans
    #[arg(long)]
    pub no_sound: bool,

    /// Print each state change as a JSON line instead of drawing the screen
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.catalog_url {
            config.catalog.base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.catalog.timeout_secs = secs;
        }
        if let Some(device) = &self.scanner {
            config.scanner.device = Some(device.clone());
        }
        if self.no_sound {
            config.scanner.sound = false;
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.json {
            RenderMode::Json
        } else {
            RenderMode::Text
        }
    }
}
