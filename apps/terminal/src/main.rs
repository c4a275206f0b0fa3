//! # Self Counter Entry Point
//!
//! ## Startup Sequence
//! 1. Parse command line flags
//! 2. Initialize tracing (stderr)
//! 3. Load config file, apply environment and flag overrides, validate
//! 4. Run the counter (see `selfcounter_terminal::run`)

use anyhow::Context;
use clap::Parser;

use selfcounter_terminal::cli::Cli;
use selfcounter_terminal::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    selfcounter_terminal::init_tracing();

    let mut config = AppConfig::load(cli.config.clone()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate().context("validating configuration")?;

    selfcounter_terminal::run(config, cli.render_mode()).await?;
    Ok(())
}
