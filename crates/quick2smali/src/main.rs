use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quick2smali::cli::Cli;
use quick2smali::config::Config;
use quick2smali::convert::{self, Outcome};
use quick2smali::tools::Toolkit;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;

    // A missing tool makes every conversion impossible, so provisioning
    // failure is fatal before any dispatch happens.
    let toolkit =
        Toolkit::provision(&config.output_root).context("failed to provision bundled tools")?;

    match convert::convert(&config, &toolkit, &cli.input)? {
        Outcome::CacheHit(dir) => info!("already converted: {}", dir.display()),
        Outcome::Converted(dir) => info!("converted into {}", dir.display()),
        Outcome::Skipped(reason) => warn!("nothing to do: {reason}"),
    }

    Ok(())
}
