use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

use anyhow::Context;

use crate::cli::Cli;

/// Runtime configuration, built once in `main` and passed by reference into
/// everything that needs it. There is deliberately no global state so tests
/// can point the whole tool at a temporary directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the extracted tools, `cache.log` and one output
    /// directory per conversion.
    pub output_root: PathBuf,
    /// Command used to open finished conversions.
    pub editor: String,
    /// Worker-pool size for the multi-dex fan-out.
    pub jobs: usize,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let output_root = match &cli.out_root {
            Some(dir) => dir.clone(),
            None => default_output_root()?,
        };

        Ok(Self {
            output_root,
            editor: cli.editor.clone(),
            jobs: cli.jobs.unwrap_or_else(default_jobs),
        })
    }
}

fn default_output_root() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to locate the running executable")?;
    let dir = exe
        .parent()
        .context("executable has no parent directory")?;

    Ok(dir.join("quick2smali-work"))
}

fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
