//! Package disassembly with a concurrent fan-out over contained dex files.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{error, info, warn};
use zip::ZipArchive;

use crate::config::Config;
use crate::error::DecompileError;
use crate::shell;
use crate::tools::Toolkit;

/// Disassembles every top-level dex inside the package, then dumps the
/// manifest. One worker task per dex entry, all awaited before the result is
/// reported; any single failure fails the whole conversion and names the
/// entries that broke.
pub fn convert(
    config: &Config,
    toolkit: &Toolkit,
    apk: &Path,
    out_dir: &Path,
) -> Result<(), DecompileError> {
    let entries = dex_entries(apk)?;
    if entries.is_empty() {
        warn!("{} contains no top-level dex entries", apk.display());
    } else {
        info!("package contains {} dex entries: {:?}", entries.len(), entries);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()?;

    let start = Instant::now();
    let failed: Vec<String> = pool.install(|| {
        entries
            .par_iter()
            .filter_map(|entry| {
                // baksmali understands the virtual in-archive path.
                let command = format!(
                    "{} -jar {} d {}/{} -o {}",
                    toolkit.java.display(),
                    toolkit.baksmali.display(),
                    apk.display(),
                    entry,
                    out_dir.display()
                );
                match shell::run(&command) {
                    Ok(()) => {
                        info!("disassembled {entry} after {:.1?}", start.elapsed());
                        None
                    }
                    Err(err) => {
                        error!("disassembly of {entry} failed: {err}");
                        Some(entry.clone())
                    }
                }
            })
            .collect()
    });

    if !failed.is_empty() {
        return Err(DecompileError::Disassembly { failed });
    }

    dump_manifest(toolkit, apk, out_dir)
}

/// Top-level `classes*.dex` entries, sorted for a stable fan-out order.
/// Nested dex files (inside `lib/`, `assets/`...) are not containers the
/// package loads directly and are skipped.
fn dex_entries(apk: &Path) -> Result<Vec<String>, DecompileError> {
    let file = File::open(apk).map_err(|source| DecompileError::Io {
        path: apk.to_path_buf(),
        source,
    })?;
    let archive = ZipArchive::new(file).map_err(|source| DecompileError::Archive {
        path: apk.to_path_buf(),
        source,
    })?;

    let mut entries: Vec<String> = archive
        .file_names()
        .filter(|name| {
            name.starts_with("classes") && name.ends_with(".dex") && !name.contains('/')
        })
        .map(str::to_owned)
        .collect();
    entries.sort();

    Ok(entries)
}

/// Dumps the package manifest as readable text next to the smali output.
fn dump_manifest(toolkit: &Toolkit, apk: &Path, out_dir: &Path) -> Result<(), DecompileError> {
    let command = format!(
        "{} dump {} --file AndroidManifest.xml > {}/AndroidManifest_dump.xml",
        toolkit.aapt2.display(),
        apk.display(),
        out_dir.display()
    );

    shell::run(&command)
}
