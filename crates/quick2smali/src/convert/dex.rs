//! Single raw dex file disassembly.

use std::path::Path;

use tracing::info;

use crate::error::DecompileError;
use crate::shell;
use crate::tools::Toolkit;

pub fn convert(toolkit: &Toolkit, dex: &Path, out_dir: &Path) -> Result<(), DecompileError> {
    let command = format!(
        "{} -jar {} d {} -o {}",
        toolkit.java.display(),
        toolkit.baksmali.display(),
        dex.display(),
        out_dir.display()
    );
    shell::run(&command)?;

    info!("disassembled {}", dex.display());
    Ok(())
}
