//! Java archive decompilation to source.
//!
//! Fernflower writes a jar of decompiled sources into the output directory;
//! unpacking that jar in place puts the .java files and the archive's
//! resources next to each other. Both steps must succeed.

use std::path::Path;

use tracing::info;

use crate::error::DecompileError;
use crate::shell;
use crate::tools::Toolkit;

pub fn convert(toolkit: &Toolkit, jar: &Path, out_dir: &Path) -> Result<(), DecompileError> {
    which::which("unzip").map_err(|_| DecompileError::MissingTool("unzip"))?;
    let name = jar
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DecompileError::InvalidInput(jar.to_path_buf()))?;

    let decompile = format!(
        "{} -jar {} -dgs=true {} {}",
        toolkit.java.display(),
        toolkit.fernflower.display(),
        jar.display(),
        out_dir.display()
    );
    shell::run(&decompile)?;

    let unpack = format!(
        "unzip -o {}/{} -d {}",
        out_dir.display(),
        name,
        out_dir.display()
    );
    shell::run(&unpack)?;

    info!("decompiled {} to source", jar.display());
    Ok(())
}
