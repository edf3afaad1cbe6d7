//! Provisioning of the bundled helper tools.
//!
//! The decompilers ship inside the binary as embedded assets and are
//! extracted into the output root on first use. A tool that is already on
//! disk is reused as-is, so a fresh output root pays the extraction cost
//! exactly once.

use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;
use tracing::info;

use crate::error::DecompileError;

pub const BAKSMALI_JAR: &str = "baksmali.jar";
pub const FERNFLOWER_JAR: &str = "fernflower.jar";
pub const AAPT2_BIN: &str = "aapt2";

#[derive(RustEmbed)]
#[folder = "assets/"]
#[exclude = "*.md"]
struct Assets;

/// Resolved paths to every external tool a conversion can need.
#[derive(Debug, Clone)]
pub struct Toolkit {
    /// The `java` binary used to run the bundled jars.
    pub java: PathBuf,
    pub baksmali: PathBuf,
    pub fernflower: PathBuf,
    pub aapt2: PathBuf,
}

impl Toolkit {
    /// Extracts the bundled tools into `output_root` and locates a JVM.
    /// Any failure here is fatal: a conversion cannot run with a missing
    /// tool, so no possibly-invalid path is ever handed out.
    pub fn provision(output_root: &Path) -> Result<Self, DecompileError> {
        Ok(Self {
            java: locate_java()?,
            baksmali: acquire::<Assets>(output_root, BAKSMALI_JAR)?,
            fernflower: acquire::<Assets>(output_root, FERNFLOWER_JAR)?,
            aapt2: acquire::<Assets>(output_root, AAPT2_BIN)?,
        })
    }
}

fn locate_java() -> Result<PathBuf, DecompileError> {
    let home = java_locator::locate_java_home()
        .map_err(|err| DecompileError::JavaNotFound(err.to_string()))?;

    Ok(Path::new(&home).join("bin").join("java"))
}

/// Materializes one embedded asset at `output_root/<name>` and returns its
/// path. Idempotent: an existing file is only re-marked executable.
fn acquire<A: RustEmbed>(output_root: &Path, name: &str) -> Result<PathBuf, DecompileError> {
    let target = output_root.join(name);

    if target.exists() {
        mark_executable(&target, name)?;
        return Ok(target);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| DecompileError::ResourceIo {
            name: name.to_owned(),
            source,
        })?;
    }

    let asset = A::get(name).ok_or_else(|| DecompileError::MissingResource(name.to_owned()))?;
    fs::write(&target, asset.data.as_ref()).map_err(|source| DecompileError::ResourceIo {
        name: name.to_owned(),
        source,
    })?;
    mark_executable(&target, name)?;

    info!("extracted bundled tool {name}");
    Ok(target)
}

#[cfg(unix)]
fn mark_executable(path: &Path, name: &str) -> Result<(), DecompileError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        DecompileError::ResourceIo {
            name: name.to_owned(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path, _name: &str) -> Result<(), DecompileError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(RustEmbed)]
    #[folder = "tests/fixtures/"]
    struct TestAssets;

    #[test]
    fn acquire_extracts_an_embedded_asset() {
        let root = tempfile::tempdir().unwrap();

        let path = acquire::<TestAssets>(root.path(), "fake-tool").unwrap();
        assert_eq!(path, root.path().join("fake-tool"));
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("fake tool"));
    }

    #[test]
    fn acquire_is_idempotent_and_keeps_existing_files() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("fake-tool");
        fs::write(&target, "already here").unwrap();

        let path = acquire::<TestAssets>(root.path(), "fake-tool").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "already here");
    }

    #[test]
    fn acquire_of_an_unknown_resource_is_a_definite_error() {
        let root = tempfile::tempdir().unwrap();

        match acquire::<TestAssets>(root.path(), "no-such-tool") {
            Err(DecompileError::MissingResource(name)) => assert_eq!(name, "no-such-tool"),
            other => panic!("expected MissingResource, got {other:?}"),
        }
        assert!(!root.path().join("no-such-tool").exists());
    }

    #[cfg(unix)]
    #[test]
    fn extracted_tools_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let path = acquire::<TestAssets>(root.path(), "fake-tool").unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
