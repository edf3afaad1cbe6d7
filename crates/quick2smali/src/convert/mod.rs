//! Conversion dispatch: one pass, one decision point, no retries.
//!
//! The dispatcher computes the cache key, short-circuits on a ledger hit and
//! otherwise hands the input to the routine matching its type. A successful
//! conversion is opened in the editor and recorded in the ledger; a failed
//! one persists nothing, so the next invocation retries from scratch.

mod apk;
mod dex;
mod jar;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cache::{self, Ledger};
use crate::config::Config;
use crate::shell;
use crate::tools::Toolkit;

/// Input type, inferred from directory-ness or the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Directory,
    Apk,
    Dex,
    Jar,
    Unsupported,
}

impl InputKind {
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            return Self::Directory;
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("apk") => Self::Apk,
            Some("dex") => Self::Dex,
            Some("jar") => Self::Jar,
            _ => Self::Unsupported,
        }
    }
}

/// Terminal state of one dispatch pass.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The ledger already held this key; the cached directory was opened.
    CacheHit(PathBuf),
    /// A fresh conversion finished and was recorded.
    Converted(PathBuf),
    /// Nothing was done and nothing was cached.
    Skipped(SkipReason),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory inputs are a placeholder: accepted, never converted.
    Directory,
    UnsupportedType,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory inputs are not converted"),
            Self::UnsupportedType => write!(f, "unsupported input type"),
        }
    }
}

/// Runs one conversion pass for `input` and returns its terminal state.
pub fn convert(config: &Config, toolkit: &Toolkit, input: &Path) -> anyhow::Result<Outcome> {
    let key = cache::output_key(input)?;
    debug!(%key, "dispatching {}", input.display());

    let ledger = Ledger::new(&config.output_root);
    match ledger.lookup(&key) {
        Ok(Some(cached)) => {
            info!("cache hit, opening {}", cached.display());
            open_editor(config, &cached);
            return Ok(Outcome::CacheHit(cached));
        }
        Ok(None) => {}
        // An unreadable ledger is a miss: converting again is always safe.
        Err(err) => warn!("cache ledger unreadable, converting from scratch: {err}"),
    }

    match InputKind::of(input) {
        InputKind::Directory => {
            info!("{} is a directory, nothing to convert", input.display());
            Ok(Outcome::Skipped(SkipReason::Directory))
        }
        InputKind::Unsupported => {
            warn!("unsupported input type: {}", input.display());
            Ok(Outcome::Skipped(SkipReason::UnsupportedType))
        }
        kind @ (InputKind::Apk | InputKind::Dex | InputKind::Jar) => {
            let out_dir = config.output_root.join(&key);
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            match kind {
                InputKind::Apk => apk::convert(config, toolkit, input, &out_dir)?,
                InputKind::Dex => dex::convert(toolkit, input, &out_dir)?,
                _ => jar::convert(toolkit, input, &out_dir)?,
            }

            open_editor(config, &out_dir);
            if let Err(err) = ledger.record(&key) {
                warn!("failed to record cache entry {key}: {err}");
            }

            Ok(Outcome::Converted(out_dir))
        }
    }
}

/// Opens `path` in the configured editor. Best effort: a missing or failing
/// editor is logged and never fails the conversion that produced `path`.
fn open_editor(config: &Config, path: &Path) {
    if which::which(&config.editor).is_err() {
        warn!("editor command '{}' not found on PATH", config.editor);
        return;
    }

    let command = format!("{} {}", config.editor, path.display());
    if let Err(err) = shell::run(&command) {
        warn!("failed to open editor: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write as _;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn test_config(root: &Path) -> Config {
        Config {
            output_root: root.to_path_buf(),
            // `true` exits 0 and swallows its arguments, which makes it a
            // perfect stand-in editor.
            editor: "true".to_owned(),
            jobs: 2,
        }
    }

    /// A toolkit whose every command line starts with `true` (all succeed)
    /// or `false` (all fail).
    fn stub_toolkit(program: &str) -> Toolkit {
        Toolkit {
            java: PathBuf::from(program),
            baksmali: PathBuf::from("baksmali.jar"),
            fernflower: PathBuf::from("fernflower.jar"),
            aapt2: PathBuf::from(program),
        }
    }

    #[test]
    fn input_kind_is_inferred_from_extension() {
        assert_eq!(InputKind::of(Path::new("a/b/app.apk")), InputKind::Apk);
        assert_eq!(InputKind::of(Path::new("classes.dex")), InputKind::Dex);
        assert_eq!(InputKind::of(Path::new("lib.jar")), InputKind::Jar);
        assert_eq!(InputKind::of(Path::new("notes.txt")), InputKind::Unsupported);
        assert_eq!(InputKind::of(Path::new("apk")), InputKind::Unsupported);
    }

    #[test]
    fn unsupported_extension_does_no_work_and_caches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("notes.txt");
        fs::write(&input, "plain text").unwrap();

        let outcome = convert(
            &test_config(root.path()),
            &stub_toolkit("true"),
            &input,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Skipped(SkipReason::UnsupportedType));
        assert!(!root.path().join("cache.log").exists());
    }

    #[test]
    fn directory_input_is_a_harmless_no_op() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("unpacked");
        fs::create_dir(&input).unwrap();

        let outcome = convert(
            &test_config(root.path()),
            &stub_toolkit("true"),
            &input,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Skipped(SkipReason::Directory));
        assert!(!root.path().join("cache.log").exists());
    }

    #[test]
    fn dex_conversion_records_a_cache_entry_and_the_repeat_run_hits_it() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("classes.dex");
        fs::write(&input, b"dex bytes").unwrap();

        let config = test_config(root.path());
        let toolkit = stub_toolkit("true");

        let first = convert(&config, &toolkit, &input).unwrap();
        let key = cache::output_key(&input).unwrap();
        let expected_dir = root.path().join(&key);
        assert_eq!(first, Outcome::Converted(expected_dir.clone()));
        assert!(expected_dir.is_dir());

        // Same file, unchanged mtime: straight to the cached directory.
        let second = convert(&config, &toolkit, &input).unwrap();
        assert_eq!(second, Outcome::CacheHit(expected_dir));
    }

    #[test]
    fn failed_conversion_persists_nothing() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("classes.dex");
        fs::write(&input, b"dex bytes").unwrap();

        let config = test_config(root.path());
        let result = convert(&config, &stub_toolkit("false"), &input);

        assert!(result.is_err());
        assert!(!root.path().join("cache.log").exists());
    }

    #[test]
    fn multi_dex_apk_converts_end_to_end() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("demo-release.apk");

        let mut writer = ZipWriter::new(File::create(&input).unwrap());
        for name in ["classes.dex", "classes2.dex", "res/layout/main.xml"] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(b"stub").unwrap();
        }
        writer.finish().unwrap();

        let config = test_config(root.path());
        let outcome = convert(&config, &stub_toolkit("true"), &input).unwrap();

        let key = cache::output_key(&input).unwrap();
        let out_dir = root.path().join(&key);
        assert_eq!(outcome, Outcome::Converted(out_dir.clone()));
        // The manifest dump redirection ran against the output directory.
        assert!(out_dir.join("AndroidManifest_dump.xml").exists());
        let ledger = fs::read_to_string(root.path().join("cache.log")).unwrap();
        assert_eq!(ledger, format!("{key}\n"));
    }
}
