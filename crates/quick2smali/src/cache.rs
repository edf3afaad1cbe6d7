//! Conversion cache: output keys and the append-only ledger.
//!
//! A conversion is identified by `file name + formatted mtime`. The ledger
//! (`cache.log` under the output root) holds one completed key per line and
//! only ever grows; a line matching the key means the directory
//! `output_root/<key>` holds a finished conversion. A directory without a
//! ledger line is never trusted — we re-convert instead.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::DecompileError;

const CACHE_LOG: &str = "cache.log";

/// Second-granularity stamp appended to the file name. Timestamps are
/// formatted in UTC so the key does not depend on the local zone.
const KEY_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("_[month]-[day]_[hour]-[minute]-[second]");

/// Derives the cache key for an input file from its name and mtime.
pub fn output_key(path: &Path) -> Result<String, DecompileError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DecompileError::InvalidInput(path.to_path_buf()))?;

    let mtime = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| DecompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    output_key_from(name, mtime)
}

/// Pure key derivation: identical (name, mtime) pairs always collide, and a
/// one-second mtime change produces a different key.
pub fn output_key_from(name: &str, mtime: SystemTime) -> Result<String, DecompileError> {
    let stamp = OffsetDateTime::from(mtime).format(KEY_STAMP)?;
    Ok(format!("{name}{stamp}"))
}

/// The append-only record of completed conversions.
#[derive(Debug, Clone)]
pub struct Ledger {
    root: PathBuf,
}

impl Ledger {
    pub fn new(output_root: &Path) -> Self {
        Self {
            root: output_root.to_path_buf(),
        }
    }

    fn log_path(&self) -> PathBuf {
        self.root.join(CACHE_LOG)
    }

    /// Scans the ledger for an exact line match and returns the cached
    /// output directory. A missing ledger file is an empty cache, not an
    /// error.
    pub fn lookup(&self, key: &str) -> io::Result<Option<PathBuf>> {
        let file = match File::open(self.log_path()) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        for line in BufReader::new(file).lines() {
            if line? == key {
                return Ok(Some(self.root.join(key)));
            }
        }

        Ok(None)
    }

    /// Appends a completed key. Each call opens, writes, flushes and closes
    /// the file so concurrent invocations at worst interleave whole lines.
    pub fn record(&self, key: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path())?;
        writeln!(file, "{key}")?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn key_is_a_pure_function_of_name_and_mtime() {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let a = output_key_from("demo-release.apk", mtime).unwrap();
        let b = output_key_from("demo-release.apk", mtime).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("demo-release.apk_"));
    }

    #[test]
    fn one_second_mtime_change_changes_the_key() {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let a = output_key_from("app.dex", mtime).unwrap();
        let b = output_key_from("app.dex", mtime + Duration::from_secs(1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn lookup_on_missing_ledger_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path());
        assert_eq!(ledger.lookup("whatever").unwrap(), None);
    }

    #[test]
    fn lookup_after_record_returns_the_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path());

        ledger.record("app.apk_11-14_22-13-20").unwrap();
        ledger.record("other.jar_01-02_03-04-05").unwrap();

        assert_eq!(
            ledger.lookup("app.apk_11-14_22-13-20").unwrap(),
            Some(dir.path().join("app.apk_11-14_22-13-20"))
        );
        assert_eq!(ledger.lookup("app.apk_11-14_22-13-21").unwrap(), None);
    }

    #[test]
    fn record_appends_without_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path());

        ledger.record("first").unwrap();
        ledger.record("second").unwrap();

        let contents = fs::read_to_string(dir.path().join(CACHE_LOG)).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
