//! Unified error type for provisioning and conversion.
//!
//! Every failure the tool can hit is a distinct variant so callers can tell
//! "the process could not be started" from "the process ran and failed" from
//! "a bundled resource is missing from this build".

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecompileError {
    /// The shell itself could not be spawned.
    #[error("could not start shell for `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Writing the command line or reading captured output failed.
    #[error("i/o error while running `{command}`: {source}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The command ran to completion with a non-zero status.
    #[error("`{command}` failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    /// A helper tool is not present in the embedded assets.
    #[error("bundled resource '{0}' is missing from this build")]
    MissingResource(String),

    /// Extracting a bundled helper tool to disk failed.
    #[error("failed to materialize bundled resource '{name}': {source}")]
    ResourceIo {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("no usable Java installation: {0}")]
    JavaNotFound(String),

    /// A tool we shell out to by name is not on PATH.
    #[error("required tool '{0}' is not on PATH")]
    MissingTool(&'static str),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The input path has no usable UTF-8 file name.
    #[error("input has no usable file name: {}", .0.display())]
    InvalidInput(PathBuf),

    #[error("failed to format modification timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("failed to build disassembly worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// One or more dex entries inside a package failed to disassemble.
    /// Sibling tasks always run to completion before this is reported.
    #[error("disassembly failed for: {}", failed.join(", "))]
    Disassembly { failed: Vec<String> },
}
