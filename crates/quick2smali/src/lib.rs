//! quick2smali turns an apk/dex/jar into readable text with one command.
//!
//! The heavy lifting is done by bundled external tools (baksmali, fernflower,
//! aapt2); this crate is the glue around them: input-type dispatch, a
//! mtime-keyed conversion cache, subprocess orchestration and a concurrent
//! fan-out over the dex files inside a package. Finished conversions are
//! opened in an editor and remembered, so the second run on an unchanged
//! file is instant.

pub mod cache;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod shell;
pub mod tools;
