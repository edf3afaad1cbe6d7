use std::path::PathBuf;

use clap::Parser;

/// Decompile an apk/dex/jar to readable text and open it in your editor.
///
/// Conversions are cached by file name and modification time, so running the
/// same command on an unchanged file opens the previous result immediately.
#[derive(Parser, Debug)]
#[command(name = "quick2smali", version, arg_required_else_help = true)]
pub struct Cli {
    /// The .apk, .dex or .jar file to convert.
    pub input: PathBuf,

    /// Root directory for extracted tools, the cache ledger and all
    /// conversion output. Defaults to `quick2smali-work` next to the binary.
    #[arg(long, value_name = "DIR")]
    pub out_root: Option<PathBuf>,

    /// Editor command used to open finished conversions.
    #[arg(long, default_value = "code", value_name = "CMD")]
    pub editor: String,

    /// Number of concurrent disassembly jobs for multi-dex packages.
    /// Defaults to the number of logical CPUs.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}
