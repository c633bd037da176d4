use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Print the writable segments of a 64-bit Mach-O core file by reading its
/// load commands directly (ELF cores are accepted too)
#[derive(Parser)]
#[command(name = "macho2segments", version)]
struct Cli {
    /// Path to the core file
    core_file: PathBuf,

    #[arg(hide = true)]
    extra: Vec<OsString>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli: Cli = coreseg_cli::parse_or_exit();
    coreseg_cli::ignore_extra(&cli.extra);

    coreseg_cli::print_native_segments(&cli.core_file)
}
