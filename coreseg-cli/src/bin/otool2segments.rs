use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use coreseg_core::ToolKind;

/// Print the memory segments of a Mach-O core file as listed by `otool -l`
#[derive(Parser)]
#[command(name = "otool2segments", version)]
struct Cli {
    /// Path to the core file
    core_file: PathBuf,

    /// Fail on tool errors or unexpected tool output instead of skipping
    #[arg(long)]
    strict: bool,

    /// otool executable to run
    #[arg(long, env = "CORESEG_OTOOL", default_value = "otool")]
    tool: OsString,

    /// Argument passed to the tool before the core file, replacing the
    /// default ones (repeatable)
    #[arg(long = "tool-arg", value_name = "ARG", allow_hyphen_values = true)]
    tool_args: Vec<OsString>,

    #[arg(hide = true)]
    extra: Vec<OsString>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli: Cli = coreseg_cli::parse_or_exit();
    coreseg_cli::ignore_extra(&cli.extra);

    let tool = coreseg_cli::build_tool(ToolKind::Otool, cli.tool, &cli.tool_args);
    coreseg_cli::print_tool_segments(&tool, &cli.core_file, coreseg_cli::mode(cli.strict))
}
