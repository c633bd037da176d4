use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coreseg_cli::output::{self, Format};
use coreseg_core::{native, scan_tool, Mode, Segment, Tool, ToolKind};

/// Core file segment lister
#[derive(Parser)]
#[command(
    name = "coreseg",
    about = "List the loadable memory segments of a core file",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Fail on tool errors or unexpected tool output instead of skipping
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scan `otool -l` output (Mach-O)
    Otool {
        /// Path to the core file
        core_file: PathBuf,
        /// otool executable to run
        #[arg(long, env = "CORESEG_OTOOL", default_value = "otool")]
        tool: OsString,
        /// Argument passed to the tool before the core file, replacing the
        /// default ones (repeatable)
        #[arg(long = "tool-arg", value_name = "ARG", allow_hyphen_values = true)]
        tool_args: Vec<OsString>,
    },
    /// Scan `readelf --segments` output (ELF)
    Readelf {
        /// Path to the core file
        core_file: PathBuf,
        /// readelf executable to run
        #[arg(long, env = "CORESEG_READELF", default_value = "readelf")]
        tool: OsString,
        /// Argument passed to the tool before the core file, replacing the
        /// default ones (repeatable)
        #[arg(long = "tool-arg", value_name = "ARG", allow_hyphen_values = true)]
        tool_args: Vec<OsString>,
    },
    /// Scan the output of this platform's native tool
    Host {
        /// Path to the core file
        core_file: PathBuf,
        /// Executable to run instead of the platform default
        #[arg(long)]
        tool: Option<OsString>,
        /// Argument passed to the tool before the core file, replacing the
        /// default ones (repeatable)
        #[arg(long = "tool-arg", value_name = "ARG", allow_hyphen_values = true)]
        tool_args: Vec<OsString>,
    },
    /// Read the segments from the core file itself
    Native {
        /// Path to the core file
        core_file: PathBuf,
    },
}

impl Command {
    fn core_file(&self) -> &PathBuf {
        match self {
            Command::Otool { core_file, .. }
            | Command::Readelf { core_file, .. }
            | Command::Host { core_file, .. }
            | Command::Native { core_file } => core_file,
        }
    }

    fn tool(&self) -> Option<Tool> {
        match self {
            Command::Otool {
                tool, tool_args, ..
            } => Some(coreseg_cli::build_tool(ToolKind::Otool, tool.clone(), tool_args)),
            Command::Readelf {
                tool, tool_args, ..
            } => Some(coreseg_cli::build_tool(ToolKind::Readelf, tool.clone(), tool_args)),
            Command::Host {
                tool, tool_args, ..
            } => {
                let kind = ToolKind::host();
                let program = tool
                    .clone()
                    .or_else(|| std::env::var_os(kind.program_env()))
                    .unwrap_or_else(|| kind.default_program().into());
                Some(coreseg_cli::build_tool(kind, program, tool_args))
            }
            Command::Native { .. } => None,
        }
    }
}

/// Feeds every segment of the core file to `sink`, returning the program
/// that produced them (or `"native"`).
fn collect<F>(command: &Command, mode: Mode, mut sink: F) -> Result<String>
where
    F: FnMut(Segment) -> coreseg_core::Result<()>,
{
    let path = command.core_file();
    match command.tool() {
        Some(tool) => {
            log::info!(
                "Listing segments with `{}` ({mode:?} mode)",
                tool.program_name()
            );
            scan_tool(&tool, path, mode, sink)
                .with_context(|| format!("Failed to list segments of {}", path.display()))?;
            Ok(tool.program_name())
        }
        None => {
            log::info!("Reading segments natively from {}", path.display());
            let segments = native::read_segments(path)
                .with_context(|| format!("Failed to read segments of {}", path.display()))?;
            for seg in segments {
                sink(seg)?;
            }
            Ok("native".to_string())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli: Cli = coreseg_cli::parse_or_exit();
    let mode = coreseg_cli::mode(cli.strict);

    match cli.format {
        Format::Text => {
            let mut emitter = coreseg_core::Emitter::stdout();
            let result = collect(&cli.command, mode, |seg| Ok(emitter.emit(&seg)?));
            emitter.flush()?;
            result?;
        }
        Format::Json | Format::Table => {
            let mut segments = Vec::new();
            let source = collect(&cli.command, mode, |seg| {
                segments.push(seg);
                Ok(())
            })?;
            let stdout = io::stdout().lock();
            if cli.format == Format::Json {
                output::write_json(stdout, cli.command.core_file(), &source, &segments)?;
            } else {
                output::write_table(stdout, &segments)?;
            }
        }
    }

    Ok(())
}
