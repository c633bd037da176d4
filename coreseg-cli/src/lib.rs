pub mod output;

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use coreseg_core::{native, scan_tool, Emitter, Mode, Segment, Tool, ToolKind};

/// Parses the command line, exiting with status 1 on any usage error.
///
/// `--help` and `--version` still exit successfully.
pub fn parse_or_exit<T: Parser>() -> T {
    T::try_parse().unwrap_or_else(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => {
            let _ = err.print();
            std::process::exit(1);
        }
    })
}

pub fn mode(strict: bool) -> Mode {
    if strict {
        Mode::Strict
    } else {
        Mode::Lenient
    }
}

/// The tool to run. Non-empty `tool_args` replace the default arguments.
pub fn build_tool(kind: ToolKind, program: OsString, tool_args: &[OsString]) -> Tool {
    let tool = Tool::new(kind).program(program);
    if tool_args.is_empty() {
        tool
    } else {
        tool.args(tool_args)
    }
}

/// Operands after the core file are accepted and dropped.
pub fn ignore_extra(extra: &[OsString]) {
    if !extra.is_empty() {
        log::debug!("Ignoring extra arguments: {extra:?}");
    }
}

/// Runs `tool` on `path` and streams each segment to stdout as it is found.
pub fn print_tool_segments(tool: &Tool, path: &Path, mode: Mode) -> Result<()> {
    log::info!(
        "Listing segments with `{}` ({mode:?} mode)",
        tool.program_name()
    );
    let mut emitter = Emitter::stdout();
    let result = scan_tool(tool, path, mode, |seg| emit(&mut emitter, &seg));
    emitter.flush()?;
    result.with_context(|| format!("Failed to list segments of {}", path.display()))?;
    Ok(())
}

/// Reads the segments of `path` directly and prints them to stdout.
pub fn print_native_segments(path: &Path) -> Result<()> {
    let segments = native::read_segments(path)
        .with_context(|| format!("Failed to read segments of {}", path.display()))?;
    let mut emitter = Emitter::stdout();
    for seg in &segments {
        emitter.emit(seg)?;
    }
    emitter.flush()?;
    Ok(())
}

fn emit<W: std::io::Write>(emitter: &mut Emitter<W>, seg: &Segment) -> coreseg_core::Result<()> {
    emitter.emit(seg)?;
    Ok(())
}
