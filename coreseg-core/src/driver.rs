use std::path::Path;

use crate::error::{Error, Result};
use crate::scanner::SegmentScanner;
use crate::source::LineSource;
use crate::tool::Tool;
use crate::Segment;

/// How recoverable failures (tool launch/exit problems and desyncs) are
/// handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Log a warning and keep whatever output was produced.
    #[default]
    Lenient,
    /// Stop at the first recoverable failure and return it.
    Strict,
}

impl Mode {
    fn tolerate(self, err: Error) -> Result<()> {
        if self == Mode::Lenient && err.is_recoverable() {
            log::warn!("{err}");
            return Ok(());
        }
        Err(err)
    }
}

/// Runs `scanner` over every line of `source`, handing each completed
/// segment to `sink` as soon as it is recognized.
///
/// Returns the number of segments emitted.
pub fn scan<S, F>(
    source: &mut S,
    scanner: &mut dyn SegmentScanner,
    mode: Mode,
    mut sink: F,
) -> Result<usize>
where
    S: LineSource + ?Sized,
    F: FnMut(Segment) -> Result<()>,
{
    let mut count = 0;
    while let Some(line) = source.next_line()? {
        match scanner.accept(&line) {
            Ok(Some(segment)) => {
                log::debug!("{} segment: {segment}", scanner.format_name());
                sink(segment)?;
                count += 1;
            }
            Ok(None) => {}
            Err(desync) => mode.tolerate(desync.into())?,
        }
    }

    if let Err(desync) = scanner.finish() {
        mode.tolerate(desync.into())?;
    }
    if let Err(err) = source.finish() {
        mode.tolerate(err)?;
    }

    log::info!("{} output yielded {count} segments", scanner.format_name());
    Ok(count)
}

/// Spawns `tool` on `path` and scans its output with the matching scanner.
///
/// In lenient mode a tool that cannot be started behaves like one that
/// printed nothing.
pub fn scan_tool<F>(tool: &Tool, path: &Path, mode: Mode, sink: F) -> Result<usize>
where
    F: FnMut(Segment) -> Result<()>,
{
    let mut process = match tool.spawn(path) {
        Ok(process) => process,
        Err(err) => {
            mode.tolerate(err)?;
            return Ok(0);
        }
    };
    let mut scanner = tool.kind().scanner();
    scan(&mut process, scanner.as_mut(), mode, sink)
}
