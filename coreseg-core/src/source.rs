use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout};

use crate::error::{Error, Result};

/// A finite, non-restartable stream of text lines.
pub trait LineSource {
    /// Returns the next line with trailing whitespace removed, or `None`
    /// once the stream is exhausted.
    fn next_line(&mut self) -> Result<Option<String>>;

    /// Called once after the last line has been read.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Lines read from any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, since
/// tool output may echo arbitrary file paths.
#[derive(Debug)]
pub struct TextSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> TextSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for TextSource<R> {
    fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.buf);
        Ok(Some(line.trim_end().to_string()))
    }
}

/// Standard output of a running introspection tool.
///
/// `finish` waits for the child and reports a failed exit status. If the
/// source is dropped before that, the child is killed and reaped.
#[derive(Debug)]
pub struct ToolProcess {
    program: String,
    child: Child,
    stdout: TextSource<BufReader<ChildStdout>>,
    reaped: bool,
}

impl ToolProcess {
    pub(crate) fn new(program: String, child: Child, stdout: ChildStdout) -> Self {
        Self {
            program,
            child,
            stdout: TextSource::new(BufReader::new(stdout)),
            reaped: false,
        }
    }
}

impl LineSource for ToolProcess {
    fn next_line(&mut self) -> Result<Option<String>> {
        self.stdout.next_line()
    }

    fn finish(&mut self) -> Result<()> {
        let status = self.child.wait()?;
        self.reaped = true;
        log::info!("`{}` exited with {status}", self.program);
        if !status.success() {
            return Err(Error::ToolExit {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl Drop for ToolProcess {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
