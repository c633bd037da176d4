use std::io::{self, StdoutLock, Write};

use crate::Segment;

/// Writes segments in canonical `"<address> <size>"` form, one per line.
#[derive(Debug)]
pub struct Emitter<W: Write> {
    out: W,
}

impl Emitter<StdoutLock<'static>> {
    pub fn stdout() -> Self {
        Self::new(io::stdout().lock())
    }
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, segment: &Segment) -> io::Result<()> {
        writeln!(self.out, "{segment}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
