pub mod elf;
pub mod macho;

use crate::error::Desync;
use crate::Segment;

pub use elf::ReadelfScanner;
pub use macho::OtoolScanner;

/// A line-oriented recognizer that turns tool output into segments.
pub trait SegmentScanner {
    /// Feeds one line of tool output.
    ///
    /// Returns the segment completed by this line, if any. A `Desync` means
    /// the line did not fit the expected layout; the scanner has already
    /// recovered and can keep accepting lines.
    fn accept(&mut self, line: &str) -> Result<Option<Segment>, Desync>;

    /// Signals end of input. Any pending address is discarded and reported.
    fn finish(&mut self) -> Result<(), Desync>;

    /// Short name of the tool output this scanner understands.
    fn format_name(&self) -> &'static str;
}

/// Scanner state shared by both formats.
#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    ReadingSegment {
        address: String,
        line: usize,
    },
}

impl State {
    fn into_unmatched(self) -> Result<(), Desync> {
        match self {
            State::Idle => Ok(()),
            State::ReadingSegment { address, line } => {
                Err(Desync::UnmatchedAddress { address, line })
            }
        }
    }
}

/// Zero-based whitespace-separated field of `line`.
fn field(line: &str, index: usize) -> Option<&str> {
    line.split_whitespace().nth(index)
}
