use super::{field, SegmentScanner, State};
use crate::error::Desync;
use crate::Segment;

const LOAD_MARKER: &str = "LOAD";

/// Recognizes `PT_LOAD` program headers in `readelf --segments` output.
///
/// readelf prints each program header over two lines:
///
/// ```text
///   LOAD           0x0000000000001000 0x0000000000400000 0x0000000000000000
///                  0x0000000000001000 0x0000000000001000  R E    0x1000
/// ```
///
/// The virtual address is the third field of the `LOAD` line and the memory
/// size is the second field of whatever line comes next. The follow-up line
/// is taken on trust, so output with extra interleaved lines will pair the
/// wrong fields.
#[derive(Debug, Default)]
pub struct ReadelfScanner {
    state: State,
    line: usize,
}

impl ReadelfScanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SegmentScanner for ReadelfScanner {
    fn accept(&mut self, line: &str) -> Result<Option<Segment>, Desync> {
        self.line += 1;
        let line_no = self.line;
        let line = line.trim();

        match std::mem::take(&mut self.state) {
            State::Idle => {
                if line.starts_with(LOAD_MARKER) {
                    let address = field(line, 2).ok_or(Desync::MissingField {
                        field: "LOAD virtual address",
                        line: line_no,
                    })?;
                    log::debug!("line {line_no}: LOAD segment at {address}");
                    self.state = State::ReadingSegment {
                        address: address.to_string(),
                        line: line_no,
                    };
                }
                Ok(None)
            }
            State::ReadingSegment { address, .. } => {
                let size = field(line, 1).ok_or(Desync::MissingField {
                    field: "LOAD memory size",
                    line: line_no,
                })?;
                Ok(Some(Segment::new(address, size)))
            }
        }
    }

    fn finish(&mut self) -> Result<(), Desync> {
        std::mem::take(&mut self.state).into_unmatched()
    }

    fn format_name(&self) -> &'static str {
        "readelf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const READELF_OUTPUT: &str = "
Elf file type is CORE (Core file)
Entry point 0x0
There are 3 program headers, starting at offset 64

Program Headers:
  Type           Offset             VirtAddr           PhysAddr
                 FileSiz            MemSiz              Flags  Align
  NOTE           0x00000000000000e8 0x0000000000000000 0x0000000000000000
                 0x0000000000000a3c 0x0000000000000000         0x0
  LOAD           0x0000000000001000 0x0000000000400000 0x0000000000000000
                 0x0000000000001000 0x0000000000001000  R E    0x1000
  LOAD           0x0000000000002000 0x0000000000600000 0x0000000000000000
                 0x0000000000001000 0x0000000000021000  RW     0x1000
";

    fn scan_all(input: &str) -> (Vec<Segment>, Vec<Desync>) {
        let mut scanner = ReadelfScanner::new();
        let mut segments = Vec::new();
        let mut desyncs = Vec::new();
        for line in input.lines() {
            match scanner.accept(line) {
                Ok(Some(seg)) => segments.push(seg),
                Ok(None) => {}
                Err(d) => desyncs.push(d),
            }
        }
        if let Err(d) = scanner.finish() {
            desyncs.push(d);
        }
        (segments, desyncs)
    }

    #[test]
    fn takes_size_from_the_following_line() {
        let (segments, desyncs) =
            scan_all("LOAD 0x0 0x400000 0x400000\n0x800 0x1000 R E 0x1000\n");
        assert_eq!(segments, vec![Segment::new("0x400000", "0x1000")]);
        assert!(desyncs.is_empty());
    }

    #[test]
    fn reads_program_header_table() {
        let (segments, desyncs) = scan_all(READELF_OUTPUT);
        assert_eq!(
            segments,
            vec![
                Segment::new("0x0000000000400000", "0x0000000000001000"),
                Segment::new("0x0000000000600000", "0x0000000000021000"),
            ]
        );
        assert!(desyncs.is_empty());
    }

    #[test]
    fn next_line_is_trusted_whatever_it_holds() {
        let (segments, _) = scan_all("LOAD 0x0 0x400000 0x400000\n[Requesting interpreter]\n");
        assert_eq!(segments, vec![Segment::new("0x400000", "interpreter]")]);
    }

    #[test]
    fn load_after_load_is_read_as_size_line() {
        let (segments, desyncs) = scan_all("LOAD a b c\nLOAD d e f\n");
        assert_eq!(segments, vec![Segment::new("b", "d")]);
        assert!(desyncs.is_empty());
    }

    #[test]
    fn load_at_end_of_input_is_dropped() {
        let (segments, desyncs) = scan_all("LOAD 0x0 0x400000 0x400000\n");
        assert!(segments.is_empty());
        assert_eq!(
            desyncs,
            vec![Desync::UnmatchedAddress {
                address: "0x400000".into(),
                line: 1
            }]
        );
    }

    #[test]
    fn short_size_line_returns_to_idle() {
        let mut scanner = ReadelfScanner::new();
        assert_eq!(scanner.accept("LOAD 0x0 0x400000 0x400000"), Ok(None));
        assert_eq!(
            scanner.accept("0x1000"),
            Err(Desync::MissingField {
                field: "LOAD memory size",
                line: 2
            })
        );
        assert_eq!(scanner.accept("0x1000 0x2000"), Ok(None));
        assert_eq!(scanner.finish(), Ok(()));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (segments, desyncs) = scan_all("");
        assert!(segments.is_empty());
        assert!(desyncs.is_empty());
    }
}
