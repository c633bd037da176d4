use super::{field, SegmentScanner, State};
use crate::error::Desync;
use crate::Segment;

const ADDRESS_MARKER: &str = "vmaddr";
const SIZE_MARKER: &str = "vmsize";

/// Recognizes segment load commands in `otool -l` output.
///
/// Each `LC_SEGMENT`/`LC_SEGMENT_64` command is printed as indented
/// `name value` lines; the scanner pairs a `vmaddr` line with the next
/// `vmsize` line and ignores everything else.
#[derive(Debug, Default)]
pub struct OtoolScanner {
    state: State,
    line: usize,
}

impl OtoolScanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SegmentScanner for OtoolScanner {
    fn accept(&mut self, line: &str) -> Result<Option<Segment>, Desync> {
        self.line += 1;
        let line_no = self.line;
        let line = line.trim();

        if line.starts_with(ADDRESS_MARKER) {
            let address = field(line, 1).ok_or(Desync::MissingField {
                field: ADDRESS_MARKER,
                line: line_no,
            })?;
            log::debug!("line {line_no}: segment starts at {address}");

            // A repeated vmaddr replaces the pending one.
            let previous = std::mem::replace(
                &mut self.state,
                State::ReadingSegment {
                    address: address.to_string(),
                    line: line_no,
                },
            );
            previous.into_unmatched()?;
            return Ok(None);
        }

        if line.starts_with(SIZE_MARKER) {
            if let State::ReadingSegment { address, .. } = std::mem::take(&mut self.state) {
                let size = field(line, 1).ok_or(Desync::MissingField {
                    field: SIZE_MARKER,
                    line: line_no,
                })?;
                return Ok(Some(Segment::new(address, size)));
            }
        }

        Ok(None)
    }

    fn finish(&mut self) -> Result<(), Desync> {
        std::mem::take(&mut self.state).into_unmatched()
    }

    fn format_name(&self) -> &'static str {
        "otool"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OTOOL_OUTPUT: &str = "\
/cores/core.4242:
Load command 0
      cmd LC_SEGMENT_64
  cmdsize 72
  segname
   vmaddr 0x0000000100000000
   vmsize 0x0000000000004000
  fileoff 8192
 filesize 16384
  maxprot 0x00000005
 initprot 0x00000005
   nsects 0
    flags 0x0
Load command 1
      cmd LC_SEGMENT_64
  cmdsize 72
  segname
   vmaddr 0x0000000100004000
   vmsize 0x0000000000008000
  fileoff 24576
 filesize 32768
  maxprot 0x00000003
 initprot 0x00000003
   nsects 0
    flags 0x0
Load command 2
        cmd LC_THREAD
    cmdsize 184
";

    fn scan_all(input: &str) -> (Vec<Segment>, Vec<Desync>) {
        let mut scanner = OtoolScanner::new();
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
    fn pairs_vmaddr_with_following_vmsize() {
        let (segments, desyncs) = scan_all("vmaddr 0x100000000\nfileoff 0\nvmsize 0x4000\n");
        assert_eq!(segments, vec![Segment::new("0x100000000", "0x4000")]);
        assert!(desyncs.is_empty());
    }

    #[test]
    fn emits_segments_in_load_command_order() {
        let (segments, desyncs) = scan_all(OTOOL_OUTPUT);
        assert_eq!(
            segments,
            vec![
                Segment::new("0x0000000100000000", "0x0000000000004000"),
                Segment::new("0x0000000100004000", "0x0000000000008000"),
            ]
        );
        assert!(desyncs.is_empty());
    }

    #[test]
    fn lines_before_first_marker_are_ignored() {
        let mut scanner = OtoolScanner::new();
        assert_eq!(scanner.accept("Load command 0"), Ok(None));
        assert_eq!(scanner.accept("vmsize 0x1000"), Ok(None));
        assert_eq!(scanner.finish(), Ok(()));
    }

    #[test]
    fn unmatched_address_is_dropped_at_end_of_input() {
        let (segments, desyncs) = scan_all("vmaddr 0x1000\nfileoff 0\n");
        assert!(segments.is_empty());
        assert_eq!(
            desyncs,
            vec![Desync::UnmatchedAddress {
                address: "0x1000".into(),
                line: 1
            }]
        );
    }

    #[test]
    fn repeated_vmaddr_replaces_pending_address() {
        let (segments, desyncs) = scan_all("vmaddr 0x1000\nvmaddr 0x2000\nvmsize 0x10\n");
        assert_eq!(segments, vec![Segment::new("0x2000", "0x10")]);
        assert_eq!(
            desyncs,
            vec![Desync::UnmatchedAddress {
                address: "0x1000".into(),
                line: 1
            }]
        );
    }

    #[test]
    fn vmsize_without_value_drops_segment() {
        let (segments, desyncs) = scan_all("vmaddr 0x1000\nvmsize\nvmsize 0x20\n");
        assert!(segments.is_empty());
        assert_eq!(
            desyncs,
            vec![Desync::MissingField {
                field: "vmsize",
                line: 2
            }]
        );
    }

    #[test]
    fn vmaddr_without_value_does_not_start_segment() {
        let (segments, desyncs) = scan_all("vmaddr\nvmsize 0x20\n");
        assert!(segments.is_empty());
        assert_eq!(
            desyncs,
            vec![Desync::MissingField {
                field: "vmaddr",
                line: 1
            }]
        );
    }
}
