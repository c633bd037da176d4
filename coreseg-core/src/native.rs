//! Segment lists read straight from the core file, without an external tool.

use std::path::Path;

use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;
use goblin::mach::load_command::LC_SEGMENT_64;
use goblin::mach::{Mach, MachO};
use goblin::Object;

use crate::error::{Error, Result};
use crate::Segment;

const VM_PROT_WRITE: u32 = 0x2;

/// Reads the loadable segments of the core file at `path`.
pub fn read_segments<P: AsRef<Path>>(path: P) -> Result<Vec<Segment>> {
    let buf = std::fs::read(&path)?;
    log::info!("Read {} bytes from {}", buf.len(), path.as_ref().display());
    segments_from_bytes(&buf)
}

/// Lists loadable segments of an in-memory object file.
///
/// Mach-O: every writable `LC_SEGMENT_64`, tokens as 16 bare hex digits.
/// ELF: every `PT_LOAD` program header, tokens as `0x` plus 16 hex digits.
pub fn segments_from_bytes(buf: &[u8]) -> Result<Vec<Segment>> {
    match Object::parse(buf)? {
        Object::Elf(elf) => Ok(elf_segments(&elf)),
        Object::Mach(Mach::Binary(macho)) => macho_segments(&macho),
        Object::Mach(Mach::Fat(_)) => Err(Error::Unsupported(
            "universal (fat) Mach-O files do not hold a process image".into(),
        )),
        _ => Err(Error::Unsupported("not an ELF or Mach-O file".into())),
    }
}

fn macho_segments(macho: &MachO) -> Result<Vec<Segment>> {
    if !macho.is_64 || !macho.little_endian {
        return Err(Error::Unsupported(
            "only 64-bit little-endian Mach-O cores are supported".into(),
        ));
    }

    let mut segments = Vec::new();
    for seg in macho.segments.iter() {
        if seg.cmd != LC_SEGMENT_64 {
            continue;
        }
        // Read-only mappings come from the executable and its dylibs.
        if (seg.initprot | seg.maxprot) & VM_PROT_WRITE == 0 {
            log::debug!(
                "Skipping read-only segment {} at {:#x}",
                seg.name().unwrap_or("?"),
                seg.vmaddr
            );
            continue;
        }
        segments.push(Segment::new(
            format!("{:016x}", seg.vmaddr),
            format!("{:016x}", seg.vmsize),
        ));
    }
    log::info!("Found {} writable Mach-O segments", segments.len());
    Ok(segments)
}

fn elf_segments(elf: &Elf) -> Vec<Segment> {
    let segments: Vec<Segment> = elf
        .program_headers
        .iter()
        .filter(|ph| ph.p_type == PT_LOAD)
        .map(|ph| Segment::new(format!("{:#018x}", ph.p_vaddr), format!("{:#018x}", ph.p_memsz)))
        .collect();
    log::info!("Found {} PT_LOAD segments", segments.len());
    segments
}
