use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use coreseg_core::Segment;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One `<address> <size>` line per segment
    Text,
    /// A JSON document with the source and the segment list
    Json,
    /// A human-readable table
    Table,
}

#[derive(Serialize)]
struct Report<'a> {
    core_file: &'a Path,
    source: &'a str,
    segments: &'a [Segment],
}

#[derive(Tabled)]
struct SegmentRow<'a> {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Address")]
    address: &'a str,
    #[tabled(rename = "Size")]
    size: &'a str,
}

pub fn write_json<W: Write>(
    mut out: W,
    core_file: &Path,
    source: &str,
    segments: &[Segment],
) -> Result<()> {
    let report = Report {
        core_file,
        source,
        segments,
    };
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_table<W: Write>(mut out: W, segments: &[Segment]) -> Result<()> {
    if segments.is_empty() {
        writeln!(out, "No segments found.")?;
        return Ok(());
    }
    let rows = segments.iter().enumerate().map(|(index, seg)| SegmentRow {
        index,
        address: &seg.address,
        size: &seg.size,
    });
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    writeln!(out, "{table}")?;
    Ok(())
}
