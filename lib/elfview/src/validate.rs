use crate::{
    error::Table,
    header::{Header, ObjectType},
    program::{ProgramHeader, SegmentType},
    section::SectionHeader,
    DecodeError,
};
use alloc::vec::Vec;
use log::warn;
use thiserror::Error;

/// Something odd about an image that doesn't stop it from being decoded.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Warning {
    /// The image is an executable, but has an entry point of `0`.
    #[error("executable has an entry point of {entry_point:#x}")]
    SuspiciousEntryPoint { entry_point: u64 },

    /// A loadable segment has more bytes in the file than it occupies in memory.
    #[error(
        "loadable segment {index} has a file size ({file_size:#x}) larger than its memory size ({mem_size:#x})"
    )]
    SegmentFileSizeExceedsMemorySize { index: usize, file_size: u64, mem_size: u64 },
}

/// Cross-check the decoded tables against the buffer, producing any warnings. This runs last, once both tables
/// have been decoded and the section names resolved.
pub fn validate(
    bytes: &[u8],
    header: &Header,
    segments: &[ProgramHeader],
    sections: &[SectionHeader],
) -> Result<Vec<Warning>, DecodeError> {
    let mut warnings = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        let entry = entry_offset(header, Table::ProgramHeaders, index);
        check_in_bounds(bytes, Table::ProgramHeaders, index, entry, segment.offset, segment.file_size)?;

        if segment.alignment != 0 && !segment.alignment.is_power_of_two() {
            return Err(DecodeError::InvalidAlignment { index, offset: entry, alignment: segment.alignment });
        }

        if segment.segment_type == SegmentType::Load && segment.file_size > segment.mem_size {
            warnings.push(Warning::SegmentFileSizeExceedsMemorySize {
                index,
                file_size: segment.file_size,
                mem_size: segment.mem_size,
            });
        }
    }

    for (index, section) in sections.iter().enumerate().filter(|(_, section)| section.has_file_data()) {
        let entry = entry_offset(header, Table::SectionHeaders, index);
        check_in_bounds(bytes, Table::SectionHeaders, index, entry, section.offset, section.size)?;
    }

    if header.object_type == ObjectType::Executable && header.entry_point == 0 {
        warnings.push(Warning::SuspiciousEntryPoint { entry_point: header.entry_point });
    }

    for warning in &warnings {
        warn!("{}", warning);
    }
    Ok(warnings)
}

/// Where the header of entry `index` of `table` sits in the file. Only called for entries that have been decoded,
/// so the table is known to fit in the buffer.
fn entry_offset(header: &Header, table: Table, index: usize) -> usize {
    let (table_offset, entry_size) = match table {
        Table::ProgramHeaders => (header.program_header_offset, header.program_header_entry_size),
        Table::SectionHeaders => (header.section_header_offset, header.section_header_entry_size),
    };
    table_offset as usize + index * entry_size as usize
}

fn check_in_bounds(
    bytes: &[u8],
    table: Table,
    index: usize,
    entry: usize,
    data_offset: u64,
    size: u64,
) -> Result<(), DecodeError> {
    match data_offset.checked_add(size) {
        Some(end) if end <= bytes.len() as u64 => Ok(()),
        _ => Err(DecodeError::DataOutOfBounds {
            table,
            index,
            offset: entry,
            data_offset,
            size,
            len: bytes.len(),
        }),
    }
}
