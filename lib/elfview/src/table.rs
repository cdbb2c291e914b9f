use crate::{
    codec::{Codec, Cursor, OutOfBounds},
    error::Table,
    header::TailField,
    DecodeError,
};
use alloc::vec::Vec;
use log::{debug, trace};

/// Where a table lives in the file, as described by the header.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Geometry {
    pub table: Table,
    pub offset: u64,
    pub entry_size: u16,
    pub count: u16,
}

impl Geometry {
    fn expected_entry_size(&self, codec: Codec) -> u16 {
        match self.table {
            Table::ProgramHeaders => codec.class.program_header_size(),
            Table::SectionHeaders => codec.class.section_header_size(),
        }
    }

    fn entry_size_field(&self) -> TailField {
        match self.table {
            Table::ProgramHeaders => TailField::ProgramHeaderEntrySize,
            Table::SectionHeaders => TailField::SectionHeaderEntrySize,
        }
    }
}

/// Decode every entry of a table, in order. The table's geometry is checked against the class and the buffer
/// before any entry is read, so an entry is either decoded from a correctly-aligned, in-bounds slot or not at all.
pub(crate) fn decode<T, F>(
    bytes: &[u8],
    codec: Codec,
    geometry: Geometry,
    decode_entry: F,
) -> Result<Vec<T>, DecodeError>
where
    F: Fn(&mut Cursor) -> Result<T, OutOfBounds>,
{
    if geometry.count == 0 {
        debug!("{} is empty", geometry.table);
        return Ok(Vec::new());
    }

    let expected = geometry.expected_entry_size(codec);
    if geometry.entry_size != expected {
        return Err(DecodeError::UnexpectedEntrySize {
            table: geometry.table,
            offset: geometry.entry_size_field().offset(codec.class),
            expected,
            found: geometry.entry_size,
        });
    }

    let out_of_bounds = |end| DecodeError::TableOutOfBounds {
        table: geometry.table,
        offset: geometry.offset,
        end,
        len: bytes.len(),
    };
    let end = (geometry.entry_size as u64)
        .checked_mul(geometry.count as u64)
        .and_then(|size| size.checked_add(geometry.offset))
        .ok_or(out_of_bounds(None))?;
    if end > bytes.len() as u64 {
        return Err(out_of_bounds(Some(end)));
    }

    debug!(
        "Decoding {} entries of the {} ({:#x}..{:#x})",
        geometry.count, geometry.table, geometry.offset, end
    );
    (0..geometry.count as usize)
        .map(|index| {
            let start = geometry.offset as usize + index * geometry.entry_size as usize;
            trace!("{} entry {} at {:#x}", geometry.table, index, start);
            decode_entry(&mut codec.cursor(bytes, start)).map_err(|_| out_of_bounds(Some(end)))
        })
        .collect()
}
