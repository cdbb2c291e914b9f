use crate::{
    codec::Class,
    header::TailField,
    section::{SectionHeader, SectionType},
    DecodeError,
};
use alloc::vec::Vec;
use core::str;
use log::debug;

/// Resolve the name of every section from the section name string table at `string_table_index`. The returned
/// names are in the same order as `sections`, and borrow from `bytes`.
pub fn resolve<'a>(
    bytes: &'a [u8],
    class: Class,
    sections: &[SectionHeader],
    string_table_index: u16,
) -> Result<Vec<&'a str>, DecodeError> {
    if sections.is_empty() {
        return Ok(Vec::new());
    }

    let string_table = sections
        .get(string_table_index as usize)
        .filter(|section| section.section_type == SectionType::StrTab)
        .ok_or(DecodeError::InvalidStringTableIndex {
            offset: TailField::StringTableIndex.offset(class),
            index: string_table_index,
        })?;
    debug!(
        "Resolving section names from string table {} ({:#x} bytes at {:#x})",
        string_table_index, string_table.size, string_table.offset
    );

    let table_data = string_table
        .offset
        .checked_add(string_table.size)
        .filter(|&end| end <= bytes.len() as u64)
        .map(|end| &bytes[(string_table.offset as usize)..(end as usize)]);

    sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let out_of_bounds = DecodeError::StringOffsetOutOfBounds {
                section: index,
                name_offset: section.name_offset,
                offset: string_table.offset,
            };
            let name = table_data
                .and_then(|data| data.get((section.name_offset as usize)..))
                .and_then(null_terminated)
                .ok_or(out_of_bounds)?;
            str::from_utf8(name).map_err(|_| DecodeError::NonUtf8Name {
                section: index,
                offset: string_table.offset + section.name_offset as u64,
            })
        })
        .collect()
}

/// The bytes of `bytes` before the first null, or `None` if there is no null terminator.
pub(crate) fn null_terminated(bytes: &[u8]) -> Option<&[u8]> {
    let null_terminator_index = bytes.iter().position(|&c| c == b'\0')?;
    Some(&bytes[0..null_terminator_index])
}
