use crate::codec::{read_uint, Endianness, Width};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NoteEntry<'a> {
    /// The owner of the note, without its null terminator.
    pub name: &'a [u8],
    pub entry_type: u32,
    pub desc: &'a [u8],
}

/// Iterates over the records of a note segment or section.
#[derive(Clone, Debug)]
pub struct NoteIter<'a> {
    data: &'a [u8],
    endianness: Endianness,
    alignment: usize,
}

impl<'a> NoteIter<'a> {
    /// Notes are padded to 4 bytes, except in segments and sections that declare an alignment of 8 (such as
    /// `.note.gnu.property` in ELF64 files).
    pub(crate) fn new(data: &'a [u8], endianness: Endianness, alignment: u64) -> NoteIter<'a> {
        let alignment = if alignment == 8 { 8 } else { 4 };
        NoteIter { data, endianness, alignment }
    }
}

impl<'a> Iterator for NoteIter<'a> {
    type Item = NoteEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let name_size = read_uint(self.data, 0, Width::U32, self.endianness).ok()? as usize;
        let desc_size = read_uint(self.data, 4, Width::U32, self.endianness).ok()? as usize;
        let entry_type = read_uint(self.data, 8, Width::U32, self.endianness).ok()? as u32;

        // Calculate the offsets to the description and next entry
        let desc_offset = align_up(12usize.checked_add(name_size)?, self.alignment)?;
        let next_entry_offset = align_up(desc_offset.checked_add(desc_size)?, self.alignment)?;

        /*
         * Make sure the entry is complete, otherwise we'd read past the end of the data. We treat incomplete
         * entries as missing by returning `None`. The final entry may omit its trailing padding.
         */
        if self.data.len() < desc_offset + desc_size {
            return None;
        }

        let name = &self.data[12..(12 + name_size)];
        let name = match name.split_last() {
            Some((0, rest)) => rest,
            _ => name,
        };
        let desc = &self.data[desc_offset..(desc_offset + desc_size)];

        self.data = self.data.get(next_entry_offset..).unwrap_or(&[]);
        Some(NoteEntry { name, entry_type, desc })
    }
}

fn align_up(offset: usize, alignment: usize) -> Option<usize> {
    if offset % alignment == 0 {
        Some(offset)
    } else {
        offset.checked_add(alignment - (offset % alignment))
    }
}
