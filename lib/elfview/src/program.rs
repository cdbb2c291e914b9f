use crate::{
    codec::{Class, Codec, Cursor, OutOfBounds},
    error::Table,
    header::Header,
    table::{self, Geometry},
    DecodeError,
};
use alloc::vec::Vec;
use bitflags::bitflags;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SegmentType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    GnuProperty,

    /// A segment with type `0x60000000` through `0x6fffffff` inclusive is defined to be
    /// environment-specific.
    Os(u32),

    /// A segment with type `0x70000000` through `0x7fffffff` inclusive is defined to be
    /// processor-specific.
    Proc(u32),
    Unknown(u32),
}

impl From<u32> for SegmentType {
    fn from(value: u32) -> SegmentType {
        match value {
            0 => SegmentType::Null,
            1 => SegmentType::Load,
            2 => SegmentType::Dynamic,
            3 => SegmentType::Interp,
            4 => SegmentType::Note,
            5 => SegmentType::Shlib,
            6 => SegmentType::Phdr,
            7 => SegmentType::Tls,
            0x6474e550 => SegmentType::GnuEhFrame,
            0x6474e551 => SegmentType::GnuStack,
            0x6474e552 => SegmentType::GnuRelro,
            0x6474e553 => SegmentType::GnuProperty,
            0x60000000..=0x6fffffff => SegmentType::Os(value),
            0x70000000..=0x7fffffff => SegmentType::Proc(value),
            other => SegmentType::Unknown(other),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct SegmentFlags: u32 {
        const EXECUTABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const READABLE = 1 << 2;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProgramHeader {
    pub segment_type: SegmentType,
    pub flags: SegmentFlags,
    pub offset: u64,
    pub virtual_address: u64,
    pub physical_address: u64,
    pub file_size: u64,
    pub mem_size: u64,
    pub alignment: u64,
}

impl ProgramHeader {
    /// Decode one program header. The two classes don't just differ in field widths: `p_flags` comes straight
    /// after `p_type` in ELF64 (keeping the 64-bit fields naturally aligned), but after `p_memsz` in ELF32.
    fn decode(cursor: &mut Cursor, class: Class) -> Result<ProgramHeader, OutOfBounds> {
        let segment_type = SegmentType::from(cursor.u32()?);
        match class {
            Class::Elf32 => {
                let offset = cursor.word()?;
                let virtual_address = cursor.word()?;
                let physical_address = cursor.word()?;
                let file_size = cursor.word()?;
                let mem_size = cursor.word()?;
                let flags = SegmentFlags::from_bits_retain(cursor.u32()?);
                let alignment = cursor.word()?;
                Ok(ProgramHeader {
                    segment_type,
                    flags,
                    offset,
                    virtual_address,
                    physical_address,
                    file_size,
                    mem_size,
                    alignment,
                })
            }
            Class::Elf64 => {
                let flags = SegmentFlags::from_bits_retain(cursor.u32()?);
                let offset = cursor.word()?;
                let virtual_address = cursor.word()?;
                let physical_address = cursor.word()?;
                let file_size = cursor.word()?;
                let mem_size = cursor.word()?;
                let alignment = cursor.word()?;
                Ok(ProgramHeader {
                    segment_type,
                    flags,
                    offset,
                    virtual_address,
                    physical_address,
                    file_size,
                    mem_size,
                    alignment,
                })
            }
        }
    }

    /// Decode the program header table described by `header`.
    pub fn decode_table(bytes: &[u8], codec: Codec, header: &Header) -> Result<Vec<ProgramHeader>, DecodeError> {
        let geometry = Geometry {
            table: Table::ProgramHeaders,
            offset: header.program_header_offset,
            entry_size: header.program_header_entry_size,
            count: header.number_of_program_headers,
        };
        table::decode(bytes, codec, geometry, |cursor| ProgramHeader::decode(cursor, codec.class))
    }

    pub fn is_executable(&self) -> bool {
        self.flags.contains(SegmentFlags::EXECUTABLE)
    }

    pub fn is_writable(&self) -> bool {
        self.flags.contains(SegmentFlags::WRITABLE)
    }

    pub fn is_readable(&self) -> bool {
        self.flags.contains(SegmentFlags::READABLE)
    }
}
