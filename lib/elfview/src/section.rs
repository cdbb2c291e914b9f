use crate::{
    codec::{Codec, Cursor, OutOfBounds},
    error::Table,
    header::Header,
    table::{self, Geometry},
    DecodeError,
};
use alloc::vec::Vec;
use bitflags::bitflags;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SectionType {
    /// The first section in a valid ELF's section table will be a null section. It does not detail
    /// a real section.
    Null,

    /// Contains information defined by the program.
    ProgBits,

    /// Contains a symbol table.
    SymTab,

    /// Contains a string table.
    StrTab,

    /// Contains "Rela"-type relocations.
    Rela,

    /// Contains a symbol hash table.
    Hash,

    /// Contains tables used during dynamic linking.
    Dynamic,

    /// Contains note information.
    Note,

    /// Defines a section as containing uninitialized space. This section does not take up any
    /// space in the file and is usually loaded with `0`s during program loading.
    NoBits,

    /// Contains "Rel"-type relocations.
    Rel,

    /// Reserved by the spec.
    ShLib,

    /// Contains a minimal set of dynamic linking symbols
    DynSym,

    InitArray,
    FiniArray,
    PreInitArray,
    Group,
    SymTabShndx,

    /// Types `0x60000000` through `0x6fffffff` inclusive are environment-specific.
    Os(u32),

    /// Types `0x70000000` through `0x7fffffff` inclusive are processor-specific.
    Proc(u32),

    /// Types `0x80000000` through `0xffffffff` inclusive are reserved for applications.
    User(u32),
    Unknown(u32),
}

impl From<u32> for SectionType {
    fn from(value: u32) -> SectionType {
        match value {
            0 => SectionType::Null,
            1 => SectionType::ProgBits,
            2 => SectionType::SymTab,
            3 => SectionType::StrTab,
            4 => SectionType::Rela,
            5 => SectionType::Hash,
            6 => SectionType::Dynamic,
            7 => SectionType::Note,
            8 => SectionType::NoBits,
            9 => SectionType::Rel,
            10 => SectionType::ShLib,
            11 => SectionType::DynSym,
            14 => SectionType::InitArray,
            15 => SectionType::FiniArray,
            16 => SectionType::PreInitArray,
            17 => SectionType::Group,
            18 => SectionType::SymTabShndx,
            0x60000000..=0x6fffffff => SectionType::Os(value),
            0x70000000..=0x7fffffff => SectionType::Proc(value),
            0x80000000..=0xffffffff => SectionType::User(value),
            other => SectionType::Unknown(other),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct SectionFlags: u64 {
        const WRITE = 0x1;
        const ALLOC = 0x2;
        const EXECINSTR = 0x4;
        const MERGE = 0x10;
        const STRINGS = 0x20;
        /// `sh_info` contains a section header table index.
        const INFO_LINK = 0x40;
        const LINK_ORDER = 0x80;
        const OS_NONCONFORMING = 0x100;
        const GROUP = 0x200;
        const TLS = 0x400;
        const COMPRESSED = 0x800;
        const MASKOS = 0x0ff0_0000;
        const MASKPROC = 0xf000_0000;
        /// Solaris
        const ORDERED = 0x0400_0000;
        /// Solaris
        const EXCLUDE = 0x0800_0000;
    }
}

/// A section header, as it appears in the file. The name is left as an offset into the section name string
/// table; see [`Section`](crate::Section) for a header with its name resolved.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SectionHeader {
    pub name_offset: u32,
    pub section_type: SectionType,
    pub flags: SectionFlags,
    pub address: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub alignment: u64,
    pub entry_size: u64,
}

impl SectionHeader {
    /// Decode one section header. Both classes share a field order: `sh_flags`, `sh_addr`, `sh_offset`,
    /// `sh_size`, `sh_addralign` and `sh_entsize` are address-sized, and the rest are always 32 bits.
    fn decode(cursor: &mut Cursor) -> Result<SectionHeader, OutOfBounds> {
        Ok(SectionHeader {
            name_offset: cursor.u32()?,
            section_type: SectionType::from(cursor.u32()?),
            flags: SectionFlags::from_bits_retain(cursor.word()?),
            address: cursor.word()?,
            offset: cursor.word()?,
            size: cursor.word()?,
            link: cursor.u32()?,
            info: cursor.u32()?,
            alignment: cursor.word()?,
            entry_size: cursor.word()?,
        })
    }

    /// Decode the section header table described by `header`. Names are not resolved here.
    pub fn decode_table(bytes: &[u8], codec: Codec, header: &Header) -> Result<Vec<SectionHeader>, DecodeError> {
        let geometry = Geometry {
            table: Table::SectionHeaders,
            offset: header.section_header_offset,
            entry_size: header.section_header_entry_size,
            count: header.number_of_section_headers,
        };
        table::decode(bytes, codec, geometry, SectionHeader::decode)
    }

    /// Whether the section's contents are actually stored in the file. `Null` sections don't describe anything,
    /// and `NoBits` sections only take up space in memory.
    pub fn has_file_data(&self) -> bool {
        !matches!(self.section_type, SectionType::Null | SectionType::NoBits)
    }

    /// Whether this section contains writable data
    pub fn is_writable(&self) -> bool {
        self.flags.contains(SectionFlags::WRITE)
    }

    /// Whether this section should be allocated into the memory image of the program
    pub fn is_allocated(&self) -> bool {
        self.flags.contains(SectionFlags::ALLOC)
    }

    /// Whether this section contains executable instructions
    pub fn is_executable(&self) -> bool {
        self.flags.contains(SectionFlags::EXECINSTR)
    }
}
