use crate::{
    codec::{Class, Codec, OutOfBounds},
    ident::IDENT_SIZE,
    DecodeError,
};
use log::debug;

/// The ELF header, minus the identification block.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Header {
    pub object_type: ObjectType,
    pub machine: Machine,
    pub version: u32,
    pub entry_point: u64,
    pub program_header_offset: u64,
    pub section_header_offset: u64,
    pub flags: u32,
    pub header_size: u16,
    pub program_header_entry_size: u16,
    pub number_of_program_headers: u16,
    pub section_header_entry_size: u16,
    pub number_of_section_headers: u16,

    /// This is the section index of the string table that contains the names of the sections.
    pub string_table_index: u16,
}

/// The `u16` fields at the end of the header. They follow the three address-sized fields, so their offsets depend
/// on the class.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TailField {
    HeaderSize,
    ProgramHeaderEntrySize,
    SectionHeaderEntrySize,
    StringTableIndex,
}

impl TailField {
    pub(crate) fn offset(self, class: Class) -> usize {
        let tail_start = match class {
            Class::Elf32 => 40,
            Class::Elf64 => 52,
        };
        let index = match self {
            TailField::HeaderSize => 0,
            TailField::ProgramHeaderEntrySize => 1,
            TailField::SectionHeaderEntrySize => 3,
            TailField::StringTableIndex => 5,
        };
        tail_start + 2 * index
    }
}

impl Header {
    /// Decode the header that follows the identification block, using the class and byte order it established.
    pub fn decode(bytes: &[u8], codec: Codec) -> Result<Header, DecodeError> {
        let expected_size = codec.class.header_size();
        if bytes.len() < expected_size as usize {
            return Err(first_missing_field(bytes.len(), codec.class));
        }

        let mut cursor = codec.cursor(bytes, IDENT_SIZE);
        let object_type = field(cursor.u16(), "e_type")?;
        let machine = field(cursor.u16(), "e_machine")?;
        let version = field(cursor.u32(), "e_version")?;
        let entry_point = field(cursor.word(), "e_entry")?;
        let program_header_offset = field(cursor.word(), "e_phoff")?;
        let section_header_offset = field(cursor.word(), "e_shoff")?;
        let flags = field(cursor.u32(), "e_flags")?;
        let header_size = field(cursor.u16(), "e_ehsize")?;
        let program_header_entry_size = field(cursor.u16(), "e_phentsize")?;
        let number_of_program_headers = field(cursor.u16(), "e_phnum")?;
        let section_header_entry_size = field(cursor.u16(), "e_shentsize")?;
        let number_of_section_headers = field(cursor.u16(), "e_shnum")?;
        let string_table_index = field(cursor.u16(), "e_shstrndx")?;
        debug_assert_eq!(cursor.offset(), expected_size as usize);

        if header_size != expected_size {
            return Err(DecodeError::InconsistentHeaderSize {
                offset: TailField::HeaderSize.offset(codec.class),
                expected: expected_size,
                found: header_size,
            });
        }

        let header = Header {
            object_type: ObjectType::from(object_type),
            machine: Machine::from(machine),
            version,
            entry_point,
            program_header_offset,
            section_header_offset,
            flags,
            header_size,
            program_header_entry_size,
            number_of_program_headers,
            section_header_entry_size,
            number_of_section_headers,
            string_table_index,
        };
        debug!(
            "{:?} for {:?}: {} program headers at {:#x}, {} section headers at {:#x}",
            header.object_type,
            header.machine,
            header.number_of_program_headers,
            header.program_header_offset,
            header.number_of_section_headers,
            header.section_header_offset
        );
        Ok(header)
    }
}

fn field<T>(result: Result<T, OutOfBounds>, field: &'static str) -> Result<T, DecodeError> {
    result.map_err(|err| DecodeError::TruncatedHeader { offset: err.offset, field })
}

/// Work out which header field a buffer of length `len` cuts short, so a truncated header is reported against
/// the field that's actually missing.
fn first_missing_field(len: usize, class: Class) -> DecodeError {
    let word = class.word_width().bytes();
    let fields: [(&'static str, usize); 13] = [
        ("e_type", 2),
        ("e_machine", 2),
        ("e_version", 4),
        ("e_entry", word),
        ("e_phoff", word),
        ("e_shoff", word),
        ("e_flags", 4),
        ("e_ehsize", 2),
        ("e_phentsize", 2),
        ("e_phnum", 2),
        ("e_shentsize", 2),
        ("e_shnum", 2),
        ("e_shstrndx", 2),
    ];

    let mut offset = IDENT_SIZE;
    for (name, size) in fields {
        if offset + size > len {
            return DecodeError::TruncatedHeader { offset, field: name };
        }
        offset += size;
    }

    DecodeError::TruncatedHeader { offset: len, field: "e_shstrndx" }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,

    /// Types `0xfe00` through `0xfeff` inclusive are environment-specific.
    Os(u16),

    /// Types `0xff00` through `0xffff` inclusive are processor-specific.
    Proc(u16),
    Unknown(u16),
}

impl From<u16> for ObjectType {
    fn from(value: u16) -> ObjectType {
        match value {
            0 => ObjectType::None,
            1 => ObjectType::Relocatable,
            2 => ObjectType::Executable,
            3 => ObjectType::SharedObject,
            4 => ObjectType::Core,
            0xfe00..=0xfeff => ObjectType::Os(value),
            0xff00..=0xffff => ObjectType::Proc(value),
            other => ObjectType::Unknown(other),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Machine {
    None,
    Sparc,
    X86,
    M68k,
    Mips,
    PowerPc,
    PowerPc64,
    S390,
    Arm,
    SuperH,
    SparcV9,
    Ia64,
    X86_64,
    AArch64,
    RiscV,
    Bpf,
    LoongArch,
    Unknown(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Machine {
        match value {
            0x00 => Machine::None,
            0x02 => Machine::Sparc,
            0x03 => Machine::X86,
            0x04 => Machine::M68k,
            0x08 => Machine::Mips,
            0x14 => Machine::PowerPc,
            0x15 => Machine::PowerPc64,
            0x16 => Machine::S390,
            0x28 => Machine::Arm,
            0x2a => Machine::SuperH,
            0x2b => Machine::SparcV9,
            0x32 => Machine::Ia64,
            0x3e => Machine::X86_64,
            0xb7 => Machine::AArch64,
            0xf3 => Machine::RiscV,
            0xf7 => Machine::Bpf,
            0x102 => Machine::LoongArch,
            other => Machine::Unknown(other),
        }
    }
}
