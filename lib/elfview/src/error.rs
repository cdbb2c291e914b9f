use core::fmt;
use thiserror::Error;

/// One of the two header tables.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Table {
    ProgramHeaders,
    SectionHeaders,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Table::ProgramHeaders => write!(f, "program header table"),
            Table::SectionHeaders => write!(f, "section header table"),
        }
    }
}

/// Why a buffer could not be decoded. Every variant carries the byte offset at which the problem was detected.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum DecodeError {
    /*
     * Errors produced reading the identification block.
     */
    /// The magic number at the beginning of the file (should be `0x7f, 'E', 'L', 'F'`) is incorrect. `offset` is
    /// the first byte that didn't match, or the length of the buffer if it ended first.
    #[error("bad ELF magic at offset {offset:#x}")]
    BadMagic { offset: usize },

    #[error("unsupported ELF class {value:#x} at offset {offset:#x}")]
    UnsupportedBitWidth { offset: usize, value: u8 },

    #[error("unsupported data encoding {value:#x} at offset {offset:#x}")]
    UnsupportedEndianness { offset: usize, value: u8 },

    /*
     * Errors produced decoding the header.
     */
    #[error("header truncated at offset {offset:#x} while reading `{field}`")]
    TruncatedHeader { offset: usize, field: &'static str },

    #[error("`e_ehsize` at offset {offset:#x} is {found}, expected {expected}")]
    InconsistentHeaderSize { offset: usize, expected: u16, found: u16 },

    /*
     * Errors produced decoding the program and section header tables.
     */
    /// The header's entry size for a table doesn't match the entry size of the file's class. `offset` locates
    /// the entry-size field in the header.
    #[error("{table} entries are {found:#x} bytes, expected {expected:#x} (field at offset {offset:#x})")]
    UnexpectedEntrySize { table: Table, offset: usize, expected: u16, found: u16 },

    /// The table starting at `offset` doesn't fit in the buffer. `end` is `None` if computing the end of the
    /// table overflowed.
    #[error("{table} at offset {offset:#x} ends at {end:x?}, past the end of the {len}-byte buffer")]
    TableOutOfBounds { table: Table, offset: u64, end: Option<u64>, len: usize },

    /*
     * Errors produced validating the decoded tables.
     */
    /// The segment or section with index `index`, whose header starts at `offset`, describes `size` bytes of file
    /// data at `data_offset` that run past the end of the buffer.
    #[error(
        "entry {index} of the {table} (at offset {offset:#x}) describes {size:#x} bytes at {data_offset:#x}, \
         past the end of the {len}-byte buffer"
    )]
    DataOutOfBounds { table: Table, index: usize, offset: usize, data_offset: u64, size: u64, len: usize },

    /// The segment with index `index`, whose header starts at `offset`, has an alignment that isn't a power of
    /// two.
    #[error(
        "segment {index} (header at offset {offset:#x}) has alignment {alignment:#x}, which is not a power of two"
    )]
    InvalidAlignment { index: usize, offset: usize, alignment: u64 },

    /*
     * Errors produced resolving section names. Decoding can continue without names if these are tolerated.
     */
    /// `e_shstrndx` (at `offset`) doesn't name a string table section.
    #[error("section name string table index {index} (field at offset {offset:#x}) is not a string table")]
    InvalidStringTableIndex { offset: usize, index: u16 },

    /// The name of the section `section` can't be read from the string table, which starts at `offset`.
    #[error(
        "name of section {section} at string table offset {name_offset:#x} (table at {offset:#x}) is out of \
         bounds or unterminated"
    )]
    StringOffsetOutOfBounds { section: usize, name_offset: u32, offset: u64 },

    /// The name of the section `section`, starting at file offset `offset`, is not valid UTF-8.
    #[error("name of section {section} at offset {offset:#x} is not valid UTF-8")]
    NonUtf8Name { section: usize, offset: u64 },
}

impl DecodeError {
    /// Whether this error only prevents section names from being resolved, leaving the rest of the image usable.
    pub fn is_name_error(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidStringTableIndex { .. }
                | DecodeError::StringOffsetOutOfBounds { .. }
                | DecodeError::NonUtf8Name { .. }
        )
    }

    /// The byte offset in the buffer at which the problem was detected.
    pub fn offset(&self) -> u64 {
        match *self {
            DecodeError::BadMagic { offset }
            | DecodeError::UnsupportedBitWidth { offset, .. }
            | DecodeError::UnsupportedEndianness { offset, .. }
            | DecodeError::TruncatedHeader { offset, .. }
            | DecodeError::InconsistentHeaderSize { offset, .. }
            | DecodeError::UnexpectedEntrySize { offset, .. }
            | DecodeError::DataOutOfBounds { offset, .. }
            | DecodeError::InvalidAlignment { offset, .. }
            | DecodeError::InvalidStringTableIndex { offset, .. } => offset as u64,

            DecodeError::TableOutOfBounds { offset, .. }
            | DecodeError::StringOffsetOutOfBounds { offset, .. }
            | DecodeError::NonUtf8Name { offset, .. } => offset,
        }
    }
}
