//! Fixed-width integer reads at arbitrary offsets, in either byte order.
//!
//! Everything above this module reads the file through [`read_uint`] (or the [`Cursor`] built on top of it), so
//! the 32-/64-bit layout difference and the byte order are both decided in exactly one place.

use core::fmt;
use scroll::Pread;

/// The ELF class, which decides the width of addresses and offsets throughout the file.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Class {
    Elf32,
    Elf64,
}

impl Class {
    pub fn from_byte(byte: u8) -> Option<Class> {
        match byte {
            1 => Some(Class::Elf32),
            2 => Some(Class::Elf64),
            _ => None,
        }
    }

    /// The size of the fixed ELF header, including the 16-byte identification block.
    pub const fn header_size(self) -> u16 {
        match self {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    pub const fn program_header_size(self) -> u16 {
        match self {
            Class::Elf32 => 0x20,
            Class::Elf64 => 0x38,
        }
    }

    pub const fn section_header_size(self) -> u16 {
        match self {
            Class::Elf32 => 0x28,
            Class::Elf64 => 0x40,
        }
    }

    /// The width of address-sized fields (`Elf32_Addr`/`Elf64_Addr`, `Elf32_Off`/`Elf64_Off`).
    pub const fn word_width(self) -> Width {
        match self {
            Class::Elf32 => Width::U32,
            Class::Elf64 => Width::U64,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Class::Elf32 => write!(f, "ELF32"),
            Class::Elf64 => write!(f, "ELF64"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn from_byte(byte: u8) -> Option<Endianness> {
        match byte {
            1 => Some(Endianness::Little),
            2 => Some(Endianness::Big),
            _ => None,
        }
    }
}

impl From<Endianness> for scroll::Endian {
    fn from(endianness: Endianness) -> scroll::Endian {
        match endianness {
            Endianness::Little => scroll::Endian::Little,
            Endianness::Big => scroll::Endian::Big,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little-endian"),
            Endianness::Big => write!(f, "big-endian"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Width {
    U8,
    U16,
    U32,
    U64,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
            Width::U64 => 8,
        }
    }
}

/// A read of `width` bytes at `offset` would run past the end of a buffer of length `len`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutOfBounds {
    pub offset: usize,
    pub width: Width,
    pub len: usize,
}

/// Read an unsigned integer of the given width from `bytes` at `offset`.
pub fn read_uint(bytes: &[u8], offset: usize, width: Width, endianness: Endianness) -> Result<u64, OutOfBounds> {
    let out_of_bounds = OutOfBounds { offset, width, len: bytes.len() };
    match offset.checked_add(width.bytes()) {
        Some(end) if end <= bytes.len() => (),
        _ => return Err(out_of_bounds),
    }

    let endian = scroll::Endian::from(endianness);
    let value = match width {
        Width::U8 => bytes.pread_with::<u8>(offset, endian).map(u64::from),
        Width::U16 => bytes.pread_with::<u16>(offset, endian).map(u64::from),
        Width::U32 => bytes.pread_with::<u32>(offset, endian).map(u64::from),
        Width::U64 => bytes.pread_with::<u64>(offset, endian),
    };
    value.map_err(|_| out_of_bounds)
}

/// The class and byte order of a file. Established by the identification block, and used to decode everything
/// after it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Codec {
    pub class: Class,
    pub endianness: Endianness,
}

impl Codec {
    pub fn new(class: Class, endianness: Endianness) -> Codec {
        Codec { class, endianness }
    }

    pub fn read(&self, bytes: &[u8], offset: usize, width: Width) -> Result<u64, OutOfBounds> {
        read_uint(bytes, offset, width, self.endianness)
    }

    pub fn cursor<'a>(&self, bytes: &'a [u8], offset: usize) -> Cursor<'a> {
        Cursor { bytes, offset, codec: *self }
    }
}

/// Reads consecutive fields of a structure, advancing past each one.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    codec: Codec,
}

impl Cursor<'_> {
    /// The offset of the next field to be read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn take(&mut self, width: Width) -> Result<u64, OutOfBounds> {
        let value = self.codec.read(self.bytes, self.offset, width)?;
        self.offset += width.bytes();
        Ok(value)
    }

    pub fn u16(&mut self) -> Result<u16, OutOfBounds> {
        self.take(Width::U16).map(|value| value as u16)
    }

    pub fn u32(&mut self) -> Result<u32, OutOfBounds> {
        self.take(Width::U32).map(|value| value as u32)
    }

    /// Read an address-sized field: 4 bytes for ELF32 and 8 bytes for ELF64, widened to `u64`.
    pub fn word(&mut self) -> Result<u64, OutOfBounds> {
        self.take(self.codec.class.word_width())
    }
}
