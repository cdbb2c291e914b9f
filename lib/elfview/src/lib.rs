//! A bounds-checked decoder for the structure of ELF files: the identification block, the header, and the program
//! and section header tables. Both classes (ELF32 and ELF64) and both byte orders are supported, regardless of the
//! host's own. Designed to be usable from `no_std` environments, such as loaders and kernels.
//!
//! ```ignore
//! let image = ElfImage::parse(&bytes)?;
//! for section in image.sections() {
//!     println!("{:?}: {:?}", section.name, section.header.section_type);
//! }
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod codec;
pub mod error;
pub mod header;
pub mod ident;
pub mod names;
pub mod note;
pub mod program;
pub mod section;
mod table;
pub mod validate;

pub use crate::{
    codec::{Class, Codec, Endianness},
    error::{DecodeError, Table},
    header::{Header, Machine, ObjectType},
    ident::{Identification, OsAbi},
    note::{NoteEntry, NoteIter},
    program::{ProgramHeader, SegmentFlags, SegmentType},
    section::{SectionFlags, SectionHeader, SectionType},
    validate::Warning,
};

use alloc::vec::Vec;
use core::str;
use log::{debug, warn};

/// Controls how forgiving decoding is.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DecodeOptions {
    strict_names: bool,
}

impl DecodeOptions {
    pub fn new() -> DecodeOptions {
        DecodeOptions { strict_names: true }
    }

    /// If `true` (the default), failing to resolve the section names fails the whole decode. Otherwise, the image
    /// is produced with every section's name absent, and the error is available from [`ElfImage::name_error`].
    pub fn strict_names(self, strict_names: bool) -> DecodeOptions {
        DecodeOptions { strict_names, ..self }
    }
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions::new()
    }
}

/// A section header, along with its name if it could be resolved.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Section<'a> {
    pub header: SectionHeader,
    pub name: Option<&'a str>,
}

/// A decoded ELF file. This borrows the bytes it was decoded from, and never changes once it has been created.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ElfImage<'a> {
    bytes: &'a [u8],
    identification: Identification,
    header: Header,
    segments: Vec<ProgramHeader>,
    sections: Vec<Section<'a>>,
    warnings: Vec<Warning>,
    name_error: Option<DecodeError>,
}

impl<'a> ElfImage<'a> {
    /// Decode an `ElfImage` from a stream of bytes, with the default [`DecodeOptions`].
    pub fn parse(bytes: &'a [u8]) -> Result<ElfImage<'a>, DecodeError> {
        ElfImage::parse_with(bytes, DecodeOptions::default())
    }

    pub fn parse_with(bytes: &'a [u8], options: DecodeOptions) -> Result<ElfImage<'a>, DecodeError> {
        let identification = Identification::read(bytes)?;
        let codec = identification.codec();
        debug!("Decoding {} {} image ({} bytes)", identification.class, identification.endianness, bytes.len());

        let header = Header::decode(bytes, codec)?;
        let segments = ProgramHeader::decode_table(bytes, codec, &header)?;
        let section_headers = SectionHeader::decode_table(bytes, codec, &header)?;

        let (names, name_error) =
            match names::resolve(bytes, codec.class, &section_headers, header.string_table_index) {
                Ok(names) => (names, None),
                Err(err) if !options.strict_names => {
                    warn!("Section names could not be resolved: {}", err);
                    (Vec::new(), Some(err))
                }
                Err(err) => return Err(err),
            };
        let warnings = validate::validate(bytes, &header, &segments, &section_headers)?;

        let sections = section_headers
            .into_iter()
            .enumerate()
            .map(|(index, header)| Section { header, name: names.get(index).copied() })
            .collect();

        Ok(ElfImage { bytes, identification, header, segments, sections, warnings, name_error })
    }

    /// The bytes this image was decoded from.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn identification(&self) -> &Identification {
        &self.identification
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn codec(&self) -> Codec {
        self.identification.codec()
    }

    pub fn segments(&self) -> &[ProgramHeader] {
        &self.segments
    }

    pub fn sections(&self) -> &[Section<'a>] {
        &self.sections
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// If section names couldn't be resolved (and [`DecodeOptions::strict_names`] was turned off), this is why.
    pub fn name_error(&self) -> Option<&DecodeError> {
        self.name_error.as_ref()
    }

    pub fn entry_point(&self) -> u64 {
        self.header.entry_point
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section<'a>> {
        self.sections.iter().find(|section| section.name == Some(name))
    }

    /// Get a segment's file image. Returns `None` if `segment` doesn't fit in the buffer, which can't happen for
    /// segments of this image.
    pub fn segment_data(&self, segment: &ProgramHeader) -> Option<&'a [u8]> {
        self.data(segment.offset, segment.file_size)
    }

    /// Get a section's data, as a byte slice. Returns `None` if the section isn't represented in the file (for
    /// example, `NoBits` sections don't have any data).
    pub fn section_data(&self, section: &SectionHeader) -> Option<&'a [u8]> {
        if !section.has_file_data() {
            return None;
        }

        self.data(section.offset, section.size)
    }

    fn data(&self, offset: u64, size: u64) -> Option<&'a [u8]> {
        let end = offset.checked_add(size)?;
        self.bytes.get(usize::try_from(offset).ok()?..usize::try_from(end).ok()?)
    }

    /// The path of the program interpreter requested by the `Interp` segment, if there is one.
    pub fn interpreter(&self) -> Option<&'a str> {
        let segment = self.segments.iter().find(|segment| segment.segment_type == SegmentType::Interp)?;
        let path = names::null_terminated(self.segment_data(segment)?)?;
        str::from_utf8(path).ok()
    }

    /// Iterate over the notes in a `Note` segment.
    pub fn segment_notes(&self, segment: &ProgramHeader) -> Option<NoteIter<'a>> {
        if segment.segment_type != SegmentType::Note {
            return None;
        }

        Some(NoteIter::new(self.segment_data(segment)?, self.identification.endianness, segment.alignment))
    }

    /// Iterate over the notes in a `Note` section.
    pub fn section_notes(&self, section: &SectionHeader) -> Option<NoteIter<'a>> {
        if section.section_type != SectionType::Note {
            return None;
        }

        Some(NoteIter::new(self.section_data(section)?, self.identification.endianness, section.alignment))
    }
}
